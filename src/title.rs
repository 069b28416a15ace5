//! Document title selection
//!
//! Strategies are tried in order until one produces a title: the largest
//! (preferably bold) multi-word line on page 1, then the first plausible
//! line near the top of the document, then the metadata title. The chain
//! always ends in a usable string.

use crate::artifacts::{is_lowercase_text, word_count};
use crate::config::OutlineConfig;
use crate::extractor::LineRecord;

/// Title used when no strategy finds anything
pub const UNTITLED: &str = "Untitled Document";

#[derive(Debug, Clone)]
pub struct TitleExtractor {
    min_words: usize,
    size_ratio: f32,
    scan_lines: usize,
}

impl TitleExtractor {
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            min_words: config.title_min_words,
            size_ratio: config.title_size_ratio,
            scan_lines: config.title_scan_lines,
        }
    }

    /// Pick the title of a document.
    ///
    /// Returns an empty string only when `lines` is empty.
    pub fn extract(&self, lines: &[LineRecord], metadata_title: Option<&str>) -> String {
        if lines.is_empty() {
            return String::new();
        }
        self.layout_title(lines)
            .or_else(|| self.lexical_title(lines))
            .or_else(|| metadata(metadata_title))
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Largest multi-word line on the first page, bold preferred, topmost wins
    pub fn layout_title(&self, lines: &[LineRecord]) -> Option<String> {
        let first_page = lines.iter().map(|l| l.page).min()?;
        let sized: Vec<(&LineRecord, f32)> = lines
            .iter()
            .filter(|l| l.page == first_page && word_count(&l.text) >= self.min_words)
            .filter_map(|l| l.font_size.map(|size| (l, size)))
            .collect();

        let max_size = sized.iter().map(|(_, s)| *s).fold(f32::NEG_INFINITY, f32::max);
        if !max_size.is_finite() {
            return None;
        }

        let candidates: Vec<&LineRecord> = sized
            .into_iter()
            .filter(|(_, size)| *size >= max_size * self.size_ratio)
            .map(|(l, _)| l)
            .collect();
        let bold: Vec<&LineRecord> = candidates.iter().copied().filter(|l| l.bold).collect();
        let pool = if bold.is_empty() { candidates } else { bold };

        pool.into_iter()
            .min_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
            .map(|l| l.text.trim().to_string())
    }

    /// First reasonably long line near the top that is not all lower-case
    pub fn lexical_title(&self, lines: &[LineRecord]) -> Option<String> {
        lines
            .iter()
            .take(self.scan_lines)
            .map(|l| l.text.trim())
            .find(|t| t.chars().count() > 3 && !is_lowercase_text(t))
            .map(str::to_string)
    }
}

fn metadata(title: Option<&str>) -> Option<String> {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TitleExtractor {
        TitleExtractor::new(&OutlineConfig::default())
    }

    #[test]
    fn test_layout_title_prefers_large_bold() {
        let lines = vec![
            LineRecord::new("Prepared for the steering committee", Some(10.0), false, 1, 80.0),
            LineRecord::new("SYSTEM REQUIREMENTS MANUAL", Some(24.0), true, 1, 120.0),
            LineRecord::new("Version two draft copy", Some(23.0), false, 1, 60.0),
            LineRecord::new("This is the body of the document", Some(10.0), false, 1, 300.0),
        ];
        assert_eq!(extractor().extract(&lines, None), "SYSTEM REQUIREMENTS MANUAL");
    }

    #[test]
    fn test_layout_title_topmost_among_equals() {
        let lines = vec![
            LineRecord::new("Second Big Line Here", Some(20.0), false, 1, 200.0),
            LineRecord::new("First Big Line Here", Some(20.0), false, 1, 100.0),
        ];
        assert_eq!(extractor().extract(&lines, None), "First Big Line Here");
    }

    #[test]
    fn test_layout_title_ignores_later_pages() {
        let lines = vec![
            LineRecord::new("Cover Page Title Text", Some(14.0), false, 1, 100.0),
            LineRecord::new("Much Larger Chapter Heading", Some(30.0), false, 2, 100.0),
        ];
        assert_eq!(extractor().extract(&lines, None), "Cover Page Title Text");
    }

    #[test]
    fn test_lexical_fallback() {
        let lines = vec![
            LineRecord::plain("abc", 1, 0.0),
            LineRecord::plain("lowercase preface line", 1, 0.0),
            LineRecord::plain("Quarterly Review", 1, 0.0),
        ];
        assert_eq!(extractor().extract(&lines, None), "Quarterly Review");
    }

    #[test]
    fn test_metadata_then_untitled() {
        let lines = vec![LineRecord::plain("tiny", 1, 0.0)];
        assert_eq!(extractor().extract(&lines, Some(" Leave Form ")), "Leave Form");
        assert_eq!(extractor().extract(&lines, Some("  ")), UNTITLED);
        assert_eq!(extractor().extract(&lines, None), UNTITLED);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(extractor().extract(&[], Some("Meta")), "");
    }
}
