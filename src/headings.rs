//! Heading candidate detection
//!
//! A line that survived the artifact filter becomes a candidate when a
//! lexical signal (section numbering, appendix or roman markers, title-like
//! capitalisation) or a layout signal (large or bold font) fires. Without
//! font metrics only the lexical signals are available.

use crate::artifacts::{is_uppercase_text, word_count};
use crate::config::OutlineConfig;
use crate::extractor::LineRecord;
use crate::outline::HeadingLevel;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*)[.)]?\s*[A-Za-z]").unwrap());
static APPENDIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\.\s+[A-Za-z]").unwrap());
static ROMAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[IVXLCDM]+\.\s+[A-Za-z]").unwrap());
static CAPITALIZED_PHRASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9 \-()&,:]{1,79}$").unwrap());

/// A line provisionally judged to be a section heading
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    pub line: LineRecord,
    /// Count of leading dot-separated numeric segments ("2.1.3" -> 3)
    pub numbering_depth: Option<usize>,
    /// Assigned by the level assigner
    pub level: Option<HeadingLevel>,
}

impl HeadingCandidate {
    pub fn new(line: LineRecord) -> Self {
        let numbering_depth = numbering_depth(&line.text);
        Self {
            line,
            numbering_depth,
            level: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.line.text
    }

    pub fn page(&self) -> u32 {
        self.line.page
    }

    /// Case-folded, trimmed text used for frequency and duplicate keys
    pub fn key(&self) -> String {
        self.line.text.trim().to_lowercase()
    }
}

/// Depth of explicit section numbering at the start of the text
pub fn numbering_depth(text: &str) -> Option<usize> {
    NUMBERED_RE
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().split('.').count())
}

/// Appendix letter ("A. Terms") or roman numeral ("IV. Results") marker
pub fn is_lettered_section(text: &str) -> bool {
    let text = text.trim();
    APPENDIX_RE.is_match(text) || ROMAN_RE.is_match(text)
}

/// Every word that starts with a letter starts with an upper-case one
fn is_title_case(text: &str) -> bool {
    let mut saw_word = false;
    for word in text.split_whitespace() {
        match word.chars().next() {
            Some(c) if c.is_alphabetic() => {
                if !c.is_uppercase() {
                    return false;
                }
                saw_word = true;
            }
            _ => {}
        }
    }
    saw_word
}

/// Decides whether a non-artifact line is a heading candidate
#[derive(Debug, Clone)]
pub struct HeadingDetector {
    median_font_size: Option<f32>,
    large_font_ratio: f32,
    lexical_title_like: bool,
}

impl HeadingDetector {
    /// Build a detector with document-wide font statistics taken from `lines`
    pub fn new(config: &OutlineConfig, lines: &[LineRecord]) -> Self {
        Self {
            median_font_size: median_font_size(lines),
            large_font_ratio: config.large_font_ratio,
            lexical_title_like: config.lexical_title_like,
        }
    }

    pub fn median_font_size(&self) -> Option<f32> {
        self.median_font_size
    }

    pub fn detect(&self, line: &LineRecord) -> bool {
        self.lexical_signal(&line.text) || self.layout_signal(line)
    }

    fn lexical_signal(&self, text: &str) -> bool {
        let text = text.trim();
        if NUMBERED_RE.is_match(text) || is_lettered_section(text) {
            return true;
        }
        if !self.lexical_title_like {
            return false;
        }
        (is_uppercase_text(text) && word_count(text) >= 2)
            || is_title_case(text)
            || CAPITALIZED_PHRASE_RE.is_match(text)
    }

    fn layout_signal(&self, line: &LineRecord) -> bool {
        if line.bold {
            return true;
        }
        match (line.font_size, self.median_font_size) {
            (Some(size), Some(median)) if median > 0.0 => size >= median * self.large_font_ratio,
            _ => false,
        }
    }
}

/// Median of the known font sizes, `None` when the source had no metrics
pub fn median_font_size(lines: &[LineRecord]) -> Option<f32> {
    let mut sizes: Vec<f32> = lines.iter().filter_map(|l| l.font_size).collect();
    if sizes.is_empty() {
        return None;
    }
    sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sizes.len() / 2;
    if sizes.len() % 2 == 0 {
        Some((sizes[mid - 1] + sizes[mid]) / 2.0)
    } else {
        Some(sizes[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> LineRecord {
        LineRecord::plain(text, 1, 0.0)
    }

    #[test]
    fn test_numbering_depth() {
        assert_eq!(numbering_depth("1. Introduction"), Some(1));
        assert_eq!(numbering_depth("3.2 Scope"), Some(2));
        assert_eq!(numbering_depth("2.1.3 Details"), Some(3));
        assert_eq!(numbering_depth("1.2.3.4.5 Deep"), Some(5));
        assert_eq!(numbering_depth("4) Results"), Some(1));
        assert_eq!(numbering_depth("Introduction"), None);
        assert_eq!(numbering_depth("2.1.3"), None);
    }

    #[test]
    fn test_lettered_sections() {
        assert!(is_lettered_section("A. Terms and Definitions"));
        assert!(is_lettered_section("IV. Results"));
        assert!(!is_lettered_section("Appendix A"));
    }

    #[test]
    fn test_lexical_detection() {
        let detector = HeadingDetector::new(&OutlineConfig::default(), &[]);
        assert!(detector.detect(&plain("1. Introduction")));
        assert!(detector.detect(&plain("1.1 Background")));
        assert!(detector.detect(&plain("PROJECT SCOPE")));
        assert!(detector.detect(&plain("Design Goals and Constraints")));
        assert!(!detector.detect(&plain("This is some body text.")));
        assert!(!detector.detect(&plain("continued from the previous page")));
    }

    #[test]
    fn test_title_like_can_be_disabled() {
        let config = OutlineConfig {
            lexical_title_like: false,
            ..OutlineConfig::default()
        };
        let detector = HeadingDetector::new(&config, &[]);
        assert!(!detector.detect(&plain("Design Goals and Constraints")));
        assert!(detector.detect(&plain("2.4 Design Goals")));
    }

    #[test]
    fn test_layout_detection() {
        let lines = vec![
            LineRecord::new("body text one;", Some(10.0), false, 1, 100.0),
            LineRecord::new("body text two;", Some(10.0), false, 1, 112.0),
            LineRecord::new("a big line;", Some(14.0), false, 1, 130.0),
            LineRecord::new("a bold line;", Some(10.0), true, 1, 150.0),
        ];
        let detector = HeadingDetector::new(&OutlineConfig::default(), &lines);
        assert_eq!(detector.median_font_size(), Some(10.0));
        assert!(!detector.detect(&lines[0]));
        assert!(detector.detect(&lines[2]));
        assert!(detector.detect(&lines[3]));
    }

    #[test]
    fn test_median_even_count() {
        let lines = vec![
            LineRecord::new("a", Some(10.0), false, 1, 0.0),
            LineRecord::new("b", Some(12.0), false, 1, 0.0),
        ];
        assert_eq!(median_font_size(&lines), Some(11.0));
        assert_eq!(median_font_size(&[plain("c")]), None);
    }
}
