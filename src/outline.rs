//! Outline types, assembly, and the end-to-end pipeline
//!
//! [`OutlineExtractor`] runs the stages in their fixed order over one
//! document's line records:
//!
//! 1. title extraction and form detection over all lines
//! 2. artifact rejection and candidate detection per line
//! 3. boilerplate and fragment filtering over all candidates
//! 4. level assignment
//! 5. assembly: ordering, duplicate and generic-heading removal

use crate::artifacts::ArtifactFilter;
use crate::config::{DedupKey, OutlineConfig};
use crate::detector::detect_form;
use crate::extractor::{LineRecord, SourceDocument};
use crate::filters::{filter_boilerplate, remove_fragments};
use crate::headings::{HeadingCandidate, HeadingDetector};
use crate::levels::LevelAssigner;
use crate::title::TitleExtractor;
use crate::OutlineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Heading depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Level for a nesting depth, clamped to 1..=4
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            _ => HeadingLevel::H4,
        }
    }

    pub fn depth(self) -> usize {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// One heading of the final outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

/// The extraction result for one document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    pub fn to_json(&self) -> Result<String, OutlineError> {
        serde_json::to_string(self).map_err(|e| OutlineError::Serialize(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, OutlineError> {
        serde_json::to_string_pretty(self).map_err(|e| OutlineError::Serialize(e.to_string()))
    }
}

/// Final ordering and duplicate removal
#[derive(Debug, Clone)]
pub struct OutlineAssembler {
    dedup_key: DedupKey,
    generic_headings: HashSet<String>,
}

impl OutlineAssembler {
    pub fn new(config: &OutlineConfig) -> Self {
        let generic_headings = if config.drop_generic_headings {
            config
                .generic_headings
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };
        Self {
            dedup_key: config.dedup_key,
            generic_headings,
        }
    }

    /// Order candidates by page (stable within a page) and emit entries.
    /// Candidates without a level are skipped.
    pub fn assemble(&self, mut candidates: Vec<HeadingCandidate>) -> Vec<OutlineEntry> {
        candidates.sort_by_key(|c| c.page());

        let mut seen: HashSet<(String, u32)> = HashSet::new();
        let mut outline = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let level = match candidate.level {
                Some(level) => level,
                None => continue,
            };
            let key = candidate.key();
            if self.is_generic(&key) && candidate.numbering_depth.is_none() {
                continue;
            }
            let discriminator = match self.dedup_key {
                DedupKey::TextPage => candidate.page(),
                DedupKey::TextLevel => level.depth() as u32,
            };
            if !seen.insert((key, discriminator)) {
                continue;
            }
            outline.push(OutlineEntry {
                level,
                text: candidate.text().trim().to_string(),
                page: candidate.page(),
            });
        }

        outline
    }

    fn is_generic(&self, key: &str) -> bool {
        let bare = key.trim_end_matches(|c: char| c == ':' || c == '.');
        self.generic_headings.contains(bare)
    }
}

/// The outline pipeline, configured once and reusable across documents
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    config: OutlineConfig,
    artifacts: ArtifactFilter,
    titles: TitleExtractor,
    assembler: OutlineAssembler,
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::new(OutlineConfig::default())
    }
}

impl OutlineExtractor {
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            artifacts: ArtifactFilter::new(&config),
            titles: TitleExtractor::new(&config),
            assembler: OutlineAssembler::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Extract title and outline from a loaded document
    pub fn extract(&self, source: &SourceDocument) -> DocumentOutline {
        let lines = &source.lines;
        if lines.is_empty() {
            return DocumentOutline::default();
        }

        let title = self
            .titles
            .extract(lines, source.metadata_title.as_deref());

        let form = detect_form(lines, &self.artifacts, self.config.form_field_fraction);
        if form.is_form() {
            log::debug!("Form document, outline suppressed (title {:?})", title);
            return DocumentOutline {
                title,
                outline: Vec::new(),
            };
        }

        let page_count = source
            .page_count
            .max(lines.iter().map(|l| l.page).max().unwrap_or(0));

        let candidates = self.candidates(lines);
        let detected = candidates.len();
        let candidates = filter_boilerplate(
            candidates,
            page_count,
            self.config.boilerplate_page_fraction,
            self.config.boilerplate_min_pages,
        );
        let mut candidates = remove_fragments(candidates, self.config.fragment_length_ratio);

        LevelAssigner::new(&self.config, &candidates).assign_all(&mut candidates);
        let outline = self.assembler.assemble(candidates);

        log::debug!(
            "{} lines, {} candidates, {} outline entries",
            lines.len(),
            detected,
            outline.len()
        );

        DocumentOutline { title, outline }
    }

    /// Convenience for callers holding bare line records
    pub fn extract_lines(&self, lines: &[LineRecord]) -> DocumentOutline {
        self.extract(&SourceDocument::from_lines(lines.to_vec()))
    }

    /// Lines that pass the artifact filter and fire a heading signal
    fn candidates(&self, lines: &[LineRecord]) -> Vec<HeadingCandidate> {
        let detector = HeadingDetector::new(&self.config, lines);
        lines
            .iter()
            .filter(|l| !l.text.trim().is_empty())
            .filter(|l| !self.artifacts.is_artifact(&l.text))
            .filter(|l| detector.detect(l))
            .map(|l| HeadingCandidate::new(l.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leveled(text: &str, page: u32, level: HeadingLevel) -> HeadingCandidate {
        let mut c = HeadingCandidate::new(LineRecord::plain(text, page, 0.0));
        c.level = Some(level);
        c
    }

    #[test]
    fn test_level_display_and_json() {
        assert_eq!(HeadingLevel::H3.to_string(), "H3");
        let entry = OutlineEntry {
            level: HeadingLevel::H2,
            text: "Scope".into(),
            page: 4,
        };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"level":"H2","text":"Scope","page":4}"#
        );
    }

    #[test]
    fn test_from_depth_clamps() {
        assert_eq!(HeadingLevel::from_depth(0), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(2), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_depth(9), HeadingLevel::H4);
    }

    #[test]
    fn test_assemble_orders_by_page_and_dedups() {
        let assembler = OutlineAssembler::new(&OutlineConfig::default());
        let outline = assembler.assemble(vec![
            leveled("Results", 2, HeadingLevel::H1),
            leveled("Methods", 1, HeadingLevel::H1),
            leveled("Data Sources", 1, HeadingLevel::H2),
            leveled("METHODS", 1, HeadingLevel::H2),
            leveled("Methods", 3, HeadingLevel::H1),
        ]);
        let texts: Vec<(&str, u32)> = outline.iter().map(|e| (e.text.as_str(), e.page)).collect();
        assert_eq!(
            texts,
            vec![("Methods", 1), ("Data Sources", 1), ("Results", 2), ("Methods", 3)]
        );
    }

    #[test]
    fn test_assemble_text_level_key() {
        let config = OutlineConfig {
            dedup_key: DedupKey::TextLevel,
            ..OutlineConfig::default()
        };
        let outline = OutlineAssembler::new(&config).assemble(vec![
            leveled("Methods", 1, HeadingLevel::H1),
            leveled("Methods", 3, HeadingLevel::H1),
            leveled("Methods", 4, HeadingLevel::H2),
        ]);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[1].page, 4);
    }

    #[test]
    fn test_generic_headings_need_numbering() {
        let assembler = OutlineAssembler::new(&OutlineConfig::default());
        let outline = assembler.assemble(vec![
            leveled("Introduction", 1, HeadingLevel::H1),
            leveled("1. Introduction", 1, HeadingLevel::H1),
            leveled("Summary:", 2, HeadingLevel::H2),
        ]);
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "1. Introduction");

        let keep_all = OutlineConfig {
            drop_generic_headings: false,
            ..OutlineConfig::default()
        };
        let outline = OutlineAssembler::new(&keep_all).assemble(vec![leveled(
            "Introduction",
            1,
            HeadingLevel::H1,
        )]);
        assert_eq!(outline.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let result = OutlineExtractor::default().extract(&SourceDocument::default());
        assert_eq!(result, DocumentOutline::default());
        assert_eq!(result.to_json().unwrap(), r#"{"title":"","outline":[]}"#);
    }
}
