//! Tunable thresholds and vocabularies for outline extraction
//!
//! Every heuristic cutoff used by the pipeline lives here so that tuning is
//! a configuration change. The struct deserializes from JSON with all
//! fields optional; missing fields take their defaults.

use crate::OutlineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the outline assembler decides two headings are duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// Same case-folded text on the same page
    #[default]
    TextPage,
    /// Same case-folded text at the same level, anywhere in the document
    TextLevel,
}

/// Configuration for the outline pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Texts found on more than this fraction of pages are running headers
    pub boilerplate_page_fraction: f32,
    /// A text must recur on at least this many pages to count as boilerplate
    pub boilerplate_min_pages: usize,
    /// Substring candidates shorter than this ratio of the containing line are fragments
    pub fragment_length_ratio: f32,
    /// Lines with more words than this are never headings
    pub max_heading_words: usize,
    /// Lines with more characters than this are never headings
    pub max_heading_chars: usize,
    /// All lower-case lines with more words than this are body text
    pub lowercase_word_limit: usize,
    /// Lines ending in a period with more words than this are sentences
    pub sentence_word_limit: usize,
    /// Font size ratio over the median that makes a line a candidate
    pub large_font_ratio: f32,
    /// Deepest level produced from section numbering ("1.2.3.4" -> H4)
    pub max_numbering_depth: usize,
    /// Number of distinct font sizes mapped to levels before capping
    pub max_font_levels: usize,
    /// Minimum words for a line to be considered as a layout title
    pub title_min_words: usize,
    /// Lines within this ratio of the largest title font are title candidates
    pub title_size_ratio: f32,
    /// How many leading lines the lexical title fallback inspects
    pub title_scan_lines: usize,
    /// Fraction of field-label lines above which the document is a form
    pub form_field_fraction: f32,
    /// Words that mark a line as a form field label
    pub field_labels: Vec<String>,
    /// Low-information headings dropped unless explicitly numbered
    pub generic_headings: Vec<String>,
    /// Whether `generic_headings` is applied at all
    pub drop_generic_headings: bool,
    /// Duplicate key used by the outline assembler
    pub dedup_key: DedupKey,
    /// Accept capitalized phrases and title-case lines as candidates
    pub lexical_title_like: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            boilerplate_page_fraction: 0.25,
            boilerplate_min_pages: 2,
            fragment_length_ratio: 0.7,
            max_heading_words: 15,
            max_heading_chars: 80,
            lowercase_word_limit: 3,
            sentence_word_limit: 7,
            large_font_ratio: 1.2,
            max_numbering_depth: 4,
            max_font_levels: 4,
            title_min_words: 3,
            title_size_ratio: 0.9,
            title_scan_lines: 10,
            form_field_fraction: 0.2,
            field_labels: to_strings(&[
                "name",
                "date",
                "place",
                "signature",
                "address",
                "phone",
                "email",
                "department",
                "designation",
                "occupation",
                "age",
                "sex",
                "religion",
                "caste",
                "income",
                "rs.",
                "pay",
            ]),
            generic_headings: to_strings(&[
                "overview",
                "introduction",
                "summary",
                "conclusion",
                "conclusions",
                "references",
                "abstract",
                "background",
                "acknowledgements",
                "acknowledgments",
                "appendix",
            ]),
            drop_generic_headings: true,
            dedup_key: DedupKey::TextPage,
            lexical_title_like: true,
        }
    }
}

impl OutlineConfig {
    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, OutlineError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(raw: &str) -> Result<Self, OutlineError> {
        let config: OutlineConfig =
            serde_json::from_str(raw).map_err(|e| OutlineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<(), OutlineError> {
        if !(0.0..=1.0).contains(&self.boilerplate_page_fraction) {
            return Err(OutlineError::Config(format!(
                "boilerplate_page_fraction must be within 0..=1, got {}",
                self.boilerplate_page_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.fragment_length_ratio) {
            return Err(OutlineError::Config(format!(
                "fragment_length_ratio must be within 0..=1, got {}",
                self.fragment_length_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.form_field_fraction) {
            return Err(OutlineError::Config(format!(
                "form_field_fraction must be within 0..=1, got {}",
                self.form_field_fraction
            )));
        }
        if self.max_numbering_depth == 0 || self.max_numbering_depth > 4 {
            return Err(OutlineError::Config(format!(
                "max_numbering_depth must be within 1..=4, got {}",
                self.max_numbering_depth
            )));
        }
        if self.max_font_levels == 0 || self.max_font_levels > 4 {
            return Err(OutlineError::Config(format!(
                "max_font_levels must be within 1..=4, got {}",
                self.max_font_levels
            )));
        }
        Ok(())
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OutlineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dedup_key, DedupKey::TextPage);
        assert!(config.field_labels.iter().any(|l| l == "rs."));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = OutlineConfig::from_json_str(
            r#"{"boilerplate_page_fraction": 0.2, "dedup_key": "text_level"}"#,
        )
        .unwrap();
        assert!((config.boilerplate_page_fraction - 0.2).abs() < 0.001);
        assert_eq!(config.dedup_key, DedupKey::TextLevel);
        assert_eq!(config.max_heading_words, 15);
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let err = OutlineConfig::from_json_str(r#"{"boilerplate_page_fraction": 3.0}"#);
        assert!(matches!(err, Err(OutlineError::Config(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = OutlineConfig::from_json_str("{not json");
        assert!(matches!(err, Err(OutlineError::Config(_))));
    }
}
