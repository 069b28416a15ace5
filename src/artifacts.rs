//! Rejection of lines that can never be headings
//!
//! Page numbers, form field labels, captions, boilerplate phrases and
//! sentences are recognised from the text alone, before any layout signal
//! is consulted.

use crate::config::OutlineConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_OF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpage\s*\d+(\s*of\s*\d+)?\b").unwrap());

static JUNK_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^table\s+of\s+contents$",
        r"(?i)^contents$",
        r"(?i)^(figure|fig\.)\s*\d+",
        r"(?i)^table\s*\d+",
        r"(?i)^\d+\s+figures?$",
        r"(?i)^\d+\s+tables?$",
        r"(?i)revision\s+history",
        r"(?i)copyright",
        r"(?i)confidential",
        r"^\d{4}$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DOTTED_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)+\.?$").unwrap());

/// Classifies single lines as noise independent of layout
#[derive(Debug, Clone)]
pub struct ArtifactFilter {
    field_label_re: Option<Regex>,
    leading_label_re: Option<Regex>,
    max_words: usize,
    max_chars: usize,
    lowercase_word_limit: usize,
    sentence_word_limit: usize,
}

impl ArtifactFilter {
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            field_label_re: build_field_label_regex(&config.field_labels, false),
            leading_label_re: build_field_label_regex(&config.field_labels, true),
            max_words: config.max_heading_words,
            max_chars: config.max_heading_chars,
            lowercase_word_limit: config.lowercase_word_limit,
            sentence_word_limit: config.sentence_word_limit,
        }
    }

    /// True when the line must never enter the outline
    pub fn is_artifact(&self, text: &str) -> bool {
        let txt = text.trim();
        let chars = txt.chars().count();
        if chars <= 2 {
            return true;
        }
        let words = word_count(txt);
        if words > self.max_words || chars > self.max_chars {
            return true;
        }
        if is_numeric_token(txt) {
            return true;
        }
        if txt.ends_with('.') && words > self.sentence_word_limit {
            return true;
        }
        if is_lowercase_text(txt) && words > self.lowercase_word_limit {
            return true;
        }
        if PAGE_OF_RE.is_match(txt) {
            return true;
        }
        if JUNK_RES.iter().any(|re| re.is_match(txt)) {
            return true;
        }
        self.is_field_label(txt)
    }

    /// True when the line starts with, or contains as a standalone word,
    /// one of the configured field labels
    pub fn is_field_label(&self, text: &str) -> bool {
        self.field_label_re
            .as_ref()
            .map_or(false, |re| re.is_match(text.trim()))
    }

    /// True when the line opens with a field label ("Name:", "Date of Birth").
    /// Prose that merely mentions a label further in does not count.
    pub fn starts_with_field_label(&self, text: &str) -> bool {
        self.leading_label_re
            .as_ref()
            .map_or(false, |re| re.is_match(text.trim()))
    }
}

/// Build `(?i)(^|\W)(label|label...)(\W|$)` from the vocabulary, or the
/// `^`-only variant when `anchored`.
/// Labels are matched as whole words, so "age" does not fire on "page".
fn build_field_label_regex(labels: &[String], anchored: bool) -> Option<Regex> {
    let alternatives: Vec<String> = labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    let lead = if anchored { "^" } else { r"(?:^|[^\p{L}\p{N}])" };
    let pattern = format!(
        r"(?i){}(?:{})(?:[^\p{{L}}\p{{N}}]|$)",
        lead,
        alternatives.join("|")
    );
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Ignoring unusable field label vocabulary: {}", e);
            None
        }
    }
}

/// Whitespace-separated word count
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Has cased characters and none of them are upper-case
pub(crate) fn is_lowercase_text(text: &str) -> bool {
    text.chars().any(|c| c.is_lowercase()) && !text.chars().any(|c| c.is_uppercase())
}

/// Has cased characters and none of them are lower-case
pub(crate) fn is_uppercase_text(text: &str) -> bool {
    text.chars().any(|c| c.is_uppercase()) && !text.chars().any(|c| c.is_lowercase())
}

/// Digits only, or a dotted numbering token with nothing after it
fn is_numeric_token(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit()) || DOTTED_NUMBER_RE.is_match(text)
}
