//! Form detection
//!
//! Application forms and similar field-dominated documents have no real
//! section structure: most of their lines are labels such as "Name:" or
//! "Date of Birth". When the share of such lines is high enough, the
//! outline is suppressed and only a title is reported.

use crate::artifacts::ArtifactFilter;
use crate::extractor::LineRecord;

/// Document classification used by the outline pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Regular document with (possibly) structural headings
    Structured,
    /// Field-label dominated document; outline is forced empty
    Form,
}

/// Result of form detection
#[derive(Debug, Clone, PartialEq)]
pub struct FormDetection {
    pub kind: DocumentKind,
    /// Lines opening with a field label
    pub field_lines: usize,
    /// All lines inspected
    pub total_lines: usize,
    /// `field_lines / total_lines`, 0.0 for empty documents
    pub field_ratio: f32,
}

impl FormDetection {
    pub fn is_form(&self) -> bool {
        self.kind == DocumentKind::Form
    }
}

/// Classify a document as a form when more than `threshold` of its lines
/// open with a field label
pub fn detect_form(lines: &[LineRecord], filter: &ArtifactFilter, threshold: f32) -> FormDetection {
    let total_lines = lines.len();
    let field_lines = lines
        .iter()
        .filter(|l| filter.starts_with_field_label(&l.text))
        .count();

    let field_ratio = if total_lines > 0 {
        field_lines as f32 / total_lines as f32
    } else {
        0.0
    };

    let kind = if total_lines > 0 && field_ratio > threshold {
        DocumentKind::Form
    } else {
        DocumentKind::Structured
    };

    log::debug!(
        "Form detection: {}/{} field lines ({:.2}) -> {:?}",
        field_lines,
        total_lines,
        field_ratio,
        kind
    );

    FormDetection {
        kind,
        field_lines,
        total_lines,
        field_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutlineConfig;

    fn lines(texts: &[&str]) -> Vec<LineRecord> {
        texts.iter().map(|t| LineRecord::plain(t, 1, 0.0)).collect()
    }

    #[test]
    fn test_form_detected() {
        let filter = ArtifactFilter::new(&OutlineConfig::default());
        let doc = lines(&[
            "Application for Leave",
            "Name:",
            "Designation:",
            "Date of joining",
            "Pay Scale",
        ]);
        let result = detect_form(&doc, &filter, 0.2);
        assert!(result.is_form());
        assert_eq!(result.field_lines, 4);
        assert_eq!(result.total_lines, 5);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let filter = ArtifactFilter::new(&OutlineConfig::default());
        let doc = lines(&[
            "1. Introduction",
            "This is some body text.",
            "1.1 Background",
            "name:",
            "2. Methods",
        ]);
        let result = detect_form(&doc, &filter, 0.2);
        assert_eq!(result.kind, DocumentKind::Structured);
        assert!((result.field_ratio - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_labels_inside_prose_do_not_make_a_form() {
        let filter = ArtifactFilter::new(&OutlineConfig::default());
        let doc = lines(&[
            "1. Salary Policy",
            "Staff are paid on the last working day and pay slips follow.",
            "2. Deductions",
            "Tax is withheld from gross pay before transfer.",
            "3. Overtime",
            "Extra hours are approved by a manager in advance.",
        ]);
        let result = detect_form(&doc, &filter, 0.2);
        assert_eq!(result.kind, DocumentKind::Structured);
        assert_eq!(result.field_lines, 0);
    }

    #[test]
    fn test_empty_document_is_structured() {
        let filter = ArtifactFilter::new(&OutlineConfig::default());
        let result = detect_form(&[], &filter, 0.2);
        assert_eq!(result.kind, DocumentKind::Structured);
        assert_eq!(result.field_ratio, 0.0);
    }
}
