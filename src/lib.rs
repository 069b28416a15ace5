//! Heuristic document outline extraction
//!
//! This crate provides:
//! - Line extraction from PDFs (lopdf) and plain text, with font size,
//!   boldness and position per line
//! - Title detection and H1-H4 heading classification from typographic and
//!   lexical signals
//! - A batch runner that turns a folder of documents into outline JSON
//!
//! ```no_run
//! let outline = pdf_outline::extract_outline("report.pdf")?;
//! println!("{}", outline.to_json_pretty()?);
//! # Ok::<(), pdf_outline::OutlineError>(())
//! ```

pub mod artifacts;
pub mod batch;
pub mod config;
pub mod detector;
pub mod extractor;
pub mod filters;
pub mod headings;
pub mod levels;
pub mod outline;
pub mod title;

pub use batch::{run_batch, BatchReport, FileOutcome, FileStatus, JsonStyle};
pub use config::{DedupKey, OutlineConfig};
pub use detector::{detect_form, DocumentKind, FormDetection};
pub use extractor::{load_pdf, load_pdf_mem, load_text, text_source, LineRecord, SourceDocument};
pub use outline::{DocumentOutline, HeadingLevel, OutlineEntry, OutlineExtractor};

use std::path::Path;

/// Input formats the crate can read line records from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Text,
}

impl InputKind {
    /// Classify a path by extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(InputKind::Pdf),
            "txt" => Some(InputKind::Text),
            _ => None,
        }
    }
}

/// Load line records from a `.pdf` or `.txt` file
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<SourceDocument, OutlineError> {
    match InputKind::from_path(&path) {
        Some(InputKind::Pdf) => load_pdf(path),
        Some(InputKind::Text) => load_text(path),
        None => Err(OutlineError::UnsupportedInput(
            path.as_ref().display().to_string(),
        )),
    }
}

/// Extract the outline of a document with the default configuration
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<DocumentOutline, OutlineError> {
    extract_outline_with_config(path, &OutlineConfig::default())
}

/// Extract the outline of a document with a custom configuration
pub fn extract_outline_with_config<P: AsRef<Path>>(
    path: P,
    config: &OutlineConfig,
) -> Result<DocumentOutline, OutlineError> {
    let source = load_document(path)?;
    Ok(OutlineExtractor::new(config.clone()).extract(&source))
}

/// Extract the outline of a PDF held in memory
pub fn extract_outline_mem(
    buffer: &[u8],
    config: &OutlineConfig,
) -> Result<DocumentOutline, OutlineError> {
    let source = load_pdf_mem(buffer)?;
    Ok(OutlineExtractor::new(config.clone()).extract(&source))
}

#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

impl From<lopdf::Error> for OutlineError {
    fn from(e: lopdf::Error) -> Self {
        OutlineError::Parse(e.to_string())
    }
}
