//! Folder-to-folder outline extraction
//!
//! Every supported document in the input folder is processed on the rayon
//! pool and written as `<stem>.json` to the output folder. A document that
//! fails to load is reported and skipped; it never stops the batch.

use crate::outline::OutlineExtractor;
use crate::{load_document, InputKind, OutlineConfig, OutlineError};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Output JSON layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    Pretty,
    Compact,
}

/// What happened to one input file
#[derive(Debug)]
pub enum FileStatus {
    Written { output: PathBuf, headings: usize },
    Failed(String),
}

#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, FileStatus::Written { .. })
    }
}

/// Per-file results of a batch, in input path order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Supported documents directly inside `dir`, sorted by path
pub fn list_inputs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, OutlineError> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && InputKind::from_path(&path).is_some() {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Process every document in `input_dir`, writing outlines to `output_dir`.
///
/// Only failures to read the input folder or create the output folder are
/// returned as errors; per-document failures are recorded in the report.
pub fn run_batch<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    config: &OutlineConfig,
    style: JsonStyle,
) -> Result<BatchReport, OutlineError> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let inputs = list_inputs(&input_dir)?;
    if inputs.is_empty() {
        log::warn!(
            "No PDF or text files found in {}",
            input_dir.as_ref().display()
        );
        return Ok(BatchReport::default());
    }

    let targets = plan_outputs(&inputs, output_dir);
    let extractor = OutlineExtractor::new(config.clone());
    let outcomes: Vec<FileOutcome> = inputs
        .par_iter()
        .zip(targets.par_iter())
        .map(|(input, target)| {
            let result = match target {
                Some(output) => process_file(&extractor, input, output, style)
                    .map(|headings| (output.clone(), headings))
                    .map_err(|e| e.to_string()),
                None => Err("no free output name, another input uses it".to_string()),
            };
            let status = match result {
                Ok((output, headings)) => {
                    log::info!(
                        "Processed {} -> {} ({} headings)",
                        input.display(),
                        output.display(),
                        headings
                    );
                    FileStatus::Written { output, headings }
                }
                Err(reason) => {
                    log::warn!("Error processing {}: {}", input.display(), reason);
                    FileStatus::Failed(reason)
                }
            };
            FileOutcome {
                input: input.clone(),
                status,
            }
        })
        .collect();

    Ok(BatchReport { outcomes })
}

/// Assign every input its own output file.
///
/// Inputs get `<stem>.json`; when two inputs share a stem (`report.pdf` and
/// `report.txt`) the later one keeps its extension (`report.txt.json`).
/// Names are compared case-insensitively so outputs stay distinct on
/// case-insensitive filesystems. `None` means no free name was left.
pub fn plan_outputs(inputs: &[PathBuf], output_dir: &Path) -> Vec<Option<PathBuf>> {
    let mut taken: HashSet<String> = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "output".to_string());
            let file_name = input
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| stem.clone());
            [format!("{}.json", stem), format!("{}.json", file_name)]
                .into_iter()
                .find(|name| taken.insert(name.to_lowercase()))
                .map(|name| output_dir.join(name))
        })
        .collect()
}

/// Extract one document and write its JSON to `output`, returning the
/// number of outline entries
pub fn process_file(
    extractor: &OutlineExtractor,
    input: &Path,
    output: &Path,
    style: JsonStyle,
) -> Result<usize, OutlineError> {
    let source = load_document(input)?;
    let outline = extractor.extract(&source);
    let json = match style {
        JsonStyle::Pretty => outline.to_json_pretty()?,
        JsonStyle::Compact => outline.to_json()?,
    };
    fs::write(output, json)?;
    Ok(outline.outline.len())
}
