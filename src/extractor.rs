//! Line records from PDF and plain-text documents
//!
//! The PDF path walks each page's content stream with lopdf, tracking the
//! transformation and text matrices to position every shown string, then
//! groups strings sharing a baseline into lines. The plain-text path has
//! no font metrics and feeds the pipeline's degraded mode.

use crate::OutlineError;
use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Height assumed when a page has no usable MediaBox (US Letter)
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// One visually distinct line of text on one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Trimmed line text
    pub text: String,
    /// Largest font size on the line, `None` when the source has no metrics
    pub font_size: Option<f32>,
    /// Any part of the line is set in a bold face
    pub bold: bool,
    /// Page number (1-indexed)
    pub page: u32,
    /// Distance from the top of the page; smaller is higher
    pub y: f32,
}

impl LineRecord {
    pub fn new(text: &str, font_size: Option<f32>, bold: bool, page: u32, y: f32) -> Self {
        Self {
            text: text.trim().to_string(),
            font_size,
            bold,
            page,
            y,
        }
    }

    /// A line without font metadata
    pub fn plain(text: &str, page: u32, y: f32) -> Self {
        Self::new(text, None, false, page, y)
    }
}

/// Everything the outline pipeline needs from one input document
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    /// Non-empty lines in page order, then reading order
    pub lines: Vec<LineRecord>,
    /// Number of pages, including pages without text
    pub page_count: u32,
    /// Title from the document's metadata, if any
    pub metadata_title: Option<String>,
}

impl SourceDocument {
    /// Build from line records alone; the page count is the highest page seen
    pub fn from_lines(lines: Vec<LineRecord>) -> Self {
        let lines: Vec<LineRecord> = lines.into_iter().filter(|l| !l.text.is_empty()).collect();
        let page_count = lines.iter().map(|l| l.page).max().unwrap_or(0);
        Self {
            lines,
            page_count,
            metadata_title: None,
        }
    }

    pub fn with_metadata_title(mut self, title: Option<String>) -> Self {
        self.metadata_title = title;
        self
    }
}

/// A text item with position information
#[derive(Debug, Clone)]
pub struct TextItem {
    /// The text content
    pub text: String,
    /// X position on page
    pub x: f32,
    /// Y position on page (PDF coordinates, origin at bottom-left)
    pub y: f32,
    /// Rendered font size
    pub font_size: f32,
    pub is_bold: bool,
    /// Page number (1-indexed)
    pub page: u32,
}

/// A line of text (grouped text items)
#[derive(Debug, Clone)]
pub struct TextLine {
    pub items: Vec<TextItem>,
    pub y: f32,
    pub page: u32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|i| i.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Convert to a line record, measuring y from the top of a page of `page_height`
    pub fn to_record(&self, page_height: f32) -> Option<LineRecord> {
        let text = self.text();
        if text.trim().is_empty() {
            return None;
        }
        let font_size = self
            .items
            .iter()
            .map(|i| i.font_size)
            .fold(f32::NEG_INFINITY, f32::max);
        Some(LineRecord::new(
            &text,
            font_size.is_finite().then_some(font_size),
            self.items.iter().any(|i| i.is_bold),
            self.page,
            page_height - self.y,
        ))
    }
}

/// Load line records and metadata from a PDF file
pub fn load_pdf<P: AsRef<Path>>(path: P) -> Result<SourceDocument, OutlineError> {
    let doc = Document::load(path)?;
    source_from_doc(&doc)
}

/// Load line records and metadata from a PDF held in memory
pub fn load_pdf_mem(buffer: &[u8]) -> Result<SourceDocument, OutlineError> {
    let doc = Document::load_mem(buffer)?;
    source_from_doc(&doc)
}

/// Load a plain-text document; form feeds separate pages
pub fn load_text<P: AsRef<Path>>(path: P) -> Result<SourceDocument, OutlineError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(text_source(&raw))
}

/// Split plain text into pages (form feed) and lines (newline)
pub fn text_source(raw: &str) -> SourceDocument {
    let mut lines = Vec::new();
    let mut page_count = 0u32;
    for (idx, page_text) in raw.split('\u{c}').enumerate() {
        let page = idx as u32 + 1;
        page_count = page;
        for (row, line) in page_text.lines().enumerate() {
            if !line.trim().is_empty() {
                lines.push(LineRecord::plain(line, page, row as f32));
            }
        }
    }
    // A trailing form feed does not open a new page
    if raw.ends_with('\u{c}') {
        page_count = page_count.saturating_sub(1);
    }
    SourceDocument {
        lines,
        page_count,
        metadata_title: None,
    }
}

fn source_from_doc(doc: &Document) -> Result<SourceDocument, OutlineError> {
    // Content streams of a document lopdf could not decrypt are unreadable
    if doc.is_encrypted() {
        return Err(OutlineError::Encrypted);
    }

    let pages = doc.get_pages();
    let mut lines = Vec::new();

    for (page_num, &page_id) in pages.iter() {
        let items = match extract_page_text_items(doc, page_id, *page_num) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Skipping page {}: {}", page_num, e);
                continue;
            }
        };
        let height = page_height(doc, page_id);
        lines.extend(
            group_into_lines(items)
                .iter()
                .filter_map(|line| line.to_record(height)),
        );
    }

    log::debug!("Extracted {} lines from {} pages", lines.len(), pages.len());

    Ok(SourceDocument {
        lines,
        page_count: pages.len() as u32,
        metadata_title: get_document_title(doc),
    })
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Current text state while walking a content stream
struct TextState {
    base_font: String,
    font_size: f32,
    text_matrix: [f32; 6],
    ctm: [f32; 6],
    page: u32,
}

impl TextState {
    fn item(&self, text: String) -> Option<TextItem> {
        if text.trim().is_empty() {
            return None;
        }
        let rendered_size = effective_font_size(self.font_size, &self.text_matrix);
        // Transform position through CTM
        let combined = multiply_matrices(&self.text_matrix, &self.ctm);
        Some(TextItem {
            text,
            x: combined[4],
            y: combined[5],
            is_bold: is_bold_font(&self.base_font),
            font_size: rendered_size,
            page: self.page,
        })
    }
}

/// Extract text items from a single page
fn extract_page_text_items(
    doc: &Document,
    page_id: ObjectId,
    page_num: u32,
) -> Result<Vec<TextItem>, OutlineError> {
    use lopdf::content::Content;

    let mut items = Vec::new();

    // Get fonts for encoding
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let base_fonts: HashMap<Vec<u8>, String> = fonts
        .iter()
        .map(|(name, dict)| {
            let base = dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_default();
            (name.clone(), base)
        })
        .collect();

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| OutlineError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| OutlineError::Parse(e.to_string()))?;

    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();
    let mut current_font = String::new();
    let mut line_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut in_text_block = false;
    let mut state = TextState {
        base_font: String::new(),
        font_size: 12.0,
        text_matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        ctm: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        page: page_num,
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    state.ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let new_matrix = [
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    ];
                    state.ctm = multiply_matrices(&new_matrix, &state.ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                state.text_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                line_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        current_font = String::from_utf8_lossy(name).to_string();
                        state.base_font = base_fonts.get(name).cloned().unwrap_or_default();
                    }
                    if let Some(size) = get_number(&op.operands[1]) {
                        state.font_size = size;
                    }
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    line_matrix[4] += tx;
                    line_matrix[5] += ty;
                    state.text_matrix = line_matrix;
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        state.text_matrix[i] =
                            get_number(operand).unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
                    }
                    line_matrix = state.text_matrix;
                }
            }
            "T*" => {
                line_matrix[5] -= state.font_size * 1.2; // Approximate line height
                state.text_matrix = line_matrix;
            }
            "Tj" => {
                if in_text_block && !op.operands.is_empty() {
                    let text = decode_operand(&op.operands[0], doc, &fonts, &current_font);
                    items.extend(text.and_then(|t| state.item(t)));
                }
            }
            "TJ" => {
                if in_text_block && !op.operands.is_empty() {
                    if let Ok(array) = op.operands[0].as_array() {
                        let combined: String = array
                            .iter()
                            .filter_map(|o| decode_operand(o, doc, &fonts, &current_font))
                            .collect();
                        items.extend(state.item(combined));
                    }
                }
            }
            "'" => {
                line_matrix[5] -= state.font_size * 1.2;
                state.text_matrix = line_matrix;
                if !op.operands.is_empty() {
                    let text = decode_operand(&op.operands[0], doc, &fonts, &current_font);
                    items.extend(text.and_then(|t| state.item(t)));
                }
            }
            _ => {}
        }
    }

    Ok(items)
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Compute effective font size from base size and text matrix
/// Text matrix is [a, b, c, d, tx, ty] where a,d are scale factors
fn effective_font_size(base_size: f32, text_matrix: &[f32; 6]) -> f32 {
    let scale_x = (text_matrix[0].powi(2) + text_matrix[1].powi(2)).sqrt();
    let scale_y = (text_matrix[2].powi(2) + text_matrix[3].powi(2)).sqrt();
    base_size * scale_x.max(scale_y)
}

/// Check if a base font name denotes a bold face ("Helvetica-Bold",
/// "Arial,Bold", "ABCDEF+Roboto-Black", "Times-BoldItalic", ...)
pub fn is_bold_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|p| lower.contains(p))
        || lower.ends_with(",b")
}

/// Extract text from a text operand, handling encoding
fn decode_operand(
    obj: &Object,
    doc: &Document,
    fonts: &std::collections::BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    current_font: &str,
) -> Option<String> {
    if let Object::String(bytes, _) = obj {
        // Try to decode using font encoding
        if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
            if let Ok(encoding) = font_dict.get_font_encoding(doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return Some(text);
                }
            }
        }
        Some(decode_pdf_string(bytes))
    } else {
        None
    }
}

/// UTF-16BE when a byte order mark is present, Latin-1 otherwise
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Page height from the MediaBox, following inherited attributes up the page tree
fn page_height(doc: &Document, page_id: ObjectId) -> f32 {
    let mut current = Some(page_id);
    // Bound the walk in case of a cyclic page tree
    for _ in 0..32 {
        let dict = match current.and_then(|id| doc.get_dictionary(id).ok()) {
            Some(dict) => dict,
            None => break,
        };
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let resolved = match media_box {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            };
            if let Some(Object::Array(values)) = resolved {
                if values.len() == 4 {
                    if let (Some(y0), Some(y1)) = (get_number(&values[1]), get_number(&values[3])) {
                        return (y1 - y0).abs();
                    }
                }
            }
        }
        current = dict.get(b"Parent").ok().and_then(|p| p.as_reference().ok());
    }
    DEFAULT_PAGE_HEIGHT
}

/// Get document title from Info dictionary
fn get_document_title(doc: &Document) -> Option<String> {
    let info_ref = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = doc.get_dictionary(info_ref).ok()?;
    match info.get(b"Title").ok()? {
        Object::String(bytes, _) => {
            let title = if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                decode_pdf_string(bytes)
            } else {
                String::from_utf8_lossy(bytes).to_string()
            };
            let title = title.trim().to_string();
            (!title.is_empty()).then_some(title)
        }
        _ => None,
    }
}

/// Group text items into lines.
///
/// Preserves content stream order (usually reading order) and merges only
/// consecutive items on the same baseline. Items within a line are sorted
/// left to right.
pub fn group_into_lines(items: Vec<TextItem>) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let y_tolerance = 3.0;

    for item in items {
        match lines.last_mut() {
            Some(last) if last.page == item.page && (last.y - item.y).abs() < y_tolerance => {
                last.items.push(item);
            }
            _ => {
                let y = item.y;
                let page = item.page;
                lines.push(TextLine {
                    items: vec![item],
                    y,
                    page,
                });
            }
        }
    }

    for line in &mut lines {
        line.items
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn item(text: &str, x: f32, y: f32, font: &str, page: u32) -> TextItem {
        TextItem {
            text: text.into(),
            x,
            y,
            font_size: 12.0,
            is_bold: is_bold_font(font),
            page,
        }
    }

    #[test]
    fn test_group_into_lines() {
        let items = vec![
            item("World", 160.0, 700.0, "Helvetica", 1),
            item("Hello", 100.0, 701.0, "Helvetica-Bold", 1),
            item("Next line", 100.0, 680.0, "Helvetica", 1),
        ];

        let lines = group_into_lines(items);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello World");
        assert_eq!(lines[1].text(), "Next line");

        let record = lines[0].to_record(792.0).unwrap();
        assert!(record.bold);
        assert_eq!(record.font_size, Some(12.0));
        assert!((record.y - 92.0).abs() < 0.001);
    }

    #[test]
    fn test_bold_font_names() {
        assert!(is_bold_font("Helvetica-Bold"));
        assert!(is_bold_font("ABCDEF+Roboto-Black"));
        assert!(is_bold_font("Arial,B"));
        assert!(is_bold_font("Times-BoldItalic"));
        assert!(!is_bold_font("Helvetica"));
        assert!(!is_bold_font("Times-Italic"));
    }

    #[test]
    fn test_effective_font_size() {
        assert_eq!(effective_font_size(1.0, &[12.0, 0.0, 0.0, 12.0, 0.0, 0.0]), 12.0);
        assert_eq!(effective_font_size(10.0, &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]), 10.0);
    }

    #[test]
    fn test_text_source_pages() {
        let source = text_source("Title Line\n\nBody\u{c}Second Page\n  \n");
        assert_eq!(source.page_count, 2);
        assert_eq!(source.lines.len(), 3);
        assert_eq!(source.lines[2].page, 2);
        assert_eq!(source.lines[2].text, "Second Page");
        assert!(source.lines.iter().all(|l| l.font_size.is_none()));
    }

    #[test]
    fn test_text_source_trailing_form_feed() {
        let source = text_source("Only Page\u{c}");
        assert_eq!(source.page_count, 1);
    }

    #[test]
    fn test_encrypted_document_is_rejected() {
        let mut doc = Document::with_version("1.5");
        let encrypt_id = doc.add_object(lopdf::dictionary! {
            "Filter" => "Standard",
            "V" => 2,
            "R" => 3,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        assert!(matches!(source_from_doc(&doc), Err(OutlineError::Encrypted)));
    }

    #[test]
    fn test_decode_utf16_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_pdf_string(&bytes), "Hi");
        assert_eq!(decode_pdf_string(b"Plain"), "Plain");
    }
}
