//! Plain-text extraction from office documents.
//!
//! Extraction is synchronous and CPU-bound; async callers run it on
//! `tokio::task::spawn_blocking`.

use crate::{Result, error::NlQueryError};
use std::{io::Read, path::Path};

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Xlsx,
    PlainText,
}

impl DocumentFormat {
    /// Extensions accepted, lower-case.
    pub const EXTENSIONS: [&'static str; 5] = ["pdf", "docx", "xlsx", "txt", "md"];

    /// Detects the format from the extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "txt" | "md" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Returns true when `path` has an extension the extractor handles.
pub fn is_supported(path: &Path) -> bool {
    DocumentFormat::from_path(path).is_some()
}

/// Extracts the plain text of a document.
///
/// Unsupported extensions yield an empty string.
///
/// # Errors
/// Returns an extraction error naming `path` when the file cannot be read
/// or parsed
pub fn extract_text(path: &Path) -> Result<String> {
    let Some(format) = DocumentFormat::from_path(path) else {
        tracing::debug!("No extractor for {}", path.display());
        return Ok(String::new());
    };

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(path),
        DocumentFormat::Docx => extract_docx(path),
        DocumentFormat::Xlsx => extract_xlsx(path),
        DocumentFormat::PlainText => {
            std::fs::read_to_string(path).map_err(|e| NlQueryError::extraction_failed(path, e))
        }
    }?;

    tracing::debug!(
        "Extracted {} chars from {}",
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

fn extract_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| NlQueryError::extraction_failed(path, e))?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| NlQueryError::extraction_failed(path, e))
}

/// Paragraphs (`w:p`) of `word/document.xml`, one per line.
fn extract_docx(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| NlQueryError::extraction_failed(path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| NlQueryError::extraction_failed(path, e))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| NlQueryError::extraction_failed(path, e))?
        .read_to_string(&mut xml)
        .map_err(|e| NlQueryError::extraction_failed(path, e))?;

    docx_paragraphs(&xml)
        .map(|paragraphs| paragraphs.join("\n"))
        .map_err(|e| NlQueryError::extraction_failed(path, e))
}

fn docx_paragraphs(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Every used row of every worksheet; non-empty cells joined by `" | "`.
fn extract_xlsx(path: &Path) -> Result<String> {
    use calamine::{Reader, Xlsx, open_workbook};

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e| NlQueryError::extraction_failed(path, e))?;

    let mut lines = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| NlQueryError::extraction_failed(path, e))?;

        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .map(render_cell)
                .filter(|cell| !cell.trim().is_empty())
                .collect();
            if !cells.is_empty() {
                lines.push(cells.join(" | "));
            }
        }
    }

    Ok(lines.join("\n"))
}

/// Date cells render as ISO dates so date keywords can match them;
/// everything else uses calamine's own formatting.
fn render_cell(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::DateTime(value) if value.is_duration() => value
            .as_duration()
            .map_or_else(|| value.to_string(), |duration| duration.to_string()),
        Data::DateTime(value) => value
            .as_datetime()
            .map_or_else(|| value.to_string(), format_datetime),
        Data::DateTimeIso(iso) => iso
            .parse::<chrono::NaiveDateTime>()
            .map_or_else(|_| iso.clone(), format_datetime),
        Data::DurationIso(iso) => iso.clone(),
        other => other.to_string(),
    }
}

fn format_datetime(value: chrono::NaiveDateTime) -> String {
    if value.time() == chrono::NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
