//! Document reading and text extraction.
//!
//! Supports plain text, markdown, HTML and text-based PDFs. Scanned PDFs
//! carry no text layer and need OCR before they can be ingested.

use docqa_core::{AppError, AppResult};
use std::fs;
use std::panic;
use std::path::Path;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    PlainText,
    Pdf,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("txt") | Some("text") => Self::PlainText,
            Some("pdf") => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::PlainText => "text",
            Self::Pdf => "pdf",
            Self::Unknown => "unknown",
        }
    }
}

/// Read a document and return its text content.
pub fn read_document(path: &Path) -> AppResult<String> {
    let content_type = ContentType::from_path(path);
    tracing::debug!("Reading {:?} as {}", path, content_type.as_str());

    let bytes = fs::read(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    if content_type == ContentType::Pdf {
        let text = extract_pdf_text(&bytes, path)?;
        tracing::info!("Extracted {} bytes of text from PDF {:?}", text.len(), path);
        return Ok(text);
    }

    if bytes.contains(&0) {
        return Err(AppError::Knowledge(format!(
            "{:?} looks like a binary file",
            path
        )));
    }

    let raw = String::from_utf8(bytes)
        .map_err(|_| AppError::Knowledge(format!("{:?} is not valid UTF-8", path)))?;

    let text = match content_type {
        ContentType::Markdown => clean_markdown(&raw),
        ContentType::Html => clean_html(&raw),
        _ => raw,
    };

    tracing::info!("Read {} bytes of text from {:?}", text.len(), path);

    Ok(text)
}

/// Extract the text layer of a PDF held in memory.
fn extract_pdf_text(bytes: &[u8], path: &Path) -> AppResult<String> {
    // pdf-extract panics on some malformed files instead of returning an error
    let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| AppError::Knowledge(format!("{:?} is not a readable PDF", path)))?;

    let text = extracted.map_err(|e| {
        AppError::Knowledge(format!("Failed to extract text from PDF {:?}: {}", path, e))
    })?;

    if text.trim().is_empty() {
        return Err(AppError::Knowledge(format!(
            "{:?} has no text layer (scanned PDF?)",
            path
        )));
    }

    Ok(text)
}

/// Strip markdown markup while keeping paragraph breaks.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim();

        // Horizontal rules and code fences
        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~")
        {
            continue;
        }

        result.push_str(trimmed.trim_start_matches('#').trim_start());
        result.push('\n');
    }

    result.trim().to_string()
}

/// Drop tags, scripts and styles; block-level closings become paragraph breaks.
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut skip_until: Option<&str> = None;

    while let Some(open) = rest.find('<') {
        if skip_until.is_none() {
            result.push_str(&rest[..open]);
        }

        let tag_area = &rest[open..];
        let Some(close) = tag_area.find('>') else {
            rest = "";
            break;
        };
        let tag = &tag_area[1..close];
        rest = &tag_area[close + 1..];

        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match skip_until {
            Some(end) if tag.starts_with('/') && name == end => skip_until = None,
            Some(_) => {}
            None if !tag.starts_with('/') && (name == "script" || name == "style") => {
                skip_until = Some(if name == "script" { "script" } else { "style" });
            }
            None if is_block_tag(&name) => result.push_str("\n\n"),
            None => {}
        }
    }

    if skip_until.is_none() {
        result.push_str(rest);
    }

    collapse_whitespace(&decode_entities(&result))
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "br" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "section"
            | "article" | "tr" | "table" | "ul" | "ol"
    )
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Collapse runs of spaces inside paragraphs and keep single blank lines between them.
fn collapse_whitespace(text: &str) -> String {
    text.split("\n\n")
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
