//! Document loader: reads a source file into page-level text records

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{FileType, Page};

/// How long the whole-buffer PDF fallback may run before giving up
const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Typographic glyphs that PDF fonts commonly emit, with ASCII replacements
const GLYPH_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2010}', "-"),   // Hyphen
    ('\u{2011}', "-"),   // Non-breaking hyphen
    ('\u{2013}', "-"),   // En dash
    ('\u{2014}', "--"),  // Em dash
    ('\u{2018}', "'"),   // Left single quote
    ('\u{2019}', "'"),   // Right single quote
    ('\u{201C}', "\""),  // Left double quote
    ('\u{201D}', "\""),  // Right double quote
    ('\u{2022}', "* "),  // Bullet
    ('\u{2026}', "..."), // Ellipsis
    ('\u{00A0}', " "),   // Non-breaking space
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalise extracted PDF text: glyphs, NULs, per-line whitespace, blank lines
fn cleanup_pdf_text(text: &str) -> String {
    let mut result = text.replace('\0', "");
    for (glyph, replacement) in GLYPH_REPLACEMENTS {
        if result.contains(*glyph) {
            result = result.replace(*glyph, replacement);
        }
    }

    result
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads PDF and plain-text sources
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load a file into its pages
    ///
    /// Fails with [`Error::Load`] if the file is missing, unreadable, of an
    /// unsupported type, or yields no text.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<Page>> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let file_type = FileType::from_path(path);
        if !file_type.is_supported() {
            return Err(Error::load(source, "unsupported file type"));
        }

        let data = std::fs::read(path).map_err(|e| Error::load(&source, e.to_string()))?;

        let pages = match file_type {
            FileType::Pdf => Self::parse_pdf(&source, &data)?,
            FileType::Txt | FileType::Markdown => Self::parse_text(&source, &data)?,
            FileType::Unknown => return Err(Error::load(source, "unsupported file type")),
        };

        if pages.is_empty() {
            return Err(Error::load(source, "no text content could be extracted"));
        }

        tracing::info!(
            "Loaded {} ({}): {} page(s)",
            source,
            file_type.display_name(),
            pages.len()
        );

        Ok(pages)
    }

    /// Parse a plain-text or markdown file as a single page
    fn parse_text(source: &str, data: &[u8]) -> Result<Vec<Page>> {
        let content = std::str::from_utf8(data)
            .map_err(|e| Error::load(source, format!("file is not valid UTF-8: {}", e)))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![Page::new(source, 1, content)])
    }

    /// Parse a PDF page by page, falling back to whole-document extraction
    fn parse_pdf(source: &str, data: &[u8]) -> Result<Vec<Page>> {
        match lopdf::Document::load_mem(data) {
            Ok(doc) => {
                let mut pages = Vec::new();
                for page_number in doc.get_pages().into_keys() {
                    match doc.extract_text(&[page_number]) {
                        Ok(text) => {
                            let text = cleanup_pdf_text(&text);
                            if !text.is_empty() {
                                pages.push(Page::new(source, page_number, text));
                            }
                        }
                        Err(e) => {
                            tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                        }
                    }
                }

                if !pages.is_empty() {
                    return Ok(pages);
                }
                tracing::warn!("lopdf extracted no text from {}, trying pdf-extract", source);
            }
            Err(e) => {
                tracing::warn!("lopdf failed to load {}: {}, trying pdf-extract", source, e);
            }
        }

        let text = Self::extract_pdf_with_timeout(data).map_err(|m| Error::load(source, m))?;
        let text = cleanup_pdf_text(&text);
        if text.is_empty() {
            return Err(Error::load(
                source,
                "No text content could be extracted from PDF (image-based or encrypted?)",
            ));
        }

        Ok(vec![Page::new(source, 1, text)])
    }

    /// Run pdf-extract on a worker thread so a pathological font cannot hang
    /// or panic the caller
    fn extract_pdf_with_timeout(data: &[u8]) -> std::result::Result<String, String> {
        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(PDF_EXTRACT_TIMEOUT) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                Ok(text)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(format!("malformed PDF: {}", e))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Err(format!(
                "PDF extraction timed out after {}s",
                PDF_EXTRACT_TIMEOUT.as_secs()
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err("PDF extraction thread crashed".to_string())
            }
        }
    }
}
