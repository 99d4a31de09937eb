//! PDF text backend (lopdf)
//!
//! Pages are addressed by position in the page tree, not by the page labels
//! printed on the document.

use folio_core::PageSource;
use lopdf::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to load PDF: {0}")]
    Load(#[from] lopdf::Error),
}

/// A loaded PDF with its page numbers in document order.
pub struct PdfDocument {
    doc: Document,
    page_numbers: Vec<u32>,
}

impl PdfDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let pdf = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), pages = pdf.page_numbers.len(), "opened PDF");
        Ok(pdf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IngestError> {
        let doc = Document::load_mem(bytes)?;
        // get_pages is keyed by 1-based page number, already sorted
        let page_numbers = doc.get_pages().keys().copied().collect();
        Ok(Self { doc, page_numbers })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> String {
        let Some(&number) = self.page_numbers.get(index) else {
            return String::new();
        };
        match self.doc.extract_text(&[number]) {
            Ok(text) => clean_page_text(&text),
            Err(e) => {
                warn!(page = number, error = %e, "could not extract page text; using empty text");
                String::new()
            }
        }
    }
}

/// Drop NULs and byte-order marks some producers leave in text runs.
fn clean_page_text(text: &str) -> String {
    text.replace(['\u{0}', '\u{FEFF}'], "")
}
