//! folio-ingest: PDF loading and per-page text extraction

pub mod pdf;

pub use pdf::{IngestError, PdfDocument};
