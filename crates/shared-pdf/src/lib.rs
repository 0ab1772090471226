//! Shared PDF handling utilities
//!
//! This crate stands in for the document rasterizer: it parses a PDF into
//! page geometry and answers raster-size queries for the placement engine.

pub mod document;
pub mod error;

pub use document::{DocumentLoader, LopdfLoader, PageMetadata, PagedDocument, PdfDocument};
pub use error::PdfError;

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of document bytes
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
