use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfError {
    #[error("Unsupported document format: expected a PDF")]
    UnsupportedFormat,

    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    #[error("Page {0} not found")]
    PageNotFound(u32),

    #[error("Invalid render width: {0}")]
    InvalidRenderWidth(f64),
}
