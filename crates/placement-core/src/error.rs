use shared_pdf::PdfError;
use shared_types::{FieldId, RecipientId};
use thiserror::Error;

/// Why a recipient could not be added
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientRejection {
    #[error("email must not be empty")]
    Empty,

    #[error("email is not a valid address")]
    Malformed,

    #[error("a recipient with this email already exists")]
    Duplicate,

    #[error("recipient limit reached")]
    LimitReached,
}

/// Why the session cannot produce a payload yet
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReadyReason {
    #[error("Place at least one field on the document")]
    NoFields,

    #[error("Add at least one recipient")]
    NoRecipients,

    #[error("{count} field(s) have no recipient assigned")]
    UnassignedFields { count: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Invalid recipient: {0}")]
    InvalidInput(RecipientRejection),

    #[error("Unknown recipient: {0}")]
    UnresolvedReference(RecipientId),

    #[error("Unknown field: {0}")]
    UnknownField(FieldId),

    #[error("Page surface has not been laid out yet")]
    LayoutNotReady,

    #[error("Not ready to send: {0}")]
    NotReadyToSend(NotReadyReason),

    #[error("Page {page} is outside the document (1..={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("Document error: {0}")]
    Document(#[from] PdfError),
}

impl From<RecipientRejection> for PlacementError {
    fn from(rejection: RecipientRejection) -> Self {
        PlacementError::InvalidInput(rejection)
    }
}

impl From<NotReadyReason> for PlacementError {
    fn from(reason: NotReadyReason) -> Self {
        PlacementError::NotReadyToSend(reason)
    }
}
