//! Domain vocabulary shared between the placement engine and its hosts

pub mod types;

pub use types::{Field, FieldId, FieldType, Payload, PayloadField, Recipient, RecipientId};
