//! Change notifications emitted by the document session

use serde::{Deserialize, Serialize};
use shared_types::{FieldId, FieldType, RecipientId};

/// Types of session changes, drained by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    DocumentLoaded {
        generation: u64,
        page_count: u32,
    },
    FieldPlaced {
        field_id: FieldId,
        field_type: FieldType,
        page: u32,
    },
    FieldMoved {
        field_id: FieldId,
        left: f64,
        top: f64,
    },
    FieldAssigned {
        field_id: FieldId,
        recipient: Option<RecipientId>,
    },
    RecipientAdded {
        recipient: RecipientId,
        email: String,
    },
    RecipientRemoved {
        recipient: RecipientId,
        unassigned: Vec<FieldId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_tagged() {
        let event = SessionEvent::FieldPlaced {
            field_id: FieldId(4),
            field_type: FieldType::Date,
            page: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"FIELD_PLACED","field_id":4,"field_type":"Date","page":2}"#
        );
    }
}
