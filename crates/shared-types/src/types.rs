use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Session-local handle for a placed field.
///
/// Allocated monotonically by the field store; never leaves the session
/// (stripped from the outgoing payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a recipient (a UUID v4 string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(String);

impl RecipientId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecipientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of input a field asks its recipient for.
///
/// Coordinate handling never looks at the kind, so new variants only need
/// a name here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Signature,
    Text,
    Date,
}

impl FieldType {
    pub const ALL: [FieldType; 3] = [FieldType::Signature, FieldType::Text, FieldType::Date];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Signature => "Signature",
            FieldType::Text => "Text",
            FieldType::Date => "Date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed overlay element.
///
/// `left`/`top` are percentages (0-100) of the rendered page width/height,
/// so the position survives re-rendering at any scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    pub page_number: u32,
    pub left: f64,
    pub top: f64,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub assigned_to: Option<RecipientId>,
}

impl Field {
    /// Create a new unassigned field
    pub fn new(id: FieldId, field_type: FieldType, page_number: u32, left: f64, top: f64) -> Self {
        Self {
            id,
            page_number,
            left,
            top,
            field_type,
            assigned_to: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }
}

/// A party who fills in one or more fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub email: String,
}

/// Field entry of the outgoing payload (no session-local id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadField {
    pub page_number: u32,
    pub left: f64,
    pub top: f64,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub assigned_to: Option<RecipientId>,
}

impl From<&Field> for PayloadField {
    fn from(field: &Field) -> Self {
        Self {
            page_number: field.page_number,
            left: field.left,
            top: field.top,
            field_type: field.field_type,
            assigned_to: field.assigned_to.clone(),
        }
    }
}

/// Structured document handed to delivery once every field has an owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub recipients: Vec<Recipient>,
    pub fields: Vec<PayloadField>,
}

impl Payload {
    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
