use crate::error::RecipientRejection;
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Recipient, RecipientId};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Highlight colors handed out to recipients in insertion order
const RECIPIENT_COLORS: [&str; 8] = [
    "#2563eb", "#16a34a", "#dc2626", "#9333ea", "#ea580c", "#0891b2", "#ca8a04", "#db2777",
];

/// Check that `email` has a plausible `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Ordered collection of recipients, unique by exact email
#[derive(Debug, Clone, Default)]
pub struct RecipientStore {
    recipients: Vec<Recipient>,
    max_recipients: Option<usize>,
}

impl RecipientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects additions beyond `max`
    pub fn with_limit(max: Option<usize>) -> Self {
        Self {
            recipients: Vec::new(),
            max_recipients: max,
        }
    }

    /// Validate and append a recipient, returning its fresh id
    pub fn add_recipient(&mut self, email: &str) -> Result<RecipientId, RecipientRejection> {
        let email = email.trim();
        if email.is_empty() {
            return Err(RecipientRejection::Empty);
        }
        if !is_valid_email(email) {
            return Err(RecipientRejection::Malformed);
        }
        if self.recipients.iter().any(|r| r.email == email) {
            return Err(RecipientRejection::Duplicate);
        }
        if self
            .max_recipients
            .is_some_and(|max| self.recipients.len() >= max)
        {
            return Err(RecipientRejection::LimitReached);
        }

        let id = RecipientId::generate();
        self.recipients.push(Recipient {
            id: id.clone(),
            email: email.to_string(),
        });
        Ok(id)
    }

    /// Remove a recipient. Callers must cascade to the field store right after.
    pub fn remove_recipient(&mut self, id: &RecipientId) -> Option<Recipient> {
        let index = self.recipients.iter().position(|r| &r.id == id)?;
        Some(self.recipients.remove(index))
    }

    pub fn get(&self, id: &RecipientId) -> Option<&Recipient> {
        self.recipients.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RecipientId) -> bool {
        self.get(id).is_some()
    }

    /// All recipients in insertion order
    pub fn all(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    pub fn clear(&mut self) {
        self.recipients.clear();
    }
}

/// Stable display color for a recipient, by its position in `recipients`
pub fn recipient_color(id: &RecipientId, recipients: &[Recipient]) -> Option<&'static str> {
    recipients
        .iter()
        .position(|r| &r.id == id)
        .map(|index| RECIPIENT_COLORS[index % RECIPIENT_COLORS.len()])
}
