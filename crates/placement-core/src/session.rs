//! Document session
//!
//! One session per loaded document. It exclusively owns the field and
//! recipient stores; loading another document resets it wholesale and bumps
//! its generation so in-flight work for the old document can be told apart.

use crate::assignment;
use crate::config::EngineConfig;
use crate::coords::clamp_percent;
use crate::error::{NotReadyReason, PlacementError};
use crate::events::SessionEvent;
use crate::fields::FieldStore;
use crate::recipients::{recipient_color, RecipientStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_pdf::{hash_document, DocumentLoader, PagedDocument};
use shared_types::{Field, FieldId, FieldType, Payload, Recipient, RecipientId};
use tracing::{debug, info, instrument, warn};

/// Facts about the currently loaded document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// SHA-256 of the source bytes, when loaded through a [`DocumentLoader`]
    pub fingerprint: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Immutable copy of session state for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub revision: u64,
    pub fields: Vec<Field>,
    pub recipients: Vec<Recipient>,
    pub readiness: Result<(), NotReadyReason>,
}

#[derive(Debug, Clone)]
pub struct DocumentSession {
    generation: u64,
    revision: u64,
    document: Option<DocumentInfo>,
    fields: FieldStore,
    recipients: RecipientStore,
    events: Vec<SessionEvent>,
    max_recipients: Option<usize>,
}

impl DocumentSession {
    /// Create an empty session with no document loaded
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        let max_recipients = config.recipients.max_recipients;
        Self {
            generation: 0,
            revision: 0,
            document: None,
            fields: FieldStore::new(),
            recipients: RecipientStore::with_limit(max_recipients),
            events: Vec::new(),
            max_recipients,
        }
    }

    /// Parse `bytes` and, on success, reset the session to the new document.
    ///
    /// The loaded document is handed back to the caller for rendering. On
    /// failure the current session is left untouched.
    #[instrument(skip(self, loader, bytes), fields(len = bytes.len()))]
    pub fn load_document<L: DocumentLoader>(
        &mut self,
        loader: &L,
        bytes: &[u8],
    ) -> Result<L::Document, PlacementError> {
        let document = loader.load_document(bytes).map_err(|e| {
            warn!("Document rejected: {}", e);
            e
        })?;

        let fingerprint = hash_document(bytes);
        self.reset_with(document.page_count(), Some(fingerprint));
        Ok(document)
    }

    /// Reset to a fresh document with `page_count` pages and no parsed source.
    ///
    /// Returns the new generation.
    pub fn reset(&mut self, page_count: u32) -> u64 {
        self.reset_with(page_count, None)
    }

    fn reset_with(&mut self, page_count: u32, fingerprint: Option<String>) -> u64 {
        self.fields.clear_all();
        self.recipients = RecipientStore::with_limit(self.max_recipients);
        self.events.clear();
        self.generation += 1;
        self.document = Some(DocumentInfo {
            page_count,
            fingerprint,
            loaded_at: Utc::now(),
        });

        info!(
            generation = self.generation,
            page_count, "Document session reset"
        );
        self.emit(SessionEvent::DocumentLoaded {
            generation: self.generation,
            page_count,
        });
        self.generation
    }

    /// Identity of the current document; changes on every load
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether work tagged with `generation` still belongs to this document
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Incremented on every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, |d| d.page_count)
    }

    // ---- fields ----------------------------------------------------------

    /// Place a new unassigned field on `page_number` (1-indexed)
    pub fn place_field(
        &mut self,
        field_type: FieldType,
        page_number: u32,
        left: f64,
        top: f64,
    ) -> Result<FieldId, PlacementError> {
        let page_count = self.page_count();
        if page_number == 0 || page_number > page_count {
            return Err(PlacementError::PageOutOfRange {
                page: page_number,
                page_count,
            });
        }

        let (left, top) = (clamp_percent(left), clamp_percent(top));
        let id = self.fields.add_field(field_type, page_number, left, top);
        debug!(field = %id, %field_type, page = page_number, left, top, "Field placed");
        self.emit(SessionEvent::FieldPlaced {
            field_id: id,
            field_type,
            page: page_number,
        });
        Ok(id)
    }

    /// Reposition a field on its own page.
    ///
    /// An unknown id is a stale drag source and is ignored (returns false).
    pub fn move_field(&mut self, id: FieldId, left: f64, top: f64) -> bool {
        let (left, top) = (clamp_percent(left), clamp_percent(top));
        if !self.fields.move_field(id, left, top) {
            debug!(field = %id, "Ignoring move of unknown field");
            return false;
        }
        debug!(field = %id, left, top, "Field moved");
        self.emit(SessionEvent::FieldMoved {
            field_id: id,
            left,
            top,
        });
        true
    }

    /// Assign a field to a recipient, or clear it with `None`
    pub fn assign_field(
        &mut self,
        id: FieldId,
        recipient: Option<RecipientId>,
    ) -> Result<(), PlacementError> {
        assignment::assign(&mut self.fields, &self.recipients, id, recipient.clone())?;
        debug!(field = %id, recipient = ?recipient, "Field assignment changed");
        self.emit(SessionEvent::FieldAssigned {
            field_id: id,
            recipient,
        });
        Ok(())
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get_field(id)
    }

    pub fn fields(&self) -> &[Field] {
        self.fields.fields()
    }

    pub fn fields_for_page(&self, page_number: u32) -> Vec<&Field> {
        self.fields.fields_for_page(page_number)
    }

    // ---- recipients ------------------------------------------------------

    pub fn add_recipient(&mut self, email: &str) -> Result<RecipientId, PlacementError> {
        match self.recipients.add_recipient(email) {
            Ok(id) => {
                let email = self
                    .recipients
                    .get(&id)
                    .map(|r| r.email.clone())
                    .unwrap_or_default();
                info!(recipient = %id, "Recipient added");
                self.emit(SessionEvent::RecipientAdded {
                    recipient: id.clone(),
                    email,
                });
                Ok(id)
            }
            Err(rejection) => {
                debug!(%rejection, "Recipient rejected");
                Err(rejection.into())
            }
        }
    }

    /// Remove a recipient and unassign its fields in the same step.
    ///
    /// Returns the fields that were unassigned, or `None` if the recipient
    /// did not exist.
    pub fn remove_recipient(&mut self, id: &RecipientId) -> Option<Vec<FieldId>> {
        let (_, unassigned) =
            assignment::remove_recipient(&mut self.fields, &mut self.recipients, id)?;
        info!(
            recipient = %id,
            unassigned = unassigned.len(),
            "Recipient removed"
        );
        self.emit(SessionEvent::RecipientRemoved {
            recipient: id.clone(),
            unassigned: unassigned.clone(),
        });
        Some(unassigned)
    }

    pub fn recipients(&self) -> &[Recipient] {
        self.recipients.all()
    }

    /// Display color for a recipient, stable while the list is unchanged
    pub fn recipient_color(&self, id: &RecipientId) -> Option<&'static str> {
        recipient_color(id, self.recipients.all())
    }

    // ---- sending ---------------------------------------------------------

    /// Recomputed on every call
    pub fn readiness(&self) -> Result<(), NotReadyReason> {
        assignment::readiness(self.fields.fields(), self.recipients.all())
    }

    pub fn is_ready_to_send(&self) -> bool {
        self.readiness().is_ok()
    }

    pub fn build_payload(&self) -> Result<Payload, PlacementError> {
        match assignment::build_payload(self.fields.fields(), self.recipients.all()) {
            Ok(payload) => {
                info!(
                    fields = payload.fields.len(),
                    recipients = payload.recipients.len(),
                    "Payload built"
                );
                Ok(payload)
            }
            Err(e) => {
                warn!("Payload rejected: {}", e);
                Err(e)
            }
        }
    }

    // ---- notifications ---------------------------------------------------

    /// Take all change notifications emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            revision: self.revision,
            fields: self.fields.fields().to_vec(),
            recipients: self.recipients.all().to_vec(),
            readiness: self.readiness(),
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.revision += 1;
        self.events.push(event);
    }
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new()
    }
}
