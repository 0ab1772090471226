//! Field placement and assignment engine
//!
//! This crate turns drag-and-drop geometry on rendered document pages into
//! resolution-independent field positions, keeps fields and recipients
//! referentially consistent, and decides when the result may be sent.
//!
//! - `coords`: pixel <-> page-fraction mapping with clamping
//! - `fields` / `recipients`: the two stores
//! - `assignment`: cross-store consistency, readiness and payload building
//! - `session`: one loaded document's state, events and snapshots
//! - `surface`: per-page adapter between the renderer, drag events and the session

pub mod assignment;
pub mod config;
pub mod coords;
pub mod error;
pub mod events;
pub mod fields;
pub mod recipients;
pub mod session;
pub mod surface;

pub use config::EngineConfig;
pub use coords::{Point, SurfaceBox};
pub use error::{NotReadyReason, PlacementError, RecipientRejection};
pub use events::SessionEvent;
pub use session::{DocumentInfo, DocumentSession, SessionSnapshot};
pub use surface::{
    DragPayload, DropEvent, DropOutcome, OverlayPosition, PageSurface, RenderOutcome,
    RenderRequest, RenderTicket, SkipReason,
};

// Re-export types from shared crates
pub use shared_pdf::{DocumentLoader, LopdfLoader, PagedDocument, PdfDocument, PdfError};
pub use shared_types::{Field, FieldId, FieldType, Payload, PayloadField, Recipient, RecipientId};
