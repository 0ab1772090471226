//! Page surface adapter
//!
//! One `PageSurface` per displayed page. It tracks the pixel box of the
//! page as currently rendered, issues render requests when the container
//! width changes, and turns drag-and-drop events into session mutations.
//!
//! Render completions are asynchronous from the surface's point of view:
//! each request carries a [`RenderTicket`] and only the latest ticket of the
//! current session generation is ever applied.

use crate::config::EngineConfig;
use crate::coords::{self, Point, SurfaceBox};
use crate::error::PlacementError;
use crate::session::DocumentSession;
use serde::{Deserialize, Serialize};
use shared_pdf::PagedDocument;
use shared_types::{FieldId, FieldType, RecipientId};
use tracing::debug;

/// What the drag source is carrying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragPayload {
    /// A new field dragged out of the palette
    #[serde(rename_all = "camelCase")]
    NewField { field_type: FieldType },
    /// An already placed field, with its position and the session
    /// generation at drag start
    #[serde(rename_all = "camelCase")]
    ExistingField {
        field_id: FieldId,
        generation: u64,
        left: f64,
        top: f64,
    },
}

impl DragPayload {
    /// Capture a move payload for `field_id` at drag start
    pub fn existing_field(session: &DocumentSession, field_id: FieldId) -> Option<Self> {
        session.field(field_id).map(|field| DragPayload::ExistingField {
            field_id,
            generation: session.generation(),
            left: field.left,
            top: field.top,
        })
    }
}

/// A completed drop on this surface
#[derive(Debug, Clone, PartialEq)]
pub struct DropEvent {
    pub payload: DragPayload,
    /// Absolute pointer offset at drop
    pub pointer: Point,
    /// Pointer travel since drag start
    pub delta: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Surface has no usable pixel box yet
    LayoutNotReady,
    /// Surface or drag source belongs to a document that has since been
    /// replaced
    StaleSession,
    /// Field type is not offered by the configured palette
    NotInPalette { field_type: FieldType },
    /// Dragged field no longer exists
    UnknownField,
    /// Dragged field lives on another page; cross-page moves are unsupported
    OtherPage { field_page: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Placed(FieldId),
    Moved(FieldId),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTicket {
    pub generation: u64,
    pub page_number: u32,
    pub sequence: u64,
    pub width_px: f64,
}

/// "Render page N at width W" for the rasterizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub ticket: RenderTicket,
    pub page_number: u32,
    pub target_width_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutcome {
    Applied(SurfaceBox),
    Stale,
}

/// Pixel placement of one field overlay, relative to the surface box
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPosition {
    pub field_id: FieldId,
    pub field_type: FieldType,
    pub x: f64,
    pub y: f64,
    pub assigned_to: Option<RecipientId>,
}

#[derive(Debug, Clone)]
pub struct PageSurface {
    page_number: u32,
    generation: u64,
    offset: Point,
    default_width_px: f64,
    min_width_change_px: f64,
    palette: Vec<FieldType>,
    container_width: Option<f64>,
    rendered: Option<(f64, f64)>,
    pending: Option<RenderTicket>,
    next_sequence: u64,
}

impl PageSurface {
    /// Bind a surface for `page_number` to the session's current document
    pub fn new(page_number: u32, session: &DocumentSession, config: &EngineConfig) -> Self {
        Self {
            page_number,
            generation: session.generation(),
            offset: Point::default(),
            default_width_px: config.render.default_width_px,
            min_width_change_px: config.render.min_width_change_px,
            palette: config.fields.palette.clone(),
            container_width: None,
            rendered: None,
            pending: None,
            next_sequence: 0,
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Field types this surface accepts from the palette, in display order
    pub fn palette(&self) -> &[FieldType] {
        &self.palette
    }

    /// Record the on-screen offset of the rendered page
    pub fn set_offset(&mut self, left: f64, top: f64) {
        self.offset = Point::new(left, top);
    }

    /// Current pixel box, once a render has completed
    pub fn surface_box(&self) -> Option<SurfaceBox> {
        self.rendered.map(|(width, height)| {
            SurfaceBox::new(self.offset.x, self.offset.y, width, height)
        })
    }

    /// Request a render at the measured container width, or the configured
    /// default before the container has been measured
    pub fn request_render(&mut self) -> RenderRequest {
        let width = self.container_width.unwrap_or(self.default_width_px);
        self.next_sequence += 1;
        let ticket = RenderTicket {
            generation: self.generation,
            page_number: self.page_number,
            sequence: self.next_sequence,
            width_px: width,
        };
        self.pending = Some(ticket);
        debug!(
            page = self.page_number,
            width,
            sequence = ticket.sequence,
            "Render requested"
        );
        RenderRequest {
            ticket,
            page_number: self.page_number,
            target_width_px: width,
        }
    }

    /// React to a container measurement; returns a render request when the
    /// width changed enough to matter
    pub fn on_container_resized(&mut self, width: f64) -> Option<RenderRequest> {
        if !(width.is_finite() && width > 0.0) {
            return None;
        }
        if let Some(previous) = self.container_width {
            if (previous - width).abs() < self.min_width_change_px {
                return None;
            }
        }
        self.container_width = Some(width);
        Some(self.request_render())
    }

    /// Apply a finished render. Completions for an older document, another
    /// page or a superseded request are ignored.
    pub fn complete_render(
        &mut self,
        session: &DocumentSession,
        ticket: RenderTicket,
        raster_height_px: f64,
    ) -> RenderOutcome {
        let current = session.is_current(ticket.generation)
            && ticket.generation == self.generation
            && ticket.page_number == self.page_number
            && self.pending == Some(ticket);
        if !current {
            debug!(
                page = self.page_number,
                sequence = ticket.sequence,
                "Ignoring stale render completion"
            );
            return RenderOutcome::Stale;
        }

        self.pending = None;
        self.rendered = Some((ticket.width_px, raster_height_px));
        let surface = SurfaceBox::new(
            self.offset.x,
            self.offset.y,
            ticket.width_px,
            raster_height_px,
        );
        debug!(
            page = self.page_number,
            width = surface.width,
            height = surface.height,
            "Render applied"
        );
        RenderOutcome::Applied(surface)
    }

    /// Render synchronously against `document`, issuing a request first if
    /// none is pending
    pub fn render_with<D: PagedDocument>(
        &mut self,
        session: &DocumentSession,
        document: &D,
    ) -> Result<RenderOutcome, PlacementError> {
        let ticket = match self.pending {
            Some(ticket) => ticket,
            None => self.request_render().ticket,
        };
        let height = document.render_page(ticket.page_number, ticket.width_px)?;
        Ok(self.complete_render(session, ticket, height))
    }

    /// Translate a drop into a placement or a move on this page
    pub fn handle_drop(
        &self,
        session: &mut DocumentSession,
        drop: &DropEvent,
    ) -> Result<DropOutcome, PlacementError> {
        if !session.is_current(self.generation) {
            debug!(page = self.page_number, "Drop on surface of a replaced document");
            return Ok(DropOutcome::Skipped(SkipReason::StaleSession));
        }
        let Some(surface) = self.surface_box() else {
            return Ok(self.skip_layout());
        };

        match drop.payload {
            DragPayload::NewField { field_type } => {
                if !self.palette.contains(&field_type) {
                    debug!(page = self.page_number, %field_type, "Field type not in palette");
                    return Ok(DropOutcome::Skipped(SkipReason::NotInPalette { field_type }));
                }
                let (left, top) = match coords::place_new(drop.pointer, &surface) {
                    Ok(position) => position,
                    Err(PlacementError::LayoutNotReady) => return Ok(self.skip_layout()),
                    Err(e) => return Err(e),
                };
                let id = session.place_field(field_type, self.page_number, left, top)?;
                Ok(DropOutcome::Placed(id))
            }
            DragPayload::ExistingField {
                field_id,
                generation,
                left,
                top,
            } => {
                if !session.is_current(generation) {
                    debug!(field = %field_id, generation, "Drag started on a replaced document");
                    return Ok(DropOutcome::Skipped(SkipReason::StaleSession));
                }
                let Some(field) = session.field(field_id) else {
                    debug!(field = %field_id, "Drop of unknown field");
                    return Ok(DropOutcome::Skipped(SkipReason::UnknownField));
                };
                if field.page_number != self.page_number {
                    debug!(
                        field = %field_id,
                        from = field.page_number,
                        to = self.page_number,
                        "Cross-page move ignored"
                    );
                    return Ok(DropOutcome::Skipped(SkipReason::OtherPage {
                        field_page: field.page_number,
                    }));
                }
                let (left, top) = match coords::move_existing(left, top, drop.delta, &surface) {
                    Ok(position) => position,
                    Err(PlacementError::LayoutNotReady) => return Ok(self.skip_layout()),
                    Err(e) => return Err(e),
                };
                session.move_field(field_id, left, top);
                Ok(DropOutcome::Moved(field_id))
            }
        }
    }

    /// Pixel positions of this page's fields, from their stored fractions
    pub fn overlays(&self, session: &DocumentSession) -> Vec<OverlayPosition> {
        let Some(surface) = self.surface_box().filter(SurfaceBox::is_laid_out) else {
            return Vec::new();
        };
        session
            .fields_for_page(self.page_number)
            .into_iter()
            .map(|field| {
                let (x, y) = coords::to_pixels(field.left, field.top, &surface);
                OverlayPosition {
                    field_id: field.id,
                    field_type: field.field_type,
                    x,
                    y,
                    assigned_to: field.assigned_to.clone(),
                }
            })
            .collect()
    }

    fn skip_layout(&self) -> DropOutcome {
        debug!(page = self.page_number, "Drop skipped, surface not laid out");
        DropOutcome::Skipped(SkipReason::LayoutNotReady)
    }
}
