//! Page metadata extraction and raster sizing
//!
//! Uses a hybrid approach: Rust extracts page geometry, the host draws the
//! actual raster. "Rendering" here answers the one question the placement
//! engine needs: how tall is page N when drawn at width W.

use crate::error::PdfError;
use lopdf::{Dictionary, Object, ObjectId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bytes a PDF header may be preceded by
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Parent links followed when resolving an inherited MediaBox
const MAX_INHERITANCE_DEPTH: usize = 32;

/// US Letter, used when no MediaBox is present anywhere in the page tree
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page metadata for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// X offset of the MediaBox (usually 0)
    pub x: f64,
    /// Y offset of the MediaBox (usually 0)
    pub y: f64,
    /// Page width in PDF points (1 point = 1/72 inch)
    pub width: f64,
    /// Page height in PDF points
    pub height: f64,
}

impl PageMetadata {
    /// Get aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Calculate scaled dimensions given a target width
    pub fn scale_to_width(&self, target_width: f64) -> ScaledDimensions {
        let scale = target_width / self.width;
        ScaledDimensions {
            width: target_width,
            height: self.height * scale,
            scale,
        }
    }

    /// MediaBox as `[x, y, width, height]`
    pub fn media_box(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// Scaled dimensions with scale factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledDimensions {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// A loaded, paged document that can be rasterized one page at a time
pub trait PagedDocument {
    fn page_count(&self) -> u32;

    /// Render `page_number` (1-indexed) at `target_width_px`, returning the
    /// raster height in pixels.
    fn render_page(&self, page_number: u32, target_width_px: f64) -> Result<f64, PdfError>;
}

/// Turns raw bytes into a [`PagedDocument`]
pub trait DocumentLoader {
    type Document: PagedDocument;

    fn load_document(&self, bytes: &[u8]) -> Result<Self::Document, PdfError>;
}

/// Loader backed by lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfLoader;

impl DocumentLoader for LopdfLoader {
    type Document = PdfDocument;

    fn load_document(&self, bytes: &[u8]) -> Result<PdfDocument, PdfError> {
        PdfDocument::load(bytes)
    }
}

/// Parsed PDF reduced to its page geometry
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<PageMetadata>,
}

impl PdfDocument {
    /// Parse PDF bytes and collect per-page metadata
    pub fn load(bytes: &[u8]) -> Result<Self, PdfError> {
        if !has_pdf_header(bytes) {
            return Err(PdfError::UnsupportedFormat);
        }

        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| PdfError::CorruptDocument(e.to_string()))?;

        let page_ids = doc.get_pages();
        if page_ids.is_empty() {
            return Err(PdfError::CorruptDocument("document has no pages".to_string()));
        }

        let mut pages = Vec::with_capacity(page_ids.len());
        for (&page_number, &page_id) in page_ids.iter() {
            let [x, y, width, height] = media_box(&doc, page_id)?;
            if !(width > 0.0 && height > 0.0) {
                return Err(PdfError::CorruptDocument(format!(
                    "page {} has a degenerate MediaBox ({} x {})",
                    page_number, width, height
                )));
            }
            pages.push(PageMetadata {
                page_number,
                x,
                y,
                width,
                height,
            });
        }

        debug!("Loaded PDF with {} pages", pages.len());
        Ok(Self { pages })
    }

    /// Get metadata for a specific page (1-indexed)
    pub fn page(&self, page_number: u32) -> Option<&PageMetadata> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    pub fn pages(&self) -> &[PageMetadata] {
        &self.pages
    }
}

impl PagedDocument for PdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn render_page(&self, page_number: u32, target_width_px: f64) -> Result<f64, PdfError> {
        if !(target_width_px.is_finite() && target_width_px > 0.0) {
            return Err(PdfError::InvalidRenderWidth(target_width_px));
        }
        let page = self
            .page(page_number)
            .ok_or(PdfError::PageNotFound(page_number))?;
        Ok(page.scale_to_width(target_width_px).height)
    }
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Extract MediaBox from a page, walking up the Parent chain if needed
fn media_box(doc: &lopdf::Document, page_id: ObjectId) -> Result<[f64; 4], PdfError> {
    let mut current = Some(page_id);

    for _ in 0..MAX_INHERITANCE_DEPTH {
        let Some(id) = current else { break };
        let dict = node_dict(doc, id)?;

        if let Ok(rect) = dict.get(b"MediaBox") {
            return parse_rect(doc, rect);
        }

        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(DEFAULT_MEDIA_BOX)
}

fn node_dict(doc: &lopdf::Document, id: ObjectId) -> Result<&Dictionary, PdfError> {
    doc.get_object(id)
        .and_then(Object::as_dict)
        .map_err(|e| PdfError::CorruptDocument(format!("page tree node {:?}: {}", id, e)))
}

/// Parse a PDF rectangle array into [x, y, width, height]
fn parse_rect(doc: &lopdf::Document, obj: &Object) -> Result<[f64; 4], PdfError> {
    let arr = match obj {
        Object::Array(a) => a,
        Object::Reference(id) => doc
            .get_object(*id)
            .and_then(Object::as_array)
            .map_err(|_| PdfError::CorruptDocument("MediaBox reference is not an array".into()))?,
        _ => return Err(PdfError::CorruptDocument("MediaBox is not an array".into())),
    };

    if arr.len() != 4 {
        return Err(PdfError::CorruptDocument(format!(
            "MediaBox has {} elements, expected 4",
            arr.len()
        )));
    }

    let mut values = [0.0f64; 4];
    for (i, obj) in arr.iter().enumerate() {
        values[i] = extract_number(doc, obj)?;
    }

    // Convert from [x1, y1, x2, y2] to [x, y, width, height]
    Ok([
        values[0],
        values[1],
        values[2] - values[0],
        values[3] - values[1],
    ])
}

fn extract_number(doc: &lopdf::Document, obj: &Object) -> Result<f64, PdfError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(f64::from(*r)),
        Object::Reference(id) => {
            let resolved = doc
                .get_object(*id)
                .map_err(|e| PdfError::CorruptDocument(format!("Failed to resolve: {}", e)))?;
            extract_number(doc, resolved)
        }
        _ => Err(PdfError::CorruptDocument(
            "Expected number in rectangle".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Build a PDF whose pages have the given MediaBox sizes.
    /// A `None` entry inherits the box from the Pages node (A4).
    fn create_test_pdf(sizes: &[Option<(i64, i64)>]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::new();
        for size in sizes {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if let Some((w, h)) = size {
                page.set(
                    "MediaBox",
                    vec![0.into(), 0.into(), (*w).into(), (*h).into()],
                );
            }
            kids.push(doc.add_object(page).into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_load_page_metadata() {
        let bytes = create_test_pdf(&[Some((612, 792)), Some((842, 595))]);
        let doc = PdfDocument::load(&bytes).unwrap();

        assert_eq!(doc.page_count(), 2);
        let first = doc.page(1).unwrap();
        assert_eq!(first.width, 612.0);
        assert_eq!(first.height, 792.0);
        let second = doc.page(2).unwrap();
        assert_eq!(second.width, 842.0);
        assert_eq!(second.height, 595.0);
    }

    #[test]
    fn test_inherited_media_box() {
        let bytes = create_test_pdf(&[None]);
        let doc = PdfDocument::load(&bytes).unwrap();
        assert_eq!(doc.page(1).unwrap().media_box(), [0.0, 0.0, 595.0, 842.0]);
    }

    #[test]
    fn test_render_height_follows_aspect_ratio() {
        let bytes = create_test_pdf(&[Some((612, 792))]);
        let doc = PdfDocument::load(&bytes).unwrap();

        let height = doc.render_page(1, 800.0).unwrap();
        assert!((height - 1035.29).abs() < 0.01);
    }

    #[test]
    fn test_render_rejects_bad_requests() {
        let bytes = create_test_pdf(&[Some((612, 792))]);
        let doc = PdfDocument::load(&bytes).unwrap();

        assert_eq!(doc.render_page(2, 800.0), Err(PdfError::PageNotFound(2)));
        assert_eq!(doc.render_page(0, 800.0), Err(PdfError::PageNotFound(0)));
        assert_eq!(
            doc.render_page(1, 0.0),
            Err(PdfError::InvalidRenderWidth(0.0))
        );
        assert!(matches!(
            doc.render_page(1, f64::NAN),
            Err(PdfError::InvalidRenderWidth(_))
        ));
    }

    #[test]
    fn test_non_pdf_is_unsupported() {
        let result = LopdfLoader.load_document(b"\x89PNG\r\n\x1a\n not a pdf");
        assert_eq!(result.unwrap_err(), PdfError::UnsupportedFormat);
    }

    #[test]
    fn test_truncated_pdf_is_corrupt() {
        let result = PdfDocument::load(b"%PDF-1.5\n1 0 obj\n<< /Type /Catalog");
        assert!(matches!(result, Err(PdfError::CorruptDocument(_))));
    }

    #[test]
    fn test_scale_to_width() {
        let metadata = PageMetadata {
            page_number: 1,
            x: 0.0,
            y: 0.0,
            width: 612.0,
            height: 792.0,
        };

        let scaled = metadata.scale_to_width(800.0);
        assert_eq!(scaled.width, 800.0);
        assert!((scaled.height - 1035.29).abs() < 0.01);
        assert!((scaled.scale - 1.307).abs() < 0.001);
        assert!((metadata.aspect_ratio() - 0.7727).abs() < 0.001);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: rendered height preserves the page aspect ratio
        #[test]
        fn render_preserves_aspect_ratio(
            width in 1.0f64..2000.0,
            height in 1.0f64..2000.0,
            target in 1.0f64..4000.0,
        ) {
            let doc = PdfDocument {
                pages: vec![PageMetadata { page_number: 1, x: 0.0, y: 0.0, width, height }],
            };
            let raster_height = doc.render_page(1, target).unwrap();
            let expected = target * height / width;
            prop_assert!((raster_height - expected).abs() < 1e-6 * expected.max(1.0));
        }

        /// Property: arbitrary bytes without a header never parse
        #[test]
        fn headerless_bytes_unsupported(data in prop::collection::vec(any::<u8>(), 0..256)) {
            prop_assume!(!data.windows(5).any(|w| w == b"%PDF-"));
            prop_assert_eq!(PdfDocument::load(&data).unwrap_err(), PdfError::UnsupportedFormat);
        }
    }
}
