//! Image size lookup.
//!
//! The wrapper template is sized from the image's rendered dimensions. There is no layout
//! engine here, so measuring is delegated to an `ImageMeasurer`.

use crate::dom::{Document, NodeId};
use crate::geom::{PxSize, size};
use crate::utils::{inline_style_value, parse_int_prefix, parse_px_prefix};

pub trait ImageMeasurer {
    fn measure(&self, doc: &Document, image: NodeId) -> PxSize;
}

/// Reads the `width`/`height` attributes, then inline `style` declarations.
///
/// Missing dimensions measure as 0, which is what a browser reports for an image that has not
/// loaded yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeMeasurer;

impl AttributeMeasurer {
    fn dimension(doc: &Document, image: NodeId, name: &str) -> i64 {
        let from_attr = doc.attr(image, name).and_then(parse_int_prefix);
        let from_style = || {
            doc.attr(image, "style")
                .and_then(|style| inline_style_value(style, name))
                .and_then(parse_px_prefix)
        };
        from_attr.or_else(from_style).unwrap_or(0).max(0)
    }
}

impl ImageMeasurer for AttributeMeasurer {
    fn measure(&self, doc: &Document, image: NodeId) -> PxSize {
        size(
            Self::dimension(doc, image, "width"),
            Self::dimension(doc, image, "height"),
        )
    }
}

/// Reports the same size for every image.
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasurer(pub PxSize);

impl ImageMeasurer for FixedMeasurer {
    fn measure(&self, _doc: &Document, _image: NodeId) -> PxSize {
        self.0
    }
}
