#![forbid(unsafe_code)]

//! Headless image-map hover overlays.
//!
//! HTML `<area>` elements describe clickable regions of an image but cannot be styled. This
//! crate rewrites an HTML document so that every marked rectangular `<area>` gets a real,
//! absolutely-positioned `<a>` on top of the image, which CSS can then style, layer, and caption.
//!
//! ```
//! use hoverarea_core::{OverlayOptions, PositionedClass, transform_html};
//!
//! let html = r##"<img src="map.png" usemap="#m" width="200" height="100">
//! <map name="m"><area shape="rect" coords="0,0,50,50" href="#a" class="onhover"></map>"##;
//!
//! let options = OverlayOptions::default()
//!     .with_wrap_image_element(true)
//!     .with_positioned_class(PositionedClass::Single("hoverable".to_string()));
//! let (out, report) = transform_html(html, "img[usemap]", &options)?;
//!
//! assert_eq!(report.overlay_count(), 1);
//! assert!(out.contains(r##"<a class="hoverable""##));
//! # Ok::<(), hoverarea_core::Error>(())
//! ```

pub mod area;
pub mod config;
pub mod dom;
pub mod error;
pub mod geom;
pub mod measure;
pub mod overlay;
pub mod selector;
pub mod utils;

pub use config::{ElementRef, OptionOverrides, OverlayOptions, PositionedClass};
pub use dom::{Document, NodeId};
pub use error::{Error, Result};
pub use measure::{AttributeMeasurer, FixedMeasurer, ImageMeasurer};
pub use overlay::{Outcome, OverlayBuilder, OverlayReport, SkipReason, TargetOutcome};

/// Default selection: every element an overlay pass can start from.
pub const DEFAULT_SELECTOR: &str = "img[usemap], map";

/// Parses `html`, applies the overlay builder to every element matching `selector`, and
/// serializes the result.
pub fn transform_html(
    html: &str,
    selector: &str,
    options: &OverlayOptions,
) -> Result<(String, OverlayReport)> {
    transform_html_with(html, selector, OverlayBuilder::new(options.clone()))
}

/// Like [`transform_html`], with a caller-configured builder (e.g. a custom image measurer).
pub fn transform_html_with<M: ImageMeasurer>(
    html: &str,
    selector: &str,
    builder: OverlayBuilder<M>,
) -> Result<(String, OverlayReport)> {
    let mut doc = Document::parse_html(html);
    let report = builder.apply_selector(&mut doc, selector)?;
    Ok((doc.to_html(), report))
}

#[cfg(test)]
mod tests;
