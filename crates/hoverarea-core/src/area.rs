//! `<area>` hotspots as read from an image map.

use indexmap::IndexMap;

use crate::dom::{Document, NodeId};
use crate::geom::{PxRect, point, rect_from_corners};
use crate::utils::parse_int_prefix;

/// Prefix of the per-layer content attributes (`x-<layer>`, `x-<layer>-valign`).
pub const LAYER_ATTRIBUTE_PREFIX: &str = "x-";

/// The only recognized value of `x-<layer>-valign`.
pub const VALIGN_CENTERED: &str = "centered";

/// Whether `area` is a candidate for an overlay: a rectangular `<area>` with coordinates, a
/// link, and the marker class.
pub fn is_candidate(doc: &Document, area: NodeId, marker_class: &str) -> bool {
    doc.is_element_named(area, "area")
        && doc.attr(area, "shape") == Some("rect")
        && doc.has_attr(area, "coords")
        && doc.has_attr(area, "href")
        && doc.has_class(area, marker_class)
}

/// Candidate areas of `map`, in document order.
pub fn candidates(doc: &Document, map: NodeId, marker_class: &str) -> Vec<NodeId> {
    doc.descendants(map)
        .into_iter()
        .filter(|id| is_candidate(doc, *id, marker_class))
        .collect()
}

/// Content injected into one overlay layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerContent {
    /// Markup, inserted unescaped.
    pub html: String,
    pub centered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaDefinition {
    pub coords: [i64; 4],
    pub href: String,
    /// Class tokens other than the marker, in source order.
    pub classes: Vec<String>,
    attrs: IndexMap<String, String>,
}

impl AreaDefinition {
    /// Reads an `<area>` element. Returns `None` when `coords` does not hold exactly four
    /// integers.
    pub fn from_element(doc: &Document, area: NodeId, marker_class: &str) -> Option<Self> {
        let el = doc.element(area)?;
        let coords = parse_coords(el.attrs.get("coords")?)?;
        let href = el.attrs.get("href").cloned().unwrap_or_default();
        let classes = el
            .classes()
            .filter(|c| *c != marker_class)
            .map(str::to_string)
            .collect();
        Some(Self {
            coords,
            href,
            classes,
            attrs: el.attrs.clone(),
        })
    }

    pub fn rect(&self) -> PxRect {
        let [x1, y1, x2, y2] = self.coords;
        rect_from_corners(point(x1, y1), point(x2, y2))
    }

    /// Content configured for `layer` through `x-<layer>` / `x-<layer>-valign`.
    pub fn layer_content(&self, layer: &str) -> Option<LayerContent> {
        let name = format!("{LAYER_ATTRIBUTE_PREFIX}{layer}").to_ascii_lowercase();
        let html = self.attrs.get(&name)?.clone();
        let centered = self
            .attrs
            .get(&format!("{name}-valign"))
            .is_some_and(|v| v == VALIGN_CENTERED);
        Some(LayerContent { html, centered })
    }
}

/// Parses `x1,y1,x2,y2`. Each item is read like `parseInt` and must fit in an `i32`; anything
/// other than exactly four such items is rejected.
pub fn parse_coords(raw: &str) -> Option<[i64; 4]> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 4 {
        return None;
    }
    let mut out = [0i64; 4];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = i64::from(i32::try_from(parse_int_prefix(part)?).ok()?);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::size;

    fn area_doc(attrs: &str) -> (Document, NodeId) {
        let doc = Document::parse_html(&format!(r#"<map name="m"><area {attrs}></map>"#));
        let area = doc.select("area").unwrap()[0];
        (doc, area)
    }

    #[test]
    fn coords_need_exactly_four_values() {
        assert_eq!(parse_coords("0,0,100,100"), Some([0, 0, 100, 100]));
        assert_eq!(parse_coords(" 1, 2 ,3px,4"), Some([1, 2, 3, 4]));
        assert_eq!(parse_coords("0,0,100"), None);
        assert_eq!(parse_coords("0,0,100,100,5"), None);
        assert_eq!(parse_coords("0,0,x,100"), None);
        assert_eq!(parse_coords("0,0,2147483648,1"), None);
        assert_eq!(
            parse_coords("-2147483648,0,2147483647,1"),
            Some([-2147483648, 0, 2147483647, 1])
        );
    }

    #[test]
    fn reversed_corners_give_the_same_rect() {
        let (doc, area) = area_doc(r##"shape="rect" coords="100,100,0,0" href="#a" class="onhover""##);
        let def = AreaDefinition::from_element(&doc, area, "onhover").unwrap();
        let rect = def.rect();
        assert_eq!(rect.origin, point(0, 0));
        assert_eq!(rect.size, size(100, 100));
    }

    #[test]
    fn marker_class_is_not_carried() {
        let (doc, area) = area_doc(
            r##"shape="rect" coords="0,0,1,1" href="#a" class="active custom1 custom2""##,
        );
        let def = AreaDefinition::from_element(&doc, area, "active").unwrap();
        assert_eq!(def.classes, vec!["custom1", "custom2"]);
        assert_eq!(def.href, "#a");
    }

    #[test]
    fn candidate_filter() {
        let (doc, area) = area_doc(r##"shape="rect" coords="0,0,1,1" href="#a" class="onhover""##);
        assert!(is_candidate(&doc, area, "onhover"));
        assert!(!is_candidate(&doc, area, "active"));

        let (doc, area) = area_doc(r##"shape="circle" coords="0,0,1" href="#a" class="onhover""##);
        assert!(!is_candidate(&doc, area, "onhover"));

        let (doc, area) = area_doc(r#"shape="rect" coords="0,0,1,1" class="onhover""#);
        assert!(!is_candidate(&doc, area, "onhover"));
    }

    #[test]
    fn layer_content_and_valign() {
        let (doc, area) = area_doc(
            r##"shape="rect" coords="0,0,1,1" href="#a" x-caption="<b>Hi</b>" x-caption-valign="centered" x-tint="" x-tint-valign="top""##,
        );
        let def = AreaDefinition::from_element(&doc, area, "onhover").unwrap();
        assert_eq!(
            def.layer_content("caption"),
            Some(LayerContent {
                html: "<b>Hi</b>".to_string(),
                centered: true
            })
        );
        assert_eq!(
            def.layer_content("tint"),
            Some(LayerContent {
                html: String::new(),
                centered: false
            })
        );
        assert_eq!(def.layer_content("overlay"), None);
    }
}
