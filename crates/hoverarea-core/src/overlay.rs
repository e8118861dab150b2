//! Region overlay builder.
//!
//! For every selected `<img usemap>` or `<map>`, the builder resolves the image/map pair and a
//! container, then appends one absolutely-positioned `<a>` per marked rectangular `<area>` to
//! that container. Nothing in here fails loudly: an element that cannot be processed is
//! recorded as skipped and the next one is handled.

use serde::Serialize;

use crate::area::{self, AreaDefinition};
use crate::config::{
    ElementRef, OPTIONS_ATTRIBUTE, OptionOverrides, OverlayOptions, PositionedClass,
};
use crate::dom::{Document, NodeData, NodeId};
use crate::geom::PxRect;
use crate::measure::{AttributeMeasurer, ImageMeasurer};
use crate::utils::{has_size_placeholder, substitute_size_placeholders};

const LAYER_TAG: &str = "div";
const CENTERING_TABLE_STYLE: &str = "display:table; width:100%; height:100%;";
const CENTERING_CELL_STYLE: &str = "display:table-cell; vertical-align:middle; text-align:center;";

/// Why an element produced no overlays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[error("element is neither an <img usemap> nor a <map>")]
    NotAnEntry,
    #[error("usemap `{name}` matched {matches} <map> elements")]
    MapNotFound { name: String, matches: usize },
    #[error("a wrapper is configured but no image element could be resolved")]
    WrapperNeedsImage,
    #[error("wrapper template produced {nodes} top-level nodes instead of one element")]
    InvalidWrapper { nodes: usize },
    #[error("container reference matched {matches} elements")]
    ContainerNotFound { matches: usize },
    #[error("no container: neither a wrapper nor a container is configured")]
    NoContainer,
    #[error("map has no marked rectangular areas")]
    NoActiveAreas,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Applied {
        container: NodeId,
        overlays: Vec<NodeId>,
        /// Areas dropped because their coordinates could not be read.
        skipped_areas: usize,
    },
    Skipped {
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: NodeId,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OverlayReport {
    pub targets: Vec<TargetOutcome>,
}

impl OverlayReport {
    /// Every overlay created, in creation order.
    pub fn overlays(&self) -> Vec<NodeId> {
        self.targets
            .iter()
            .flat_map(|t| match &t.outcome {
                Outcome::Applied { overlays, .. } => overlays.clone(),
                Outcome::Skipped { .. } => Vec::new(),
            })
            .collect()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays().len()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (NodeId, &SkipReason)> {
        self.targets.iter().filter_map(|t| match &t.outcome {
            Outcome::Skipped { reason } => Some((t.target, reason)),
            Outcome::Applied { .. } => None,
        })
    }
}

/// Where processing of one element starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Image(NodeId),
    Map(NodeId),
}

impl Entry {
    fn of(doc: &Document, target: NodeId) -> Option<Self> {
        if doc.is_element_named(target, "img") && doc.has_attr(target, "usemap") {
            Some(Self::Image(target))
        } else if doc.is_element_named(target, "map") {
            Some(Self::Map(target))
        } else {
            None
        }
    }
}

/// The image/map pair plus the element overlays go into.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    image: Option<NodeId>,
    map: NodeId,
    container: NodeId,
}

pub struct OverlayBuilder<M = AttributeMeasurer> {
    options: OverlayOptions,
    measurer: M,
}

impl OverlayBuilder<AttributeMeasurer> {
    pub fn new(options: OverlayOptions) -> Self {
        Self {
            options,
            measurer: AttributeMeasurer,
        }
    }
}

impl<M: ImageMeasurer> OverlayBuilder<M> {
    pub fn with_measurer<N: ImageMeasurer>(self, measurer: N) -> OverlayBuilder<N> {
        OverlayBuilder {
            options: self.options,
            measurer,
        }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Processes every element of `selection`, in order.
    pub fn apply(&self, doc: &mut Document, selection: &[NodeId]) -> OverlayReport {
        let _span = tracing::debug_span!("area_overlays", targets = selection.len()).entered();

        let targets = selection
            .iter()
            .map(|&target| {
                let outcome = match self.apply_one(doc, target) {
                    Ok(outcome) => outcome,
                    Err(reason) => {
                        tracing::debug!(node = target.index(), %reason, "skipping element");
                        Outcome::Skipped { reason }
                    }
                };
                TargetOutcome { target, outcome }
            })
            .collect();
        OverlayReport { targets }
    }

    /// Processes every element matching `selector`.
    pub fn apply_selector(
        &self,
        doc: &mut Document,
        selector: &str,
    ) -> crate::Result<OverlayReport> {
        let selection = doc.select(selector)?;
        Ok(self.apply(doc, &selection))
    }

    fn apply_one(&self, doc: &mut Document, target: NodeId) -> Result<Outcome, SkipReason> {
        let entry = Entry::of(doc, target).ok_or(SkipReason::NotAnEntry)?;
        let options = self.options_for(doc, target);
        let resolved = self.resolve(doc, entry, &options)?;
        tracing::trace!(
            image = ?resolved.image.map(NodeId::index),
            map = resolved.map.index(),
            container = resolved.container.index(),
            "resolved overlay target"
        );

        let areas = area::candidates(doc, resolved.map, &options.area_marker_class);
        if areas.is_empty() {
            return Err(SkipReason::NoActiveAreas);
        }
        for &a in &areas {
            doc.remove_class(a, &options.area_marker_class);
        }

        let mut overlays = Vec::with_capacity(areas.len());
        let mut skipped_areas = 0;
        for a in areas {
            let Some(def) = AreaDefinition::from_element(doc, a, &options.area_marker_class)
            else {
                tracing::debug!(node = a.index(), "skipping area with unreadable coords");
                skipped_areas += 1;
                continue;
            };
            let overlay = build_overlay(doc, &def, &options.positioned_element_class);
            doc.append_child(resolved.container, overlay);
            tracing::trace!(node = overlay.index(), href = %def.href, "overlay created");
            overlays.push(overlay);
        }

        Ok(Outcome::Applied {
            container: resolved.container,
            overlays,
            skipped_areas,
        })
    }

    fn options_for(&self, doc: &Document, target: NodeId) -> OverlayOptions {
        match doc.attr(target, OPTIONS_ATTRIBUTE) {
            Some(raw) => self.options.merged(&OptionOverrides::from_attribute(raw)),
            None => self.options.clone(),
        }
    }

    fn resolve(
        &self,
        doc: &mut Document,
        entry: Entry,
        options: &OverlayOptions,
    ) -> Result<Resolved, SkipReason> {
        let wrapper = options.effective_wrapper();

        let (image, map) = match entry {
            Entry::Image(img) => {
                let usemap = doc.attr(img, "usemap").unwrap_or_default();
                let name = usemap.strip_prefix('#').unwrap_or(usemap).to_string();
                let maps = doc.maps_named(&name);
                if maps.len() != 1 {
                    return Err(SkipReason::MapNotFound {
                        name,
                        matches: maps.len(),
                    });
                }
                (Some(img), maps[0])
            }
            Entry::Map(map) => {
                let image = options
                    .image_element
                    .as_ref()
                    .and_then(|r| resolve_unique(doc, r).ok());
                if image.is_none() && wrapper.is_some() {
                    return Err(SkipReason::WrapperNeedsImage);
                }
                (image, map)
            }
        };

        let container = match (image, wrapper) {
            (Some(img), Some(template)) => self.wrap_image(doc, img, template)?,
            _ => match &options.image_element_container {
                Some(reference) => resolve_unique(doc, reference)
                    .map_err(|matches| SkipReason::ContainerNotFound { matches })?,
                None => return Err(SkipReason::NoContainer),
            },
        };

        Ok(Resolved {
            image,
            map,
            container,
        })
    }

    /// Wraps `img` with the instantiated template and returns the image's new parent.
    fn wrap_image(
        &self,
        doc: &mut Document,
        img: NodeId,
        template: &str,
    ) -> Result<NodeId, SkipReason> {
        let markup = if has_size_placeholder(template) {
            substitute_size_placeholders(template, self.measurer.measure(doc, img))
        } else {
            template.to_string()
        };

        let nodes: Vec<NodeId> = doc
            .parse_fragment(&markup)
            .into_iter()
            .filter(|n| !is_blank_text(doc, *n))
            .collect();
        match nodes.as_slice() {
            [wrapper] if doc.element(*wrapper).is_some() => Ok(doc.wrap(img, *wrapper)),
            _ => Err(SkipReason::InvalidWrapper { nodes: nodes.len() }),
        }
    }
}

fn is_blank_text(doc: &Document, node: NodeId) -> bool {
    matches!(doc.node(node).data(), NodeData::Text(t) if t.trim().is_empty())
}

/// Resolves a reference to exactly one element; `Err` carries the number of matches.
fn resolve_unique(doc: &Document, reference: &ElementRef) -> Result<NodeId, usize> {
    match reference {
        ElementRef::Node(id) => match doc.get(*id) {
            Some(_) if doc.element(*id).is_some() => Ok(*id),
            _ => Err(0),
        },
        ElementRef::Selector(selector) => {
            let found = doc.select(selector).unwrap_or_else(|err| {
                tracing::debug!(%err, "unresolvable element reference");
                Vec::new()
            });
            match found.as_slice() {
                [only] => Ok(*only),
                _ => Err(found.len()),
            }
        }
    }
}

fn anchor_style(rect: &PxRect) -> String {
    format!(
        "display:block; position:absolute; z-index:1; width:{}px; height:{}px; left:{}px; top:{}px;",
        rect.size.width, rect.size.height, rect.origin.x, rect.origin.y
    )
}

fn layer_style(depth: usize) -> String {
    format!(
        "display:block; position:absolute; z-index:{depth}; width:100%; height:100%; left:0; top:0;"
    )
}

/// Builds the (detached) overlay anchor for one area.
fn build_overlay(
    doc: &mut Document,
    def: &AreaDefinition,
    positioned: &PositionedClass,
) -> NodeId {
    let anchor = doc.create_element("a");

    match positioned {
        PositionedClass::None => {}
        PositionedClass::Single(class) => doc.add_class(anchor, class),
        PositionedClass::Layered(layers) => {
            for (i, class) in layers.iter().enumerate() {
                let layer = build_layer(doc, def, class, i + 1);
                doc.append_child(anchor, layer);
            }
        }
    }

    let carried = def.classes.join(" ");
    if !carried.trim().is_empty() {
        doc.add_class(anchor, &carried);
    }

    doc.set_attr(anchor, "style", anchor_style(&def.rect()));
    doc.set_attr(anchor, "href", def.href.as_str());
    anchor
}

fn build_layer(doc: &mut Document, def: &AreaDefinition, class: &str, depth: usize) -> NodeId {
    let layer = doc.create_element(LAYER_TAG);
    doc.set_attr(layer, "class", class);
    doc.set_attr(layer, "style", layer_style(depth));

    let Some(content) = def.layer_content(class) else {
        return layer;
    };
    if content.centered {
        let table = doc.create_element(LAYER_TAG);
        doc.set_attr(table, "style", CENTERING_TABLE_STYLE);
        let cell = doc.create_element(LAYER_TAG);
        doc.set_attr(cell, "style", CENTERING_CELL_STYLE);
        doc.append_html(cell, &content.html);
        doc.append_child(table, cell);
        doc.append_child(layer, table);
    } else {
        doc.append_html(layer, &content.html);
    }
    layer
}
