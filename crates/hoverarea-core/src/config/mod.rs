//! Overlay options and their layering.
//!
//! Options come from three layers, lowest precedence first: built-in defaults, the caller, and
//! an `options` attribute serialized on the element being processed. The attribute layer is
//! best-effort: anything that does not parse as an object contributes nothing.

use serde::Deserialize;
use serde_json::Value;

use crate::dom::NodeId;
use crate::{Error, Result};

/// Attribute holding per-element option overrides.
pub const OPTIONS_ATTRIBUTE: &str = "options";

/// Class that marks an `<area>` as not processed yet.
pub const DEFAULT_AREA_MARKER_CLASS: &str = "onhover";

/// Wrapper used when `wrap_image_element` is set and no explicit template is configured.
pub const DEFAULT_IMAGE_WRAPPER: &str = "<div style=\"display:inline-block; position:relative; z-index:0; width:{{img_width}}px; height:{{img_height}}px;\"></div>";

/// Reference to an element of the document being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRef {
    /// Resolved against the whole document; must match exactly one element.
    Selector(String),
    Node(NodeId),
}

impl From<&str> for ElementRef {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for ElementRef {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<NodeId> for ElementRef {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

/// How overlay anchors are classed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawPositionedClass")]
pub enum PositionedClass {
    #[default]
    None,
    /// One class applied to the anchor itself.
    Single(String),
    /// One stacked child layer per class, bottom first.
    Layered(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPositionedClass {
    Flag(bool),
    Single(String),
    Layered(Vec<String>),
}

impl From<RawPositionedClass> for PositionedClass {
    fn from(raw: RawPositionedClass) -> Self {
        match raw {
            RawPositionedClass::Flag(_) => Self::None,
            RawPositionedClass::Single(name) => {
                let name = name.trim();
                if name.is_empty() {
                    Self::None
                } else {
                    Self::Single(name.to_string())
                }
            }
            RawPositionedClass::Layered(names) => {
                let names: Vec<String> = names
                    .into_iter()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect();
                if names.is_empty() {
                    Self::None
                } else {
                    Self::Layered(names)
                }
            }
        }
    }
}

/// Values accepted where the widget takes "something, or `false`".
#[derive(Deserialize)]
#[serde(untagged)]
enum Toggle<T> {
    Flag(bool),
    Value(T),
}

impl<T> Toggle<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Toggle::Flag(_) => None,
            Toggle::Value(v) => Some(v),
        }
    }
}

fn string_or_false<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let toggle = Option::<Toggle<String>>::deserialize(deserializer)?;
    Ok(Some(toggle.and_then(Toggle::into_option)))
}

fn element_ref_or_false<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<ElementRef>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let selector = string_or_false(deserializer)?;
    Ok(selector.map(|s| s.map(ElementRef::Selector)))
}

/// Fully resolved options for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOptions {
    pub image_element: Option<ElementRef>,
    pub image_element_wrapper: Option<String>,
    pub image_element_container: Option<ElementRef>,
    pub positioned_element_class: PositionedClass,
    pub wrap_image_element: bool,
    pub area_marker_class: String,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            image_element: None,
            image_element_wrapper: None,
            image_element_container: None,
            positioned_element_class: PositionedClass::None,
            wrap_image_element: false,
            area_marker_class: DEFAULT_AREA_MARKER_CLASS.to_string(),
        }
    }
}

impl OverlayOptions {
    /// Defaults overlaid with caller options given as JSON (or JSON5).
    ///
    /// Unlike the per-element attribute, caller options are validated.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides = OptionOverrides::parse(text)?;
        Ok(Self::default().merged(&overrides))
    }

    pub fn with_image_element(mut self, image: impl Into<ElementRef>) -> Self {
        self.image_element = Some(image.into());
        self
    }

    pub fn with_image_element_wrapper(mut self, template: impl Into<String>) -> Self {
        self.image_element_wrapper = Some(template.into());
        self
    }

    pub fn with_container(mut self, container: impl Into<ElementRef>) -> Self {
        self.image_element_container = Some(container.into());
        self
    }

    pub fn with_positioned_class(mut self, class: PositionedClass) -> Self {
        self.positioned_element_class = class;
        self
    }

    pub fn with_wrap_image_element(mut self, wrap: bool) -> Self {
        self.wrap_image_element = wrap;
        self
    }

    pub fn with_area_marker_class(mut self, class: impl Into<String>) -> Self {
        self.area_marker_class = class.into();
        self
    }

    /// `self` overlaid with every option `overrides` sets.
    pub fn merged(&self, overrides: &OptionOverrides) -> Self {
        let mut out = self.clone();
        if let Some(v) = &overrides.image_element {
            out.image_element = v.clone();
        }
        if let Some(v) = &overrides.image_element_wrapper {
            out.image_element_wrapper = v.clone();
        }
        if let Some(v) = &overrides.image_element_container {
            out.image_element_container = v.clone();
        }
        if let Some(v) = overrides.positioned_class() {
            out.positioned_element_class = v.clone();
        }
        if let Some(v) = overrides.wrap_image_element {
            out.wrap_image_element = v;
        }
        if let Some(v) = &overrides.area_marker_class {
            out.area_marker_class = v.clone();
        }
        out
    }

    /// The wrapper template to use, expanding the `wrap_image_element` helper.
    pub fn effective_wrapper(&self) -> Option<&str> {
        match self.image_element_wrapper.as_deref() {
            Some(template) if !template.trim().is_empty() => Some(template),
            _ if self.wrap_image_element => Some(DEFAULT_IMAGE_WRAPPER),
            _ => None,
        }
    }
}

/// One layer of option overrides. `None` leaves the lower layer untouched; for the
/// "value or `false`" options, `Some(None)` explicitly clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct OptionOverrides {
    #[serde(deserialize_with = "element_ref_or_false")]
    pub image_element: Option<Option<ElementRef>>,
    #[serde(deserialize_with = "string_or_false")]
    pub image_element_wrapper: Option<Option<String>>,
    #[serde(deserialize_with = "element_ref_or_false")]
    pub image_element_container: Option<Option<ElementRef>>,
    pub positioned_element_class: Option<PositionedClass>,
    /// Older spelling of `positioned_element_class`; loses when both are given.
    pub css_class: Option<PositionedClass>,
    pub wrap_image_element: Option<bool>,
    pub area_marker_class: Option<String>,
}

impl OptionOverrides {
    /// The positioning spec this layer sets, under either spelling.
    pub fn positioned_class(&self) -> Option<&PositionedClass> {
        self.positioned_element_class
            .as_ref()
            .or(self.css_class.as_ref())
    }

    /// Strict parse: the text must be a JSON5 object whose known keys have valid types.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = json5::from_str(text).map_err(|e| Error::InvalidOptions {
            message: e.to_string(),
        })?;
        if !value.is_object() {
            return Err(Error::InvalidOptions {
                message: "expected an object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| Error::InvalidOptions {
            message: e.to_string(),
        })
    }

    /// Lenient parse for the per-element attribute: any failure yields no overrides.
    pub fn from_attribute(text: &str) -> Self {
        match Self::parse(text) {
            Ok(overrides) => overrides,
            Err(err) => {
                tracing::debug!(%err, "ignoring unparsable `{OPTIONS_ATTRIBUTE}` attribute");
                Self::default()
            }
        }
    }
}
