//! Owned, arena-backed HTML document.
//!
//! This is the document the overlay builder reads from and mutates. Nodes are never freed:
//! detaching a node only unlinks it from its parent, so every `NodeId` handed out by a
//! `Document` stays valid for the lifetime of that document.

mod html;
mod serialize;

use indexmap::IndexMap;
use serde::Serialize;

use crate::Result;
use crate::selector::SelectorList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Doctype { name: String },
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementData {
    /// ASCII-lowercase tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: IndexMap<String, String>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: IndexMap::new(),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .map(|s| s.as_str())
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attrs.get(name).map(|s| s.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Sets an attribute, keeping its position when it already exists. No-op on non-elements.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.insert(name.to_ascii_lowercase(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id)?.attrs.shift_remove(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// Adds every whitespace-separated token of `classes` that the element does not carry yet.
    pub fn add_class(&mut self, id: NodeId, classes: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let mut tokens: Vec<String> = el.classes().map(str::to_string).collect();
        let mut changed = false;
        for token in classes.split_ascii_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
                changed = true;
            }
        }
        if changed {
            el.attrs.insert("class".to_string(), tokens.join(" "));
        }
    }

    /// Removes every occurrence of `class`. The attribute itself is kept, possibly empty,
    /// matching how browsers update `className`.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        if !el.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = el.classes().filter(|c| *c != class).collect();
        let joined = remaining.join(" ");
        el.attrs.insert("class".to_string(), joined);
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_element_with(&mut self, data: ElementData) -> NodeId {
        self.push_node(NodeData::Element(data))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Comment(text.into()))
    }

    pub(crate) fn create_doctype(&mut self, name: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Doctype { name: name.into() })
    }

    /// Unlinks `id` from its parent. The node and its subtree stay allocated.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut cur = Some(of);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Appends `child` as the last child of `parent`, moving it if it already has a parent.
    /// Attempts to create a cycle are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `child` into `parent` right before `reference`, or appends it when `reference`
    /// is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let siblings = &mut self.nodes[parent.0].children;
        match siblings.iter().position(|c| *c == reference) {
            Some(pos) => siblings.insert(pos, child),
            None => siblings.push(child),
        }
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.element(*c).is_some())
    }

    /// Wraps `target` with the (detached) `wrapper` structure.
    ///
    /// The wrapper takes `target`'s place in the tree and `target` is appended to the deepest
    /// first-element descendant of the wrapper. Returns the element `target` ended up in.
    pub fn wrap(&mut self, target: NodeId, wrapper: NodeId) -> NodeId {
        if let Some(parent) = self.parent(target) {
            self.insert_before(parent, wrapper, target);
        }
        let mut innermost = wrapper;
        while let Some(next) = self.first_element_child(innermost) {
            innermost = next;
        }
        self.append_child(innermost, target);
        innermost
    }

    /// Descendants of `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Element descendants of the root, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.element(*id).is_some())
            .collect()
    }

    /// Every `<map>` whose `name` attribute equals `name`.
    pub fn maps_named(&self, name: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|id| self.is_element_named(*id, "map") && self.attr(*id, "name") == Some(name))
            .collect()
    }

    /// Elements matching `selector` anywhere in the document, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.select_within(self.root(), selector)
    }

    /// Elements matching `selector` among the descendants of `scope`, in document order.
    pub fn select_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select_parsed(scope, &list))
    }

    pub fn select_parsed(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.element(*id).is_some() && list.matches(self, *id))
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(t) = &self.node(id).data {
            out.push_str(t);
        }
        for d in self.descendants(id) {
            if let NodeData::Text(t) = &self.node(d).data {
                out.push_str(t);
            }
        }
        out
    }
}
