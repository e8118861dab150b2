//! HTML5 parsing using html5ever.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, QualName, local_name, ns, parse_document};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use super::{Document, ElementData, NodeId};

impl Document {
    /// Parses a complete HTML document. HTML parsing never fails; malformed markup is
    /// recovered the way browsers do.
    pub fn parse_html(html: &str) -> Self {
        let dom = parse_rcdom(html);
        let mut doc = Document::new();
        let root = doc.root();
        for child in dom.document.children.borrow().iter() {
            doc.import(child, root);
        }
        doc
    }

    /// Parses `markup` as `<body>` content and returns the resulting top-level nodes, detached.
    pub fn parse_fragment(&mut self, markup: &str) -> Vec<NodeId> {
        let dom = html5ever::parse_fragment(
            RcDom::default(),
            ParseOpts::default(),
            QualName::new(None, ns!(html), local_name!("body")),
            Vec::new(),
            false,
        )
        .one(markup);

        // Fragment parsing puts the nodes under a synthetic `<html>` root.
        let holder = self.create_element("body");
        for root in dom.document.children.borrow().iter() {
            for child in root.children.borrow().iter() {
                self.import(child, holder);
            }
        }
        let nodes = self.children(holder).to_vec();
        for node in &nodes {
            self.detach(*node);
        }
        nodes
    }

    /// Parses `markup` and appends the resulting nodes to `parent`.
    pub fn append_html(&mut self, parent: NodeId, markup: &str) {
        for node in self.parse_fragment(markup) {
            self.append_child(parent, node);
        }
    }

    fn import(&mut self, handle: &Handle, parent: NodeId) {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.import(child, parent);
                }
            }
            RcNodeData::Doctype { name, .. } => {
                let node = self.create_doctype(name.to_string());
                self.append_child(parent, node);
            }
            RcNodeData::Text { contents } => {
                let node = self.create_text(contents.borrow().to_string());
                self.append_child(parent, node);
            }
            RcNodeData::Comment { contents } => {
                let node = self.create_comment(contents.to_string());
                self.append_child(parent, node);
            }
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let mut data = ElementData::new(name.local.to_string());
                for attr in attrs.borrow().iter() {
                    data.attrs
                        .insert(attr.name.local.to_string(), attr.value.to_string());
                }
                let node = self.create_element_with(data);
                self.append_child(parent, node);

                // `<template>` keeps its parsed content out of the regular child list.
                if let Some(contents) = template_contents.borrow().as_ref() {
                    for child in contents.children.borrow().iter() {
                        self.import(child, node);
                    }
                }
                for child in handle.children.borrow().iter() {
                    self.import(child, node);
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {}
        }
    }
}

fn parse_rcdom(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

#[cfg(test)]
mod tests {
    use crate::dom::{Document, NodeData};

    #[test]
    fn parse_keeps_doctype_and_attributes() {
        let doc = Document::parse_html(
            r##"<!DOCTYPE html><html><body><img src="a.png" usemap="#m" WIDTH="20"></body></html>"##,
        );
        let first = doc.children(doc.root())[0];
        assert!(matches!(doc.node(first).data(), NodeData::Doctype { name } if name == "html"));

        let img = doc.select("img").unwrap()[0];
        assert_eq!(doc.attr(img, "src"), Some("a.png"));
        assert_eq!(doc.attr(img, "usemap"), Some("#m"));
        assert_eq!(doc.attr(img, "width"), Some("20"));
    }

    #[test]
    fn fragment_nodes_are_detached() {
        let mut doc = Document::new();
        let nodes = doc.parse_fragment("<div class=\"w\"><span>x</span></div> tail");
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| doc.parent(*n).is_none()));
        assert_eq!(doc.tag_name(nodes[0]), Some("div"));
        assert_eq!(doc.text_content(nodes[0]), "x");
    }

    #[test]
    fn fragment_keeps_head_elements_and_leading_whitespace() {
        let mut doc = Document::new();
        let nodes = doc.parse_fragment("  <style>.c{color:red}</style><meta charset=\"utf-8\">x");
        assert_eq!(nodes.len(), 4);
        assert!(matches!(doc.node(nodes[0]).data(), NodeData::Text(t) if t == "  "));
        assert_eq!(doc.tag_name(nodes[1]), Some("style"));
        assert_eq!(doc.tag_name(nodes[2]), Some("meta"));
    }

    #[test]
    fn fragment_text_only() {
        let mut doc = Document::new();
        let nodes = doc.parse_fragment("Caption");
        assert_eq!(nodes.len(), 1);
        assert!(matches!(doc.node(nodes[0]).data(), NodeData::Text(t) if t == "Caption"));
    }
}
