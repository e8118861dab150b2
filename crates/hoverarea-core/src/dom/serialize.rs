use super::{Document, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

impl Document {
    /// Serializes the whole document.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    /// Serializes `id` including its own tags.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serializes the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.node(id).data() {
            NodeData::Document => {
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
            }
            NodeData::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.tag_name(p))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&htmlize::escape_text(text.as_str()));
                }
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&htmlize::escape_attribute(value.as_str()));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::Document;

    #[test]
    fn void_elements_have_no_end_tag() {
        let mut doc = Document::new();
        let img = doc.create_element("img");
        doc.set_attr(img, "src", "a.png");
        assert_eq!(doc.outer_html(img), r#"<img src="a.png">"#);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        doc.set_attr(a, "title", r#"say "hi""#);
        let t = doc.create_text("1 < 2 & 3");
        doc.append_child(a, t);
        assert_eq!(
            doc.outer_html(a),
            r#"<a title="say &quot;hi&quot;">1 &lt; 2 &amp; 3</a>"#
        );
    }

    #[test]
    fn script_text_is_not_escaped() {
        let doc = Document::parse_html("<script>if (a < b) {}</script>");
        let script = doc.select("script").unwrap()[0];
        assert_eq!(doc.inner_html(script), "if (a < b) {}");
    }

    #[test]
    fn parse_then_serialize_keeps_structure() {
        let src = r##"<!DOCTYPE html><html><head></head><body><map name="m"><area shape="rect" coords="0,0,1,1" href="#a"></map></body></html>"##;
        let doc = Document::parse_html(src);
        assert_eq!(doc.to_html(), src);
    }
}
