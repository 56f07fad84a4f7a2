//! HTML Serialization
//!
//! Serializes trees back to markup. The output is canonical: no
//! indentation, attributes in source order, double-quoted values,
//! void elements without end tags. The template compiler emits the
//! same form, so rendering an untouched template equals serializing it.

use stencil_dom::{DomTree, NodeData, NodeId};

/// Void elements (no end tag)
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text html5ever keeps unparsed; their content is
/// written back without escaping. `noscript` is among them because the
/// parser runs with scripting enabled.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// HTML serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the whole tree
    pub fn serialize(&self, tree: &DomTree) -> String {
        self.serialize_outer(tree, tree.root())
    }

    /// Serialize children only (innerHTML)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output, false);
        output
    }

    /// Serialize a node including itself (outerHTML)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output, false);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String, raw: bool) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                self.serialize_children(tree, node_id, output, false);
            }
            NodeData::Element(elem) => {
                let tag = tree.resolve(elem.name.local);

                output.push('<');
                output.push_str(tag);
                for attr in elem.attrs.iter() {
                    output.push(' ');
                    output.push_str(tree.resolve(attr.name.local));
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }
                output.push('>');

                if !is_void_element(tag) {
                    self.serialize_children(tree, node_id, output, is_raw_text_element(tag));
                    output.push_str("</");
                    output.push_str(tag);
                    output.push('>');
                }
            }
            NodeData::Text(text) => {
                if raw {
                    output.push_str(text);
                } else {
                    escape_text(text, output);
                }
            }
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                output.push_str(&doctype_declaration(tree.resolve(*name), public_id, system_id));
            }
            NodeData::ProcessingInstruction { target, data } => {
                output.push_str("<?");
                output.push_str(tree.resolve(*target));
                if !data.is_empty() {
                    output.push(' ');
                    output.push_str(data);
                }
                output.push('>');
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String, raw: bool) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output, raw);
        }
    }
}

/// Render a DOCTYPE declaration
pub fn doctype_declaration(name: &str, public_id: &str, system_id: &str) -> String {
    match (public_id.is_empty(), system_id.is_empty()) {
        (true, true) => format!("<!DOCTYPE {name}>"),
        (true, false) => format!("<!DOCTYPE {name} SYSTEM \"{system_id}\">"),
        (false, true) => format!("<!DOCTYPE {name} PUBLIC \"{public_id}\">"),
        (false, false) => format!("<!DOCTYPE {name} PUBLIC \"{public_id}\" \"{system_id}\">"),
    }
}

/// Escape text content for HTML
pub fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
pub fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// [`escape_text`] into a new string
pub fn escaped_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    escape_text(text, &mut output);
    output
}

/// [`escape_attribute`] into a new string
pub fn escaped_attribute(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    escape_attribute(text, &mut output);
    output
}
