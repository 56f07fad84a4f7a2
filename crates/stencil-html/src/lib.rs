//! stencil HTML Parser
//!
//! HTML5 parser built on html5ever. Parses template markup and converts
//! it into the arena tree from `stencil-dom`, and serializes trees back
//! to canonical markup.

mod parser;
mod serializer;

pub use parser::{HtmlParser, ParseOptions};
pub use serializer::{
    doctype_declaration, escape_attribute, escape_text, escaped_attribute, escaped_text,
    is_raw_text_element, is_void_element, HtmlSerializer, RAW_TEXT_ELEMENTS, VOID_ELEMENTS,
};
pub use stencil_dom::{DomTree, Node, NodeId};

/// Parse a whole HTML document
pub fn parse(html: &str) -> DomTree {
    HtmlParser::new().parse(html)
}

/// Parse an HTML fragment (the nodes html5ever places inside `<body>`)
pub fn parse_fragment(html: &str) -> DomTree {
    HtmlParser::new().parse_fragment(html)
}

/// Serialize a whole tree to canonical markup
pub fn serialize(tree: &DomTree) -> String {
    HtmlSerializer::new().serialize(tree)
}
