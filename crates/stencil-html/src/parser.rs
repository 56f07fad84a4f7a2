//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts the result into our arena tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use stencil_dom::{DomTree, ElementData, NodeId, QualName};

/// What the parser keeps from the source markup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep text nodes that contain only whitespace
    pub keep_whitespace: bool,
    /// Keep comment nodes
    pub keep_comments: bool,
}

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Create a parser with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with explicit options
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse a whole document; html5ever supplies any implied
    /// `<html>`, `<head>` and `<body>` elements.
    pub fn parse(&self, html: &str) -> DomTree {
        let dom = self.parse_rcdom(html);

        let mut tree = DomTree::new();
        let root = tree.root();
        self.convert_node(&dom.document, &mut tree, root);

        tracing::debug!("Parsed document into {} nodes", tree.len());
        tree
    }

    /// Parse a fragment: only the content html5ever puts in `<body>`
    /// is kept, placed directly under the container node.
    pub fn parse_fragment(&self, html: &str) -> DomTree {
        // An explicit <body> keeps head-only elements (title, script,
        // style, meta) where the fragment put them.
        let dom = self.parse_rcdom(&format!("<body>{html}"));

        let mut tree = DomTree::new();
        let root = tree.root();
        if let Some(body) = find_body(&dom.document) {
            for child in body.children.borrow().iter() {
                self.convert_node(child, &mut tree, root);
            }
        }

        tracing::debug!("Parsed fragment into {} nodes", tree.len());
        tree
    }

    fn parse_rcdom(&self, html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    /// Convert an RcDom node (and its subtree) into `tree` under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
            }
            RcNodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                let id = tree.create_doctype(name, public_id, system_id);
                tree.append_child(parent, id);
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if self.options.keep_whitespace || !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id);
                }
            }
            RcNodeData::Comment { contents } => {
                if self.options.keep_comments {
                    let id = tree.create_comment(contents);
                    tree.append_child(parent, id);
                }
            }
            RcNodeData::Element { name, attrs, .. } => {
                let ns = tree.intern(&name.ns);
                let local = tree.intern(&name.local);
                let mut elem = ElementData::new(QualName::new(ns, local));

                for attr in attrs.borrow().iter() {
                    let attr_local = match &attr.name.prefix {
                        Some(prefix) => tree.intern(&format!("{}:{}", &**prefix, &*attr.name.local)),
                        None => tree.intern(&attr.name.local),
                    };
                    let attr_ns = tree.intern(&attr.name.ns);
                    let value = attr.value.to_string();

                    // Cache id and class for selector matching
                    match &*attr.name.local {
                        "id" => elem.id = Some(tree.intern(&value)),
                        "class" => {
                            for class in value.split_whitespace() {
                                let class = tree.intern(class);
                                elem.classes.push(class);
                            }
                        }
                        _ => {}
                    }

                    elem.set_attr(QualName::new(attr_ns, attr_local), value);
                }

                let id = tree.create_element_with(elem);
                tree.append_child(parent, id);

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id);
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {
                // Not representable in HTML output
            }
        }
    }
}

fn element_named(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, RcNodeData::Element { name, .. } if &*name.local == tag)
}

fn find_body(document: &Handle) -> Option<Handle> {
    let html = document
        .children
        .borrow()
        .iter()
        .find(|child| element_named(child, "html"))
        .cloned()?;
    let body = html
        .children
        .borrow()
        .iter()
        .find(|child| element_named(child, "body"))
        .cloned();
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let tree = HtmlParser::new().parse(html);

        let html_elem = tree.document_element().unwrap();
        assert_eq!(tree.tag_name(html_elem), Some("html"));
        // container + html + head + title + text + body + p + text
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_parse_fragment_skips_implied_wrappers() {
        let tree = HtmlParser::new().parse_fragment("<div><span>Text</span></div><p></p>");

        let top: Vec<_> = tree
            .element_children(tree.root())
            .filter_map(|id| tree.tag_name(id))
            .collect();
        assert_eq!(top, vec!["div", "p"]);
    }

    #[test]
    fn test_parse_fragment_keeps_head_elements_in_place() {
        let tree = HtmlParser::new().parse_fragment("<title>T</title><div></div>");
        let top: Vec<_> = tree
            .element_children(tree.root())
            .filter_map(|id| tree.tag_name(id))
            .collect();
        assert_eq!(top, vec!["title", "div"]);
    }

    #[test]
    fn test_whitespace_and_comments_dropped_by_default() {
        let tree = HtmlParser::new().parse_fragment("<ul>\n  <li>a</li>\n  <!-- note -->\n</ul>");
        let ul = tree.document_element().unwrap();
        assert_eq!(tree.children(ul).count(), 1);
    }

    #[test]
    fn test_options_keep_whitespace_and_comments() {
        let parser = HtmlParser::with_options(ParseOptions {
            keep_whitespace: true,
            keep_comments: true,
        });
        let tree = parser.parse_fragment("<ul>\n  <li>a</li>\n  <!-- note -->\n</ul>");
        let ul = tree.document_element().unwrap();
        // "\n  ", li, "\n  ", comment, "\n"
        assert_eq!(tree.children(ul).count(), 5);
    }

    #[test]
    fn test_attribute_caches() {
        let tree = HtmlParser::new().parse_fragment(r#"<p id="intro" class="body lead">x</p>"#);
        let p = tree.document_element().unwrap();
        let elem = tree.get(p).unwrap().as_element().unwrap();

        assert_eq!(elem.id.map(|id| tree.resolve(id)), Some("intro"));
        assert_eq!(elem.classes.len(), 2);
        assert_eq!(tree.attribute(p, "class"), Some("body lead"));
    }
}
