//! Arena nodes
//!
//! Links between nodes are [`NodeId`]s into the owning tree's arena;
//! names are interned, and attributes sit inline while an element has
//! only a few of them.

use crate::{InternedString, NodeId};
use smallvec::SmallVec;

/// Namespace plus local name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualName {
    pub ns: InternedString,
    pub local: InternedString,
}

impl QualName {
    pub fn new(ns: InternedString, local: InternedString) -> Self {
        Self { ns, local }
    }

    /// Name in no namespace
    pub fn local(local: InternedString) -> Self {
        Self::new(InternedString::EMPTY, local)
    }
}

#[derive(Debug)]
pub struct Node {
    // Tree links, NodeId::NONE when absent
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,

    pub data: NodeData,
}

impl Node {
    /// A node with no links yet
    pub fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    pub fn element(name: QualName) -> Self {
        Self::new(NodeData::Element(ElementData::new(name)))
    }

    pub fn text(content: String) -> Self {
        Self::new(NodeData::Text(content))
    }

    /// The container every tree is rooted at
    pub fn document() -> Self {
        Self::new(NodeData::Document)
    }

    pub fn category(&self) -> NodeCategory {
        match &self.data {
            NodeData::Document => NodeCategory::Container,
            NodeData::Doctype { .. } => NodeCategory::Doctype,
            NodeData::Element(_) => NodeCategory::Element,
            NodeData::Text(_) => NodeCategory::Text,
            NodeData::Comment(_) => NodeCategory::Comment,
            NodeData::ProcessingInstruction { .. } => NodeCategory::ProcessingInstruction,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.category() == NodeCategory::Element
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        if let NodeData::Element(elem) = &self.data {
            Some(elem)
        } else {
            None
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        if let NodeData::Element(elem) = &mut self.data {
            Some(elem)
        } else {
            None
        }
    }

    /// Character data of a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        if let NodeData::Text(content) = &self.data {
            Some(content)
        } else {
            None
        }
    }
}

/// Coarse node classification used by tree walkers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Document or fragment container
    Container,
    Element,
    Text,
    Doctype,
    Comment,
    ProcessingInstruction,
}

impl NodeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Element => "element",
            Self::Text => "text",
            Self::Doctype => "doctype",
            Self::Comment => "comment",
            Self::ProcessingInstruction => "processing-instruction",
        }
    }
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum NodeData {
    /// Tree container; holds the top-level nodes of a document or fragment
    Document,
    Doctype {
        name: InternedString,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    /// Unescaped character data
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: InternedString,
        data: String,
    },
}

#[derive(Debug)]
pub struct ElementData {
    pub name: QualName,
    /// Source order is kept; it is the order markup is emitted in
    pub attrs: SmallVec<[Attribute; 4]>,
    /// `id` attribute, interned for selector matching
    pub id: Option<InternedString>,
    /// Words of the `class` attribute, interned for selector matching
    pub classes: SmallVec<[InternedString; 4]>,
}

impl ElementData {
    pub fn new(name: QualName) -> Self {
        Self {
            name,
            attrs: SmallVec::new(),
            id: None,
            classes: SmallVec::new(),
        }
    }

    /// Value of the attribute whose local name is `local`
    pub fn get_attr(&self, local: InternedString) -> Option<&str> {
        self.attrs
            .iter()
            .find_map(|attr| (attr.name.local == local).then_some(attr.value.as_str()))
    }

    /// Overwrite an existing attribute where it stands, or add it at the end
    pub fn set_attr(&mut self, name: QualName, value: String) {
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
    }

    pub fn has_class(&self, class: InternedString) -> bool {
        self.classes.contains(&class)
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    /// Unescaped value
    pub value: String,
}
