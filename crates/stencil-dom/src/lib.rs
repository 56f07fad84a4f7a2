//! stencil DOM - template node tree
//!
//! Arena-allocated node tree consumed by the template compiler.
//! Nodes are addressed by [`NodeId`]; links are ids, never pointers.

mod interner;
mod node;
mod tree;

pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Node, NodeCategory, NodeData, QualName};
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document/container node every tree starts with
    pub const ROOT: NodeId = NodeId(0);
    /// Marks an absent link (no parent, no sibling, ...)
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
