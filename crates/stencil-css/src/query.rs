//! Element Query
//!
//! querySelectorAll-style search over a `DomTree`. Matching runs right to
//! left; every element a combinator walks to must lie inside the subtree
//! the search started from.

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorComponent, SelectorList,
};
use crate::{parse_selector_list, SelectorError};
use stencil_dom::{DomTree, NodeData, NodeId};

/// Element query trait
pub trait ElementQuery {
    /// All descendants of `root` matching `selector`, in document order
    fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// First descendant of `root` matching `selector`
    fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// [`ElementQuery::query_selector_all`] with a pre-parsed list
    fn select_all(&self, root: NodeId, selectors: &SelectorList) -> Vec<NodeId>;

    /// Check whether `element` matches, treating `root` as the search boundary
    fn matches(&self, element: NodeId, root: NodeId, selectors: &SelectorList) -> bool;
}

impl ElementQuery for DomTree {
    fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self.select_all(root, &list))
    }

    fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self
            .descendants(root)
            .find(|&id| self.matches(id, root, &list)))
    }

    fn select_all(&self, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.matches(id, root, selectors))
            .collect()
    }

    fn matches(&self, element: NodeId, root: NodeId, selectors: &SelectorList) -> bool {
        let matcher = Matcher { tree: self, root };
        matcher.is_element(element)
            && selectors
                .selectors
                .iter()
                .any(|complex| matcher.complex(element, complex))
    }
}

struct Matcher<'a> {
    tree: &'a DomTree,
    root: NodeId,
}

impl Matcher<'_> {
    fn is_element(&self, id: NodeId) -> bool {
        self.tree.get(id).is_some_and(|n| n.is_element())
    }

    /// Inside the search boundary (strictly below `root`)
    fn in_bounds(&self, id: NodeId) -> bool {
        id.is_valid() && id != self.root
    }

    fn complex(&self, element: NodeId, selector: &ComplexSelector) -> bool {
        match selector.compounds.len() {
            0 => false,
            n => self.complex_at(element, selector, n - 1),
        }
    }

    fn complex_at(&self, element: NodeId, selector: &ComplexSelector, index: usize) -> bool {
        if !self.compound(element, &selector.compounds[index]) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match selector.combinators[index - 1] {
            Combinator::Child => self
                .parent(element)
                .is_some_and(|parent| self.complex_at(parent, selector, index - 1)),
            Combinator::Descendant => {
                let mut cursor = self.parent(element);
                while let Some(ancestor) = cursor {
                    if self.complex_at(ancestor, selector, index - 1) {
                        return true;
                    }
                    cursor = self.parent(ancestor);
                }
                false
            }
            Combinator::NextSibling => self
                .previous_element(element)
                .is_some_and(|sibling| self.complex_at(sibling, selector, index - 1)),
            Combinator::SubsequentSibling => {
                let mut cursor = self.previous_element(element);
                while let Some(sibling) = cursor {
                    if self.complex_at(sibling, selector, index - 1) {
                        return true;
                    }
                    cursor = self.previous_element(sibling);
                }
                false
            }
        }
    }

    /// Parent element inside the search boundary
    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree
            .parent(id)
            .filter(|&p| self.in_bounds(p) && self.is_element(p))
    }

    fn previous_element(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.tree.get(id)?.prev_sibling;
        while cursor.is_valid() {
            let node = self.tree.get(cursor)?;
            if node.is_element() {
                return Some(cursor);
            }
            cursor = node.prev_sibling;
        }
        None
    }

    fn compound(&self, element: NodeId, compound: &CompoundSelector) -> bool {
        compound
            .components
            .iter()
            .all(|component| self.component(element, component))
    }

    fn component(&self, element: NodeId, component: &SelectorComponent) -> bool {
        let Some(elem) = self.tree.get(element).and_then(|n| n.as_element()) else {
            return false;
        };

        match component {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(tag) => self.tree.resolve(elem.name.local).eq_ignore_ascii_case(tag),
            SelectorComponent::Id(id) => elem.id.is_some_and(|v| self.tree.resolve(v) == id),
            SelectorComponent::Class(class) => self
                .tree
                .interner()
                .lookup(class)
                .is_some_and(|class| elem.has_class(class)),
            SelectorComponent::Attribute(attr) => attr.matches(self.tree.attribute(element, &attr.name)),
            SelectorComponent::PseudoClass(pseudo) => self.pseudo_class(element, pseudo),
        }
    }

    fn pseudo_class(&self, element: NodeId, pseudo: &PseudoClass) -> bool {
        match pseudo {
            // Top-level elements of the tree
            PseudoClass::Root => self.tree.parent(element) == Some(self.tree.root()),
            PseudoClass::Empty => self.tree.children(element).all(|(_, child)| match &child.data {
                NodeData::Comment(_) | NodeData::ProcessingInstruction { .. } => true,
                NodeData::Text(text) => text.is_empty(),
                _ => false,
            }),
            PseudoClass::FirstChild => self.position(element, false).0 == 1,
            PseudoClass::LastChild => {
                let (index, count) = self.position(element, false);
                index == count
            }
            PseudoClass::OnlyChild => self.position(element, false).1 == 1,
            PseudoClass::FirstOfType => self.position(element, true).0 == 1,
            PseudoClass::LastOfType => {
                let (index, count) = self.position(element, true);
                index == count
            }
            PseudoClass::OnlyOfType => self.position(element, true).1 == 1,
            PseudoClass::NthChild(expr) => expr.matches(self.position(element, false).0 as i32),
            PseudoClass::NthLastChild(expr) => {
                let (index, count) = self.position(element, false);
                expr.matches((count - index + 1) as i32)
            }
            PseudoClass::NthOfType(expr) => expr.matches(self.position(element, true).0 as i32),
            PseudoClass::NthLastOfType(expr) => {
                let (index, count) = self.position(element, true);
                expr.matches((count - index + 1) as i32)
            }
            PseudoClass::Not(inner) => !self.compound(element, inner),
        }
    }

    /// 1-based index among element siblings and the sibling count,
    /// optionally restricted to siblings with the same tag
    fn position(&self, element: NodeId, same_type: bool) -> (usize, usize) {
        let Some(parent) = self.tree.parent(element) else {
            return (1, 1);
        };
        let tag = self.tree.tag_name(element);

        let mut index = 0;
        let mut count = 0;
        for sibling in self.tree.element_children(parent) {
            if same_type && self.tree.tag_name(sibling) != tag {
                continue;
            }
            count += 1;
            if sibling == element {
                index = count;
            }
        }
        (index, count)
    }
}
