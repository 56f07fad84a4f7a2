//! The compile walk
//!
//! [`Filter`] walks the document tree once. Untouched nodes compile
//! structurally; nodes with logged mutations go through a [`Tag`] and
//! the handler registered for each mutation kind.

use crate::ast::{Ast, Cond, LoopHeader, VarRef};
use crate::context::{ContextId, ParamList};
use crate::document::Document;
use crate::error::CompileError;
use crate::mutation;
use crate::scope::Scope;
use crate::tag::Tag;
use std::collections::HashMap;
use stencil_dom::{DomTree, NodeCategory, NodeData, NodeId};
use stencil_html::{doctype_declaration, escaped_attribute, escaped_text, is_raw_text_element};

/// Rewrites a tag for one logged mutation
pub type Handler =
    fn(tag: &mut Tag, scope: &HandlerScope<'_>, var: VarRef, args: &[String]) -> Result<(), CompileError>;

/// Builds the `attrs` AST of a mutated element
pub type AttributePass = fn(tag: &Tag, tree: &DomTree) -> Ast;

/// Mutation kind -> handler
#[derive(Clone)]
pub struct HandlerTable {
    handlers: HashMap<String, Handler>,
}

impl HandlerTable {
    /// A table with no handlers at all
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The five standard mutation kinds
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.insert(mutation::REPLACE_INNER_HTML, on_replace_inner_html);
        table.insert(mutation::APPEND, on_append);
        table.insert(mutation::SET_ATTRIBUTE, on_set_attribute);
        table.insert(mutation::REMOVE, on_remove);
        table.insert(mutation::REPEAT_EACH, on_repeat_each);
        table
    }

    /// Add or replace a handler, returning the one it displaced
    pub fn insert(&mut self, kind: &str, handler: Handler) -> Option<Handler> {
        self.handlers.insert(kind.to_string(), handler)
    }

    pub fn remove(&mut self, kind: &str) -> Option<Handler> {
        self.handlers.remove(kind)
    }

    pub fn get(&self, kind: &str) -> Option<Handler> {
        self.handlers.get(kind).copied()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("HandlerTable").field("kinds", &kinds).finish()
    }
}

/// What a handler can see of the scope that logged the mutation
pub struct HandlerScope<'a> {
    doc: &'a Document,
    scope: &'a Scope,
}

impl<'a> HandlerScope<'a> {
    pub fn scope(&self) -> &'a Scope {
        self.scope
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn tree(&self) -> &'a DomTree {
        self.doc.tree()
    }

    /// Loop parameters of the repeated region rooted at this scope, if a
    /// nested context was entered for it
    pub fn loop_parameters(&self) -> Option<ParamList> {
        self.scope
            .nested_context()
            .map(|ctx| self.doc.context_at(ctx).loop_parameter_list())
    }
}

/// The compiler
#[derive(Debug, Clone)]
pub struct Filter {
    handlers: HandlerTable,
    attributes: AttributePass,
}

impl Filter {
    pub fn new() -> Self {
        Self::with_handlers(HandlerTable::standard())
    }

    /// A filter dispatching through `handlers` instead of the standard table
    pub fn with_handlers(handlers: HandlerTable) -> Self {
        Self {
            handlers,
            attributes: override_aware_attributes,
        }
    }

    pub fn with_attribute_pass(mut self, pass: AttributePass) -> Self {
        self.attributes = pass;
        self
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerTable {
        &mut self.handlers
    }

    /// Walk the whole document into one AST
    pub fn compile(&self, doc: &Document) -> Result<Ast, CompileError> {
        let ast = self.compile_node(doc, NodeId::ROOT, false)?;
        if let Some(var) = unbound_var(&ast, &mut vec![doc.root_context()]) {
            return Err(unbound_error(doc, var));
        }
        tracing::debug!("Compiled document tree ({} nodes)", doc.tree().len());
        Ok(ast)
    }

    fn compile_node(&self, doc: &Document, id: NodeId, raw: bool) -> Result<Ast, CompileError> {
        let tree = doc.tree();
        let Some(node) = tree.get(id) else {
            return Ok(Ast::empty());
        };

        if doc.is_mutated(id) {
            return self.compile_tag(doc, id);
        }

        match &node.data {
            NodeData::Document => self.compile_children(doc, id, false),
            NodeData::Element(elem) => {
                let name = tree.resolve(elem.name.local);
                let content = self.compile_children(doc, id, is_raw_text_element(name))?;
                Ok(Ast::element(name, element_attributes(tree, id), content))
            }
            NodeData::Text(text) if raw => Ok(Ast::Static(text.clone())),
            NodeData::Text(text) => Ok(Ast::Static(escaped_text(text))),
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => Ok(Ast::Static(doctype_declaration(
                tree.resolve(*name),
                public_id,
                system_id,
            ))),
            NodeData::Comment(_) | NodeData::ProcessingInstruction { .. } => {
                Err(CompileError::UnrecognizedNodeCategory {
                    node: id,
                    category: node.category(),
                })
            }
        }
    }

    fn compile_children(&self, doc: &Document, id: NodeId, raw: bool) -> Result<Ast, CompileError> {
        doc.tree()
            .children(id)
            .map(|(child, _)| self.compile_node(doc, child, raw))
            .collect::<Result<Vec<_>, _>>()
            .map(Ast::Multi)
    }

    fn compile_tag(&self, doc: &Document, id: NodeId) -> Result<Ast, CompileError> {
        let tree = doc.tree();
        let Some(name) = tree.tag_name(id) else {
            let kind = doc
                .scopes_touching(id)
                .flat_map(|scope| scope.mutations())
                .map(|logged| logged.key.kind.clone())
                .next()
                .unwrap_or_default();
            return Err(CompileError::NotAnElement {
                kind,
                node: id,
                category: tree.get(id).map_or(NodeCategory::Container, |n| n.category()),
            });
        };

        let mut tag = Tag::new(id);
        for scope in doc.scopes_touching(id) {
            let handler_scope = HandlerScope { doc, scope };
            for logged in scope.mutations() {
                let kind = logged.key.kind.as_str();
                let handler = self.handlers.get(kind).ok_or_else(|| {
                    CompileError::UnknownMutationHandler {
                        kind: kind.to_string(),
                        node: id,
                        element: name.to_string(),
                    }
                })?;

                let var = VarRef::new(scope.context(), logged.slot);
                tracing::trace!("Applying {} to node {:?} as {}", logged.key, id, var);
                handler(&mut tag, &handler_scope, var, &logged.key.args)?;
            }
        }

        let content = match tag.take_content() {
            Some(content) => content,
            None => self.compile_children(doc, id, is_raw_text_element(name))?,
        };
        let content = tag.apply_inner(content);
        let attrs = (self.attributes)(&tag, tree);
        Ok(tag.apply_outer(Ast::element(name, attrs, content)))
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

/// First variable read where no enclosing frame binds its context
fn unbound_var(ast: &Ast, bound: &mut Vec<ContextId>) -> Option<VarRef> {
    fn check(var: VarRef, bound: &[ContextId]) -> Option<VarRef> {
        (!bound.contains(&var.context)).then_some(var)
    }

    match ast {
        Ast::Static(_) => None,
        Ast::Dynamic(var) => check(*var, bound),
        Ast::Multi(items) => items.iter().find_map(|item| unbound_var(item, bound)),
        Ast::If {
            cond,
            then,
            otherwise,
        } => {
            if let Some(var) = check(cond.var(), bound) {
                return Some(var);
            }
            if let Some(var) = unbound_var(then, bound) {
                return Some(var);
            }
            otherwise
                .as_deref()
                .and_then(|otherwise| unbound_var(otherwise, bound))
        }
        Ast::Block { header, body } => {
            if let Some(var) = check(header.source, bound) {
                return Some(var);
            }
            let Some(frame) = header.frame else {
                return unbound_var(body, bound);
            };
            bound.push(frame.context);
            let found = unbound_var(body, bound);
            bound.pop();
            found
        }
        Ast::Element { attrs, content, .. } => {
            unbound_var(attrs, bound).or_else(|| unbound_var(content, bound))
        }
        Ast::Attr { value, .. } => unbound_var(value, bound),
    }
}

fn unbound_error(doc: &Document, var: VarRef) -> CompileError {
    let (kind, node) = match doc.mutation_for(var) {
        Some((scope, logged)) => (
            logged.key.kind.clone(),
            scope.nodes().first().copied().unwrap_or(NodeId::NONE),
        ),
        None => (String::new(), NodeId::NONE),
    };
    CompileError::UnboundVariable {
        kind,
        node,
        var,
        context: var.context,
    }
}

fn static_attribute(name: &str, value: &str) -> Ast {
    Ast::attr(name, Ast::Static(escaped_attribute(value)))
}

fn element_attributes(tree: &DomTree, id: NodeId) -> Ast {
    let Some(elem) = tree.get(id).and_then(|n| n.as_element()) else {
        return Ast::empty();
    };
    Ast::Multi(
        elem.attrs
            .iter()
            .map(|attr| static_attribute(tree.resolve(attr.name.local), &attr.value))
            .collect(),
    )
}

/// Attribute pass that ignores overrides and emits the source attributes
pub fn static_attributes(tag: &Tag, tree: &DomTree) -> Ast {
    element_attributes(tree, tag.node())
}

/// Default attribute pass. Source attributes keep their order; an
/// overridden one falls back to its source value when the slot is
/// absent. Overrides of attributes the element lacks come last and
/// emit nothing when absent.
pub fn override_aware_attributes(tag: &Tag, tree: &DomTree) -> Ast {
    let Some(elem) = tree.get(tag.node()).and_then(|n| n.as_element()) else {
        return Ast::empty();
    };
    let data = tag.data();

    let mut attrs = Vec::with_capacity(elem.attrs.len() + data.overrides().len());
    for attr in elem.attrs.iter() {
        let name = tree.resolve(attr.name.local);
        let fallback = static_attribute(name, &attr.value);
        match data.override_for(name) {
            Some(var) => attrs.push(Ast::if_else(
                Cond::Truthy(var),
                Ast::attr(name, Ast::Dynamic(var)),
                Some(fallback),
            )),
            None => attrs.push(fallback),
        }
    }

    for (name, var) in data.overrides() {
        let in_source = elem
            .attrs
            .iter()
            .any(|attr| tree.resolve(attr.name.local).eq_ignore_ascii_case(name));
        if !in_source {
            attrs.push(Ast::if_else(
                Cond::Truthy(*var),
                Ast::attr(name.as_str(), Ast::Dynamic(*var)),
                None,
            ));
        }
    }

    Ast::Multi(attrs)
}

fn expect_args(kind: &str, tag: &Tag, args: &[String], expected: usize) -> Result<(), CompileError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CompileError::InvalidArguments {
            kind: kind.to_string(),
            node: tag.node(),
            expected,
            found: args.len(),
        })
    }
}

fn on_replace_inner_html(
    tag: &mut Tag,
    _scope: &HandlerScope<'_>,
    var: VarRef,
    args: &[String],
) -> Result<(), CompileError> {
    expect_args(mutation::REPLACE_INNER_HTML, tag, args, 0)?;
    tag.wrap_inner(move |content| Ast::if_else(Cond::Truthy(var), Ast::Dynamic(var), Some(content)));
    Ok(())
}

fn on_append(
    tag: &mut Tag,
    _scope: &HandlerScope<'_>,
    var: VarRef,
    args: &[String],
) -> Result<(), CompileError> {
    expect_args(mutation::APPEND, tag, args, 0)?;
    tag.wrap_inner(move |content| Ast::Multi(vec![content, Ast::Dynamic(var)]));
    Ok(())
}

fn on_set_attribute(
    tag: &mut Tag,
    _scope: &HandlerScope<'_>,
    var: VarRef,
    args: &[String],
) -> Result<(), CompileError> {
    expect_args(mutation::SET_ATTRIBUTE, tag, args, 1)?;
    tag.data_mut().set_override(&args[0], var);
    Ok(())
}

fn on_remove(
    tag: &mut Tag,
    _scope: &HandlerScope<'_>,
    var: VarRef,
    args: &[String],
) -> Result<(), CompileError> {
    expect_args(mutation::REMOVE, tag, args, 0)?;
    tag.wrap_outer(move |element| Ast::if_else(Cond::Falsy(var), element, None));
    Ok(())
}

fn on_repeat_each(
    tag: &mut Tag,
    scope: &HandlerScope<'_>,
    var: VarRef,
    args: &[String],
) -> Result<(), CompileError> {
    expect_args(mutation::REPEAT_EACH, tag, args, 0)?;
    let header = LoopHeader {
        source: var,
        frame: scope.loop_parameters(),
    };
    tag.wrap_outer(move |element| Ast::Block {
        header,
        body: Box::new(element),
    });
    Ok(())
}
