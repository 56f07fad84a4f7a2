//! Template document
//!
//! Owns the parsed tree, every context and scope created against it, the
//! node -> scope mutation index, and the compiled renderer.
//!
//! All mutating entry points take `&mut self`, so a document has exactly
//! one writer. Once compiled, the renderer returned by
//! [`Document::compile`] is immutable and can be shared across threads.

use crate::ast::{Ast, VarRef};
use crate::backend::{Backend, Interpreter, Render};
use crate::context::{Context, ContextId, Slot};
use crate::error::{CompileError, Error, Result};
use crate::filter::Filter;
use crate::mutation::{LoggedMutation, MutationKey};
use crate::scope::{Scope, ScopeId};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;
use stencil_css::ElementQuery;
use stencil_dom::{DomTree, NodeId};

pub struct Document {
    tree: DomTree,
    contexts: Vec<Context>,
    scopes: Vec<Scope>,
    /// Scopes with logged mutations, per node they cover
    index: HashMap<NodeId, Vec<ScopeId>>,
    filter: Filter,
    backend: Box<dyn Backend>,
    dirty: bool,
    compiled: Option<Arc<dyn Render>>,
    root: ContextId,
}

impl Document {
    /// Parse a whole HTML document
    pub fn parse(html: &str) -> Self {
        Self::new(stencil_html::parse(html))
    }

    /// Parse a template fragment such as `<div class="comment">…</div>`
    pub fn parse_fragment(html: &str) -> Self {
        Self::new(stencil_html::parse_fragment(html))
    }

    pub fn new(tree: DomTree) -> Self {
        Self::with_filter(tree, Filter::default())
    }

    pub fn with_filter(tree: DomTree, filter: Filter) -> Self {
        Self::with_backend(tree, filter, Interpreter::default())
    }

    pub fn with_backend(tree: DomTree, filter: Filter, backend: impl Backend + 'static) -> Self {
        let mut doc = Self {
            tree,
            contexts: Vec::new(),
            scopes: Vec::new(),
            index: HashMap::new(),
            filter,
            backend: Box::new(backend),
            dirty: false,
            compiled: None,
            root: ContextId(0),
        };
        doc.root = doc.register_context(vec![NodeId::ROOT]);
        doc
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// The top-level context
    pub fn root_context(&self) -> ContextId {
        self.root
    }

    /// Scope over the whole document
    pub fn root_scope(&self) -> ScopeId {
        self.context_at(self.root).scope()
    }

    /// `None` if `id` was not issued by this document
    pub fn context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(id.0 as usize)
    }

    /// `None` if `id` was not issued by this document
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn context_scope(&self, id: ContextId) -> Option<ScopeId> {
        self.context(id).map(Context::scope)
    }

    pub fn scope_nodes(&self, id: ScopeId) -> Option<&[NodeId]> {
        self.scope(id).map(Scope::nodes)
    }

    // Ids handed out internally are always in range
    pub(crate) fn context_at(&self, id: ContextId) -> &Context {
        &self.contexts[id.0 as usize]
    }

    pub(crate) fn scope_at(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    fn checked_scope(&self, id: ScopeId) -> Result<&Scope> {
        self.scope(id).ok_or(Error::UnknownScope(id))
    }

    fn register_context(&mut self, nodes: Vec<NodeId>) -> ContextId {
        let context = ContextId(self.contexts.len() as u32);
        let scope = ScopeId(self.scopes.len() as u32);
        tracing::debug!(
            "Registered context {} over {} node(s)",
            context.0,
            nodes.len()
        );
        self.scopes.push(Scope::new(scope, nodes, context));
        self.contexts.push(Context::new(context, scope));
        context
    }

    /// Resolve `selector` against the root scope
    pub fn find(&mut self, selector: &str) -> Result<ScopeId> {
        self.resolve_child(self.root_scope(), selector)
    }

    /// Search every node of `scope` for `selector`. Results are memoized per
    /// scope and selector string; no match gives an empty scope.
    pub fn resolve_child(&mut self, scope: ScopeId, selector: &str) -> Result<ScopeId> {
        let parent = self.checked_scope(scope)?;
        if let Some(child) = parent.child(selector) {
            return Ok(child);
        }

        let list = stencil_css::parse(selector)?;
        let nodes: Vec<NodeId> = parent
            .nodes()
            .iter()
            .flat_map(|&root| self.tree.select_all(root, &list))
            .collect();
        let context = parent.context();

        let child = ScopeId(self.scopes.len() as u32);
        tracing::trace!("Selector `{}` matched {} node(s)", selector, nodes.len());
        self.scopes.push(Scope::new(child, nodes, context));
        self.scope_mut(scope).insert_child(selector, child);
        Ok(child)
    }

    /// Record a mutation against `scope` and return its slot. Logging the
    /// same kind and arguments again returns the same slot.
    pub fn log(&mut self, scope: ScopeId, kind: &str, args: &[&str]) -> Result<Slot> {
        let key = MutationKey::new(kind, args);
        let target = self.checked_scope(scope)?;
        if let Some(slot) = target.slot_for(&key) {
            return Ok(slot);
        }

        let context = target.context();
        let slot = self.contexts[context.0 as usize].allocate_slot();
        tracing::trace!("Logged {} on scope {} as slot {}", key, scope.0, slot);
        self.scope_mut(scope).record(key, slot);
        self.note_mutation(scope);
        Ok(slot)
    }

    fn note_mutation(&mut self, scope: ScopeId) {
        for &node in self.scopes[scope.0 as usize].nodes() {
            let entry = self.index.entry(node).or_default();
            if !entry.contains(&scope) {
                entry.push(scope);
            }
        }
        self.dirty = true;
    }

    /// Context for the repeated region rooted at `scope`, created on first use
    pub fn enter_nested_context(&mut self, scope: ScopeId) -> Result<ContextId> {
        let target = self.checked_scope(scope)?;
        if let Some(nested) = target.nested_context() {
            return Ok(nested);
        }
        let nodes = target.nodes().to_vec();
        let nested = self.register_context(nodes);
        self.scope_mut(scope).set_nested(nested);
        Ok(nested)
    }

    pub(crate) fn is_mutated(&self, node: NodeId) -> bool {
        self.index.get(&node).is_some_and(|scopes| !scopes.is_empty())
    }

    /// Scopes with mutations touching `node`, in the order they were first logged
    pub fn scopes_touching(&self, node: NodeId) -> impl Iterator<Item = &Scope> + '_ {
        self.index
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&id| self.scope_at(id))
    }

    /// The scope and logged mutation that own `var`
    pub(crate) fn mutation_for(&self, var: VarRef) -> Option<(&Scope, &LoggedMutation)> {
        self.scopes
            .iter()
            .filter(|scope| scope.context() == var.context)
            .find_map(|scope| {
                scope
                    .mutations()
                    .iter()
                    .find(|logged| logged.slot == var.slot)
                    .map(|logged| (scope, logged))
            })
    }

    /// Mutations were logged since the last successful compile
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Un-optimized AST of the current declarations
    pub fn compiled_ast(&self) -> std::result::Result<Ast, CompileError> {
        self.filter.compile(self)
    }

    /// Compile if needed and return the renderer. On failure the previous
    /// renderer stays in place and the document stays dirty.
    pub fn compile(&mut self) -> Result<Arc<dyn Render>> {
        if !self.dirty {
            if let Some(compiled) = &self.compiled {
                return Ok(Arc::clone(compiled));
            }
        }

        let ast = self.filter.compile(self)?;
        let params = self.context_at(self.root).parameter_list();
        tracing::debug!("Recompiling template with parameters ({})", params);
        let compiled = self.backend.compile(ast, params)?;

        self.compiled = Some(Arc::clone(&compiled));
        self.dirty = false;
        Ok(compiled)
    }

    /// Render with one value per top-level slot; trailing values may be omitted
    pub fn render(&mut self, values: &[Value]) -> Result<String> {
        let compiled = self.compile()?;
        Ok(compiled.render(values)?)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.len())
            .field("contexts", &self.contexts.len())
            .field("scopes", &self.scopes.len())
            .field("dirty", &self.dirty)
            .field("compiled", &self.compiled.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::{REMOVE, REPEAT_EACH, REPLACE_INNER_HTML, SET_ATTRIBUTE};

    const COMMENT: &str = r#"<div class="comment"><h2></h2><p></p><a>View more</a></div>"#;

    #[test]
    fn test_logging_is_idempotent() {
        let mut doc = Document::parse_fragment(COMMENT);
        let a = doc.find("a").unwrap();

        let first = doc.log(a, SET_ATTRIBUTE, &["href"]).unwrap();
        let second = doc.log(a, SET_ATTRIBUTE, &["href"]).unwrap();
        let other = doc.log(a, SET_ATTRIBUTE, &["title"]).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);

        let node = doc.scope_nodes(a).unwrap()[0];
        assert_eq!(doc.scopes_touching(node).count(), 1);
        assert_eq!(doc.context(doc.root_context()).unwrap().slot_count(), 2);
    }

    #[test]
    fn test_selector_memoization() {
        let mut doc = Document::parse_fragment(COMMENT);
        let first = doc.find(".comment h2").unwrap();
        let second = doc.find(".comment h2").unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.scope_nodes(first).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_match_is_a_scope() {
        let mut doc = Document::parse_fragment(COMMENT);
        let missing = doc.find("table").unwrap();
        assert!(doc.scope(missing).unwrap().is_empty());

        doc.log(missing, REMOVE, &[]).unwrap();
        let html = doc.render(&[Value::Bool(true)]).unwrap();
        assert_eq!(html, COMMENT);
    }

    #[test]
    fn test_bad_selector() {
        let mut doc = Document::parse_fragment(COMMENT);
        assert!(matches!(doc.find("div >"), Err(crate::Error::Selector(_))));
    }

    #[test]
    fn test_child_scopes_share_context() {
        let mut doc = Document::parse_fragment(COMMENT);
        let comment = doc.find(".comment").unwrap();
        let h2 = doc.resolve_child(comment, "h2").unwrap();
        assert_eq!(doc.scope(h2).unwrap().context(), doc.root_context());

        let nested = doc.enter_nested_context(comment).unwrap();
        assert_ne!(nested, doc.root_context());
        assert_eq!(doc.enter_nested_context(comment).unwrap(), nested);

        let nested_root = doc.context_scope(nested).unwrap();
        assert_eq!(doc.scope_nodes(nested_root).unwrap(), doc.scope_nodes(comment).unwrap());
        let nested_h2 = doc.resolve_child(nested_root, "h2").unwrap();
        assert_eq!(doc.scope(nested_h2).unwrap().context(), nested);
        assert_eq!(doc.scope_nodes(nested_h2).unwrap(), doc.scope_nodes(h2).unwrap());
    }

    #[test]
    fn test_multi_root_scope_concatenates() {
        let mut doc = Document::parse_fragment("<ul><li>a</li></ul><ul><li>b</li><li>c</li></ul>");
        let lists = doc.find("ul").unwrap();
        let items = doc.resolve_child(lists, "li").unwrap();
        assert_eq!(doc.scope_nodes(items).unwrap().len(), 3);
    }

    #[test]
    fn test_dirty_state_machine() {
        let mut doc = Document::parse_fragment(COMMENT);
        assert!(!doc.is_dirty());

        let h2 = doc.find("h2").unwrap();
        doc.log(h2, REPLACE_INNER_HTML, &[]).unwrap();
        assert!(doc.is_dirty());

        let first = doc.compile().unwrap();
        assert!(!doc.is_dirty());
        let again = doc.compile().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        // Re-logging an existing mutation does not invalidate
        doc.log(h2, REPLACE_INNER_HTML, &[]).unwrap();
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_failed_compile_keeps_previous_renderer() {
        let mut doc = Document::parse_fragment(COMMENT);
        let h2 = doc.find("h2").unwrap();
        doc.log(h2, REPLACE_INNER_HTML, &[]).unwrap();
        let good = doc.compile().unwrap();

        doc.log(h2, "no-such-kind", &[]).unwrap();
        assert!(doc.render(&[]).is_err());
        assert!(doc.is_dirty());
        assert_eq!(
            good.render(&[Value::from("Hi")]).unwrap(),
            r#"<div class="comment"><h2>Hi</h2><p></p><a>View more</a></div>"#
        );
    }

    #[test]
    fn test_repeat_without_nested_mutations() {
        let mut doc = Document::parse_fragment("<ul><li>x</li></ul>");
        let li = doc.find("li").unwrap();
        let slot = doc.log(li, REPEAT_EACH, &[]).unwrap();
        assert_eq!(slot, 0);

        let html = doc
            .render(&[Value::list(vec![vec![], vec![], vec![]])])
            .unwrap();
        assert_eq!(html, "<ul><li>x</li><li>x</li><li>x</li></ul>");
    }

    #[test]
    fn test_foreign_scope_ids_are_errors() {
        let mut big = Document::parse_fragment(COMMENT);
        let mut small = Document::parse_fragment("<p></p>");
        big.find("h2").unwrap();
        let foreign = big.find("p").unwrap();

        assert!(small.scope(foreign).is_none());
        assert!(small.scope_nodes(foreign).is_none());
        assert!(small.context(ContextId(7)).is_none());
        assert!(matches!(
            small.log(foreign, REMOVE, &[]),
            Err(crate::Error::UnknownScope(id)) if id == foreign
        ));
        assert!(small.resolve_child(foreign, "p").is_err());
        assert!(small.enter_nested_context(foreign).is_err());
        assert!(!small.is_dirty());
    }
}
