//! Error types
//!
//! Compile errors abort the whole compilation; there is no partial
//! renderer. Render errors come from values that do not fit the shape
//! the compiled program expects.

use crate::{ContextId, ScopeId, VarRef};
use stencil_css::SelectorError;
use stencil_dom::{NodeCategory, NodeId};

/// Errors raised while walking the document or generating the renderer
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot compile {category} node {node:?}")]
    UnrecognizedNodeCategory { node: NodeId, category: NodeCategory },

    #[error("no handler registered for mutation `{kind}` (logged against <{element}>, node {node:?})")]
    UnknownMutationHandler {
        kind: String,
        node: NodeId,
        element: String,
    },

    #[error("mutation `{kind}` on node {node:?} expects {expected} argument(s), got {found}")]
    InvalidArguments {
        kind: String,
        node: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("mutation `{kind}` targets {category} node {node:?}; only elements can be mutated")]
    NotAnElement {
        kind: String,
        node: NodeId,
        category: NodeCategory,
    },

    #[error(
        "mutation `{kind}` on node {node:?} reads `{var}` outside the repeated region that binds context {}",
        .context.0
    )]
    UnboundVariable {
        kind: String,
        node: NodeId,
        var: VarRef,
        context: ContextId,
    },

    #[error("code generation failed: {0}")]
    Backend(String),
}

/// Errors raised while evaluating a compiled renderer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("renderer takes at most {expected} argument(s), got {found}")]
    TooManyArguments { expected: usize, found: usize },

    #[error("`{var}` must be a list to repeat over, got {found}")]
    NotIterable { var: VarRef, found: &'static str },

    #[error("`{var}` holds a {found}, which cannot be written as markup")]
    NotRenderable { var: VarRef, found: &'static str },
}

/// Any error surfaced by the public API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0:?} was not issued by this document")]
    UnknownScope(ScopeId),
}

pub type Result<T> = std::result::Result<T, Error>;
