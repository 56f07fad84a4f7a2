//! stencil
//!
//! Compiles a static HTML document plus selector-addressed mutations
//! (replace inner HTML, append, override an attribute, remove, repeat)
//! into a reusable renderer. The document is walked once per change to
//! the set of declared mutations; every render after that only evaluates
//! the compiled program against positional values.
//!
//! # Example
//! ```rust,ignore
//! use stencil::{Document, Value, mutation};
//!
//! let mut doc = Document::parse_fragment(r#"<div class="comment"><p></p></div>"#);
//! let p = doc.find(".comment p")?;
//! let slot = doc.log(p, mutation::REPLACE_INNER_HTML, &[])?;
//!
//! let mut values = vec![Value::Absent; slot + 1];
//! values[slot] = Value::from("Hello");
//! let html = doc.render(&values)?;
//! ```

mod ast;
pub mod backend;
mod context;
mod document;
mod error;
mod filter;
pub mod mutation;
mod scope;
mod tag;
mod value;
mod view;

pub use ast::{Ast, Cond, LoopHeader, VarRef};
pub use backend::{Backend, Interpreter, Render};
pub use context::{Context, ContextId, ParamList, Slot};
pub use document::Document;
pub use error::{CompileError, Error, RenderError, Result};
pub use filter::{
    override_aware_attributes, static_attributes, AttributePass, Filter, Handler, HandlerScope,
    HandlerTable,
};
pub use mutation::{LoggedMutation, MutationKey};
pub use scope::{Scope, ScopeId};
pub use tag::{Tag, TagData};
pub use value::Value;
pub use view::View;

// Re-export collaborator crates for advanced usage
pub use stencil_css as css;
pub use stencil_dom as dom;
pub use stencil_html as html;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
