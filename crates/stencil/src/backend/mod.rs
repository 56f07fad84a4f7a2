//! Code generation
//!
//! A [`Backend`] turns the compile walk's AST into a [`Render`] callable.
//! The default [`Interpreter`] runs the optimizer passes and evaluates
//! the result by walking it.

mod interpreter;
mod optimize;

pub use interpreter::Interpreter;
pub use optimize::{flatten, lower_html, merge_statics, optimize};

use crate::ast::Ast;
use crate::context::ParamList;
use crate::error::{CompileError, RenderError};
use crate::value::Value;
use std::sync::Arc;

pub trait Backend: Send + Sync {
    /// Build a renderer for `ast` taking the parameters described by `params`
    fn compile(&self, ast: Ast, params: ParamList) -> Result<Arc<dyn Render>, CompileError>;
}

/// A compiled template
pub trait Render: Send + Sync {
    fn render(&self, args: &[Value]) -> Result<String, RenderError>;
}
