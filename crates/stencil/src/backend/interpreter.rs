//! Tree-walking backend

use super::optimize::optimize;
use super::{Backend, Render};
use crate::ast::{Ast, Cond, VarRef};
use crate::context::{ContextId, ParamList};
use crate::error::{CompileError, RenderError};
use crate::value::Value;
use std::sync::Arc;
use stencil_html::is_void_element;

static ABSENT: Value = Value::Absent;

/// Evaluates the AST directly, optionally after the optimizer passes
#[derive(Debug, Clone, Copy)]
pub struct Interpreter {
    optimize: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        Self { optimize: true }
    }

    /// Evaluate the AST exactly as the compile walk produced it
    pub fn without_optimizer() -> Self {
        Self { optimize: false }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for Interpreter {
    fn compile(&self, ast: Ast, params: ParamList) -> Result<Arc<dyn Render>, CompileError> {
        let ast = if self.optimize { optimize(ast) } else { ast };
        tracing::trace!("Interpreter program: {}", ast);
        Ok(Arc::new(Program { ast, params }))
    }
}

#[derive(Debug)]
struct Program {
    ast: Ast,
    params: ParamList,
}

impl Render for Program {
    fn render(&self, args: &[Value]) -> Result<String, RenderError> {
        if args.len() > self.params.arity {
            return Err(RenderError::TooManyArguments {
                expected: self.params.arity,
                found: args.len(),
            });
        }

        let mut env = Env {
            frames: vec![(self.params.context, args)],
        };
        let mut out = String::new();
        env.eval(&self.ast, &mut out)?;
        Ok(out)
    }
}

/// Bound frames, innermost last
struct Env<'a> {
    frames: Vec<(ContextId, &'a [Value])>,
}

impl<'a> Env<'a> {
    fn lookup(&self, var: VarRef) -> &'a Value {
        self.frames
            .iter()
            .rev()
            .find(|(context, _)| *context == var.context)
            .and_then(|&(_, values)| values.get(var.slot))
            .unwrap_or(&ABSENT)
    }

    fn eval(&mut self, ast: &Ast, out: &mut String) -> Result<(), RenderError> {
        match ast {
            Ast::Static(text) => out.push_str(text),
            Ast::Dynamic(var) => write_value(*var, self.lookup(*var), out)?,
            Ast::Multi(items) => {
                for item in items {
                    self.eval(item, out)?;
                }
            }
            Ast::If {
                cond,
                then,
                otherwise,
            } => {
                let truthy = self.lookup(cond.var()).is_truthy();
                let taken = match cond {
                    Cond::Truthy(_) => truthy,
                    Cond::Falsy(_) => !truthy,
                };
                if taken {
                    self.eval(then, out)?;
                } else if let Some(otherwise) = otherwise {
                    self.eval(otherwise, out)?;
                }
            }
            Ast::Block { header, body } => {
                let frames: Vec<&'a [Value]> = match self.lookup(header.source) {
                    // Absent repeats once with every nested slot absent
                    Value::Absent => {
                        let empty: &'a [Value] = &[];
                        vec![empty]
                    }
                    Value::List(items) => items.iter().map(Vec::as_slice).collect(),
                    other => {
                        return Err(RenderError::NotIterable {
                            var: header.source,
                            found: other.type_name(),
                        });
                    }
                };

                for values in frames {
                    match header.frame {
                        Some(frame) => {
                            if values.len() > frame.arity {
                                return Err(RenderError::TooManyArguments {
                                    expected: frame.arity,
                                    found: values.len(),
                                });
                            }
                            self.frames.push((frame.context, values));
                            let result = self.eval(body, out);
                            self.frames.pop();
                            result?;
                        }
                        None => self.eval(body, out)?,
                    }
                }
            }
            Ast::Element {
                name,
                attrs,
                content,
            } => {
                out.push('<');
                out.push_str(name);
                self.eval(attrs, out)?;
                out.push('>');
                if !is_void_element(name) {
                    self.eval(content, out)?;
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            Ast::Attr { name, value } => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                self.eval(value, out)?;
                out.push('"');
            }
        }
        Ok(())
    }
}

fn write_value(var: VarRef, value: &Value, out: &mut String) -> Result<(), RenderError> {
    match value {
        Value::Absent => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Text(text) => out.push_str(text),
        Value::List(_) => {
            return Err(RenderError::NotRenderable {
                var,
                found: value.type_name(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LoopHeader;
    use pretty_assertions::assert_eq;

    fn top(arity: usize) -> ParamList {
        ParamList {
            context: ContextId(0),
            arity,
            optional: true,
        }
    }

    fn var(context: u32, slot: usize) -> VarRef {
        VarRef::new(ContextId(context), slot)
    }

    fn run(ast: Ast, arity: usize, args: &[Value]) -> Result<String, RenderError> {
        Interpreter::new().compile(ast, top(arity)).unwrap().render(args)
    }

    #[test]
    fn test_missing_trailing_args_are_absent() {
        let ast = Ast::Multi(vec![Ast::Dynamic(var(0, 0)), Ast::Dynamic(var(0, 1))]);
        assert_eq!(run(ast, 2, &[Value::from("a")]).unwrap(), "a");
    }

    #[test]
    fn test_too_many_arguments() {
        let err = run(Ast::empty(), 1, &[Value::Absent, Value::Absent]).unwrap_err();
        assert_eq!(err, RenderError::TooManyArguments { expected: 1, found: 2 });
    }

    #[test]
    fn test_scalar_formatting() {
        let ast = Ast::Multi(vec![Ast::Dynamic(var(0, 0)), Ast::Dynamic(var(0, 1))]);
        assert_eq!(run(ast, 2, &[Value::Int(7), Value::Bool(false)]).unwrap(), "7false");
    }

    #[test]
    fn test_list_is_not_renderable() {
        let err = run(Ast::Dynamic(var(0, 0)), 1, &[Value::List(vec![])]).unwrap_err();
        assert!(matches!(err, RenderError::NotRenderable { .. }));
    }

    fn repeated() -> Ast {
        Ast::Block {
            header: LoopHeader {
                source: var(0, 0),
                frame: Some(ParamList {
                    context: ContextId(1),
                    arity: 1,
                    optional: false,
                }),
            },
            body: Box::new(Ast::element(
                "li",
                Ast::empty(),
                Ast::if_else(
                    Cond::Truthy(var(1, 0)),
                    Ast::Dynamic(var(1, 0)),
                    Some(Ast::Static("-".into())),
                ),
            )),
        }
    }

    #[test]
    fn test_block_iterations() {
        let items = Value::list(vec![vec![Value::from("a")], vec![Value::from("b")]]);
        assert_eq!(run(repeated(), 1, &[items]).unwrap(), "<li>a</li><li>b</li>");
        assert_eq!(run(repeated(), 1, &[Value::List(vec![])]).unwrap(), "");
        assert_eq!(run(repeated(), 1, &[]).unwrap(), "<li>-</li>");
        // Short frames read absent
        assert_eq!(run(repeated(), 1, &[Value::list(vec![vec![]])]).unwrap(), "<li>-</li>");
    }

    #[test]
    fn test_block_frame_longer_than_loop_parameters() {
        let items = Value::list(vec![vec![Value::from("a"), Value::from("b")]]);
        let err = run(repeated(), 1, &[items]).unwrap_err();
        assert_eq!(err, RenderError::TooManyArguments { expected: 1, found: 2 });
    }

    #[test]
    fn test_block_needs_a_list() {
        let err = run(repeated(), 1, &[Value::from("nope")]).unwrap_err();
        assert_eq!(
            err,
            RenderError::NotIterable {
                var: var(0, 0),
                found: "text"
            }
        );
    }

    #[test]
    fn test_optimizer_does_not_change_output() {
        let items = Value::list(vec![vec![Value::from("a")], vec![]]);
        let params = top(1);
        let plain = Interpreter::without_optimizer()
            .compile(repeated(), params)
            .unwrap()
            .render(std::slice::from_ref(&items))
            .unwrap();
        let optimized = Interpreter::new()
            .compile(repeated(), params)
            .unwrap()
            .render(&[items])
            .unwrap();
        assert_eq!(plain, optimized);
    }
}
