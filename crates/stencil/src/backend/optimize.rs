//! AST passes
//!
//! Pure `Ast -> Ast` rewrites run before evaluation:
//! html lowering, then multi flattening, then static merging.

use crate::ast::Ast;
use stencil_html::is_void_element;

/// The full pipeline
pub fn optimize(ast: Ast) -> Ast {
    merge_statics(flatten(lower_html(ast)))
}

/// Rewrite `Element` and `Attr` into open/close tag text around their content
pub fn lower_html(ast: Ast) -> Ast {
    match ast {
        Ast::Element {
            name,
            attrs,
            content,
        } => {
            let mut parts = vec![
                Ast::Static(format!("<{name}")),
                lower_html(*attrs),
                Ast::Static(">".to_string()),
            ];
            if !is_void_element(&name) {
                parts.push(lower_html(*content));
                parts.push(Ast::Static(format!("</{name}>")));
            }
            Ast::Multi(parts)
        }
        Ast::Attr { name, value } => Ast::Multi(vec![
            Ast::Static(format!(" {name}=\"")),
            lower_html(*value),
            Ast::Static("\"".to_string()),
        ]),
        other => map_children(other, lower_html),
    }
}

/// Splice nested `Multi` into their parent and unwrap singletons
pub fn flatten(ast: Ast) -> Ast {
    match ast {
        Ast::Multi(items) => {
            let mut flat = Vec::with_capacity(items.len());
            for item in items {
                match flatten(item) {
                    Ast::Multi(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            if flat.len() == 1 {
                flat.pop().unwrap_or_else(Ast::empty)
            } else {
                Ast::Multi(flat)
            }
        }
        other => map_children(other, flatten),
    }
}

/// Join adjacent `Static` text and drop empty ones
pub fn merge_statics(ast: Ast) -> Ast {
    match ast {
        Ast::Multi(items) => {
            let mut merged: Vec<Ast> = Vec::with_capacity(items.len());
            for item in items {
                match merge_statics(item) {
                    Ast::Static(text) if text.is_empty() => {}
                    Ast::Static(text) => match merged.last_mut() {
                        Some(Ast::Static(prev)) => prev.push_str(&text),
                        _ => merged.push(Ast::Static(text)),
                    },
                    other => merged.push(other),
                }
            }
            if merged.len() == 1 {
                merged.pop().unwrap_or_else(Ast::empty)
            } else {
                Ast::Multi(merged)
            }
        }
        other => map_children(other, merge_statics),
    }
}

/// Apply `pass` to the direct children of a control-flow node
fn map_children(ast: Ast, pass: fn(Ast) -> Ast) -> Ast {
    match ast {
        Ast::Multi(items) => Ast::Multi(items.into_iter().map(pass).collect()),
        Ast::If {
            cond,
            then,
            otherwise,
        } => Ast::If {
            cond,
            then: Box::new(pass(*then)),
            otherwise: otherwise.map(|o| Box::new(pass(*o))),
        },
        Ast::Block { header, body } => Ast::Block {
            header,
            body: Box::new(pass(*body)),
        },
        Ast::Element {
            name,
            attrs,
            content,
        } => Ast::Element {
            name,
            attrs: Box::new(pass(*attrs)),
            content: Box::new(pass(*content)),
        },
        Ast::Attr { name, value } => Ast::Attr {
            name,
            value: Box::new(pass(*value)),
        },
        leaf @ (Ast::Static(_) | Ast::Dynamic(_)) => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Cond, VarRef};
    use crate::context::ContextId;
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Ast {
        Ast::Static(text.to_string())
    }

    #[test]
    fn test_lowering_and_merging() {
        let ast = Ast::element(
            "a",
            Ast::Multi(vec![Ast::attr("href", s("/"))]),
            Ast::Multi(vec![s("x")]),
        );
        assert_eq!(optimize(ast), s(r#"<a href="/">x</a>"#));
    }

    #[test]
    fn test_void_elements_have_no_close_tag() {
        let ast = Ast::element("br", Ast::empty(), s("ignored"));
        assert_eq!(optimize(ast), s("<br>"));
    }

    #[test]
    fn test_dynamic_splits_statics() {
        let var = VarRef::new(ContextId(0), 0);
        let ast = Ast::element("p", Ast::empty(), Ast::Dynamic(var));
        assert_eq!(
            optimize(ast),
            Ast::Multi(vec![s("<p>"), Ast::Dynamic(var), s("</p>")])
        );
    }

    #[test]
    fn test_passes_reach_into_branches() {
        let var = VarRef::new(ContextId(0), 0);
        let ast = Ast::if_else(
            Cond::Falsy(var),
            Ast::Multi(vec![Ast::Multi(vec![s("a"), s("")]), s("b")]),
            None,
        );
        assert_eq!(optimize(ast), Ast::if_else(Cond::Falsy(var), s("ab"), None));
    }

    #[test]
    fn test_flatten_unwraps_singletons() {
        assert_eq!(flatten(Ast::Multi(vec![Ast::Multi(vec![s("a")])])), s("a"));
        assert_eq!(flatten(Ast::Multi(vec![])), Ast::empty());
    }
}
