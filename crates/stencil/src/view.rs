//! Declarative rendering on top of [`Document`]
//!
//! A [`View`] declares mutations and collects the matching values in
//! one pass, so callers never handle slot numbers:
//!
//! ```rust,ignore
//! let mut doc = Document::parse_fragment(TEMPLATE);
//! let html = View::new(&mut doc)
//!     .text("title", "Comments")?
//!     .replace_each(".comment", &comments, |view, comment| {
//!         view.text("h2", &comment.title)?;
//!         view.attr("a", "href", &format!("/c/{}", comment.id))?;
//!         Ok(())
//!     })?
//!     .render()?;
//! ```

use crate::document::Document;
use crate::error::Result;
use crate::mutation;
use crate::scope::ScopeId;
use crate::value::Value;
use stencil_html::{escaped_attribute, escaped_text};

pub struct View<'d> {
    doc: &'d mut Document,
    scope: ScopeId,
    values: Vec<Value>,
}

impl<'d> View<'d> {
    pub fn new(doc: &'d mut Document) -> Self {
        let scope = doc.root_scope();
        Self {
            doc,
            scope,
            values: Vec::new(),
        }
    }

    /// Scope selectors are currently resolved against
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Values collected for the current frame, indexed by slot
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    fn declare(&mut self, selector: &str, kind: &str, args: &[&str], value: Value) -> Result<&mut Self> {
        let scope = self.doc.resolve_child(self.scope, selector)?;
        let slot = self.doc.log(scope, kind, args)?;
        if self.values.len() <= slot {
            self.values.resize(slot + 1, Value::Absent);
        }
        self.values[slot] = value;
        Ok(self)
    }

    /// Replace the matched elements' content with escaped text
    pub fn text(&mut self, selector: &str, text: &str) -> Result<&mut Self> {
        self.html(selector, escaped_text(text))
    }

    /// Replace the matched elements' content with markup
    pub fn html(&mut self, selector: &str, html: impl Into<Value>) -> Result<&mut Self> {
        self.declare(selector, mutation::REPLACE_INNER_HTML, &[], html.into())
    }

    /// Append markup after the matched elements' content
    pub fn append(&mut self, selector: &str, html: impl Into<Value>) -> Result<&mut Self> {
        self.declare(selector, mutation::APPEND, &[], html.into())
    }

    pub fn attr(&mut self, selector: &str, name: &str, value: &str) -> Result<&mut Self> {
        self.declare(
            selector,
            mutation::SET_ATTRIBUTE,
            &[name],
            Value::Text(escaped_attribute(value)),
        )
    }

    pub fn remove(&mut self, selector: &str) -> Result<&mut Self> {
        self.declare(selector, mutation::REMOVE, &[], Value::Bool(true))
    }

    /// Run `f` with selectors resolved below `selector`
    pub fn within<F>(&mut self, selector: &str, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let inner = self.doc.resolve_child(self.scope, selector)?;
        let outer = std::mem::replace(&mut self.scope, inner);
        let result = f(self);
        self.scope = outer;
        result?;
        Ok(self)
    }

    /// Repeat the matched elements once per item. `f` declares the
    /// per-item mutations relative to the repeated element.
    pub fn replace_each<I, F>(&mut self, selector: &str, items: I, mut f: F) -> Result<&mut Self>
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item) -> Result<()>,
    {
        let scope = self.doc.resolve_child(self.scope, selector)?;
        let nested = self.doc.enter_nested_context(scope)?;
        let nested_root = self.doc.context_at(nested).scope();

        let outer_scope = std::mem::replace(&mut self.scope, nested_root);
        let outer_values = std::mem::take(&mut self.values);

        let mut frames = Vec::new();
        let mut result = Ok(());
        for item in items {
            if let Err(err) = f(self, item) {
                result = Err(err);
                break;
            }
            frames.push(std::mem::take(&mut self.values));
        }

        self.scope = outer_scope;
        self.values = outer_values;
        result?;

        tracing::trace!("Repeating `{}` {} time(s)", selector, frames.len());
        let slot = self.doc.log(scope, mutation::REPEAT_EACH, &[])?;
        if self.values.len() <= slot {
            self.values.resize(slot + 1, Value::Absent);
        }
        self.values[slot] = Value::List(frames);
        Ok(self)
    }

    /// Render the document with the collected values
    pub fn render(&mut self) -> Result<String> {
        self.doc.render(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_is_escaped() {
        let mut doc = Document::parse_fragment("<p>x</p>");
        let html = View::new(&mut doc).text("p", "a < b").unwrap().render().unwrap();
        assert_eq!(html, "<p>a &lt; b</p>");
    }

    #[test]
    fn test_html_is_verbatim() {
        let mut doc = Document::parse_fragment("<p>x</p>");
        let html = View::new(&mut doc).html("p", "<b>y</b>").unwrap().render().unwrap();
        assert_eq!(html, "<p><b>y</b></p>");
    }

    #[test]
    fn test_chaining() {
        let mut doc = Document::parse_fragment(r#"<div><h1>t</h1><ul><li>a</li></ul><a>go</a></div>"#);
        let html = View::new(&mut doc)
            .append("ul", "<li>b</li>")
            .unwrap()
            .attr("a", "href", "/?a=1&b=2")
            .unwrap()
            .remove("h1")
            .unwrap()
            .render()
            .unwrap();
        assert_eq!(
            html,
            r#"<div><ul><li>a</li><li>b</li></ul><a href="/?a=1&amp;b=2">go</a></div>"#
        );
    }

    #[test]
    fn test_within_narrows_selectors() {
        let mut doc = Document::parse_fragment("<header><p>h</p></header><footer><p>f</p></footer>");
        let html = View::new(&mut doc)
            .within("footer", |view| {
                view.text("p", "changed")?;
                Ok(())
            })
            .unwrap()
            .render()
            .unwrap();
        assert_eq!(html, "<header><p>h</p></header><footer><p>changed</p></footer>");
    }

    #[test]
    fn test_replace_each_restores_outer_frame() {
        let mut doc = Document::parse_fragment("<h1>t</h1><ul><li>x</li></ul>");
        let mut view = View::new(&mut doc);
        view.text("h1", "Items").unwrap();
        view.replace_each("li", ["a", "b"], |view, item| {
            view.text(":root", item)?;
            Ok(())
        })
        .unwrap();
        // The nested root is the <li> itself, so ":root" never matches inside it
        assert_eq!(view.values().len(), 2);
        assert_eq!(view.scope(), view.doc.root_scope());
    }

    #[test]
    fn test_replace_each_propagates_errors() {
        let mut doc = Document::parse_fragment("<ul><li>x</li></ul>");
        let mut view = View::new(&mut doc);
        let root = view.scope();
        let err = view.replace_each("li", [1, 2], |view, _| {
            view.text("p >", "bad")?;
            Ok(())
        });
        assert!(err.is_err());
        assert_eq!(view.scope(), root);
    }
}
