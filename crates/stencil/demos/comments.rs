//! Example: compile a comment template once, render it a few ways
//!
//! Run with `RUST_LOG=stencil=trace` to watch slots being allocated.

use stencil::{
    mutation, Ast, CompileError, Cond, Document, Filter, HandlerScope, HandlerTable, Tag, Value,
    VarRef, View,
};
use tracing_subscriber::EnvFilter;

const TEMPLATE: &str = r#"
<div class="comment">
  <strong>Author:</strong>
  <p>Comment</p>
</div>
"#;

/// Inner HTML replacement that falls back to the template's text when the
/// value is absent or false, written out as a custom handler
fn on_html(
    tag: &mut Tag,
    _scope: &HandlerScope<'_>,
    var: VarRef,
    _args: &[String],
) -> Result<(), CompileError> {
    tag.wrap_inner(move |content| Ast::if_else(Cond::Truthy(var), Ast::Dynamic(var), Some(content)));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("stencil v{}", stencil::VERSION);

    let mut handlers = HandlerTable::standard();
    handlers.insert("html", on_html);
    let tree = stencil::html::parse_fragment(TEMPLATE);
    let mut doc = Document::with_filter(tree, Filter::with_handlers(handlers));

    let p = doc.find(".comment p")?;
    let slot = doc.log(p, "html", &[])?;

    let mut values = vec![Value::Absent; slot + 1];
    values[slot] = Value::from("This is a <strong>lovely</strong> README");

    println!("{}", doc.compiled_ast()?);
    println!("{}", doc.render(&values)?);
    println!("{}", doc.render(&[])?);

    // The same template through the view layer, repeated per author
    let authors = [("ada", "First!"), ("grace", "Nice <3")];
    let mut doc = Document::parse_fragment(TEMPLATE);
    let html = View::new(&mut doc)
        .replace_each(".comment", authors, |view, (author, body)| {
            view.append("strong", format!(" {author}"))?.text("p", body)?;
            Ok(())
        })?
        .render()?;
    println!("{html}");

    let slots = doc.context(doc.root_context()).map_or(0, |ctx| ctx.slot_count());
    println!("{} top-level slot(s), `{}` logged once", slots, mutation::REPEAT_EACH);
    Ok(())
}
