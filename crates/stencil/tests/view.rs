//! View tests - page-level declarations through the convenience layer

use pretty_assertions::assert_eq;
use stencil::{Document, View};

const SIMPLE: &str = r#"
    <html>
      <head>
        <title></title>
      </head>
      <body>
        <h1></h1>
        <p class="body"></p>
        <div class="comment">
          <h2></h2>
          <p></p>
          <a>View more</a>
        </div>
      </body>
    </html>
"#;

struct Comment {
    id: u32,
    title: &'static str,
    summary: &'static str,
}

const COMMENTS: [Comment; 2] = [
    Comment {
        id: 1,
        title: "Hello",
        summary: "First comment",
    },
    Comment {
        id: 2,
        title: "World",
        summary: "Second comment",
    },
];

fn assert_html(actual: &str, expected: &str) {
    let canonical = |html: &str| stencil_html::serialize(&stencil_html::parse(html));
    assert_eq!(canonical(actual), canonical(expected));
}

#[test]
fn test_just_render() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc).render().unwrap();
    assert_html(&html, SIMPLE);
}

#[test]
fn test_text_over_selector_list() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc)
        .text("title, .body", "Hello World")
        .unwrap()
        .render()
        .unwrap();

    assert_html(
        &html,
        r#"
        <html>
          <head><title>Hello World</title></head>
          <body>
            <h1></h1>
            <p class="body">Hello World</p>
            <div class="comment"><h2></h2><p></p><a>View more</a></div>
          </body>
        </html>
        "#,
    );
}

#[test]
fn test_nested_selector() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc)
        .text("title", "Hello World")
        .unwrap()
        .text(".comment h2", "Nice")
        .unwrap()
        .render()
        .unwrap();

    assert_html(
        &html,
        r#"
        <html>
          <head><title>Hello World</title></head>
          <body>
            <h1></h1>
            <p class="body"></p>
            <div class="comment"><h2>Nice</h2><p></p><a>View more</a></div>
          </body>
        </html>
        "#,
    );
}

#[test]
fn test_replace_each() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc)
        .text("title", "Hello World")
        .unwrap()
        .replace_each(".comment", &COMMENTS, |view, comment| {
            view.text("h2", comment.title)?
                .text("p", comment.summary)?
                .attr("a", "href", &format!("/c/{}", comment.id))?;
            Ok(())
        })
        .unwrap()
        .render()
        .unwrap();

    assert_html(
        &html,
        r#"
        <html>
          <head><title>Hello World</title></head>
          <body>
            <h1></h1>
            <p class="body"></p>
            <div class="comment">
              <h2>Hello</h2>
              <p>First comment</p>
              <a href="/c/1">View more</a>
            </div>
            <div class="comment">
              <h2>World</h2>
              <p>Second comment</p>
              <a href="/c/2">View more</a>
            </div>
          </body>
        </html>
        "#,
    );
}

#[test]
fn test_replace_each_title_only() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc)
        .replace_each(".comment", &COMMENTS, |view, comment| {
            view.text("h2", comment.title)?;
            Ok(())
        })
        .unwrap()
        .render()
        .unwrap();

    assert_html(
        &html,
        r#"
        <html>
          <head><title></title></head>
          <body>
            <h1></h1>
            <p class="body"></p>
            <div class="comment"><h2>Hello</h2><p></p><a>View more</a></div>
            <div class="comment"><h2>World</h2><p></p><a>View more</a></div>
          </body>
        </html>
        "#,
    );
}

#[test]
fn test_replace_each_with_no_items() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc)
        .replace_each(".comment", std::iter::empty::<&Comment>(), |view, comment| {
            view.text("h2", comment.title)?;
            Ok(())
        })
        .unwrap()
        .render()
        .unwrap();

    assert_html(
        &html,
        r#"<html><head><title></title></head><body><h1></h1><p class="body"></p></body></html>"#,
    );
}

#[test]
fn test_attr_replace() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc)
        .attr(".body", "class", "head")
        .unwrap()
        .render()
        .unwrap();

    assert_html(
        &html,
        r#"
        <html>
          <head><title></title></head>
          <body>
            <h1></h1>
            <p class="head"></p>
            <div class="comment"><h2></h2><p></p><a>View more</a></div>
          </body>
        </html>
        "#,
    );
}

#[test]
fn test_remove() {
    let mut doc = Document::parse(SIMPLE);
    let html = View::new(&mut doc).remove(".comment").unwrap().render().unwrap();

    assert_html(
        &html,
        r#"<html><head><title></title></head><body><h1></h1><p class="body"></p></body></html>"#,
    );
}

#[test]
fn test_views_share_the_compiled_template() {
    let mut doc = Document::parse(SIMPLE);
    let first = View::new(&mut doc).text("h1", "one").unwrap().render().unwrap();
    assert!(!doc.is_dirty());

    // Same declarations, different values: no recompile needed
    let mut view = View::new(&mut doc);
    view.text("h1", "two").unwrap();
    assert_eq!(view.values().len(), 1);
    let second = view.render().unwrap();
    assert!(!doc.is_dirty());

    assert!(first.contains("<h1>one</h1>"));
    assert!(second.contains("<h1>two</h1>"));
}
