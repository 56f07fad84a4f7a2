//! stencil CSS selectors
//!
//! Parses the CSS selector subset templates are addressed with and
//! searches `stencil-dom` trees for matching elements.

mod parser;
mod query;
mod selectors;

pub use parser::parse_selector_list;
pub use query::ElementQuery;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};

/// Parse a selector list such as `title, .comment > h2`
pub fn parse(selector: &str) -> Result<SelectorList, SelectorError> {
    parse_selector_list(selector)
}

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected `{found}` at offset {offset} in selector `{selector}`")]
    UnexpectedToken {
        selector: String,
        offset: usize,
        found: char,
    },

    #[error("unsupported pseudo-class `:{name}` in selector `{selector}`")]
    UnsupportedPseudoClass { selector: String, name: String },

    #[error("invalid argument `{argument}` for `:{name}` in selector `{selector}`")]
    InvalidArgument {
        selector: String,
        name: String,
        argument: String,
    },

    #[error("selector `{selector}` ends with a dangling combinator")]
    DanglingCombinator { selector: String },
}
