//! Selector parser
//!
//! Hand-written recursive descent over the selector text. Supports
//! selector lists, the four combinators, compounds of type, universal,
//! id, class, attribute and structural pseudo-class selectors.

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};
use crate::SelectorError;

/// Parse a comma-separated selector list
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let mut parser = Parser::new(input);
    let mut selectors = Vec::new();

    loop {
        parser.skip_whitespace();
        selectors.push(parser.complex()?);
        parser.skip_whitespace();
        match parser.peek() {
            Some(',') => parser.bump(),
            None => break,
            Some(c) => return Err(parser.unexpected(c)),
        }
    }

    tracing::trace!("Parsed selector `{}` into {} alternatives", input, selectors.len());
    Ok(SelectorList { selectors })
}

/// Parse a single compound selector (used by `:not()`)
fn parse_compound(input: &str) -> Result<CompoundSelector, SelectorError> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    let compound = parser.compound()?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(compound),
        Some(c) => Err(parser.unexpected(c)),
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::UnexpectedToken {
            selector: self.source.to_string(),
            offset: self.pos,
            found,
        }
    }

    fn end_error(&self) -> SelectorError {
        if self.source.trim().is_empty() {
            SelectorError::Empty
        } else {
            SelectorError::DanglingCombinator {
                selector: self.source.to_string(),
            }
        }
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                None | Some(',') => break,
                Some(_) if had_space => {
                    combinators.push(Combinator::Descendant);
                    compounds.push(self.compound()?);
                    continue;
                }
                Some(c) => return Err(self.unexpected(c)),
            };
            self.bump();
            self.skip_whitespace();
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        if self.eat('*') {
            components.push(SelectorComponent::Universal);
        } else if self.peek().is_some_and(is_ident_start) {
            components.push(SelectorComponent::Type(self.ident().to_ascii_lowercase()));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    let id = self.required_ident()?;
                    components.push(SelectorComponent::Id(id));
                }
                Some('.') => {
                    self.bump();
                    let class = self.required_ident()?;
                    components.push(SelectorComponent::Class(class));
                }
                Some('[') => {
                    self.bump();
                    components.push(SelectorComponent::Attribute(self.attribute()?));
                }
                Some(':') => {
                    self.bump();
                    components.push(SelectorComponent::PseudoClass(self.pseudo_class()?));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.end_error(),
            });
        }
        Ok(CompoundSelector { components })
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn required_ident(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(c) if is_ident_char(c) => Ok(self.ident()),
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.end_error()),
        }
    }

    /// After `[`
    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.required_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let matcher: Option<fn(String) -> AttributeMatcher> = match self.peek() {
            Some(']') => None,
            Some('=') => Some(AttributeMatcher::Exact),
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                self.bump();
                if self.peek() != Some('=') {
                    return Err(match self.peek() {
                        Some(c) => self.unexpected(c),
                        None => self.end_error(),
                    });
                }
                Some(match op {
                    '~' => AttributeMatcher::Contains,
                    '|' => AttributeMatcher::DashMatch,
                    '^' => AttributeMatcher::Prefix,
                    '$' => AttributeMatcher::Suffix,
                    _ => AttributeMatcher::Substring,
                })
            }
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.end_error()),
        };

        let mut selector = AttributeSelector {
            name,
            matcher: None,
            case_insensitive: false,
        };

        if let Some(make) = matcher {
            // consume '='
            self.bump();
            self.skip_whitespace();
            let value = self.attribute_value()?;
            selector.matcher = Some(make(value));
            self.skip_whitespace();
            if matches!(self.peek(), Some('i' | 'I')) {
                self.bump();
                selector.case_insensitive = true;
                self.skip_whitespace();
            }
        }

        if !self.eat(']') {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.end_error(),
            });
        }
        Ok(selector)
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.peek() {
                        Some(c) if c == quote => {
                            self.bump();
                            return Ok(value);
                        }
                        Some(c) => {
                            value.push(c);
                            self.bump();
                        }
                        None => return Err(self.end_error()),
                    }
                }
            }
            _ => self.required_ident(),
        }
    }

    /// After `:`
    fn pseudo_class(&mut self) -> Result<PseudoClass, SelectorError> {
        if self.peek() == Some(':') {
            // Pseudo-elements select no element of a static tree
            self.bump();
            let name = self.ident();
            return Err(SelectorError::UnsupportedPseudoClass {
                selector: self.source.to_string(),
                name: format!(":{name}"),
            });
        }

        let name = self.required_ident()?.to_ascii_lowercase();
        let argument = if self.eat('(') {
            Some(self.parenthesized()?)
        } else {
            None
        };

        let invalid = |argument: &str| SelectorError::InvalidArgument {
            selector: self.source.to_string(),
            name: name.clone(),
            argument: argument.to_string(),
        };

        let pseudo = match (name.as_str(), argument.as_deref()) {
            ("root", None) => PseudoClass::Root,
            ("empty", None) => PseudoClass::Empty,
            ("first-child", None) => PseudoClass::FirstChild,
            ("last-child", None) => PseudoClass::LastChild,
            ("only-child", None) => PseudoClass::OnlyChild,
            ("first-of-type", None) => PseudoClass::FirstOfType,
            ("last-of-type", None) => PseudoClass::LastOfType,
            ("only-of-type", None) => PseudoClass::OnlyOfType,
            ("nth-child", Some(arg)) => {
                PseudoClass::NthChild(NthExpression::parse(arg).ok_or_else(|| invalid(arg))?)
            }
            ("nth-last-child", Some(arg)) => {
                PseudoClass::NthLastChild(NthExpression::parse(arg).ok_or_else(|| invalid(arg))?)
            }
            ("nth-of-type", Some(arg)) => {
                PseudoClass::NthOfType(NthExpression::parse(arg).ok_or_else(|| invalid(arg))?)
            }
            ("nth-last-of-type", Some(arg)) => {
                PseudoClass::NthLastOfType(NthExpression::parse(arg).ok_or_else(|| invalid(arg))?)
            }
            ("not", Some(arg)) => {
                let inner = parse_compound(arg).map_err(|_| invalid(arg))?;
                PseudoClass::Not(Box::new(inner))
            }
            _ => {
                return Err(SelectorError::UnsupportedPseudoClass {
                    selector: self.source.to_string(),
                    name,
                });
            }
        };
        Ok(pseudo)
    }

    /// After `(`: text up to the matching `)`
    fn parenthesized(&mut self) -> Result<String, SelectorError> {
        let mut depth = 1;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.bump();
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                }
                _ => {}
            }
            out.push(c);
        }
        Err(self.end_error())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> ComplexSelector {
        let mut list = parse_selector_list(input).unwrap();
        assert_eq!(list.selectors.len(), 1);
        list.selectors.remove(0)
    }

    #[test]
    fn test_type_and_class() {
        let sel = single("div.comment");
        assert_eq!(
            sel.compounds[0].components,
            vec![
                SelectorComponent::Type("div".into()),
                SelectorComponent::Class("comment".into()),
            ]
        );
    }

    #[test]
    fn test_combinators() {
        let sel = single(".comment  h2 > a + b ~ i");
        assert_eq!(
            sel.combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
        assert_eq!(sel.compounds.len(), 5);
    }

    #[test]
    fn test_tight_child_combinator() {
        let sel = single("ul>li");
        assert_eq!(sel.combinators, vec![Combinator::Child]);
    }

    #[test]
    fn test_selector_list() {
        let list = parse_selector_list("title, .body").unwrap();
        assert_eq!(list.selectors.len(), 2);
    }

    #[test]
    fn test_attribute_forms() {
        let sel = single(r#"a[href^="/c/"][data-x=y i][title]"#);
        let comps = &sel.compounds[0].components;
        assert_eq!(comps.len(), 4);
        assert_eq!(
            comps[1],
            SelectorComponent::Attribute(AttributeSelector {
                name: "href".into(),
                matcher: Some(AttributeMatcher::Prefix("/c/".into())),
                case_insensitive: false,
            })
        );
        assert_eq!(
            comps[2],
            SelectorComponent::Attribute(AttributeSelector {
                name: "data-x".into(),
                matcher: Some(AttributeMatcher::Exact("y".into())),
                case_insensitive: true,
            })
        );
    }

    #[test]
    fn test_pseudo_classes() {
        let sel = single("li:nth-child(2n+1):not(.hidden)");
        let comps = &sel.compounds[0].components;
        assert_eq!(
            comps[1],
            SelectorComponent::PseudoClass(PseudoClass::NthChild(NthExpression::new(2, 1)))
        );
        assert!(matches!(comps[2], SelectorComponent::PseudoClass(PseudoClass::Not(_))));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_selector_list(""), Err(SelectorError::Empty));
        assert!(matches!(
            parse_selector_list("div >"),
            Err(SelectorError::DanglingCombinator { .. })
        ));
        assert!(matches!(
            parse_selector_list("a:hover"),
            Err(SelectorError::UnsupportedPseudoClass { .. })
        ));
        assert!(matches!(
            parse_selector_list("p::before"),
            Err(SelectorError::UnsupportedPseudoClass { .. })
        ));
        assert!(matches!(
            parse_selector_list("li:nth-child(x)"),
            Err(SelectorError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_selector_list("div, , p"),
            Err(SelectorError::UnexpectedToken { found: ',', .. })
        ));
    }
}
