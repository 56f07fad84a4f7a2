//! Selector data model
//!
//! Compound selectors joined by combinators, grouped into lists.
//! Only structural pseudo-classes are supported: templates are static
//! markup, so user-action and form states never apply.

use std::fmt;

/// Comma-separated selector list; an element matches if any entry does
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, in source order.
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// The rightmost compound, the one the matched element must satisfy
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.compounds.last()
    }
}

/// Sequence of simple selectors with no combinator, e.g. `a.nav[href]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

/// Relationship between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// One simple selector inside a compound
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// `*`
    Universal,
    /// `div`, compared case-insensitively
    Type(String),
    /// `#main`
    Id(String),
    /// `.comment`
    Class(String),
    /// `[href]`, `[href^="/c/"]`, ...
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
}

/// Pseudo-classes that depend only on tree shape
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    /// Top-level element of the template
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Not(Box<CompoundSelector>),
}

/// `An+B` argument of the `:nth-*` family; positions are 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    pub a: i32,
    pub b: i32,
}

impl NthExpression {
    pub const ODD: Self = Self::new(2, 1);
    pub const EVEN: Self = Self::new(2, 0);

    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Accepts `odd`, `even`, a bare integer or `An+B` with optional
    /// signs and inner whitespace
    pub fn parse(arg: &str) -> Option<Self> {
        let compact: String = arg
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if compact == "odd" {
            return Some(Self::ODD);
        }
        if compact == "even" {
            return Some(Self::EVEN);
        }

        let Some((step, offset)) = compact.split_once('n') else {
            return compact.parse().ok().map(|b| Self::new(0, b));
        };
        let a = match step {
            "" | "+" => 1,
            "-" => -1,
            digits => digits.parse().ok()?,
        };
        let b = match offset {
            "" => 0,
            _ if offset.starts_with('+') => offset[1..].parse().ok()?,
            _ if offset.starts_with('-') => offset.parse().ok()?,
            _ => return None,
        };
        Some(Self::new(a, b))
    }

    /// Is there an `n >= 0` with `a*n + b == position`?
    pub fn matches(&self, position: i32) -> bool {
        // Widened so extreme coefficients cannot overflow
        let offset = i64::from(position) - i64::from(self.b);
        match i64::from(self.a) {
            0 => offset == 0,
            a => offset % a == 0 && offset / a >= 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    /// `None` tests presence only
    pub matcher: Option<AttributeMatcher>,
    /// Trailing ` i` flag
    pub case_insensitive: bool,
}

/// Value test of an attribute selector, by operator
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// `=`
    Exact(String),
    /// `~=`, one of the whitespace-separated words
    Contains(String),
    /// `|=`, the value or the value followed by `-`
    DashMatch(String),
    /// `^=`
    Prefix(String),
    /// `$=`
    Suffix(String),
    /// `*=`
    Substring(String),
}

impl AttributeMatcher {
    fn operand(&self) -> &str {
        match self {
            Self::Exact(v)
            | Self::Contains(v)
            | Self::DashMatch(v)
            | Self::Prefix(v)
            | Self::Suffix(v)
            | Self::Substring(v) => v,
        }
    }

    fn test(&self, actual: &str, operand: &str) -> bool {
        match self {
            Self::Exact(_) => actual == operand,
            Self::Contains(_) => actual.split_ascii_whitespace().any(|word| word == operand),
            Self::DashMatch(_) => actual
                .strip_prefix(operand)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
            // The substring family never matches an empty operand
            Self::Prefix(_) => !operand.is_empty() && actual.starts_with(operand),
            Self::Suffix(_) => !operand.is_empty() && actual.ends_with(operand),
            Self::Substring(_) => !operand.is_empty() && actual.contains(operand),
        }
    }
}

impl AttributeSelector {
    /// Test the element's value for this attribute (`None` when missing)
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (&self.matcher, value) {
            (None, value) => value.is_some(),
            (Some(_), None) => false,
            (Some(matcher), Some(actual)) if self.case_insensitive => matcher.test(
                &actual.to_lowercase(),
                &matcher.operand().to_lowercase(),
            ),
            (Some(matcher), Some(actual)) => matcher.test(actual, matcher.operand()),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::NextSibling => " + ",
            Self::SubsequentSibling => " ~ ",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, matcher: Option<AttributeMatcher>) -> AttributeSelector {
        AttributeSelector {
            name: name.to_string(),
            matcher,
            case_insensitive: false,
        }
    }

    #[test]
    fn test_nth_keywords() {
        let rows: Vec<i32> = (1..=6).filter(|&i| NthExpression::ODD.matches(i)).collect();
        assert_eq!(rows, vec![1, 3, 5]);
        let rows: Vec<i32> = (1..=6).filter(|&i| NthExpression::EVEN.matches(i)).collect();
        assert_eq!(rows, vec![2, 4, 6]);
    }

    #[test]
    fn test_nth_parse_forms() {
        let cases = [
            ("odd", Some(NthExpression::ODD)),
            (" EVEN ", Some(NthExpression::EVEN)),
            ("4", Some(NthExpression::new(0, 4))),
            ("n", Some(NthExpression::new(1, 0))),
            ("3n", Some(NthExpression::new(3, 0))),
            ("3n + 2", Some(NthExpression::new(3, 2))),
            ("-n+2", Some(NthExpression::new(-1, 2))),
            ("2n-1", Some(NthExpression::new(2, -1))),
            ("2n1", None),
            ("first", None),
        ];
        for (input, expected) in cases {
            assert_eq!(NthExpression::parse(input), expected, "{input}");
        }
    }

    #[test]
    fn test_nth_first_few() {
        // -n+2: the first two comments only
        let expr = NthExpression::new(-1, 2);
        let rows: Vec<i32> = (1..=5).filter(|&i| expr.matches(i)).collect();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn test_nth_extreme_coefficients() {
        let cases = [
            ("n-2147483648", 1, true),
            ("-n+2147483647", 2147483647, true),
            ("-2147483648n+2147483647", 1, false),
            ("2147483647n-2147483648", 2147483646, true),
            ("-1n-2147483648", 1, false),
        ];
        for (input, position, expected) in cases {
            let expr = NthExpression::parse(input).unwrap();
            assert_eq!(expr.matches(position), expected, "{input} at {position}");
        }
    }

    #[test]
    fn test_nth_exact_position() {
        let expr = NthExpression::new(0, 3);
        assert!(expr.matches(3));
        assert!(!expr.matches(6));
    }

    #[test]
    fn test_attribute_presence() {
        let sel = attr("href", None);
        assert!(sel.matches(Some("")));
        assert!(!sel.matches(None));
    }

    #[test]
    fn test_attribute_operators() {
        let link = "/c/42";
        assert!(attr("href", Some(AttributeMatcher::Exact("/c/42".into()))).matches(Some(link)));
        assert!(attr("href", Some(AttributeMatcher::Prefix("/c/".into()))).matches(Some(link)));
        assert!(attr("href", Some(AttributeMatcher::Suffix("42".into()))).matches(Some(link)));
        assert!(attr("href", Some(AttributeMatcher::Substring("c/4".into()))).matches(Some(link)));
        assert!(!attr("href", Some(AttributeMatcher::Prefix("".into()))).matches(Some(link)));

        let class = "comment featured";
        assert!(attr("class", Some(AttributeMatcher::Contains("featured".into()))).matches(Some(class)));
        assert!(!attr("class", Some(AttributeMatcher::Contains("feat".into()))).matches(Some(class)));
    }

    #[test]
    fn test_attribute_dash_match() {
        let sel = attr("lang", Some(AttributeMatcher::DashMatch("pt".into())));
        assert!(sel.matches(Some("pt")));
        assert!(sel.matches(Some("pt-BR")));
        assert!(!sel.matches(Some("ptx")));
    }

    #[test]
    fn test_attribute_case_flag() {
        let mut sel = attr("type", Some(AttributeMatcher::Exact("Submit".into())));
        assert!(!sel.matches(Some("submit")));
        sel.case_insensitive = true;
        assert!(sel.matches(Some("SUBMIT")));
    }
}
