//! Render values
//!
//! Positional arguments handed to a compiled renderer, one per slot.

/// A render argument
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value supplied; the template markup is kept
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    /// Markup, written verbatim
    Text(String),
    /// One positional frame per iteration of a repeated element
    List(Vec<Vec<Value>>),
}

impl Value {
    /// `Absent` and `false` are falsy; everything else, empty text included, is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Absent | Value::Bool(false))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Build a list value from per-iteration frames
    pub fn list<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        Value::List(frames.into_iter().collect())
    }

    /// Short name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent value",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}

impl FromIterator<Vec<Value>> for Value {
    fn from_iter<I: IntoIterator<Item = Vec<Value>>>(iter: I) -> Self {
        Value::list(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Absent.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::List(vec![]).is_truthy());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(None::<&str>), Value::Absent);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        let list: Value = vec![vec![Value::Int(1)], vec![]].into_iter().collect();
        assert_eq!(list, Value::List(vec![vec![Value::Int(1)], vec![]]));
    }
}
