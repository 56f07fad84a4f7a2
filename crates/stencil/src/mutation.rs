//! Mutation kinds and log entries
//!
//! Kinds are open strings; these are the ones the standard handler
//! table understands.

use crate::context::Slot;
use std::fmt;

/// Replace an element's children with the slot value when present
pub const REPLACE_INNER_HTML: &str = "replace-inner-html";
/// Append the slot value after an element's children
pub const APPEND: &str = "append";
/// Override one attribute (argument: attribute name)
pub const SET_ATTRIBUTE: &str = "set-attribute";
/// Drop the element when the slot value is truthy
pub const REMOVE: &str = "remove";
/// Emit the element once per item of the slot value
pub const REPEAT_EACH: &str = "repeat-each";

/// `(kind, args)`: what a scope's log is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutationKey {
    pub kind: String,
    pub args: Vec<String>,
}

impl MutationKey {
    pub fn new(kind: &str, args: &[&str]) -> Self {
        Self {
            kind: kind.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for MutationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// A logged mutation and the slot it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMutation {
    pub key: MutationKey,
    pub slot: Slot,
}
