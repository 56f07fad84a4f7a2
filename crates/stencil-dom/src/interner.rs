//! Name interning
//!
//! Tag names ("div", "span", "p") and attribute names ("class", "id",
//! "href") repeat constantly in templates; each is stored once and
//! referenced by a 4-byte id.

use std::collections::HashMap;

/// Handle to a string owned by a [`StringInterner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Always the empty string
    pub const EMPTY: InternedString = InternedString(0);
}

/// Append-only string table; handles stay valid for its lifetime
#[derive(Debug)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    map: HashMap<Box<str>, u32>,
}

impl StringInterner {
    /// Seeded with the element and attribute names templates use most
    pub fn new() -> Self {
        let mut interner = Self {
            strings: Vec::with_capacity(128),
            map: HashMap::with_capacity(128),
        };

        // Index 0 is always the empty string
        interner.intern("");

        const COMMON_NAMES: &[&str] = &[
            "html", "head", "body", "title", "div", "span", "p", "a", "img",
            "ul", "ol", "li", "table", "tr", "td", "th", "h1", "h2", "h3",
            "section", "article", "header", "footer", "nav", "main",
            "script", "style", "link", "meta", "br", "hr",
            "id", "class", "href", "src", "alt", "type", "name", "value",
        ];
        for name in COMMON_NAMES {
            interner.intern(name);
        }

        interner
    }

    /// Handle for `s`, adding it on first sight
    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(&idx) = self.map.get(s) {
            return InternedString(idx);
        }

        let idx = self.strings.len() as u32;
        self.strings.push(s.into());
        self.map.insert(s.into(), idx);
        InternedString(idx)
    }

    /// Look up a string without interning it
    pub fn lookup(&self, s: &str) -> Option<InternedString> {
        self.map.get(s).map(|&idx| InternedString(idx))
    }

    /// Unknown handles resolve to the empty string
    #[inline]
    pub fn get(&self, id: InternedString) -> &str {
        self.strings.get(id.0 as usize).map(|s| &**s).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = StringInterner::new();
        let id1 = interner.intern("comment");
        let id2 = interner.intern("comment");
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_get_string() {
        let mut interner = StringInterner::new();
        let id = interner.intern("data-id");
        assert_eq!(interner.get(id), "data-id");
        assert_eq!(interner.get(InternedString::EMPTY), "");
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let interner = StringInterner::new();
        let before = interner.len();
        assert!(interner.lookup("never-seen").is_none());
        assert_eq!(interner.lookup("div").map(|id| interner.get(id)), Some("div"));
        assert_eq!(interner.len(), before);
    }
}
