/// Taxonomy schema — categories and the normalized category-key type.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A word category. Base categories are eligible to seed a formula's
/// theme; the rest describe modifiers or processes applied to the theme.
///
/// Categories are unique by name and immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub is_base: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, is_base: bool) -> Self {
        Self {
            name: name.into(),
            is_base,
        }
    }
}

/// An unordered set of category names used as a word-selection constraint.
///
/// Two keys are equal iff they contain the same names, regardless of the
/// order they were given in: the key is stored sorted and deduplicated, so
/// derived `Eq`/`Hash` give order-independent map semantics. The original
/// bot keyed its used-word tracking on raw tuples, which made
/// `("A","B")` and `("B","A")` distinct; that was an artifact, not a
/// feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryKey(Vec<String>);

impl CategoryKey {
    /// Build a key from any collection of category names. Names are
    /// sorted and deduplicated.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        CategoryKey(names)
    }

    /// Key over a single category name.
    pub fn single(name: impl Into<String>) -> Self {
        CategoryKey(vec![name.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(key: &CategoryKey) -> u64 {
        let mut h = DefaultHasher::new();
        key.hash(&mut h);
        h.finish()
    }

    #[test]
    fn key_order_independent() {
        let ab = CategoryKey::new(["alpha", "beta"]);
        let ba = CategoryKey::new(["beta", "alpha"]);
        assert_eq!(ab, ba);
        assert_eq!(hash_of(&ab), hash_of(&ba));
    }

    #[test]
    fn key_deduplicates() {
        let key = CategoryKey::new(["metals", "metals", "hardened"]);
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn key_contains() {
        let key = CategoryKey::new(["metals", "hardened"]);
        assert!(key.contains("metals"));
        assert!(key.contains("hardened"));
        assert!(!key.contains("fluids"));
    }

    #[test]
    fn key_display_joins_sorted() {
        let key = CategoryKey::new(["metals", "hardened"]);
        assert_eq!(key.to_string(), "hardened+metals");
    }

    #[test]
    fn single_key() {
        let key = CategoryKey::single("dissolution");
        assert_eq!(key.len(), 1);
        assert!(key.contains("dissolution"));
    }
}
