/// Selection session state — what has already been used in one run.
use rustc_hash::{FxHashMap, FxHashSet};

use super::taxonomy::CategoryKey;

/// Transient state scoped to one formula-generation run.
///
/// Tracks which base categories have served as a theme and which words
/// have been returned for each exact category key, so a formula never
/// repeats itself. Discarded when the run ends; nothing here is ever
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    used_categories: FxHashSet<String>,
    used_words: FxHashMap<CategoryKey, FxHashSet<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `name` has already been chosen as a base category.
    pub fn category_used(&self, name: &str) -> bool {
        self.used_categories.contains(name)
    }

    /// Record a base category as used.
    pub fn mark_category(&mut self, name: impl Into<String>) {
        self.used_categories.insert(name.into());
    }

    /// Words already returned for `key`, if any have been.
    pub fn words_used_for(&self, key: &CategoryKey) -> Option<&FxHashSet<String>> {
        self.used_words.get(key)
    }

    /// Record a word as used under `key`.
    pub fn mark_word(&mut self, key: CategoryKey, word: impl Into<String>) {
        self.used_words.entry(key).or_default().insert(word.into());
    }
}
