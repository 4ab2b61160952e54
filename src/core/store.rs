/// Taxonomy store — the query surface the selector reads from, plus the
/// in-process implementation the loader populates.
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::schema::taxonomy::{Category, CategoryKey};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("membership references unknown category '{0}'")]
    UnknownCategory(String),
    #[error("membership references unknown word '{0}'")]
    UnknownWord(String),
}

/// Read-only query surface over the loaded taxonomy.
///
/// The selector only ever sees this trait; mutation lives on the concrete
/// store so the taxonomy cannot change mid-generation. Methods return
/// `Result` so a fallible backend can propagate its errors through the
/// selector unmodified.
pub trait TaxonomyStore {
    /// All categories flagged as base, sorted by name.
    fn base_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// All words belonging to every category in `required` and, when
    /// `excluded` is given, to none of those. Sorted by name.
    fn find_words(
        &self,
        required: &CategoryKey,
        excluded: Option<&CategoryKey>,
    ) -> Result<Vec<String>, StoreError>;

    /// Whether a word with this name has been inserted.
    fn word_exists(&self, name: &str) -> Result<bool, StoreError>;
}

/// In-memory relational store: categories, words, and the many-to-many
/// membership between them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    categories: FxHashMap<String, Category>,
    /// word name → categories it belongs to
    word_categories: FxHashMap<String, FxHashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category definition. Re-inserting a name overwrites its
    /// `is_base` flag.
    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.name.clone(), category);
    }

    /// Insert a word with no memberships yet. Idempotent.
    pub fn insert_word(&mut self, name: impl Into<String>) {
        self.word_categories.entry(name.into()).or_default();
    }

    /// Record that `word` belongs to `category`. Idempotent; both the
    /// category and the word must already exist.
    pub fn insert_membership(&mut self, category: &str, word: &str) -> Result<(), StoreError> {
        if !self.categories.contains_key(category) {
            return Err(StoreError::UnknownCategory(category.to_string()));
        }
        let members = self
            .word_categories
            .get_mut(word)
            .ok_or_else(|| StoreError::UnknownWord(word.to_string()))?;
        members.insert(category.to_string());
        Ok(())
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.categories.clear();
        self.word_categories.clear();
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn word_count(&self) -> usize {
        self.word_categories.len()
    }

    pub fn membership_count(&self) -> usize {
        self.word_categories.values().map(FxHashSet::len).sum()
    }

    /// All category names, sorted. Used by the bank linter.
    pub fn category_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.categories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Words with no category membership at all. Used by the bank linter.
    pub fn orphan_words(&self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .word_categories
            .iter()
            .filter(|(_, cats)| cats.is_empty())
            .map(|(w, _)| w.clone())
            .collect();
        orphans.sort();
        orphans
    }
}

impl TaxonomyStore for MemoryStore {
    fn base_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut bases: Vec<Category> = self
            .categories
            .values()
            .filter(|c| c.is_base)
            .cloned()
            .collect();
        // Sorted so seeded runs are reproducible.
        bases.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(bases)
    }

    fn find_words(
        &self,
        required: &CategoryKey,
        excluded: Option<&CategoryKey>,
    ) -> Result<Vec<String>, StoreError> {
        let mut matches: Vec<String> = self
            .word_categories
            .iter()
            .filter(|(_, cats)| {
                required.iter().all(|c| cats.contains(c))
                    && excluded.map_or(true, |ex| !ex.iter().any(|c| cats.contains(c)))
            })
            .map(|(word, _)| word.clone())
            .collect();
        matches.sort();
        Ok(matches)
    }

    fn word_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.word_categories.contains_key(name))
    }
}
