/// Word-bank loading — parses the two-section bank file into a store.
///
/// Format:
/// ```text
/// <category_name> <true|false>     (one per line)
/// /////
/// <category_name> <word_name>      (one per line, repeats tolerated)
/// ```
use std::path::Path;
use thiserror::Error;

use crate::core::store::{MemoryStore, StoreError, TaxonomyStore};
use crate::schema::taxonomy::Category;

/// Divider between category definitions and memberships.
const SECTION_DIVIDER: &str = "/////";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed category definition '{text}' (expected '<name> <true|false>')")]
    MalformedCategory { line: usize, text: String },
    #[error("line {line}: membership references unknown category '{name}'")]
    UnknownCategory { line: usize, name: String },
    #[error("missing '/////' divider between categories and memberships")]
    MissingDivider,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Load a word bank from a file.
///
/// Parsing builds a fresh store and returns it by value, so a mid-load
/// failure never leaves a half-populated taxonomy behind.
pub fn load_bank(path: &Path) -> Result<MemoryStore, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    parse_bank(&contents)
}

/// Parse a word bank from a string.
pub fn parse_bank(input: &str) -> Result<MemoryStore, LoadError> {
    let mut store = MemoryStore::new();
    let mut in_definitions = true;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if in_definitions {
            if line == SECTION_DIVIDER {
                in_definitions = false;
                continue;
            }
            let mut parts = line.split_whitespace();
            let name = parts.next();
            let is_base = parts.next().and_then(|f| match f {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            });
            match (name, is_base) {
                (Some(name), Some(is_base)) => {
                    store.insert_category(Category::new(name, is_base));
                }
                _ => {
                    return Err(LoadError::MalformedCategory {
                        line: line_no,
                        text: line.to_string(),
                    })
                }
            }
        } else {
            let parts: Vec<&str> = line.split_whitespace().collect();
            // Short lines are tolerated, matching the original loader.
            if parts.len() < 2 {
                continue;
            }
            let (category, word) = (parts[0], parts[1]);

            if !store.word_exists(word)? {
                store.insert_word(word);
            }
            if let Err(err) = store.insert_membership(category, word) {
                return Err(match err {
                    StoreError::UnknownCategory(name) => LoadError::UnknownCategory {
                        line: line_no,
                        name,
                    },
                    other => LoadError::Store(other),
                });
            }
        }
    }

    if in_definitions {
        return Err(LoadError::MissingDivider);
    }

    log::info!(
        "loaded word bank: {} categories, {} words, {} memberships",
        store.category_count(),
        store.word_count(),
        store.membership_count()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::taxonomy::CategoryKey;

    const SAMPLE: &str = "\
metals true
fluids true
hardened false
/////
metals gold
metals iron
hardened iron
fluids vinegar
";

    #[test]
    fn parse_well_formed_bank() {
        let store = parse_bank(SAMPLE).unwrap();
        assert_eq!(store.category_count(), 3);
        assert_eq!(store.word_count(), 3);
        assert_eq!(store.membership_count(), 4);
    }

    #[test]
    fn base_flags_respected() {
        let store = parse_bank(SAMPLE).unwrap();
        let bases = store.base_categories().unwrap();
        let names: Vec<&str> = bases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["fluids", "metals"]);
    }

    #[test]
    fn memberships_queryable() {
        let store = parse_bank(SAMPLE).unwrap();
        let metals = store
            .find_words(&CategoryKey::single("metals"), None)
            .unwrap();
        assert_eq!(metals, vec!["gold", "iron"]);
    }

    #[test]
    fn duplicate_membership_lines_idempotent() {
        let input = "metals true\n/////\nmetals gold\nmetals gold\n";
        let store = parse_bank(input).unwrap();
        assert_eq!(store.word_count(), 1);
        assert_eq!(store.membership_count(), 1);
    }

    #[test]
    fn blank_lines_and_short_membership_lines_skipped() {
        let input = "metals true\n\n/////\n\nmetals\nmetals gold\n";
        let store = parse_bank(input).unwrap();
        assert_eq!(store.word_count(), 1);
    }

    #[test]
    fn malformed_category_line_rejected() {
        let input = "metals maybe\n/////\n";
        let err = parse_bank(input).unwrap_err();
        assert!(matches!(err, LoadError::MalformedCategory { line: 1, .. }));
    }

    #[test]
    fn membership_with_unknown_category_rejected() {
        let input = "metals true\n/////\ngemstones ruby\n";
        let err = parse_bank(input).unwrap_err();
        assert!(
            matches!(err, LoadError::UnknownCategory { line: 3, ref name } if name == "gemstones")
        );
    }

    #[test]
    fn missing_divider_rejected() {
        let input = "metals true\nfluids true\n";
        let err = parse_bank(input).unwrap_err();
        assert!(matches!(err, LoadError::MissingDivider));
    }
}
