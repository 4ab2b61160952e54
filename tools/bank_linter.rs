/// Bank Linter — validates a word bank against a formula set.
///
/// Usage: bank_linter <bank_file> [--formulas <path>]
use std::collections::HashSet;
use std::path::Path;
use std::process;

use word_alchemy::core::formula::{FormulaSet, SlotSpec};
use word_alchemy::core::loader;
use word_alchemy::core::store::{MemoryStore, TaxonomyStore};
use word_alchemy::schema::taxonomy::CategoryKey;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: bank_linter <bank_file> [--formulas <path>]");
        process::exit(0);
    }

    let bank_path = &args[1];
    let mut formulas_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--formulas" && i + 1 < args.len() {
            i += 1;
            formulas_path = Some(args[i].clone());
        }
        i += 1;
    }

    let store = match loader::load_bank(Path::new(bank_path)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("ERROR: Failed to load word bank: {}", e);
            process::exit(1);
        }
    };
    println!(
        "Loaded {} categories, {} words, {} memberships",
        store.category_count(),
        store.word_count(),
        store.membership_count()
    );

    let formulas = match formulas_path {
        Some(ref path) => match FormulaSet::load_from_ron(Path::new(path)) {
            Ok(set) => set,
            Err(e) => {
                eprintln!("ERROR: Failed to load formulas: {}", e);
                process::exit(1);
            }
        },
        None => FormulaSet::builtin(),
    };
    println!("Loaded {} formulas", formulas.len());

    let (errors, warnings) = lint(&store, &formulas);

    println!("\n=== Bank Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }
    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint(store: &MemoryStore, formulas: &FormulaSet) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let categories: HashSet<String> = store.category_names().into_iter().collect();
    let base_count = store
        .base_categories()
        .map(|b| b.len())
        .unwrap_or_default();

    // Empty categories and orphan words are legal but suspicious.
    for name in store.category_names() {
        let words = store
            .find_words(&CategoryKey::single(&name), None)
            .unwrap_or_default();
        if words.is_empty() {
            warnings.push(format!("category '{}' has no words", name));
        }
    }
    for word in store.orphan_words() {
        warnings.push(format!("word '{}' belongs to no category", word));
    }

    for formula in &formulas.formulas {
        let mut base_slots: HashSet<&str> = HashSet::new();
        let mut defined: HashSet<&str> = HashSet::new();
        let mut base_picks = 0usize;

        for slot in &formula.slots {
            match &slot.spec {
                SlotSpec::Base { avoid } => {
                    base_picks += 1;
                    base_slots.insert(slot.name.as_str());
                    for name in avoid {
                        if !categories.contains(name) {
                            warnings.push(format!(
                                "formula '{}': avoided category '{}' is not in the bank",
                                formula.name, name
                            ));
                        }
                    }
                }
                SlotSpec::Word { key, exclude } => {
                    for r in key.iter().chain(exclude.iter()) {
                        check_category_ref(
                            formula.name.as_str(),
                            r,
                            &categories,
                            &base_slots,
                            &mut errors,
                        );
                    }
                }
            }
            defined.insert(slot.name.as_str());
        }

        if base_picks > base_count {
            errors.push(format!(
                "formula '{}' needs {} distinct base categories but the bank defines {}",
                formula.name, base_picks, base_count
            ));
        }

        for template in &formula.body {
            for name in template.slot_refs() {
                if !defined.contains(name) {
                    errors.push(format!(
                        "formula '{}': body references undefined slot '{}'",
                        formula.name, name
                    ));
                }
            }
        }
    }

    (errors, warnings)
}

/// A literal ref must name a bank category; a `$slot` ref must name an
/// earlier base slot. Compound refs are only checked for slot validity
/// since their final name depends on the run.
fn check_category_ref(
    formula: &str,
    raw: &str,
    categories: &HashSet<String>,
    base_slots: &HashSet<&str>,
    errors: &mut Vec<String>,
) {
    if !raw.contains('$') {
        if !categories.contains(raw) {
            errors.push(format!(
                "formula '{}': category '{}' is not in the bank",
                formula, raw
            ));
        }
        return;
    }

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            continue;
        }
        let mut name = String::new();
        while let Some(&n) = chars.peek() {
            if n.is_alphanumeric() || n == '_' {
                name.push(n);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            errors.push(format!(
                "formula '{}': category ref '{}' has an empty '$' substitution",
                formula, raw
            ));
        } else if !base_slots.contains(name.as_str()) {
            errors.push(format!(
                "formula '{}': category ref '{}' uses '${}' which is not an earlier base slot",
                formula, raw, name
            ));
        }
    }
}
