//! Word Alchemy — word-bank driven generation of pseudo-alchemical recipes.
//!
//! Loads a category/word taxonomy from a flat bank file, then fills one of
//! seven fixed formula templates with randomly chosen words that satisfy
//! category constraints, never repeating a word (per category key) or a
//! theme category within a single generation run.

pub mod core;
pub mod schema;
