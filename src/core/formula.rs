/// Formula templates — definition, RON loading, and composition.
///
/// A formula is an ordered list of selection slots (base-category and
/// word picks) followed by body lines that interpolate the slot values.
/// The seven builtin formulas live in `data/formulas.ron`.
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::selector::{SelectError, Selector};
use crate::core::store::TaxonomyStore;
use crate::schema::session::Session;
use crate::schema::taxonomy::CategoryKey;

#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("formula '{formula}': duplicate slot name '{slot}'")]
    DuplicateSlot { formula: String, slot: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A segment of a parsed body line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Interpolation of a filled slot: `{slot_name}`.
    SlotRef(String),
}

/// A parsed body line — a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a body line into segments.
    ///
    /// Syntax:
    /// - `{slot_name}` → `SlotRef`
    /// - `{{` / `}}` → literal braces
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, FormulaError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(literal_buf.clone()));
                    literal_buf.clear();
                }

                let start = i + 1;
                let mut end = start;
                while end < len && chars[end] != '}' {
                    if chars[end] == '{' {
                        return Err(FormulaError::TemplateParse(
                            "nested braces are not allowed".to_string(),
                        ));
                    }
                    end += 1;
                }
                if end == len {
                    return Err(FormulaError::TemplateParse("unclosed brace".to_string()));
                }

                let name: String = chars[start..end].iter().collect();
                if name.is_empty() {
                    return Err(FormulaError::TemplateParse("empty braces".to_string()));
                }
                segments.push(TemplateSegment::SlotRef(name));
                i = end + 1;
            } else if chars[i] == '}' {
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(FormulaError::TemplateParse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    /// Slot names referenced by this line, in order of appearance.
    pub fn slot_refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::SlotRef(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }
}

/// How a slot's value is selected.
///
/// Category refs in `key`/`exclude` may embed `$slot` substitutions that
/// resolve against earlier slot values at composition time: `"$theme"`
/// for the bound theme itself, or `"$theme-$contrast"` for a compound
/// category named by joining two themes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SlotSpec {
    /// Pick a fresh base category. Names in `avoid` can never become
    /// this formula's theme.
    Base {
        #[serde(default)]
        avoid: Vec<String>,
    },
    /// Pick a word satisfying all of `key` and none of `exclude`.
    Word {
        key: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

/// A named selection slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDef {
    pub name: String,
    pub spec: SlotSpec,
}

/// One formula: slots filled strictly in order, then body lines rendered
/// and joined with newlines.
#[derive(Debug, Clone)]
pub struct Formula {
    pub name: String,
    pub slots: Vec<SlotDef>,
    pub body: Vec<Template>,
}

/// The ordered stock of formulas a composer chooses from.
#[derive(Debug, Clone, Default)]
pub struct FormulaSet {
    pub formulas: Vec<Formula>,
}

// RON deserialization helpers — body lines arrive as raw strings and are
// parsed into templates on load.

#[derive(Debug, Deserialize)]
struct RonSlot {
    name: String,
    pick: SlotSpec,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Formula")]
struct RonFormula {
    name: String,
    slots: Vec<RonSlot>,
    body: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RonFormulaSet {
    formulas: Vec<RonFormula>,
}

/// The seven builtin formulas shipped with the crate.
const BUILTIN_FORMULAS: &str = include_str!("../../data/formulas.ron");

impl FormulaSet {
    /// The builtin stock of seven formulas.
    pub fn builtin() -> FormulaSet {
        // The embedded file is validated by tests; a parse failure here
        // is a build defect, not a runtime condition.
        Self::parse_ron(BUILTIN_FORMULAS).expect("builtin formulas must parse")
    }

    /// Load a formula set from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<FormulaSet, FormulaError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a formula set from a RON string.
    pub fn parse_ron(input: &str) -> Result<FormulaSet, FormulaError> {
        let raw: RonFormulaSet = ron::from_str(input)?;
        let mut formulas = Vec::with_capacity(raw.formulas.len());

        for ron_formula in raw.formulas {
            let mut slots = Vec::with_capacity(ron_formula.slots.len());
            let mut seen = std::collections::HashSet::new();
            for slot in ron_formula.slots {
                if !seen.insert(slot.name.clone()) {
                    return Err(FormulaError::DuplicateSlot {
                        formula: ron_formula.name,
                        slot: slot.name,
                    });
                }
                slots.push(SlotDef {
                    name: slot.name,
                    spec: slot.pick,
                });
            }

            let mut body = Vec::with_capacity(ron_formula.body.len());
            for line in &ron_formula.body {
                body.push(Template::parse(line)?);
            }

            formulas.push(Formula {
                name: ron_formula.name,
                slots,
                body,
            });
        }

        Ok(FormulaSet { formulas })
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("formula set is empty")]
    EmptyFormulaSet,
    #[error("no formula at index {0}")]
    UnknownFormula(usize),
    #[error("slot '{0}' referenced before it was filled")]
    UnknownSlot(String),
    #[error("category ref '{0}' contains an empty '$' substitution")]
    EmptySubstitution(String),
    #[error(transparent)]
    Select(#[from] SelectError),
}

/// Drives the selector through a formula's slots and renders the result.
///
/// Each composition gets a fresh session; a selection failure aborts the
/// run with no partial output.
pub struct Composer<'a, S: TaxonomyStore> {
    selector: Selector<'a, S>,
    formulas: &'a FormulaSet,
}

impl<'a, S: TaxonomyStore> Composer<'a, S> {
    pub fn new(store: &'a S, formulas: &'a FormulaSet) -> Self {
        Self {
            selector: Selector::new(store),
            formulas,
        }
    }

    /// Compose one formula chosen uniformly at random from the stock.
    pub fn compose(&self, rng: &mut StdRng) -> Result<String, ComposeError> {
        if self.formulas.is_empty() {
            return Err(ComposeError::EmptyFormulaSet);
        }
        let index = rng.gen_range(0..self.formulas.len());
        self.compose_formula(index, rng)
    }

    /// Compose the formula at a specific index (tests and the CLI's
    /// `--formula` override).
    pub fn compose_formula(&self, index: usize, rng: &mut StdRng) -> Result<String, ComposeError> {
        let formula = self
            .formulas
            .formulas
            .get(index)
            .ok_or(ComposeError::UnknownFormula(index))?;
        log::debug!("composing formula '{}'", formula.name);

        let mut session = Session::new();
        let mut values: HashMap<String, String> = HashMap::new();

        for slot in &formula.slots {
            let value = match &slot.spec {
                SlotSpec::Base { avoid } => {
                    for name in avoid {
                        session.mark_category(name.clone());
                    }
                    self.selector.pick_base_category(&mut session, rng)?
                }
                SlotSpec::Word { key, exclude } => {
                    let key = resolve_key(key, &values)?;
                    let exclude = if exclude.is_empty() {
                        None
                    } else {
                        Some(resolve_key(exclude, &values)?)
                    };
                    self.selector
                        .pick_word(&key, exclude.as_ref(), &mut session, rng)?
                }
            };
            values.insert(slot.name.clone(), value);
        }

        let mut lines = Vec::with_capacity(formula.body.len());
        for template in &formula.body {
            lines.push(render(template, &values)?);
        }
        Ok(lines.join("\n"))
    }
}

/// Resolve a list of category refs into a normalized key.
fn resolve_key(
    refs: &[String],
    values: &HashMap<String, String>,
) -> Result<CategoryKey, ComposeError> {
    let mut names = Vec::with_capacity(refs.len());
    for r in refs {
        names.push(resolve_ref(r, values)?);
    }
    Ok(CategoryKey::new(names))
}

/// Substitute `$slot` references in a category ref with bound values.
fn resolve_ref(raw: &str, values: &HashMap<String, String>) -> Result<String, ComposeError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
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
            return Err(ComposeError::EmptySubstitution(raw.to_string()));
        }
        let value = values
            .get(&name)
            .ok_or_else(|| ComposeError::UnknownSlot(name.clone()))?;
        out.push_str(value);
    }
    Ok(out)
}

/// Render a body line against filled slot values.
fn render(template: &Template, values: &HashMap<String, String>) -> Result<String, ComposeError> {
    let mut out = String::new();
    for segment in &template.segments {
        match segment {
            TemplateSegment::Literal(text) => out.push_str(text),
            TemplateSegment::SlotRef(name) => {
                let value = values
                    .get(name)
                    .ok_or_else(|| ComposeError::UnknownSlot(name.clone()))?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
