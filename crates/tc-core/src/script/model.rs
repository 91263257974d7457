use crate::domain::{TcError, TcResult};
use crate::tables::RbiTable;
use indexmap::IndexMap;
use serde::Serialize;

/// Guessed starting compositions from `xyzguess` directives: component name
/// to its remaining argument tokens (value, optionally bounds). Last write
/// per component wins.
pub type XyzGuesses = IndexMap<String, Vec<String>>;

/// Value stored under one scripting-file key.
///
/// The representation of a plain key depends on how many times it occurred:
/// once keeps a bare `Scalar`, a second occurrence demotes it to `Rows` and
/// later occurrences append. This is a round-trip requirement of the target
/// text format, not an accident; the external program's own reader
/// distinguishes the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptValue {
    /// Key present with no arguments. Serializes as the bare key.
    Empty,
    /// Arguments of a once-only key, joined by single spaces.
    Scalar(String),
    /// Per-occurrence values of a repeated key, in occurrence order. An empty
    /// string records an occurrence that had no arguments.
    Rows(Vec<String>),
    /// The nested `xyzguess` composition table.
    Guesses(XyzGuesses),
    /// The nested `rbi` phase-proportion table.
    Proportions(RbiTable),
}

impl ScriptValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[String]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

/// One scripting-file's worth of directives, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptModel {
    entries: IndexMap<String, ScriptValue>,
}

impl ScriptModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Sets a key outright. An existing key keeps its original position.
    pub fn set(&mut self, key: impl Into<String>, value: ScriptValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScriptValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a repeated occurrence of a plain key: a prior `Scalar` (or
    /// `Empty`) is demoted into a single-element row list first, then the new
    /// value is appended.
    pub fn append_row(&mut self, key: &str, value: String) -> TcResult<()> {
        match self.entries.get_mut(key) {
            None => {
                self.entries.insert(key.to_string(), ScriptValue::Rows(vec![value]));
            }
            Some(ScriptValue::Rows(rows)) => rows.push(value),
            Some(slot @ ScriptValue::Empty) => {
                *slot = ScriptValue::Rows(vec![String::new(), value]);
            }
            Some(slot @ ScriptValue::Scalar(_)) => {
                let ScriptValue::Scalar(first) = std::mem::replace(slot, ScriptValue::Empty) else {
                    unreachable!()
                };
                *slot = ScriptValue::Rows(vec![first, value]);
            }
            Some(ScriptValue::Guesses(_)) | Some(ScriptValue::Proportions(_)) => {
                return Err(TcError::config(
                    "CONFIG.KEY_SHAPE",
                    format!("key '{key}' holds a nested table and cannot take scalar rows"),
                ));
            }
        }
        Ok(())
    }

    /// Merges one `xyzguess` directive into the single nested composition
    /// table, creating it on first use.
    pub fn merge_guess(&mut self, component: &str, tokens: Vec<String>) {
        let guesses = self
            .entries
            .entry("xyzguess".to_string())
            .or_insert_with(|| ScriptValue::Guesses(XyzGuesses::new()));
        if let ScriptValue::Guesses(map) = guesses {
            map.insert(component.to_string(), tokens);
        } else {
            *guesses = ScriptValue::Guesses(XyzGuesses::from_iter([(
                component.to_string(),
                tokens,
            )]));
        }
    }

    pub fn guesses(&self) -> Option<&XyzGuesses> {
        match self.entries.get("xyzguess") {
            Some(ScriptValue::Guesses(map)) => Some(map),
            _ => None,
        }
    }

    pub fn rbi(&self) -> Option<&RbiTable> {
        match self.entries.get("rbi") {
            Some(ScriptValue::Proportions(table)) => Some(table),
            _ => None,
        }
    }

    pub fn rbi_mut(&mut self) -> Option<&mut RbiTable> {
        match self.entries.get_mut("rbi") {
            Some(ScriptValue::Proportions(table)) => Some(table),
            _ => None,
        }
    }
}
