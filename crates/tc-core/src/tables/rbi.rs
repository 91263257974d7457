use super::table::{ProportionSchema, Table};
use crate::domain::TcResult;
use indexmap::IndexMap;
use serde::Serialize;

/// Phase-proportion table: one row per phase, a leading `mode` column, then
/// one column per oxide. Named after its on-disk directive key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RbiTable {
    table: Table<ProportionSchema>,
}

impl RbiTable {
    /// Creates an empty table whose oxide columns come from the first `rbi`
    /// directive's argument tokens.
    pub fn new<I, T>(oxides: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            table: Table::new(oxides),
        }
    }

    /// The oxide column names, a view of the table header.
    pub fn oxides(&self) -> &[String] {
        self.table.header()
    }

    /// Appends a data row from a tokenised `rbi` line: phase, mode, oxides.
    pub fn add_row(&mut self, tokens: &[&str]) -> TcResult<()> {
        self.table.add_row(tokens)
    }

    pub fn add_phase(&mut self, phase: &str, mode: &str, oxides: &[&str]) -> TcResult<()> {
        let mut tokens = Vec::with_capacity(oxides.len() + 2);
        tokens.push(phase.trim());
        tokens.push(mode);
        tokens.extend_from_slice(oxides);
        self.table.add_row(&tokens)
    }

    pub fn phase(&self, name: &str) -> Option<&IndexMap<String, String>> {
        self.table.row(name)
    }

    pub fn phase_mut(&mut self, name: &str) -> Option<&mut IndexMap<String, String>> {
        self.table.row_mut(name)
    }

    pub fn phases(&self) -> impl Iterator<Item = (&String, &IndexMap<String, String>)> {
        self.table.rows()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Deep copy: the new table owns its own row data, so mutating the copy
    /// never shows through to the source.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Plain aligned rendering without the directive prefix.
    pub fn to_text(&self) -> String {
        self.table.to_text()
    }

    /// Script rendering: every line carries the `rbi` directive key, so the
    /// output is valid scripting-file input.
    pub fn to_script_text(&self) -> String {
        self.table.to_prefixed_text("rbi")
    }
}
