use crate::domain::{TcError, TcResult};
use indexmap::IndexMap;
use serde::Serialize;
use std::marker::PhantomData;

/// Row-building strategy for one table schema.
///
/// The table layout (ordered header, named rows, aligned rendering) is shared;
/// only the rule for turning a tokenised data line into a row differs between
/// the thermodynamic-property and phase-proportion schemas.
pub trait RowSchema {
    /// Blank cells prepended to the header row when rendering, so data rows
    /// and the header line up column for column.
    const LEADING_CELLS: usize;

    fn build_row(header: &[String], tokens: &[&str]) -> TcResult<(String, IndexMap<String, String>)>;
}

/// Thermodynamic-property rows: leading phase name, then exactly one value
/// per header column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertySchema;

impl RowSchema for PropertySchema {
    const LEADING_CELLS: usize = 1;

    fn build_row(header: &[String], tokens: &[&str]) -> TcResult<(String, IndexMap<String, String>)> {
        if tokens.len() != header.len() + 1 {
            return Err(TcError::output_parse(
                "PARSE.PROPERTY_ROW",
                format!(
                    "expected property count ({}) is different from that encountered ({}) for phase '{}'",
                    header.len(),
                    tokens.len().saturating_sub(1),
                    tokens.first().copied().unwrap_or("?"),
                ),
            ));
        }
        let mut row = IndexMap::with_capacity(header.len());
        for (column, value) in header.iter().zip(&tokens[1..]) {
            row.insert(column.clone(), (*value).to_string());
        }
        Ok((tokens[0].to_string(), row))
    }
}

/// Phase-proportion rows: leading phase name, then the phase mode, then one
/// value per oxide column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProportionSchema;

impl RowSchema for ProportionSchema {
    const LEADING_CELLS: usize = 2;

    fn build_row(header: &[String], tokens: &[&str]) -> TcResult<(String, IndexMap<String, String>)> {
        let oxide_count = tokens.len().saturating_sub(2);
        if tokens.len() < 2 || oxide_count != header.len() {
            return Err(TcError::output_parse(
                "PARSE.RBI_ROW",
                format!(
                    "expected oxide count ({}) is different from that encountered ({}) for phase '{}'",
                    header.len(),
                    oxide_count,
                    tokens.first().copied().unwrap_or("?"),
                ),
            ));
        }
        let mut row = IndexMap::with_capacity(header.len() + 1);
        row.insert("mode".to_string(), tokens[1].to_string());
        for (column, value) in header.iter().zip(&tokens[2..]) {
            row.insert(column.clone(), (*value).to_string());
        }
        Ok((tokens[0].to_string(), row))
    }
}

/// Named rows over a fixed column header, in row-arrival order.
///
/// Rendering reproduces a layout the external program's own reader accepts,
/// so a serialized table can be fed straight back as script input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table<S: RowSchema> {
    header: Vec<String>,
    rows: IndexMap<String, IndexMap<String, String>>,
    #[serde(skip)]
    _schema: PhantomData<S>,
}

impl<S: RowSchema> Table<S> {
    pub fn new<I, T>(header: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            header: header
                .into_iter()
                .map(|item| item.as_ref().trim().to_string())
                .collect(),
            rows: IndexMap::new(),
            _schema: PhantomData,
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Single mutation entry point; the row-building rule is schema-specific.
    pub fn add_row(&mut self, tokens: &[&str]) -> TcResult<()> {
        let (key, row) = S::build_row(&self.header, tokens)?;
        self.rows.insert(key, row);
        Ok(())
    }

    pub fn row(&self, key: &str) -> Option<&IndexMap<String, String>> {
        self.rows.get(key)
    }

    pub fn row_mut(&mut self, key: &str) -> Option<&mut IndexMap<String, String>> {
        self.rows.get_mut(key)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&String, &IndexMap<String, String>)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn render_cells(&self) -> Vec<Vec<String>> {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        let mut header_line = vec![String::new(); S::LEADING_CELLS];
        header_line.extend(self.header.iter().cloned());
        lines.push(header_line);
        for (key, row) in &self.rows {
            let mut line = Vec::with_capacity(row.len() + 1);
            line.push(key.clone());
            line.extend(row.values().cloned());
            lines.push(line);
        }
        lines
    }

    /// Column-aligned plain-text rendering, stable across runs because the
    /// ordered substrate fixes both row and column order.
    pub fn to_text(&self) -> String {
        render_aligned(&self.render_cells(), &[])
    }

    pub(crate) fn to_prefixed_text(&self, prefix: &str) -> String {
        render_aligned(&self.render_cells(), &[prefix.to_string()])
    }
}

/// Aligns a cell grid into columns separated by two spaces, with optional
/// fixed leading cells prepended to every line.
pub(crate) fn render_aligned(lines: &[Vec<String>], lead: &[String]) -> String {
    let mut widths: Vec<usize> = Vec::new();
    for line in lines {
        for (index, cell) in line.iter().enumerate() {
            if index >= widths.len() {
                widths.push(0);
            }
            widths[index] = widths[index].max(cell.len());
        }
    }

    let mut text = String::new();
    for line in lines {
        let mut rendered = String::new();
        for cell in lead {
            rendered.push_str(cell);
            rendered.push_str("  ");
        }
        for (index, cell) in line.iter().enumerate() {
            if index > 0 {
                rendered.push_str("  ");
            }
            rendered.push_str(&format!("{:<width$}", cell, width = widths[index]));
        }
        text.push_str(rendered.trim_end());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::{PropertySchema, Table};

    #[test]
    fn property_rows_zip_against_header() {
        let mut table: Table<PropertySchema> = Table::new([" mode ", "G", "H"]);
        table
            .add_row(&["g", "0.1", "-6.2", "1.3"])
            .expect("row matching header should be accepted");

        assert_eq!(table.header(), ["mode", "G", "H"]);
        let row = table.row("g").expect("row 'g' should exist");
        assert_eq!(row.get("G").map(String::as_str), Some("-6.2"));
    }

    #[test]
    fn property_count_mismatch_names_expected_and_actual() {
        let mut table: Table<PropertySchema> = Table::new(["a", "b", "c", "d", "e"]);
        let error = table
            .add_row(&["g", "1", "2", "3", "4"])
            .expect_err("short row should be rejected");

        assert_eq!(error.code(), "PARSE.PROPERTY_ROW");
        assert!(error.message().contains("(5)"), "message: {error}");
        assert!(error.message().contains("(4)"), "message: {error}");
        assert!(error.message().contains("'g'"), "message: {error}");
    }

    #[test]
    fn rendering_is_reingestible_and_column_aligned() {
        let mut table: Table<PropertySchema> = Table::new(["G", "H"]);
        table.add_row(&["liq", "1.5", "2"]).expect("row should be accepted");
        table.add_row(&["g", "-10.25", "0.125"]).expect("row should be accepted");

        let text = table.to_text();
        let mut lines = text.lines();
        assert_eq!(lines.next().map(str::split_whitespace).map(Iterator::count), Some(2));
        let row_tokens: Vec<&str> = lines.next().expect("data row").split_whitespace().collect();
        assert_eq!(row_tokens, ["liq", "1.5", "2"]);
    }

    #[test]
    fn updating_an_existing_row_keeps_its_position() {
        let mut table: Table<PropertySchema> = Table::new(["v"]);
        table.add_row(&["a", "1"]).expect("row should be accepted");
        table.add_row(&["b", "2"]).expect("row should be accepted");
        table.add_row(&["a", "9"]).expect("row should be accepted");

        let keys: Vec<&str> = table.rows().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(table.row("a").and_then(|row| row.get("v")).map(String::as_str), Some("9"));
    }
}
