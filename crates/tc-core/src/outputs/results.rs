use crate::tables::{PropertyTable, RbiTable, SiteFractions};
use indexmap::IndexMap;
use serde::Serialize;

/// One parsed field of a calculation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    Text(String),
    Number(f64),
    Words(Vec<String>),
    NumberMap(IndexMap<String, f64>),
    Proportions(RbiTable),
    SiteFractions(SiteFractions),
    Properties(PropertyTable),
}

/// Result-set keys exposed to callers. Raw captures are prefixed `output_`.
pub mod keys {
    pub const OUTPUT_STDOUT: &str = "output_stdout";
    pub const OUTPUT_STDERR: &str = "output_stderr";
    pub const OUTPUT_TC_LOG: &str = "output_tc_log";
    pub const OUTPUT_TC_IC: &str = "output_tc_ic";
    pub const PRESSURE: &str = "P";
    pub const TEMPERATURE: &str = "T";
    pub const PHASES: &str = "phases";
    pub const XYZ: &str = "xyz";
    pub const MODES: &str = "modes";
    pub const RBI: &str = "rbi";
    pub const BULK_COMPOSITION: &str = "bulk_composition";
    pub const SITE_FRACTIONS: &str = "site_fractions";
    pub const THERMODYNAMIC_PROPERTIES: &str = "thermodynamic_properties";
}

/// Ordered result mapping produced fresh by each `execute()` call.
///
/// A field is either fully populated or absent; per-artifact parse failures
/// surface as advisories instead of partial values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResults {
    values: IndexMap<String, ResultValue>,
    advisories: Vec<String>,
}

impl RunResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ResultValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ResultValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResultValue)> {
        self.values.iter()
    }

    pub fn push_advisory(&mut self, advisory: impl Into<String>) {
        self.advisories.push(advisory.into());
    }

    /// Non-fatal conditions raised while parsing outputs, in arrival order.
    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ResultValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ResultValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    fn number_map(&self, key: &str) -> Option<&IndexMap<String, f64>> {
        match self.values.get(key) {
            Some(ResultValue::NumberMap(map)) => Some(map),
            _ => None,
        }
    }

    pub fn pressure(&self) -> Option<f64> {
        self.number(keys::PRESSURE)
    }

    pub fn temperature(&self) -> Option<f64> {
        self.number(keys::TEMPERATURE)
    }

    pub fn phases(&self) -> Option<&[String]> {
        match self.values.get(keys::PHASES) {
            Some(ResultValue::Words(words)) => Some(words),
            _ => None,
        }
    }

    pub fn composition(&self) -> Option<&IndexMap<String, f64>> {
        self.number_map(keys::XYZ)
    }

    pub fn modes(&self) -> Option<&IndexMap<String, f64>> {
        self.number_map(keys::MODES)
    }

    pub fn bulk_composition(&self) -> Option<&IndexMap<String, f64>> {
        self.number_map(keys::BULK_COMPOSITION)
    }

    pub fn rbi(&self) -> Option<&RbiTable> {
        match self.values.get(keys::RBI) {
            Some(ResultValue::Proportions(table)) => Some(table),
            _ => None,
        }
    }

    pub fn site_fractions(&self) -> Option<&SiteFractions> {
        match self.values.get(keys::SITE_FRACTIONS) {
            Some(ResultValue::SiteFractions(fractions)) => Some(fractions),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&PropertyTable> {
        match self.values.get(keys::THERMODYNAMIC_PROPERTIES) {
            Some(ResultValue::Properties(table)) => Some(table),
            _ => None,
        }
    }

    pub fn stdout(&self) -> Option<&str> {
        self.text(keys::OUTPUT_STDOUT)
    }

    pub fn stderr(&self) -> Option<&str> {
        self.text(keys::OUTPUT_STDERR)
    }

    pub fn log_text(&self) -> Option<&str> {
        self.text(keys::OUTPUT_TC_LOG)
    }

    pub fn ic_text(&self) -> Option<&str> {
        self.text(keys::OUTPUT_TC_IC)
    }
}
