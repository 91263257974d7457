use super::table::render_aligned;
use crate::domain::{TcError, TcResult};
use indexmap::IndexMap;
use serde::Serialize;

/// Accumulator for the site-fraction report block, a strict two-line
/// repeating pattern:
///
/// ```text
/// g          xMgX      xFeX      xCaX      xAlY     xFe3Y
///         0.13698   0.82757   0.03545   0.98451   0.01549
/// ```
///
/// Odd calls open a named group from a title + column-name line, even calls
/// fill the most recently opened group positionally. Lines must be fed in
/// file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteFractions {
    groups: IndexMap<String, IndexMap<String, Option<String>>>,
    #[serde(skip)]
    open_group: Option<String>,
}

impl SiteFractions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one tokenised line. Value lines shorter or longer than their
    /// column line are zip-truncated; surplus columns keep their `None`
    /// placeholder.
    pub fn add_line(&mut self, tokens: &[&str]) -> TcResult<()> {
        match self.open_group.take() {
            None => {
                let Some((title, columns)) = tokens.split_first() else {
                    return Err(TcError::output_parse(
                        "PARSE.SITE_FRACTIONS",
                        "site-fraction column line is empty",
                    ));
                };
                let mut group = IndexMap::with_capacity(columns.len());
                for column in columns {
                    group.insert((*column).to_string(), None);
                }
                self.groups.insert((*title).to_string(), group);
                self.open_group = Some((*title).to_string());
            }
            Some(title) => {
                // open_group is only ever set right after inserting the group
                if let Some(group) = self.groups.get_mut(&title) {
                    for (slot, value) in group.values_mut().zip(tokens) {
                        *slot = Some((*value).to_string());
                    }
                }
            }
        }
        Ok(())
    }

    /// False while a column line is still waiting for its value line.
    pub fn is_complete(&self) -> bool {
        self.open_group.is_none()
    }

    pub fn group(&self, name: &str) -> Option<&IndexMap<String, Option<String>>> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &IndexMap<String, Option<String>>)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Renders the block back into its two-line-per-group layout.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.groups.len() * 2);
        for (name, group) in &self.groups {
            let mut columns = vec![name.clone()];
            columns.extend(group.keys().cloned());
            lines.push(columns);

            let mut values = vec![String::new()];
            values.extend(group.values().map(|value| value.clone().unwrap_or_default()));
            lines.push(values);
        }
        render_aligned(&lines, &[])
    }
}
