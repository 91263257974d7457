mod rbi;
mod site_fractions;
mod table;

pub use rbi::RbiTable;
pub use site_fractions::SiteFractions;
pub use table::{PropertySchema, ProportionSchema, RowSchema, Table};

/// Thermodynamic-property table parsed from the information-content report.
pub type PropertyTable = Table<PropertySchema>;
