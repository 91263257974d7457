mod icfile;
mod logfile;
mod results;

pub use icfile::{IcSummary, parse_ic};
pub use logfile::{KNOWN_VERSION, LogSummary, parse_log};
pub use results::{ResultValue, RunResults, keys};
