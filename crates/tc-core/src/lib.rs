//! Text-protocol adapter for the THERMOCALC phase-equilibrium program.
//!
//! THERMOCALC communicates exclusively through fixed-format plain-text files
//! and a line-oriented interactive session. This crate turns its ordered
//! key/value scripting language into an addressable in-memory model, renders
//! that model back as program input, drives one calculation per
//! [`context::Context`] in an isolated scratch directory, and parses the
//! loosely-delimited report output back into structured data.

pub mod context;
pub mod domain;
pub mod encoding;
pub mod outputs;
pub mod script;
pub mod tables;

pub use context::{Context, ContextOptions, ProgramRunner, RunOutput, SystemRunner};
pub use domain::{TcError, TcErrorCategory, TcResult};
pub use outputs::{ResultValue, RunResults};
pub use script::{ScriptModel, ScriptValue};
pub use tables::{PropertyTable, RbiTable, SiteFractions};
