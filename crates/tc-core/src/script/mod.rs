mod model;
pub(crate) mod parser;
mod render;

pub use model::{ScriptModel, ScriptValue, XyzGuesses};
pub use parser::{parse_prefs, parse_script};
pub use render::{render_prefs, render_script};
