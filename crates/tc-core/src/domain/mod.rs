pub mod errors;

pub use errors::{TcError, TcErrorCategory, TcResult};
