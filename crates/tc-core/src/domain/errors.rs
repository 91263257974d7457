use thiserror::Error;

/// Broad failure classes with stable process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TcErrorCategory {
    /// Bad or missing configuration detected before the external program runs.
    ConfigError,
    /// Filesystem or subprocess failure.
    IoError,
    /// Structured text that does not match the expected layout.
    ParseError,
}

impl TcErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ConfigError => 2,
            Self::IoError => 3,
            Self::ParseError => 4,
        }
    }
}

/// Library error carrying a stable dotted diagnostic code alongside the
/// human-readable message, e.g. `CONFIG.AXFILE` or `PARSE.RBI_ROW`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct TcError {
    category: TcErrorCategory,
    code: String,
    message: String,
}

impl TcError {
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: TcErrorCategory::ConfigError,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn io_system(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: TcErrorCategory::IoError,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn output_parse(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: TcErrorCategory::ParseError,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> TcErrorCategory {
        self.category
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    /// Single stderr line used by the CLI when a run aborts.
    pub fn diagnostic_line(&self) -> String {
        format!("tcalc: {self}")
    }
}

pub type TcResult<T> = Result<T, TcError>;
