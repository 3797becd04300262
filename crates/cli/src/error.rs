//! CLI failures and their process exit codes.
//!
//! | code | meaning |
//! |------|---------|
//! | 0    | success |
//! | 2    | argument parse error (clap, before `run`) |
//! | 10   | engine: unknown variant, invalid override, bad dimensions |
//! | 11   | I/O: image decode, PNG write, seed record read/write |
//! | 12   | input: bad `--params` JSON, unusable text or color |
//! | 13   | serialization of JSON output |

use molecular_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(EngineError),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// Host-side failures leave the engine bucket: file errors exit as I/O, a
/// bad color or raster source as input.
impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            input @ (EngineError::InvalidColor(_) | EngineError::Source(_)) => {
                CliError::Input(input.to_string())
            }
            other => CliError::Engine(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
