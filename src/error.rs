//! Error types for the solver crate.
//!
//! Search failure is not an error: solvers signal "no solution" with an empty
//! path. These variants cover the edges of the crate only (parsing boards,
//! loading configuration, selecting an algorithm by name).

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("board has wrong number of cells: expected {expected}, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("tile {value} at cell {index} is out of range (must be 0-8)")]
    TileOutOfRange { value: u8, index: usize },

    #[error("tile {value} appears more than once")]
    DuplicateTile { value: u8 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unknown algorithm '{name}'. Expected one of: {expected}")]
    UnknownAlgorithm { name: String, expected: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
