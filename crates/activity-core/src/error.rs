use std::fmt;
use std::io;

use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Color,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Color => "color",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid activity ({})", join_violations(.0))]
    Validation(Vec<Violation>),

    #[error("index {index} is out of range for {len} activities")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no activity with id {0}")]
    NotFound(Uuid),

    #[error("stored value under key {key:?} is corrupt: {source}")]
    CorruptStore {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to encode activities: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    /// Fields named by a validation failure, empty for every other kind.
    pub fn invalid_fields(&self) -> Vec<Field> {
        match self {
            StoreError::Validation(violations) => violations.iter().map(|v| v.field).collect(),
            _ => vec![],
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
