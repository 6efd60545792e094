use thiserror::Error;

/// Failures reported by a [`crate::KeyValueStorage`] backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read key {key:?}: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write key {key:?}: {reason}")]
    Write { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum QuestError {
    #[error("a quest named {0:?} already exists")]
    DuplicateName(String),

    #[error("quest name cannot be empty")]
    EmptyName,

    #[error("progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(u8),

    #[error("unknown filter {0:?}; expected all, pending or completed")]
    UnknownFilter(String),

    #[error("stored value under {key:?} is not a valid quest list")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode quest list")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, QuestError>;
