//! Shared error types for the services crate.

use std::fmt;

use thiserror::Error;

use quiz_core::model::{ConfigError, OptionId};
use storage::cache::CacheError;
use storage::repository::{Collection, StorageError};
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizGateway::load`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("failed to fetch {collection}: {source}")]
    Fetch {
        collection: Collection,
        #[source]
        source: StorageError,
    },
    #[error("stored configuration is invalid: {0}")]
    Invalid(#[from] ConfigError),
}

/// Step of the clear-then-insert replace sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStage {
    Clear(Collection),
    Insert(Collection),
}

impl fmt::Display for SaveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStage::Clear(c) => write!(f, "clear {c}"),
            SaveStage::Insert(c) => write!(f, "insert {c}"),
        }
    }
}

/// A save aborted at `stage`. Earlier stages were applied and are not undone.
#[derive(Debug, Error)]
#[error("save failed at {stage}: {source}")]
pub struct SaveError {
    pub stage: SaveStage,
    #[source]
    pub source: StorageError,
}

/// Errors emitted by `AnswerTracker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted by `QuizSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("an answer is already being recorded")]
    AnsweringInProgress,
    #[error("quiz already completed")]
    Completed,
    #[error("option {0} does not belong to the current question")]
    UnknownOption(OptionId),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Errors emitted by the admin gate and configuration editor.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("incorrect admin password")]
    InvalidSecret,
    #[error("admin access requires authentication")]
    NotAuthenticated,
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
    #[error("unknown option {option} in question {question}")]
    UnknownOption { question: String, option: String },
    #[error("unknown result tier: {0}")]
    UnknownTier(String),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
