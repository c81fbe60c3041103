use async_trait::async_trait;
use quiz_core::model::{OptionId, QuestionId, TierId};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The three independently stored collections that make up a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Questions,
    Options,
    Results,
}

impl Collection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Questions => "questions",
            Collection::Options => "options",
            Collection::Results => "results",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted shape of a question, without its options.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub question_id: QuestionId,
    pub question: String,
    pub sort_order: i64,
}

/// Persisted shape of an option. Joined to its question by `question_id`;
/// `sort_order` is the index within that question.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionRecord {
    pub question_id: QuestionId,
    pub option_id: OptionId,
    pub text: String,
    pub value: f64,
    pub sort_order: i64,
}

/// Persisted shape of a result tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub result_id: TierId,
    pub name: String,
    pub min_score: f64,
    pub max_score: f64,
    pub description: String,
    pub embed_html: Option<String>,
    pub redirect_url: Option<String>,
    pub sort_order: i64,
}

/// Record-level contract for the remote quiz store.
///
/// Collections are read and written independently; there is no cross-collection
/// transaction. Reads return rows ordered by `sort_order`.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Fetch all question rows ordered by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a row is malformed.
    async fn fetch_questions(&self) -> Result<Vec<QuestionRecord>, StorageError>;

    /// Fetch all option rows ordered by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a row is malformed.
    async fn fetch_options(&self) -> Result<Vec<OptionRecord>, StorageError>;

    /// Fetch all result tier rows ordered by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a row is malformed.
    async fn fetch_results(&self) -> Result<Vec<ResultRecord>, StorageError>;

    /// Delete every row of a collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear(&self, collection: Collection) -> Result<(), StorageError>;

    /// Bulk-insert question rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for duplicate ids, or other storage errors.
    async fn insert_questions(&self, rows: &[QuestionRecord]) -> Result<(), StorageError>;

    /// Bulk-insert option rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for duplicate ids, or other storage errors.
    async fn insert_options(&self, rows: &[OptionRecord]) -> Result<(), StorageError>;

    /// Bulk-insert result tier rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for duplicate ids, or other storage errors.
    async fn insert_results(&self, rows: &[ResultRecord]) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<QuestionRecord>>>,
    options: Arc<Mutex<Vec<OptionRecord>>>,
    results: Arc<Mutex<Vec<ResultRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, StorageError> {
    m.lock().map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn fetch_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let mut rows = lock(&self.questions)?.clone();
        rows.sort_by_key(|r| r.sort_order);
        Ok(rows)
    }

    async fn fetch_options(&self) -> Result<Vec<OptionRecord>, StorageError> {
        let mut rows = lock(&self.options)?.clone();
        rows.sort_by_key(|r| r.sort_order);
        Ok(rows)
    }

    async fn fetch_results(&self) -> Result<Vec<ResultRecord>, StorageError> {
        let mut rows = lock(&self.results)?.clone();
        rows.sort_by_key(|r| r.sort_order);
        Ok(rows)
    }

    async fn clear(&self, collection: Collection) -> Result<(), StorageError> {
        match collection {
            Collection::Questions => lock(&self.questions)?.clear(),
            Collection::Options => lock(&self.options)?.clear(),
            Collection::Results => lock(&self.results)?.clear(),
        }
        Ok(())
    }

    async fn insert_questions(&self, rows: &[QuestionRecord]) -> Result<(), StorageError> {
        let mut guard = lock(&self.questions)?;
        for row in rows {
            if guard.iter().any(|r| r.question_id == row.question_id) {
                return Err(StorageError::Conflict(format!(
                    "question {}",
                    row.question_id
                )));
            }
        }
        guard.extend_from_slice(rows);
        Ok(())
    }

    async fn insert_options(&self, rows: &[OptionRecord]) -> Result<(), StorageError> {
        let mut guard = lock(&self.options)?;
        for row in rows {
            if guard
                .iter()
                .any(|r| r.question_id == row.question_id && r.option_id == row.option_id)
            {
                return Err(StorageError::Conflict(format!(
                    "option {}/{}",
                    row.question_id, row.option_id
                )));
            }
        }
        guard.extend_from_slice(rows);
        Ok(())
    }

    async fn insert_results(&self, rows: &[ResultRecord]) -> Result<(), StorageError> {
        let mut guard = lock(&self.results)?;
        for row in rows {
            if guard.iter().any(|r| r.result_id == row.result_id) {
                return Err(StorageError::Conflict(format!("result {}", row.result_id)));
            }
        }
        guard.extend_from_slice(rows);
        Ok(())
    }
}

/// Holds the quiz repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quiz: Arc<dyn QuizRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            quiz: Arc::new(InMemoryRepository::new()),
        }
    }
}
