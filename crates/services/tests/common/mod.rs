#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use quiz_core::model::{
    OptionDraft, QuestionDraft, QuizConfiguration, QuizConfigurationDraft, TierDraft,
};
use storage::repository::{
    Collection, InMemoryRepository, OptionRecord, QuestionRecord, QuizRepository, ResultRecord,
    StorageError,
};

/// Two questions with options worth 1 and 5; Low [1, 3] and High [3.01, 5].
pub fn low_high_config() -> QuizConfiguration {
    let question = |id: &str| QuestionDraft {
        id: id.into(),
        question: format!("Question {id}"),
        options: vec![
            OptionDraft {
                id: "a".into(),
                text: "One".into(),
                value: 1.0,
            },
            OptionDraft {
                id: "b".into(),
                text: "Five".into(),
                value: 5.0,
            },
        ],
    };
    let tier = |id: &str, name: &str, min: f64, max: f64| TierDraft {
        id: id.into(),
        name: name.into(),
        min_score: min,
        max_score: max,
        description: format!("{name} tier"),
        embed_html: None,
        redirect_url: None,
    };

    QuizConfigurationDraft {
        questions: vec![question("q1"), question("q2")],
        results: vec![tier("low", "Low", 1.0, 3.0), tier("high", "High", 3.01, 5.0)],
    }
    .validate()
    .expect("fixture config is valid")
}

/// Which repository call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Fetch,
    Clear(Collection),
    Insert(Collection),
}

/// Wraps an in-memory repository and fails one kind of call.
#[derive(Clone)]
pub struct FailingRepository {
    pub inner: InMemoryRepository,
    fail_at: std::sync::Arc<Mutex<Option<FailAt>>>,
}

impl FailingRepository {
    pub fn new(fail_at: Option<FailAt>) -> Self {
        Self {
            inner: InMemoryRepository::new(),
            fail_at: std::sync::Arc::new(Mutex::new(fail_at)),
        }
    }

    pub fn set_failure(&self, fail_at: Option<FailAt>) {
        *self.fail_at.lock().unwrap() = fail_at;
    }

    fn check(&self, call: FailAt) -> Result<(), StorageError> {
        if *self.fail_at.lock().unwrap() == Some(call) {
            return Err(StorageError::Connection(format!("injected failure at {call:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for FailingRepository {
    async fn fetch_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        self.check(FailAt::Fetch)?;
        self.inner.fetch_questions().await
    }

    async fn fetch_options(&self) -> Result<Vec<OptionRecord>, StorageError> {
        self.check(FailAt::Fetch)?;
        self.inner.fetch_options().await
    }

    async fn fetch_results(&self) -> Result<Vec<ResultRecord>, StorageError> {
        self.check(FailAt::Fetch)?;
        self.inner.fetch_results().await
    }

    async fn clear(&self, collection: Collection) -> Result<(), StorageError> {
        self.check(FailAt::Clear(collection))?;
        self.inner.clear(collection).await
    }

    async fn insert_questions(&self, rows: &[QuestionRecord]) -> Result<(), StorageError> {
        self.check(FailAt::Insert(Collection::Questions))?;
        self.inner.insert_questions(rows).await
    }

    async fn insert_options(&self, rows: &[OptionRecord]) -> Result<(), StorageError> {
        self.check(FailAt::Insert(Collection::Options))?;
        self.inner.insert_options(rows).await
    }

    async fn insert_results(&self, rows: &[ResultRecord]) -> Result<(), StorageError> {
        self.check(FailAt::Insert(Collection::Results))?;
        self.inner.insert_results(rows).await
    }
}
