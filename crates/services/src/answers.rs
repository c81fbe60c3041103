use std::sync::Arc;

use quiz_core::model::AnswerRecord;
use quiz_core::scoring::average_score;
use storage::cache::{ANSWERS_KEY, KeyValueCache};

use crate::error::TrackerError;

/// Ordered answer sequence of one quiz attempt, mirrored into the cache after
/// every mutation so an interrupted attempt can resume.
pub struct AnswerTracker {
    records: Vec<AnswerRecord>,
    cache: Arc<dyn KeyValueCache>,
}

impl std::fmt::Debug for AnswerTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerTracker")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl AnswerTracker {
    /// An empty tracker. Nothing is written until the first mutation.
    #[must_use]
    pub fn new(cache: Arc<dyn KeyValueCache>) -> Self {
        Self {
            records: Vec::new(),
            cache,
        }
    }

    /// Reload the persisted sequence. A missing entry yields an empty tracker;
    /// an entry that does not parse is purged.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Cache` if the cache cannot be read or purged.
    pub fn restore(cache: Arc<dyn KeyValueCache>) -> Result<Self, TrackerError> {
        let records = match cache.get(ANSWERS_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<AnswerRecord>>(&raw) {
                Ok(records) => records,
                Err(err) => {
                    tracing::warn!(error = %err, "discarding corrupt answer sequence");
                    cache.remove(ANSWERS_KEY)?;
                    Vec::new()
                }
            },
        };
        tracing::debug!(answers = records.len(), "restored answer sequence");
        Ok(Self { records, cache })
    }

    /// # Errors
    ///
    /// Returns `TrackerError` if the sequence cannot be persisted; the record
    /// is not kept in that case.
    pub fn append(&mut self, record: AnswerRecord) -> Result<(), TrackerError> {
        self.records.push(record);
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Drop the most recent answer. Returns the removed record; `None` (and no
    /// write) when the sequence is empty.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the shortened sequence cannot be persisted;
    /// the record is kept in that case.
    pub fn remove_last(&mut self) -> Result<Option<AnswerRecord>, TrackerError> {
        let Some(record) = self.records.pop() else {
            return Ok(None);
        };
        if let Err(err) = self.persist() {
            self.records.push(record);
            return Err(err);
        }
        Ok(Some(record))
    }

    /// Clear all answers and purge the persisted entry.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Cache` if the entry cannot be removed.
    pub fn reset(&mut self) -> Result<(), TrackerError> {
        self.records.clear();
        self.cache.remove(ANSWERS_KEY)?;
        Ok(())
    }

    /// Index of the question to show next.
    #[must_use]
    pub fn resume_index(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean of the recorded values, or 0 when nothing is recorded.
    #[must_use]
    pub fn score(&self) -> f64 {
        average_score(&self.records)
    }

    fn persist(&self) -> Result<(), TrackerError> {
        let json = serde_json::to_string(&self.records)?;
        self.cache.set(ANSWERS_KEY, &json)?;
        Ok(())
    }
}
