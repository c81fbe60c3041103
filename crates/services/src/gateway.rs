use std::sync::Arc;

use quiz_core::defaults::default_configuration;
use quiz_core::model::{
    OptionDraft, QuestionDraft, QuizConfiguration, QuizConfigurationDraft, TierDraft,
};
use quiz_core::scoring::{SCORE_RANGE_MAX, SCORE_RANGE_MIN};
use storage::cache::{CONFIG_SNAPSHOT_KEY, KeyValueCache};
use storage::repository::{
    Collection, OptionRecord, QuestionRecord, QuizRepository, ResultRecord, StorageError,
};

use crate::error::{GatewayError, SaveError, SaveStage};

/// Where the in-memory configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Local snapshot, not yet confirmed by the remote store.
    Cached,
    /// Loaded from the remote store.
    Remote,
    /// Built-in defaults; `persisted` tells whether writing them back succeeded.
    Defaults { persisted: bool },
    /// Replaced through the admin editor.
    Edited,
}

/// Result of [`QuizGateway::load_or_default`].
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    pub config: QuizConfiguration,
    pub source: ConfigSource,
}

/// Loads and saves the whole quiz configuration against the remote store and
/// mirrors good configurations into the local cache.
#[derive(Clone)]
pub struct QuizGateway {
    repo: Arc<dyn QuizRepository>,
    cache: Arc<dyn KeyValueCache>,
}

impl QuizGateway {
    #[must_use]
    pub fn new(repo: Arc<dyn QuizRepository>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { repo, cache }
    }

    /// Fetch the three collections and assemble a configuration.
    ///
    /// Returns `Ok(None)` when the store holds no questions.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Fetch` if a collection cannot be read and
    /// `GatewayError::Invalid` if the joined rows do not validate.
    pub async fn load(&self) -> Result<Option<QuizConfiguration>, GatewayError> {
        let questions = self
            .repo
            .fetch_questions()
            .await
            .map_err(fetch_err(Collection::Questions))?;
        if questions.is_empty() {
            tracing::debug!("remote store has no questions");
            return Ok(None);
        }
        let options = self
            .repo
            .fetch_options()
            .await
            .map_err(fetch_err(Collection::Options))?;
        let results = self
            .repo
            .fetch_results()
            .await
            .map_err(fetch_err(Collection::Results))?;

        tracing::debug!(
            questions = questions.len(),
            options = options.len(),
            results = results.len(),
            "fetched quiz collections"
        );

        let config = join_records(questions, &options, results).validate()?;
        warn_on_gaps(&config);
        self.mirror(&config);
        Ok(Some(config))
    }

    /// Replace the remote configuration wholesale.
    ///
    /// Clears options, questions and results, then inserts questions, options
    /// and results with `sort_order` taken from list position. Stops at the
    /// first failing step; steps already applied stay applied.
    ///
    /// # Errors
    ///
    /// Returns `SaveError` naming the step that failed.
    pub async fn save(&self, config: &QuizConfiguration) -> Result<(), SaveError> {
        let (questions, options, results) = split_records(config);

        for collection in [Collection::Options, Collection::Questions, Collection::Results] {
            self.repo
                .clear(collection)
                .await
                .map_err(save_err(SaveStage::Clear(collection)))?;
        }

        self.repo
            .insert_questions(&questions)
            .await
            .map_err(save_err(SaveStage::Insert(Collection::Questions)))?;
        self.repo
            .insert_options(&options)
            .await
            .map_err(save_err(SaveStage::Insert(Collection::Options)))?;
        self.repo
            .insert_results(&results)
            .await
            .map_err(save_err(SaveStage::Insert(Collection::Results)))?;

        tracing::info!(
            questions = questions.len(),
            options = options.len(),
            results = results.len(),
            "saved quiz configuration"
        );
        warn_on_gaps(config);
        self.mirror(config);
        Ok(())
    }

    /// Load from the remote store, falling back to the built-in defaults.
    ///
    /// When the store is empty or unreachable, the defaults are written to
    /// it; a failed write is logged and the defaults are still returned.
    /// Stored rows that do not validate are left in place and the cached
    /// snapshot (or the unsaved defaults) is returned instead.
    pub async fn load_or_default(&self) -> LoadedConfiguration {
        match self.load().await {
            Ok(Some(config)) => {
                return LoadedConfiguration {
                    config,
                    source: ConfigSource::Remote,
                };
            }
            Ok(None) => tracing::info!("no stored quiz configuration; using defaults"),
            Err(err @ GatewayError::Invalid(_)) => {
                tracing::warn!(error = %err, "leaving invalid stored configuration untouched");
                return self.local_fallback();
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load quiz configuration; using defaults");
            }
        }
        self.install_defaults().await
    }

    /// The cached snapshot, or the built-in defaults without writing them.
    #[must_use]
    pub fn local_fallback(&self) -> LoadedConfiguration {
        match self.cached() {
            Some(config) => LoadedConfiguration {
                config,
                source: ConfigSource::Cached,
            },
            None => LoadedConfiguration {
                config: default_configuration(),
                source: ConfigSource::Defaults { persisted: false },
            },
        }
    }

    /// Write the built-in defaults to the remote store and return them.
    pub async fn install_defaults(&self) -> LoadedConfiguration {
        let config = default_configuration();
        let persisted = match self.save(&config).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist default configuration");
                false
            }
        };
        LoadedConfiguration {
            config,
            source: ConfigSource::Defaults { persisted },
        }
    }

    /// Read the cached snapshot.
    ///
    /// A snapshot that does not parse or validate is purged from the cache.
    #[must_use]
    pub fn cached(&self) -> Option<QuizConfiguration> {
        let raw = match self.cache.get(CONFIG_SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "configuration cache unreadable");
                return None;
            }
        };

        match serde_json::from_str::<QuizConfiguration>(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(error = %err, "discarding corrupt configuration snapshot");
                if let Err(err) = self.cache.remove(CONFIG_SNAPSHOT_KEY) {
                    tracing::warn!(error = %err, "failed to purge configuration snapshot");
                }
                None
            }
        }
    }

    fn mirror(&self, config: &QuizConfiguration) {
        let written = serde_json::to_string(config)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.cache
                    .set(CONFIG_SNAPSHOT_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = written {
            tracing::warn!(%error, "failed to mirror configuration into cache");
        }
    }
}

fn fetch_err(collection: Collection) -> impl FnOnce(StorageError) -> GatewayError {
    move |source| GatewayError::Fetch { collection, source }
}

fn save_err(stage: SaveStage) -> impl FnOnce(StorageError) -> SaveError {
    move |source| SaveError { stage, source }
}

fn warn_on_gaps(config: &QuizConfiguration) {
    for gap in config.coverage_gaps(SCORE_RANGE_MIN, SCORE_RANGE_MAX) {
        tracing::warn!(
            after = gap.after,
            before = gap.before,
            "scores in this range match no result tier"
        );
    }
}

/// Joins option rows to their questions. Rows arrive sorted by `sort_order`,
/// so filtering keeps each question's option order.
fn join_records(
    questions: Vec<QuestionRecord>,
    options: &[OptionRecord],
    results: Vec<ResultRecord>,
) -> QuizConfigurationDraft {
    let questions = questions
        .into_iter()
        .map(|q| QuestionDraft {
            options: options
                .iter()
                .filter(|o| o.question_id == q.question_id)
                .map(|o| OptionDraft {
                    id: o.option_id.to_string(),
                    text: o.text.clone(),
                    value: o.value,
                })
                .collect(),
            id: q.question_id.into(),
            question: q.question,
        })
        .collect();

    let results = results
        .into_iter()
        .map(|r| TierDraft {
            id: r.result_id.into(),
            name: r.name,
            min_score: r.min_score,
            max_score: r.max_score,
            description: r.description,
            embed_html: r.embed_html,
            redirect_url: r.redirect_url,
        })
        .collect();

    QuizConfigurationDraft { questions, results }
}

fn sort_key(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn split_records(
    config: &QuizConfiguration,
) -> (Vec<QuestionRecord>, Vec<OptionRecord>, Vec<ResultRecord>) {
    let questions = config
        .questions()
        .iter()
        .enumerate()
        .map(|(index, q)| QuestionRecord {
            question_id: q.id().clone(),
            question: q.prompt().to_owned(),
            sort_order: sort_key(index),
        })
        .collect();

    let options = config
        .questions()
        .iter()
        .flat_map(|q| {
            q.options()
                .iter()
                .enumerate()
                .map(move |(index, o)| OptionRecord {
                    question_id: q.id().clone(),
                    option_id: o.id().clone(),
                    text: o.text().to_owned(),
                    value: o.value(),
                    sort_order: sort_key(index),
                })
        })
        .collect();

    let results = config
        .results()
        .iter()
        .enumerate()
        .map(|(index, t)| ResultRecord {
            result_id: t.id().clone(),
            name: t.name().to_owned(),
            min_score: t.min_score(),
            max_score: t.max_score(),
            description: t.description().to_owned(),
            embed_html: t.embed_html().map(str::to_owned),
            redirect_url: t.redirect_url().map(str::to_owned),
            sort_order: sort_key(index),
        })
        .collect();

    (questions, options, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::cache::InMemoryCache;
    use storage::repository::InMemoryRepository;

    fn gateway() -> (QuizGateway, InMemoryRepository, InMemoryCache) {
        let repo = InMemoryRepository::new();
        let cache = InMemoryCache::new();
        let gw = QuizGateway::new(Arc::new(repo.clone()), Arc::new(cache.clone()));
        (gw, repo, cache)
    }

    #[tokio::test]
    async fn empty_store_loads_as_none() {
        let (gw, _, _) = gateway();
        assert!(gw.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_assigns_sort_order_by_position() {
        let (gw, repo, _) = gateway();
        gw.save(&default_configuration()).await.unwrap();

        let questions = repo.fetch_questions().await.unwrap();
        assert_eq!(questions[0].question_id.as_str(), "q1");
        assert_eq!(questions[10].sort_order, 10);

        let options = repo.fetch_options().await.unwrap();
        assert_eq!(options.len(), 55);
        assert!(options.iter().all(|o| (0..5).contains(&o.sort_order)));
    }

    #[tokio::test]
    async fn save_mirrors_snapshot_into_cache() {
        let (gw, _, cache) = gateway();
        assert!(gw.cached().is_none());
        gw.save(&default_configuration()).await.unwrap();
        assert!(cache.get(CONFIG_SNAPSHOT_KEY).unwrap().is_some());
        assert_eq!(gw.cached().unwrap(), default_configuration());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_purged() {
        let (gw, _, cache) = gateway();
        cache.set(CONFIG_SNAPSHOT_KEY, "{not json").unwrap();
        assert!(gw.cached().is_none());
        assert_eq!(cache.get(CONFIG_SNAPSHOT_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn structurally_empty_snapshot_is_purged() {
        let (gw, _, cache) = gateway();
        cache
            .set(CONFIG_SNAPSHOT_KEY, r#"{"questions":[],"results":[]}"#)
            .unwrap();
        assert!(gw.cached().is_none());
        assert_eq!(cache.get(CONFIG_SNAPSHOT_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn empty_store_falls_back_to_persisted_defaults() {
        let (gw, repo, _) = gateway();
        let loaded = gw.load_or_default().await;
        assert_eq!(loaded.source, ConfigSource::Defaults { persisted: true });
        assert_eq!(repo.fetch_questions().await.unwrap().len(), 11);

        let again = gw.load_or_default().await;
        assert_eq!(again.source, ConfigSource::Remote);
        assert_eq!(again.config, loaded.config);
    }

    #[tokio::test]
    async fn invalid_rows_are_not_overwritten_by_defaults() {
        let (gw, repo, _) = gateway();
        repo.insert_questions(&[QuestionRecord {
            question_id: "custom1".parse().unwrap(),
            question: "Orphaned question".into(),
            sort_order: 0,
        }])
        .await
        .unwrap();

        let loaded = gw.load_or_default().await;
        assert_eq!(loaded.source, ConfigSource::Defaults { persisted: false });
        let questions = repo.fetch_questions().await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_id.as_str(), "custom1");
    }
}
