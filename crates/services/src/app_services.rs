use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use storage::cache::{FileCache, InMemoryCache, KeyValueCache};
use storage::repository::{QuizRepository, Storage};

use crate::Clock;
use crate::admin::AdminGate;
use crate::config_store::ConfigStore;
use crate::error::{AppServicesError, SessionError};
use crate::gateway::QuizGateway;
use crate::session::{DEFAULT_TRANSITION_DELAY, QuizSession};

/// Composition root: wires storage, caches and services for the front end.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    store: Arc<ConfigStore>,
    cache: Arc<dyn KeyValueCache>,
    admin_gate: Option<AdminGate>,
    transition_delay: Duration,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and a file cache in `cache_dir`.
    ///
    /// The configuration is seeded from the cache; call
    /// [`ConfigStore::revalidate`] on [`AppServices::store`] to refresh it.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        cache_dir: &Path,
        admin_secret: Option<String>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let cache: Arc<dyn KeyValueCache> = Arc::new(FileCache::new(cache_dir));
        Ok(Self::from_parts(
            Arc::clone(&storage.quiz),
            cache,
            admin_secret,
            clock,
        ))
    }

    /// Build services from already-constructed parts.
    #[must_use]
    pub fn from_parts(
        repo: Arc<dyn QuizRepository>,
        cache: Arc<dyn KeyValueCache>,
        admin_secret: Option<String>,
        clock: Clock,
    ) -> Self {
        let gateway = QuizGateway::new(repo, Arc::clone(&cache));
        let store = Arc::new(ConfigStore::seeded(gateway));
        let session_store: Arc<dyn KeyValueCache> = Arc::new(InMemoryCache::new());
        let admin_gate = admin_secret.map(|secret| AdminGate::new(secret, session_store));
        Self {
            clock,
            store,
            cache,
            admin_gate,
            transition_delay: DEFAULT_TRANSITION_DELAY,
        }
    }

    #[must_use]
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    #[must_use]
    pub fn store(&self) -> Arc<ConfigStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn gateway(&self) -> &QuizGateway {
        self.store.gateway()
    }

    /// `None` when no admin secret was configured.
    #[must_use]
    pub fn admin_gate(&self) -> Option<&AdminGate> {
        self.admin_gate.as_ref()
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn transition_delay(&self) -> Duration {
        self.transition_delay
    }

    /// Start a fresh attempt against the current configuration.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if stale answers cannot be purged.
    pub fn start_session(&self) -> Result<QuizSession, SessionError> {
        QuizSession::start(self.store.current(), Arc::clone(&self.cache))
            .map(|s| s.with_transition_delay(self.transition_delay))
    }

    /// Resume the persisted attempt against the current configuration.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the answer cache cannot be read.
    pub fn resume_session(&self) -> Result<QuizSession, SessionError> {
        QuizSession::resume(self.store.current(), Arc::clone(&self.cache))
            .map(|s| s.with_transition_delay(self.transition_delay))
    }
}
