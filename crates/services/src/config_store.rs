use std::sync::{Arc, PoisonError, RwLock};

use quiz_core::defaults::default_configuration;
use quiz_core::model::QuizConfiguration;

use crate::error::{GatewayError, SaveError};
use crate::gateway::{ConfigSource, QuizGateway};

#[derive(Debug)]
struct Snapshot {
    config: Arc<QuizConfiguration>,
    source: ConfigSource,
}

/// In-memory configuration shared by the quiz and admin views.
///
/// Seeded synchronously from the cache (or the built-in defaults) so the quiz
/// can start before the remote store answers; [`ConfigStore::revalidate`]
/// then swaps in the remote state.
pub struct ConfigStore {
    gateway: QuizGateway,
    state: RwLock<Snapshot>,
}

impl ConfigStore {
    /// Seed from the cached snapshot, falling back to the built-in defaults.
    #[must_use]
    pub fn seeded(gateway: QuizGateway) -> Self {
        let (config, source) = match gateway.cached() {
            Some(config) => (config, ConfigSource::Cached),
            None => (
                default_configuration(),
                ConfigSource::Defaults { persisted: false },
            ),
        };
        tracing::info!(?source, "seeded quiz configuration");
        Self {
            gateway,
            state: RwLock::new(Snapshot {
                config: Arc::new(config),
                source,
            }),
        }
    }

    /// Refresh from the remote store and return the resulting source.
    ///
    /// An unreachable store keeps a cached snapshot in place. With nothing
    /// cached, or when the store is empty, the defaults are installed and
    /// written back. Stored rows that do not validate are never overwritten:
    /// the cached snapshot stays, or the defaults are used unsaved.
    pub async fn revalidate(&self) -> ConfigSource {
        let loaded = match self.gateway.load().await {
            Ok(Some(config)) => Some((config, ConfigSource::Remote)),
            Ok(None) => {
                tracing::info!("remote store is empty; installing defaults");
                None
            }
            Err(err) if self.source() == ConfigSource::Cached => {
                tracing::warn!(error = %err, "remote load failed; keeping cached configuration");
                return ConfigSource::Cached;
            }
            Err(err @ GatewayError::Invalid(_)) => {
                tracing::warn!(error = %err, "leaving invalid stored configuration untouched");
                let fallback = self.gateway.local_fallback();
                self.set(fallback.config, fallback.source);
                return fallback.source;
            }
            Err(err) => {
                tracing::warn!(error = %err, "remote load failed; installing defaults");
                None
            }
        };

        let (config, source) = match loaded {
            Some(pair) => pair,
            None => {
                let installed = self.gateway.install_defaults().await;
                (installed.config, installed.source)
            }
        };
        tracing::info!(?source, "quiz configuration revalidated");
        self.set(config, source);
        source
    }

    /// Install `config` in memory, then write it to the remote store.
    ///
    /// The in-memory value is kept even when the save fails.
    ///
    /// # Errors
    ///
    /// Returns `SaveError` from the gateway.
    pub async fn replace(&self, config: QuizConfiguration) -> Result<(), SaveError> {
        let config = Arc::new(config);
        self.set_shared(Arc::clone(&config), ConfigSource::Edited);
        self.gateway.save(&config).await
    }

    #[must_use]
    pub fn current(&self) -> Arc<QuizConfiguration> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard.config)
    }

    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .source
    }

    #[must_use]
    pub fn gateway(&self) -> &QuizGateway {
        &self.gateway
    }

    fn set(&self, config: QuizConfiguration, source: ConfigSource) {
        self.set_shared(Arc::new(config), source);
    }

    fn set_shared(&self, config: Arc<QuizConfiguration>, source: ConfigSource) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Snapshot { config, source };
    }
}
