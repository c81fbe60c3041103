mod common;

use std::sync::Arc;

use quiz_core::defaults::default_configuration;
use services::{ConfigSource, ConfigStore, QuizGateway, SaveStage};
use storage::cache::{CONFIG_SNAPSHOT_KEY, InMemoryCache, KeyValueCache};
use storage::repository::{
    Collection, InMemoryRepository, QuestionRecord, QuizRepository, ResultRecord, Storage,
};

use common::{FailAt, FailingRepository, low_high_config};

#[tokio::test]
async fn save_then_load_round_trips_configuration() {
    let repo = FailingRepository::new(None);
    let gateway = QuizGateway::new(Arc::new(repo.clone()), Arc::new(InMemoryCache::new()));

    let mut draft = low_high_config().to_draft();
    draft.results[0].embed_html = Some("<iframe src=\"x\"></iframe>".into());
    let config = draft.validate().unwrap();

    gateway.save(&config).await.unwrap();
    let loaded = gateway.load().await.unwrap().unwrap();
    assert_eq!(loaded, config);
}

#[tokio::test]
async fn sqlite_round_trip_preserves_order() {
    let storage = Storage::sqlite("sqlite:file:services_round_trip?mode=memory&cache=shared")
        .await
        .unwrap();
    let gateway = QuizGateway::new(Arc::clone(&storage.quiz), Arc::new(InMemoryCache::new()));

    let config = default_configuration();
    gateway.save(&config).await.unwrap();
    assert_eq!(gateway.load().await.unwrap().unwrap(), config);

    // A second save replaces rather than appends.
    gateway.save(&low_high_config()).await.unwrap();
    assert_eq!(gateway.load().await.unwrap().unwrap(), low_high_config());
}

#[tokio::test]
async fn save_fails_fast_and_reports_stage() {
    let repo = FailingRepository::new(None);
    let gateway = QuizGateway::new(Arc::new(repo.clone()), Arc::new(InMemoryCache::new()));
    gateway.save(&default_configuration()).await.unwrap();

    repo.set_failure(Some(FailAt::Insert(Collection::Options)));
    let err = gateway.save(&low_high_config()).await.unwrap_err();
    assert_eq!(err.stage, SaveStage::Insert(Collection::Options));

    // Questions were already replaced; options and results were not rewritten.
    assert_eq!(repo.inner.fetch_questions().await.unwrap().len(), 2);
    assert!(repo.inner.fetch_options().await.unwrap().is_empty());
    assert!(repo.inner.fetch_results().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_failure_stops_before_inserts() {
    let repo = FailingRepository::new(Some(FailAt::Clear(Collection::Results)));
    let gateway = QuizGateway::new(Arc::new(repo.clone()), Arc::new(InMemoryCache::new()));
    let err = gateway.save(&low_high_config()).await.unwrap_err();
    assert_eq!(err.stage, SaveStage::Clear(Collection::Results));
    assert!(repo.inner.fetch_questions().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_remote_keeps_cached_snapshot() {
    let repo = FailingRepository::new(Some(FailAt::Fetch));
    let cache = InMemoryCache::new();
    cache
        .set(
            CONFIG_SNAPSHOT_KEY,
            &serde_json::to_string(&low_high_config()).unwrap(),
        )
        .unwrap();

    let store = ConfigStore::seeded(QuizGateway::new(Arc::new(repo.clone()), Arc::new(cache)));
    assert_eq!(store.revalidate().await, ConfigSource::Cached);
    assert_eq!(*store.current(), low_high_config());
    assert!(repo.inner.fetch_questions().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_remote_without_cache_uses_defaults() {
    let repo = FailingRepository::new(Some(FailAt::Fetch));
    let store = ConfigStore::seeded(QuizGateway::new(
        Arc::new(repo.clone()),
        Arc::new(InMemoryCache::new()),
    ));
    assert_eq!(
        store.revalidate().await,
        ConfigSource::Defaults { persisted: true }
    );
    assert_eq!(store.current().question_count(), 11);
}

#[tokio::test]
async fn failed_default_persist_is_not_fatal() {
    let repo = FailingRepository::new(Some(FailAt::Insert(Collection::Questions)));
    let gateway = QuizGateway::new(Arc::new(repo), Arc::new(InMemoryCache::new()));
    let loaded = gateway.load_or_default().await;
    assert_eq!(loaded.source, ConfigSource::Defaults { persisted: false });
    assert_eq!(loaded.config, default_configuration());
}

/// Questions without options, as left behind by a save that failed after
/// inserting questions.
async fn seed_half_saved_rows(repo: &InMemoryRepository) {
    repo.insert_questions(&[QuestionRecord {
        question_id: "custom1".parse().unwrap(),
        question: "Admin's own question".into(),
        sort_order: 0,
    }])
    .await
    .unwrap();
    repo.insert_results(&[ResultRecord {
        result_id: "mine".parse().unwrap(),
        name: "Mine".into(),
        min_score: 1.0,
        max_score: 5.0,
        description: String::new(),
        embed_html: None,
        redirect_url: None,
        sort_order: 0,
    }])
    .await
    .unwrap();
}

#[tokio::test]
async fn invalid_remote_rows_survive_revalidation() {
    let repo = InMemoryRepository::new();
    seed_half_saved_rows(&repo).await;

    let store = ConfigStore::seeded(QuizGateway::new(
        Arc::new(repo.clone()),
        Arc::new(InMemoryCache::new()),
    ));
    assert_eq!(
        store.revalidate().await,
        ConfigSource::Defaults { persisted: false }
    );
    assert_eq!(store.current().question_count(), 11);

    let questions = repo.fetch_questions().await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question_id.as_str(), "custom1");
    assert_eq!(repo.fetch_results().await.unwrap()[0].result_id.as_str(), "mine");
    assert!(repo.fetch_options().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_remote_rows_keep_cached_snapshot() {
    let repo = InMemoryRepository::new();
    seed_half_saved_rows(&repo).await;
    let cache = InMemoryCache::new();
    cache
        .set(
            CONFIG_SNAPSHOT_KEY,
            &serde_json::to_string(&low_high_config()).unwrap(),
        )
        .unwrap();

    let gateway = QuizGateway::new(Arc::new(repo.clone()), Arc::new(cache));
    let loaded = gateway.load_or_default().await;
    assert_eq!(loaded.source, ConfigSource::Cached);
    assert_eq!(loaded.config, low_high_config());

    let store = ConfigStore::seeded(gateway);
    assert_eq!(store.revalidate().await, ConfigSource::Cached);
    assert_eq!(repo.fetch_questions().await.unwrap().len(), 1);
}
