use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs versioned migrations for the quiz schema.
///
/// The three collections are independent tables joined only by
/// `question_id`; there are no foreign keys so each can be cleared on its own.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: questions, options, results.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_questions (
                    id INTEGER PRIMARY KEY,
                    question_id TEXT NOT NULL UNIQUE,
                    question TEXT NOT NULL,
                    sort_order INTEGER NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_options (
                    id INTEGER PRIMARY KEY,
                    question_id TEXT NOT NULL,
                    option_id TEXT NOT NULL,
                    text TEXT NOT NULL,
                    value REAL NOT NULL,
                    sort_order INTEGER NOT NULL,
                    UNIQUE (question_id, option_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_results (
                    id INTEGER PRIMARY KEY,
                    result_id TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    min_score REAL NOT NULL,
                    max_score REAL NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    embed_html TEXT,
                    redirect_url TEXT,
                    sort_order INTEGER NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_questions_sort
                    ON quiz_questions (sort_order);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_options_question_sort
                    ON quiz_options (question_id, sort_order);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_results_sort
                    ON quiz_results (sort_order);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied quiz schema migration");
    }

    Ok(())
}
