use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use super::SqliteRepository;
use super::mapping::{db_err, map_option_row, map_question_row, map_result_row};
use crate::repository::{
    Collection, OptionRecord, QuestionRecord, QuizRepository, ResultRecord, StorageError,
};

#[async_trait]
impl QuizRepository for SqliteRepository {
    async fn fetch_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT question_id, question, sort_order
            FROM quiz_questions
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn fetch_options(&self) -> Result<Vec<OptionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT question_id, option_id, text, value, sort_order
            FROM quiz_options
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_option_row).collect()
    }

    async fn fetch_results(&self) -> Result<Vec<ResultRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT result_id, name, min_score, max_score, description, embed_html, redirect_url, sort_order
            FROM quiz_results
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_result_row).collect()
    }

    async fn clear(&self, collection: Collection) -> Result<(), StorageError> {
        let sql = match collection {
            Collection::Questions => "DELETE FROM quiz_questions",
            Collection::Options => "DELETE FROM quiz_options",
            Collection::Results => "DELETE FROM quiz_results",
        };
        let res = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        tracing::debug!(%collection, removed = res.rows_affected(), "cleared collection");
        Ok(())
    }

    async fn insert_questions(&self, rows: &[QuestionRecord]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO quiz_questions (question_id, question, sort_order) ");
        qb.push_values(rows, |mut b, row| {
            b.push_bind(row.question_id.as_str())
                .push_bind(row.question.as_str())
                .push_bind(row.sort_order);
        });
        qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }

    async fn insert_options(&self, rows: &[OptionRecord]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO quiz_options (question_id, option_id, text, value, sort_order) ",
        );
        qb.push_values(rows, |mut b, row| {
            b.push_bind(row.question_id.as_str())
                .push_bind(row.option_id.as_str())
                .push_bind(row.text.as_str())
                .push_bind(row.value)
                .push_bind(row.sort_order);
        });
        qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }

    async fn insert_results(&self, rows: &[ResultRecord]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO quiz_results (result_id, name, min_score, max_score, description, embed_html, redirect_url, sort_order) ",
        );
        qb.push_values(rows, |mut b, row| {
            b.push_bind(row.result_id.as_str())
                .push_bind(row.name.as_str())
                .push_bind(row.min_score)
                .push_bind(row.max_score)
                .push_bind(row.description.as_str())
                .push_bind(row.embed_html.as_deref())
                .push_bind(row.redirect_url.as_deref())
                .push_bind(row.sort_order);
        });
        qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }
}
