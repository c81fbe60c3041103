use quiz_core::model::{OptionId, QuestionId, TierId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{OptionRecord, QuestionRecord, ResultRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps a driver error, reporting unique-constraint violations as conflicts.
pub(crate) fn db_err(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::Conflict(db.message().to_owned())
        }
        _ => StorageError::Connection(err.to_string()),
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, StorageError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StorageError::Serialization(format!(
            "{field} is not a finite number"
        )))
    }
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuestionRecord, StorageError> {
    Ok(QuestionRecord {
        question_id: QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?)
            .map_err(ser)?,
        question: row.try_get("question").map_err(ser)?,
        sort_order: row.try_get("sort_order").map_err(ser)?,
    })
}

pub(crate) fn map_option_row(row: &SqliteRow) -> Result<OptionRecord, StorageError> {
    Ok(OptionRecord {
        question_id: QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?)
            .map_err(ser)?,
        option_id: OptionId::new(row.try_get::<String, _>("option_id").map_err(ser)?)
            .map_err(ser)?,
        text: row.try_get("text").map_err(ser)?,
        value: finite("value", row.try_get("value").map_err(ser)?)?,
        sort_order: row.try_get("sort_order").map_err(ser)?,
    })
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<ResultRecord, StorageError> {
    Ok(ResultRecord {
        result_id: TierId::new(row.try_get::<String, _>("result_id").map_err(ser)?)
            .map_err(ser)?,
        name: row.try_get("name").map_err(ser)?,
        min_score: finite("min_score", row.try_get("min_score").map_err(ser)?)?,
        max_score: finite("max_score", row.try_get("max_score").map_err(ser)?)?,
        description: row
            .try_get::<Option<String>, _>("description")
            .map_err(ser)?
            .unwrap_or_default(),
        embed_html: row.try_get("embed_html").map_err(ser)?,
        redirect_url: row.try_get("redirect_url").map_err(ser)?,
        sort_order: row.try_get("sort_order").map_err(ser)?,
    })
}
