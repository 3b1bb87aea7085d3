//! Key-value blob persistence.
//!
//! Each key holds one JSON document. Writes replace the whole document, so the
//! last writer wins.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::entities::kv_entry;
use crate::error::AppError;

pub const PROJECTS_KEY: &str = "universe-projects";
pub const DOMAINS_KEY: &str = "universe-domains";

pub async fn read_raw<C: ConnectionTrait>(conn: &C, key: &str) -> Result<Option<String>, AppError> {
    let entry = kv_entry::Entity::find_by_id(key.to_string())
        .one(conn)
        .await?;
    Ok(entry.map(|entry| entry.value))
}

pub async fn write_raw<C: ConnectionTrait>(
    conn: &C,
    key: &str,
    value: String,
) -> Result<(), AppError> {
    debug!(key, bytes = value.len(), "writing blob");
    let active = kv_entry::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value),
        updated_at: Set(Utc::now()),
    };
    kv_entry::Entity::insert(active)
        .on_conflict(
            OnConflict::column(kv_entry::Column::Key)
                .update_columns([kv_entry::Column::Value, kv_entry::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Reads and decodes the document under `key`. A malformed document is an error.
pub async fn read_json<C, T>(conn: &C, key: &str) -> Result<Option<T>, AppError>
where
    C: ConnectionTrait,
    T: DeserializeOwned,
{
    match read_raw(conn, key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn write_json<C, T>(conn: &C, key: &str, value: &T) -> Result<(), AppError>
where
    C: ConnectionTrait,
    T: Serialize + ?Sized,
{
    write_raw(conn, key, serde_json::to_string(value)?).await
}
