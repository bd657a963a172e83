use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool};

use crate::data_formats::ScreamWithComments;
use crate::errors::RequestError;
use crate::events::{append_event, DomainEvent};
use crate::models::Like;

use super::scream_helpers::{fetch_comments, fetch_scream};

/// The like/unlike transitions run check, row write, counter bump and event
/// append in one transaction, so concurrent requests for the same
/// (user, scream) pair cannot double-insert or drive the counter negative.
pub async fn like_scream_in_db(
    pool: &SqlitePool,
    scream_id: i64,
    handle: &str,
) -> Result<ScreamWithComments, RequestError> {
    let mut tx = pool.begin().await?;

    fetch_scream(&mut tx, scream_id).await?;

    let existing = sqlx::query("SELECT id FROM likes WHERE scream_id = $1 AND user_handle = $2")
        .bind(scream_id)
        .bind(handle)
        .fetch_optional(&mut tx)
        .await?;
    if existing.is_some() {
        return Err(RequestError::BadRequest("error", "Scream is already liked"));
    }

    let result = sqlx::query("INSERT INTO likes (scream_id, user_handle, created_at) VALUES ($1, $2, $3)")
        .bind(scream_id)
        .bind(handle)
        .bind(Utc::now())
        .execute(&mut tx)
        .await?;
    let like_id = result.last_insert_rowid();

    sqlx::query("UPDATE screams SET like_count = like_count + 1 WHERE id = $1")
        .bind(scream_id)
        .execute(&mut tx)
        .await?;

    append_event(
        &mut tx,
        &DomainEvent::LikeCreated {
            like_id,
            scream_id,
            user_handle: handle.to_owned(),
        },
    )
    .await?;

    let scream = fetch_scream(&mut tx, scream_id).await?;
    let comments = fetch_comments(&mut tx, scream_id).await?;
    tx.commit().await?;
    Ok(ScreamWithComments { scream, comments })
}

pub async fn unlike_scream_in_db(
    pool: &SqlitePool,
    scream_id: i64,
    handle: &str,
) -> Result<ScreamWithComments, RequestError> {
    let mut tx = pool.begin().await?;

    fetch_scream(&mut tx, scream_id).await?;

    let existing = sqlx::query("SELECT id FROM likes WHERE scream_id = $1 AND user_handle = $2")
        .bind(scream_id)
        .bind(handle)
        .fetch_optional(&mut tx)
        .await?;
    let like_id: i64 = match existing {
        Some(row) => row.get("id"),
        None => return Err(RequestError::BadRequest("error", "Scream not liked")),
    };

    sqlx::query("DELETE FROM likes WHERE id = $1")
        .bind(like_id)
        .execute(&mut tx)
        .await?;

    sqlx::query("UPDATE screams SET like_count = like_count - 1 WHERE id = $1")
        .bind(scream_id)
        .execute(&mut tx)
        .await?;

    append_event(&mut tx, &DomainEvent::LikeDeleted { like_id }).await?;

    let scream = fetch_scream(&mut tx, scream_id).await?;
    let comments = fetch_comments(&mut tx, scream_id).await?;
    tx.commit().await?;
    Ok(ScreamWithComments { scream, comments })
}

pub async fn list_likes_by_handle_in_db(
    pool: &SqlitePool,
    handle: &str,
) -> Result<Vec<Like>, RequestError> {
    let likes = sqlx::query_as::<Sqlite, Like>(
        "SELECT id, scream_id, user_handle, created_at FROM likes WHERE user_handle = $1",
    )
    .bind(handle)
    .fetch_all(pool)
    .await?;
    Ok(likes)
}
