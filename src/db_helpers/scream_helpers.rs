use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::ScreamWithComments;
use crate::errors::RequestError;
use crate::events::{append_event, DomainEvent};
use crate::models::{Comment, Scream};

const SCREAM_COLUMNS: &str =
    "id, user_handle, body, created_at, like_count, comment_count, user_image";

pub async fn list_screams_in_db(pool: &SqlitePool) -> Result<Vec<Scream>, RequestError> {
    let query =
        format!("SELECT {SCREAM_COLUMNS} FROM screams ORDER BY created_at DESC, id DESC");
    let screams = sqlx::query_as::<Sqlite, Scream>(&query)
        .fetch_all(pool)
        .await?;
    Ok(screams)
}

pub async fn list_screams_by_handle_in_db(
    pool: &SqlitePool,
    handle: &str,
) -> Result<Vec<Scream>, RequestError> {
    let query = format!(
        "SELECT {SCREAM_COLUMNS} FROM screams WHERE user_handle = $1 \
         ORDER BY created_at DESC, id DESC"
    );
    let screams = sqlx::query_as::<Sqlite, Scream>(&query)
        .bind(handle)
        .fetch_all(pool)
        .await?;
    Ok(screams)
}

/// New screams start with zeroed counters and the author's current profile
/// image denormalized onto the row.
pub async fn insert_scream_in_db(
    pool: &SqlitePool,
    handle: &str,
    body: &str,
    user_image: &str,
) -> Result<Scream, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "INSERT INTO screams (user_handle, body, created_at, like_count, comment_count, user_image) \
         VALUES ($1, $2, $3, 0, 0, $4) RETURNING {SCREAM_COLUMNS}"
    );
    let scream = sqlx::query_as::<Sqlite, Scream>(&query)
        .bind(handle)
        .bind(body)
        .bind(Utc::now())
        .bind(user_image)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(scream)
}

pub async fn get_scream_with_comments_in_db(
    pool: &SqlitePool,
    scream_id: i64,
) -> Result<ScreamWithComments, RequestError> {
    let mut tx = pool.begin().await?;
    let scream = fetch_scream(&mut tx, scream_id).await?;
    let comments = fetch_comments(&mut tx, scream_id).await?;
    tx.commit().await?;
    Ok(ScreamWithComments { scream, comments })
}

/// Owner-only delete. The cascade over comments, likes and notifications is
/// not done here; the scream-deleted event covers it so cleanup also runs for
/// deletions this handler did not originate.
pub async fn delete_scream_in_db(
    pool: &SqlitePool,
    scream_id: i64,
    requester: &str,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let scream = fetch_scream(&mut tx, scream_id).await?;
    if scream.user_handle != requester {
        return Err(RequestError::NotAuthorized);
    }
    sqlx::query("DELETE FROM screams WHERE id = $1")
        .bind(scream_id)
        .execute(&mut tx)
        .await?;
    append_event(&mut tx, &DomainEvent::ScreamDeleted { scream_id }).await?;
    tx.commit().await?;
    Ok(())
}

pub(super) async fn fetch_scream(
    tx: &mut Transaction<'_, Sqlite>,
    scream_id: i64,
) -> Result<Scream, RequestError> {
    let query = format!("SELECT {SCREAM_COLUMNS} FROM screams WHERE id = $1");
    let scream = sqlx::query_as::<Sqlite, Scream>(&query)
        .bind(scream_id)
        .fetch_optional(&mut *tx)
        .await?;
    match scream {
        Some(scream) => Ok(scream),
        None => Err(RequestError::NotFound("Scream not found")),
    }
}

pub(super) async fn fetch_comments(
    tx: &mut Transaction<'_, Sqlite>,
    scream_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let comments = sqlx::query_as::<Sqlite, Comment>(
        "SELECT id, scream_id, user_handle, body, created_at, user_image FROM comments \
         WHERE scream_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(scream_id)
    .fetch_all(&mut *tx)
    .await?;
    Ok(comments)
}
