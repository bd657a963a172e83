use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::events::{append_event, DomainEvent};
use crate::models::Comment;

use super::scream_helpers::fetch_scream;

/// Creates the comment and bumps the scream's denormalized comment_count in
/// one transaction, so the counter always equals the number of comment rows.
pub async fn insert_comment_in_db(
    pool: &SqlitePool,
    scream_id: i64,
    handle: &str,
    body: &str,
    user_image: &str,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;

    fetch_scream(&mut tx, scream_id).await?;

    sqlx::query("UPDATE screams SET comment_count = comment_count + 1 WHERE id = $1")
        .bind(scream_id)
        .execute(&mut tx)
        .await?;

    let comment = sqlx::query_as::<Sqlite, Comment>(
        "INSERT INTO comments (scream_id, user_handle, body, created_at, user_image) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, scream_id, user_handle, body, created_at, user_image",
    )
    .bind(scream_id)
    .bind(handle)
    .bind(body)
    .bind(Utc::now())
    .bind(user_image)
    .fetch_one(&mut tx)
    .await?;

    append_event(
        &mut tx,
        &DomainEvent::CommentCreated {
            comment_id: comment.id,
            scream_id,
            user_handle: handle.to_owned(),
        },
    )
    .await?;

    tx.commit().await?;
    Ok(comment)
}
