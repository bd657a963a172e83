use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::Notification;

/// Only the most recent notifications are returned; the client marks the
/// ones it rendered as read through [`mark_notifications_read_in_db`].
pub async fn list_notifications_in_db(
    pool: &SqlitePool,
    recipient: &str,
) -> Result<Vec<Notification>, RequestError> {
    let notifications = sqlx::query_as::<Sqlite, Notification>(
        "SELECT id, recipient, sender, type, read, scream_id, created_at FROM notifications \
         WHERE recipient = $1 ORDER BY created_at DESC, id DESC LIMIT 10",
    )
    .bind(recipient)
    .fetch_all(pool)
    .await?;
    Ok(notifications)
}

/// Marks the whole batch read in one transaction. Only the caller's own
/// notifications are touched; foreign or unknown ids are ignored.
pub async fn mark_notifications_read_in_db(
    pool: &SqlitePool,
    recipient: &str,
    ids: &[i64],
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    for id in ids {
        sqlx::query("UPDATE notifications SET read = 1 WHERE id = $1 AND recipient = $2")
            .bind(id)
            .bind(recipient)
            .execute(&mut tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
