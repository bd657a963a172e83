//! Outbox-style replacement for the storage platform's change triggers.
//!
//! Handlers append a [`DomainEvent`] row in the same transaction as the write
//! that caused it, so an event exists exactly when its triggering row does.
//! A background consumer drains the table in insertion order; each event's
//! side effects and its processed mark commit together, and every effect is
//! idempotent so a crash between commit and re-poll only causes a harmless
//! redelivery.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::storage::ImageStore;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    LikeCreated {
        like_id: i64,
        scream_id: i64,
        user_handle: String,
    },
    LikeDeleted {
        like_id: i64,
    },
    CommentCreated {
        comment_id: i64,
        scream_id: i64,
        user_handle: String,
    },
    ScreamDeleted {
        scream_id: i64,
    },
    UserImageChanged {
        handle: String,
        old_url: String,
        new_url: String,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::LikeCreated { .. } => "like_created",
            DomainEvent::LikeDeleted { .. } => "like_deleted",
            DomainEvent::CommentCreated { .. } => "comment_created",
            DomainEvent::ScreamDeleted { .. } => "scream_deleted",
            DomainEvent::UserImageChanged { .. } => "user_image_changed",
        }
    }
}

/// Appends an event inside the caller's transaction. If the caller rolls
/// back, the event vanishes with the write it described.
pub async fn append_event(
    tx: &mut Transaction<'_, Sqlite>,
    event: &DomainEvent,
) -> Result<(), sqlx::Error> {
    let payload = serde_json::to_string(event).expect("domain events serialize to JSON");
    sqlx::query("INSERT INTO events (kind, payload, created_at) VALUES ($1, $2, $3)")
        .bind(event.kind())
        .bind(payload)
        .bind(Utc::now())
        .execute(tx)
        .await?;
    Ok(())
}

/// Drains all unprocessed events and returns how many were handled. A failed
/// event stops the pass; it stays unprocessed and is retried on the next one.
pub async fn process_pending(pool: &SqlitePool, images: &ImageStore) -> Result<usize> {
    let mut handled = 0;
    loop {
        let row = sqlx::query(
            "SELECT id, payload FROM events WHERE processed_at IS NULL ORDER BY id LIMIT 1",
        )
        .fetch_optional(pool)
        .await?;
        let row = match row {
            Some(row) => row,
            None => return Ok(handled),
        };
        let event_id: i64 = row.get("id");
        let payload: String = row.get("payload");
        let event: DomainEvent = serde_json::from_str(&payload)
            .with_context(|| format!("Malformed payload for event {event_id}"))?;

        let mut tx = pool.begin().await?;
        apply_event(&mut tx, images, &event)
            .await
            .with_context(|| format!("Failed to apply event {event_id}"))?;
        sqlx::query("UPDATE events SET processed_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(event_id)
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        handled += 1;
    }
}

/// Runs the consumer until the process exits. Woken by handlers after they
/// commit an event, with a polling interval as fallback.
pub async fn run_consumer(state: Arc<AppState>) {
    loop {
        tokio::select! {
            _ = state.wakeup.notified() => {}
            _ = tokio::time::sleep(Duration::from_millis(500)) => {}
        }
        match process_pending(&state.pool, &state.images).await {
            Ok(0) => {}
            Ok(n) => tracing::debug!("processed {n} events"),
            Err(e) => tracing::error!("event consumer error: {e:#}"),
        }
    }
}

async fn apply_event(
    tx: &mut Transaction<'_, Sqlite>,
    images: &ImageStore,
    event: &DomainEvent,
) -> Result<()> {
    match event {
        DomainEvent::LikeCreated {
            like_id,
            scream_id,
            user_handle,
        } => {
            notify_scream_owner(tx, "like", *like_id, *scream_id, user_handle).await?;
        }
        DomainEvent::LikeDeleted { like_id } => {
            sqlx::query("DELETE FROM notifications WHERE source_type = 'like' AND source_id = $1")
                .bind(like_id)
                .execute(tx)
                .await?;
        }
        DomainEvent::CommentCreated {
            comment_id,
            scream_id,
            user_handle,
        } => {
            notify_scream_owner(tx, "comment", *comment_id, *scream_id, user_handle).await?;
        }
        DomainEvent::ScreamDeleted { scream_id } => {
            sqlx::query("DELETE FROM comments WHERE scream_id = $1")
                .bind(scream_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM likes WHERE scream_id = $1")
                .bind(scream_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM notifications WHERE scream_id = $1")
                .bind(scream_id)
                .execute(tx)
                .await?;
        }
        DomainEvent::UserImageChanged {
            handle,
            old_url,
            new_url,
        } => {
            // The file delete sits outside the transaction; losing the file
            // of a replaced image is cosmetic, losing the URL update is not.
            if !images.is_placeholder(old_url) {
                images.delete_by_url(old_url).await?;
            }
            sqlx::query("UPDATE screams SET user_image = $1 WHERE user_handle = $2")
                .bind(new_url)
                .bind(handle)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE comments SET user_image = $1 WHERE user_handle = $2")
                .bind(new_url)
                .bind(handle)
                .execute(tx)
                .await?;
        }
    }
    Ok(())
}

/// Inserts the notification for a like or comment, unless the actor is the
/// scream's owner or the scream is already gone. The (source_type, source_id)
/// uniqueness makes redelivery a no-op.
async fn notify_scream_owner(
    tx: &mut Transaction<'_, Sqlite>,
    source_type: &str,
    source_id: i64,
    scream_id: i64,
    sender: &str,
) -> Result<()> {
    let owner = sqlx::query("SELECT user_handle FROM screams WHERE id = $1")
        .bind(scream_id)
        .fetch_optional(&mut *tx)
        .await?;
    let owner: String = match owner {
        Some(row) => row.get("user_handle"),
        None => return Ok(()),
    };
    if owner == sender {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO notifications (source_type, source_id, recipient, sender, type, read, scream_id, created_at)
        VALUES ($1, $2, $3, $4, $1, 0, $5, $6)
        ON CONFLICT (source_type, source_id) DO NOTHING
        "#,
    )
    .bind(source_type)
    .bind(source_id)
    .bind(owner)
    .bind(sender)
    .bind(scream_id)
    .bind(Utc::now())
    .execute(tx)
    .await?;
    Ok(())
}
