use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub handle: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub image_url: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scream {
    #[serde(rename = "screamId")]
    pub id: i64,
    pub user_handle: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub comment_count: i64,
    pub user_image: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "commentId")]
    pub id: i64,
    pub scream_id: i64,
    pub user_handle: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub user_image: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "likeId")]
    pub id: i64,
    pub scream_id: i64,
    pub user_handle: String,
    pub created_at: DateTime<Utc>,
}

/// A notification is keyed back to the like or comment that produced it
/// through the (source_type, source_id) pair, which is unique so redelivered
/// events cannot create duplicates. Those columns never leave the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "notificationId")]
    pub id: i64,
    pub recipient: String,
    pub sender: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub scream_id: i64,
    pub created_at: DateTime<Utc>,
}
