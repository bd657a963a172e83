use serde::Serialize;

use crate::models::{Comment, Like, Notification, Scream, User};

/// A scream plus its comments, the payload of the single-scream fetch and of
/// the like/unlike transitions (the frontend re-renders the whole card).
#[derive(Debug, Serialize)]
pub struct ScreamWithComments {
    #[serde(flatten)]
    pub scream: Scream,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct AuthenticatedUserResponse {
    pub credentials: User,
    pub likes: Vec<Like>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub struct UserDetailsResponse {
    pub credentials: User,
    pub screams: Vec<Scream>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
