use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::events::{append_event, DomainEvent};
use crate::models::User;
use crate::validation::UserDetails;

use super::{get_user_by_handle, QueryBuilder, USER_COLUMNS};

pub async fn insert_user(
    pool: &SqlitePool,
    handle: &str,
    email: &str,
    password_hash: &str,
    image_url: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;

    let taken = sqlx::query("SELECT handle FROM users WHERE handle = $1")
        .bind(handle)
        .fetch_optional(&mut tx)
        .await?;
    if taken.is_some() {
        return Err(RequestError::BadRequest("handle", "Handle is already taken"));
    }

    let query = format!(
        "INSERT INTO users (handle, email, password, created_at, image_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(handle)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(image_url)
        .fetch_one(&mut tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(e) = &e {
                if e.message().contains("UNIQUE constraint failed") {
                    return RequestError::BadRequest("email", "Email is already in use");
                }
            }
            RequestError::Database(e)
        })?;
    tx.commit().await?;
    Ok(user)
}

pub async fn update_user_details_in_db(
    pool: &SqlitePool,
    handle: &str,
    UserDetails {
        bio,
        website,
        location,
    }: UserDetails,
) -> Result<(), RequestError> {
    let (query, params) = QueryBuilder::new("UPDATE users SET ".to_owned(), Some(", "))
        .add_param("bio = ?", bio)
        .add_param("website = ?", website)
        .add_param("location = ?", location)
        .build();
    if query.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    let query = format!("{query} WHERE handle = ?");
    let mut query = sqlx::query(&query);
    for param in params {
        query = query.bind(param);
    }
    query.bind(handle).execute(&mut tx).await?;
    tx.commit().await?;
    Ok(())
}

/// Replaces the user's profile image URL and records the change as an event
/// so the old file cleanup and the scream/comment denormalization happen off
/// the request path. Returns the previous URL.
pub async fn set_user_image_in_db(
    pool: &SqlitePool,
    handle: &str,
    new_url: &str,
) -> Result<String, RequestError> {
    let mut tx = pool.begin().await?;

    let user = get_user_by_handle(pool, handle).await?;
    let old_url = match user {
        Some(user) => user.image_url,
        None => return Err(RequestError::NotFound("User not found")),
    };

    sqlx::query("UPDATE users SET image_url = $1 WHERE handle = $2")
        .bind(new_url)
        .bind(handle)
        .execute(&mut tx)
        .await?;

    if old_url != new_url {
        append_event(
            &mut tx,
            &DomainEvent::UserImageChanged {
                handle: handle.to_owned(),
                old_url: old_url.clone(),
                new_url: new_url.to_owned(),
            },
        )
        .await?;
    }
    tx.commit().await?;
    Ok(old_url)
}
