use sqlx::{Sqlite, SqlitePool};

use crate::models::User;

mod comment_helpers;
mod like_helpers;
mod notification_helpers;
mod scream_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use like_helpers::*;
pub use notification_helpers::*;
pub use scream_helpers::*;
pub use user_helpers::*;

const USER_COLUMNS: &str =
    "handle, email, password, created_at, image_url, bio, website, location";

/// Builds `UPDATE ... SET a = ?, b = ?` statements where every field is
/// optional and absent fields must not appear in the query at all.
struct QueryBuilder {
    query: String,
    params: Vec<String>,
    seperator: Option<&'static str>,
    counter: usize,
}

impl QueryBuilder {
    fn new(initial: String, seperator: Option<&'static str>) -> Self {
        Self {
            query: initial,
            params: Vec::new(),
            seperator,
            counter: 0,
        }
    }

    fn add_param(mut self, filter: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            self.query.push_str(filter);
            if let Some(seperator) = self.seperator {
                self.query.push_str(seperator);
            }
            self.params.push(value);
            self.counter += 1;
        }
        self
    }

    fn trim(mut self) -> Self {
        if let Some(seperator) = self.seperator {
            self.query = self.query.trim_end_matches(seperator).to_string();
        }
        self
    }

    fn build(mut self) -> (String, Vec<String>) {
        self = self.trim();
        if self.counter == 0 {
            self.query = String::new();
        }
        (self.query, self.params)
    }
}

// ----------------- Shared User Lookups -----------------

pub async fn get_user_by_handle(
    pool: &SqlitePool,
    handle: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE handle = $1");
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(handle)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await
}
