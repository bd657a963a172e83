pub mod authentication;
pub mod config;
pub mod data_formats;
pub mod db_helpers;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod storage;
pub mod validation;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tokio::sync::Notify;

use crate::storage::ImageStore;

pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Shared clients, passed into every handler and into the event consumer.
/// `wakeup` lets handlers nudge the consumer right after committing an event
/// instead of waiting for its polling interval.
pub struct AppState {
    pub pool: SqlitePool,
    pub images: ImageStore,
    pub wakeup: Notify,
}

impl AppState {
    pub fn new(pool: SqlitePool, images: ImageStore) -> Self {
        Self {
            pool,
            images,
            wakeup: Notify::new(),
        }
    }
}

pub async fn run_app(state: Arc<AppState>, address: SocketAddr) -> Result<()> {
    let app = make_router(state.clone());
    tokio::spawn(events::run_consumer(state));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {db_url}");
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    let pool = SqlitePool::connect(db_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/screams", get(get_all_screams))
        .route("/scream", post(post_scream))
        .route("/scream/:scream_id", get(get_scream).delete(delete_scream))
        .route("/scream/:scream_id/like", post(like_scream))
        .route("/scream/:scream_id/unlike", post(unlike_scream))
        .route("/scream/:scream_id/comment", post(comment_on_scream))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/user/image", post(upload_image))
        .route("/user", get(get_authenticated_user).post(add_user_details))
        .route("/user/:handle", get(get_user_details))
        .route("/notifications", post(mark_notifications_read));
    Router::new()
        .route("/check_health", get(alive))
        .nest("/api", api)
        .fallback(not_found)
        .layer(Extension(state))
}
