#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use screamer::storage::ImageStore;
use screamer::{get_random_free_port, init_db, make_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;

pub struct TestApp {
    pub base: String,
    pub client: reqwest::Client,
    pub state: Arc<AppState>,
    pub image_dir: PathBuf,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    std::env::set_var("JWT_SECRET", "test-secret");

    let dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", dir.path().join("screamer.db").display());
    let pool = init_db(&db_url).await.expect("Failed to set up test database");

    let image_dir = dir.path().join("images");
    let images = ImageStore::new(&image_dir, "http://localhost/images").unwrap();
    let state = Arc::new(AppState::new(pool, images));

    let (port, addr) = get_random_free_port();
    let router = make_router(state.clone());
    tokio::spawn(async move {
        axum::Server::bind(&addr)
            .serve(router.into_make_service())
            .await
            .unwrap();
    });

    let app = TestApp {
        base: format!("http://127.0.0.1:{port}/api"),
        client: reqwest::Client::new(),
        state,
        image_dir,
        _dir: dir,
    };
    app.wait_until_alive(&format!("http://127.0.0.1:{port}/check_health"))
        .await;
    app
}

impl TestApp {
    async fn wait_until_alive(&self, url: &str) {
        for _ in 0..50 {
            if self.client.get(url).send().await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server did not come up");
    }

    /// Signs up `<handle>@jungle.com` and returns the bearer token.
    pub async fn signup(&self, handle: &str) -> String {
        let response = self
            .client
            .post(format!("{}/signup", self.base))
            .json(&json!({
                "handle": handle,
                "email": format!("{handle}@jungle.com"),
                "password": "secret password",
                "confirmPassword": "secret password",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "signup for {handle} failed");
        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_owned()
    }

    pub async fn post_scream(&self, token: &str, body: &str) -> Value {
        let response = self
            .client
            .post(format!("{}/scream", self.base))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    pub async fn process_events(&self) -> usize {
        screamer::events::process_pending(&self.state.pool, &self.state.images)
            .await
            .expect("event processing failed")
    }

    pub async fn count(&self, query: &str, scream_id: i64) -> i64 {
        sqlx::query_scalar(query)
            .bind(scream_id)
            .fetch_one(&self.state.pool)
            .await
            .unwrap()
    }
}
