mod common;

use common::spawn_app;
use serde_json::{json, Value};

async fn like(app: &common::TestApp, token: &str, scream_id: i64) {
    let response = app
        .client
        .post(format!("{}/scream/{scream_id}/like", app.base))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

async fn notifications_for(app: &common::TestApp, token: &str) -> Vec<Value> {
    let response = app
        .client
        .get(format!("{}/user", app.base))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    body["notifications"].as_array().unwrap().clone()
}

#[tokio::test]
async fn liking_someone_elses_scream_notifies_the_owner() {
    let app = spawn_app().await;
    let owner = app.signup("ape").await;
    let liker = app.signup("gorilla").await;
    let scream = app.post_scream(&owner, "notify me").await;
    let scream_id = scream["screamId"].as_i64().unwrap();

    like(&app, &liker, scream_id).await;
    app.process_events().await;

    let notifications = notifications_for(&app, &owner).await;
    assert_eq!(notifications.len(), 1);
    let notification = &notifications[0];
    assert_eq!(notification["type"], "like");
    assert_eq!(notification["sender"], "gorilla");
    assert_eq!(notification["recipient"], "ape");
    assert_eq!(notification["read"], false);
    assert_eq!(notification["screamId"].as_i64(), Some(scream_id));
}

#[tokio::test]
async fn self_likes_produce_no_notification() {
    let app = spawn_app().await;
    let owner = app.signup("ape").await;
    let scream = app.post_scream(&owner, "I like myself").await;
    let scream_id = scream["screamId"].as_i64().unwrap();

    like(&app, &owner, scream_id).await;
    app.process_events().await;

    assert!(notifications_for(&app, &owner).await.is_empty());
}

#[tokio::test]
async fn unliking_removes_the_notification() {
    let app = spawn_app().await;
    let owner = app.signup("ape").await;
    let liker = app.signup("gorilla").await;
    let scream = app.post_scream(&owner, "fickle fans").await;
    let scream_id = scream["screamId"].as_i64().unwrap();

    like(&app, &liker, scream_id).await;
    app.process_events().await;
    assert_eq!(notifications_for(&app, &owner).await.len(), 1);

    let response = app
        .client
        .post(format!("{}/scream/{scream_id}/unlike", app.base))
        .bearer_auth(&liker)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    app.process_events().await;

    assert!(notifications_for(&app, &owner).await.is_empty());
}

#[tokio::test]
async fn comments_notify_the_owner_and_can_be_marked_read() {
    let app = spawn_app().await;
    let owner = app.signup("ape").await;
    let commenter = app.signup("gorilla").await;
    let scream = app.post_scream(&owner, "discuss").await;
    let scream_id = scream["screamId"].as_i64().unwrap();

    let response = app
        .client
        .post(format!("{}/scream/{scream_id}/comment", app.base))
        .bearer_auth(&commenter)
        .json(&json!({ "body": "nice one, mate!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    app.process_events().await;

    let notifications = notifications_for(&app, &owner).await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "comment");
    assert_eq!(notifications[0]["read"], false);
    let id = notifications[0]["notificationId"].as_i64().unwrap();

    let response = app
        .client
        .post(format!("{}/notifications", app.base))
        .bearer_auth(&owner)
        .json(&json!([id]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Notifications marked as read");

    let notifications = notifications_for(&app, &owner).await;
    assert_eq!(notifications[0]["read"], true);
}

#[tokio::test]
async fn redelivered_like_events_do_not_duplicate_notifications() {
    let app = spawn_app().await;
    let owner = app.signup("ape").await;
    let liker = app.signup("gorilla").await;
    let scream = app.post_scream(&owner, "at most once").await;
    let scream_id = scream["screamId"].as_i64().unwrap();

    like(&app, &liker, scream_id).await;
    app.process_events().await;

    // simulate the consumer crashing after the effect but before the mark
    sqlx::query("UPDATE events SET processed_at = NULL")
        .execute(&app.state.pool)
        .await
        .unwrap();
    app.process_events().await;

    assert_eq!(notifications_for(&app, &owner).await.len(), 1);
}

#[tokio::test]
async fn deleting_a_scream_cascades_to_all_dependents() {
    let app = spawn_app().await;
    let owner = app.signup("ape").await;
    let other = app.signup("gorilla").await;
    let scream = app.post_scream(&owner, "doomed").await;
    let scream_id = scream["screamId"].as_i64().unwrap();

    like(&app, &other, scream_id).await;
    let response = app
        .client
        .post(format!("{}/scream/{scream_id}/comment", app.base))
        .bearer_auth(&other)
        .json(&json!({ "body": "posterity" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    app.process_events().await;

    assert_eq!(
        app.count("SELECT COUNT(*) FROM comments WHERE scream_id = $1", scream_id)
            .await,
        1
    );
    assert_eq!(
        app.count("SELECT COUNT(*) FROM likes WHERE scream_id = $1", scream_id)
            .await,
        1
    );
    assert_eq!(
        app.count(
            "SELECT COUNT(*) FROM notifications WHERE scream_id = $1",
            scream_id
        )
        .await,
        2
    );

    let response = app
        .client
        .delete(format!("{}/scream/{scream_id}", app.base))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    app.process_events().await;

    for table in ["comments", "likes", "notifications"] {
        let rows = app
            .count(
                &format!("SELECT COUNT(*) FROM {table} WHERE scream_id = $1"),
                scream_id,
            )
            .await;
        assert_eq!(rows, 0, "{table} not cleaned up");
    }
}

async fn upload_image(app: &common::TestApp, token: &str, file_name: &str) -> String {
    let part = reqwest::multipart::Part::bytes(b"fake image bytes".to_vec())
        .file_name(file_name.to_owned());
    let form = reqwest::multipart::Form::new().part("image", part);
    let response = app
        .client
        .post(format!("{}/user/image", app.base))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json::<String>().await.unwrap()
}

#[tokio::test]
async fn changing_the_profile_image_propagates_everywhere() {
    let app = spawn_app().await;
    let owner = app.signup("ape").await;
    let other = app.signup("gorilla").await;
    let scream = app.post_scream(&owner, "watch my avatar").await;
    let scream_id = scream["screamId"].as_i64().unwrap();
    let other_scream = app.post_scream(&other, "unaffected").await;

    let response = app
        .client
        .post(format!("{}/scream/{scream_id}/comment", app.base))
        .bearer_auth(&owner)
        .json(&json!({ "body": "my own comment" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let first_url = upload_image(&app, &owner, "me.png").await;
    app.process_events().await;

    let response = app
        .client
        .get(format!("{}/scream/{scream_id}", app.base))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["userImage"], first_url);
    assert_eq!(body["comments"][0]["userImage"], first_url);

    // a second upload replaces the stored file of the first
    let first_file = app
        .image_dir
        .join(first_url.rsplit('/').next().unwrap());
    assert!(first_file.exists());

    let second_url = upload_image(&app, &owner, "me2.jpg").await;
    app.process_events().await;
    assert!(!first_file.exists());

    let response = app
        .client
        .get(format!("{}/scream/{scream_id}", app.base))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["userImage"], second_url);

    // other users' screams keep their own image
    let response = app
        .client
        .get(format!(
            "{}/scream/{}",
            app.base,
            other_scream["screamId"].as_i64().unwrap()
        ))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["userImage"].as_str().unwrap().ends_with("no-img.png"));
}
