use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    Extension, Json,
};

use crate::{
    authentication::AuthUser,
    data_formats::{CommentRequest, MessageResponse, ScreamRequest, ScreamWithComments},
    db_helpers::{
        delete_scream_in_db, get_scream_with_comments_in_db, get_user_by_handle,
        insert_comment_in_db, insert_scream_in_db, like_scream_in_db, list_screams_in_db,
        unlike_scream_in_db,
    },
    errors::RequestError,
    models::{Comment, Scream},
    AppState,
};

use super::JsonResult;

pub async fn get_all_screams(Extension(state): Extension<Arc<AppState>>) -> JsonResult<Vec<Scream>> {
    let screams = list_screams_in_db(&state.pool).await?;
    Ok(Json(screams))
}

pub async fn post_scream(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<ScreamRequest>,
) -> JsonResult<Scream> {
    if request.body.trim().is_empty() {
        return Err(RequestError::BadRequest("body", "Field must not be empty"));
    }
    let author = get_user_by_handle(&state.pool, &user.handle)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let scream =
        insert_scream_in_db(&state.pool, &user.handle, &request.body, &author.image_url).await?;
    Ok(Json(scream))
}

pub async fn get_scream(
    Extension(state): Extension<Arc<AppState>>,
    Path(scream_id): Path<i64>,
) -> JsonResult<ScreamWithComments> {
    let scream = get_scream_with_comments_in_db(&state.pool, scream_id).await?;
    Ok(Json(scream))
}

pub async fn delete_scream(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(scream_id): Path<i64>,
) -> Result<(StatusCode, Json<MessageResponse>), RequestError> {
    delete_scream_in_db(&state.pool, scream_id, &user.handle).await?;
    state.wakeup.notify_one();
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Scream deleted successfully",
        }),
    ))
}

pub async fn like_scream(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(scream_id): Path<i64>,
) -> JsonResult<ScreamWithComments> {
    let scream = like_scream_in_db(&state.pool, scream_id, &user.handle).await?;
    state.wakeup.notify_one();
    Ok(Json(scream))
}

pub async fn unlike_scream(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(scream_id): Path<i64>,
) -> JsonResult<ScreamWithComments> {
    let scream = unlike_scream_in_db(&state.pool, scream_id, &user.handle).await?;
    state.wakeup.notify_one();
    Ok(Json(scream))
}

pub async fn comment_on_scream(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(scream_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> JsonResult<Comment> {
    if request.body.trim().is_empty() {
        return Err(RequestError::BadRequest(
            "comment",
            "Field must not be empty",
        ));
    }
    let author = get_user_by_handle(&state.pool, &user.handle)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let comment = insert_comment_in_db(
        &state.pool,
        scream_id,
        &user.handle,
        &request.body,
        &author.image_url,
    )
    .await?;
    state.wakeup.notify_one();
    Ok(Json(comment))
}
