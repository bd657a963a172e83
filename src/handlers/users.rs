use std::sync::Arc;

use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    authentication::{get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser},
    data_formats::{
        AuthenticatedUserResponse, LoginRequest, MessageResponse, SignupRequest, TokenResponse,
        UpdateDetailsRequest, UserDetailsResponse,
    },
    db_helpers::{
        get_user_by_email, get_user_by_handle, insert_user, list_likes_by_handle_in_db,
        list_notifications_in_db, list_screams_by_handle_in_db, mark_notifications_read_in_db,
        set_user_image_in_db, update_user_details_in_db,
    },
    errors::RequestError,
    validation::{reduce_user_details, validate_login, validate_signup},
    AppState,
};

use super::JsonResult;

pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), RequestError> {
    validate_signup(&request)?;

    let password_hash = hash_password_argon2(request.password)
        .await
        .map_err(|_| RequestError::ServerError("Could not hash password"))?;

    insert_user(
        &state.pool,
        &request.handle,
        &request.email,
        &password_hash,
        &state.images.placeholder_url(),
    )
    .await?;

    let token = get_jwt_token(&request.handle)
        .map_err(|_| RequestError::ServerError("Could not generate token"))?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> JsonResult<TokenResponse> {
    validate_login(&request)?;

    let user = get_user_by_email(&state.pool, &request.email)
        .await?
        .ok_or(RequestError::BadRequest(
            "email",
            "There is no user registered with that email address",
        ))?;

    let password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| RequestError::ServerError("Could not verify password"))?;
    if !password_correct {
        return Err(RequestError::WrongPassword);
    }

    let token = get_jwt_token(&user.handle)
        .map_err(|_| RequestError::ServerError("Could not generate token"))?;
    Ok(Json(TokenResponse { token }))
}

/// Stores the uploaded file and points the profile at it. The old file
/// cleanup and the denormalized user_image propagation run through the
/// image-changed event, off the request path.
pub async fn upload_image(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> JsonResult<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| RequestError::BadRequest("error", "Malformed multipart body"))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let extension = field
            .file_name()
            .and_then(|name| name.rsplit('.').next())
            .unwrap_or("png")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| RequestError::BadRequest("error", "Malformed multipart body"))?;

        let url = state
            .images
            .store(&extension, &bytes)
            .await
            .map_err(|_| RequestError::ServerError("Could not store image"))?;
        set_user_image_in_db(&state.pool, &user.handle, &url).await?;
        state.wakeup.notify_one();
        return Ok(Json(url));
    }
    Err(RequestError::BadRequest("image", "Field must not be empty"))
}

pub async fn add_user_details(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<UpdateDetailsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), RequestError> {
    let details = reduce_user_details(request);
    update_user_details_in_db(&state.pool, &user.handle, details).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Details added successfully",
        }),
    ))
}

pub async fn get_authenticated_user(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
) -> JsonResult<AuthenticatedUserResponse> {
    let credentials = get_user_by_handle(&state.pool, &user.handle)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let likes = list_likes_by_handle_in_db(&state.pool, &user.handle).await?;
    let notifications = list_notifications_in_db(&state.pool, &user.handle).await?;
    Ok(Json(AuthenticatedUserResponse {
        credentials,
        likes,
        notifications,
    }))
}

pub async fn get_user_details(
    Extension(state): Extension<Arc<AppState>>,
    Path(handle): Path<String>,
) -> JsonResult<UserDetailsResponse> {
    let credentials = get_user_by_handle(&state.pool, &handle)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let screams = list_screams_by_handle_in_db(&state.pool, &handle).await?;
    Ok(Json(UserDetailsResponse {
        credentials,
        screams,
    }))
}

pub async fn mark_notifications_read(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Json(ids): Json<Vec<i64>>,
) -> JsonResult<MessageResponse> {
    mark_notifications_read_in_db(&state.pool, &user.handle, &ids).await?;
    Ok(Json(MessageResponse {
        message: "Notifications marked as read",
    }))
}
