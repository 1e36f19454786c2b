/// Public and contact-facing endpoints
use crate::{
    error::{DirectoryError, DirectoryResult},
    notifier::SendEmailResult,
    projection::PublicContactView,
    store::ContactUpdate,
    token::{LoginResult, SECRET_VALIDITY_USER_REQUEST},
    AppContext,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build public routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/directory", get(get_directory))
        .route("/login/request", post(request_login))
        .route("/login/validate", post(validate_login))
        .route("/UserLogin/:email/:secret", get(follow_login_link))
        .route("/user/update", post(update_contact))
}

/// Published part of the directory
async fn get_directory(State(ctx): State<AppContext>) -> DirectoryResult<Json<Vec<PublicContactView>>> {
    Ok(Json(ctx.projection.public_view().await?))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct LoginRequestResponse {
    result: SendEmailResult,
}

/// Mail a short-lived login link to a known contact
async fn request_login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> DirectoryResult<Json<LoginRequestResponse>> {
    let _guard = ctx.directory_lock.lock().await;

    let result = ctx
        .notifier
        .dispatch(&[req.email], SECRET_VALIDITY_USER_REQUEST)
        .await?;

    Ok(Json(LoginRequestResponse { result }))
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    email: Option<String>,
    secret: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    result: LoginResult,
}

async fn validate_login(
    State(ctx): State<AppContext>,
    Json(req): Json<ValidateRequest>,
) -> DirectoryResult<Json<ValidateResponse>> {
    let result = ctx
        .tokens
        .validate(req.email.as_deref(), req.secret.as_deref())
        .await?;

    Ok(Json(ValidateResponse { result }))
}

/// Target of the mailed link
async fn follow_login_link(
    State(ctx): State<AppContext>,
    Path((email, secret)): Path<(String, String)>,
) -> DirectoryResult<Json<ValidateResponse>> {
    let result = ctx.tokens.validate(Some(&email), Some(&secret)).await?;
    Ok(Json(ValidateResponse { result }))
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    email: String,
    secret: String,
    #[serde(default)]
    data: ContactUpdate,
}

#[derive(Debug, Serialize)]
struct UpdateResponse {
    updated: bool,
}

/// Let a contact edit their own record
async fn update_contact(
    State(ctx): State<AppContext>,
    Json(req): Json<UpdateRequest>,
) -> DirectoryResult<Json<UpdateResponse>> {
    let _guard = ctx.directory_lock.lock().await;

    match ctx.tokens.validate(Some(&req.email), Some(&req.secret)).await? {
        LoginResult::Success => {}
        LoginResult::Wrong => {
            return Err(DirectoryError::Authentication("Wrong secret".to_string()));
        }
        LoginResult::Expired => {
            return Err(DirectoryError::Authentication("Secret expired".to_string()));
        }
    }

    let updated = ctx.directory.update_record(&req.email, &req.data).await?;
    Ok(Json(UpdateResponse { updated }))
}
