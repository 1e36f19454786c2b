/// Admin API Endpoints
///
/// Every handler requires the configured admin bearer token.
use crate::{
    api::middleware::AdminAuth,
    error::{DirectoryError, DirectoryResult},
    notifier::DispatchReport,
    store::{ContactRecord, ContactUpdate, NewContact},
    token::SECRET_VALIDITY_ADMIN_SENDING,
    AppContext,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build admin API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/contacts", get(list_contacts).post(add_contacts))
        .route("/admin/new-contact", post(create_contact))
        .route(
            "/admin/contacts/:email",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/admin/invitations", post(send_invitations))
}

async fn list_contacts(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
) -> DirectoryResult<Json<Vec<ContactRecord>>> {
    Ok(Json(ctx.directory.list_all().await?))
}

#[derive(Debug, Deserialize)]
struct AddContactsRequest {
    /// Addresses separated by `;`
    emails: String,
}

/// Add a bare record for every new address in the list
async fn add_contacts(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
    Json(req): Json<AddContactsRequest>,
) -> DirectoryResult<Json<Vec<ContactRecord>>> {
    let _guard = ctx.directory_lock.lock().await;

    let added = ctx.directory.add_by_email_list(&req.emails).await?;
    tracing::info!("Admin added {} contacts", added.len());

    Ok(Json(added))
}

async fn create_contact(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
    Json(data): Json<NewContact>,
) -> DirectoryResult<Json<ContactRecord>> {
    if !data.email.contains('@') {
        return Err(DirectoryError::Validation(format!(
            "Not an email address: {}",
            data.email
        )));
    }

    let _guard = ctx.directory_lock.lock().await;
    Ok(Json(ctx.directory.create_contact(data).await?))
}

async fn get_contact(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
    Path(email): Path<String>,
) -> DirectoryResult<Json<ContactRecord>> {
    ctx.directory
        .get_by_email(&email)
        .await?
        .map(Json)
        .ok_or_else(|| DirectoryError::NotFound(format!("No contact for {}", email)))
}

#[derive(Debug, Serialize)]
struct UpdateResponse {
    updated: bool,
}

async fn update_contact(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
    Path(email): Path<String>,
    Json(data): Json<ContactUpdate>,
) -> DirectoryResult<Json<UpdateResponse>> {
    let _guard = ctx.directory_lock.lock().await;

    let updated = ctx.directory.update_record(&email, &data).await?;
    Ok(Json(UpdateResponse { updated }))
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    deleted: bool,
}

async fn delete_contact(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
    Path(email): Path<String>,
) -> DirectoryResult<Json<DeleteResponse>> {
    let _guard = ctx.directory_lock.lock().await;

    let deleted = ctx.directory.delete_by_email(&email).await?;
    tracing::info!(email = %email, deleted, "Admin delete");

    Ok(Json(DeleteResponse { deleted }))
}

#[derive(Debug, Deserialize)]
struct InvitationRequest {
    emails: Vec<String>,
}

/// Mail long-lived login links to the given contacts
async fn send_invitations(
    State(ctx): State<AppContext>,
    _auth: AdminAuth,
    Json(req): Json<InvitationRequest>,
) -> DirectoryResult<Json<DispatchReport>> {
    let _guard = ctx.directory_lock.lock().await;

    let report = ctx
        .notifier
        .dispatch_detailed(&req.emails, SECRET_VALIDITY_ADMIN_SENDING)
        .await?;

    Ok(Json(report))
}
