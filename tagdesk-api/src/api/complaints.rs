//! Complaint endpoints
//!
//! POST/GET /complaints, GET /complaints/urgent, GET /complaints/stats,
//! GET/PATCH/DELETE /complaints/{id}

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tagdesk_common::db::{Category, Complaint, ComplaintStatus, NewComplaint, Sentiment};
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::db::complaints as store;
use crate::db::{ComplaintFilter, ComplaintStats};
use crate::error::{ApiError, ApiResult, ErrorDetail, ValidationErrorBody};
use crate::validation::CreateComplaintRequest;
use crate::AppState;

/// Page size when `limit` is omitted
pub const DEFAULT_LIMIT: i64 = 100;
/// Largest accepted `limit`
pub const MAX_LIMIT: i64 = 500;

/// GET /complaints query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Only complaints in this category
    pub category: Option<Category>,
    /// Only complaints with this sentiment
    pub sentiment: Option<Sentiment>,
    /// Only complaints with this status
    pub status: Option<ComplaintStatus>,
    /// Maximum number of complaints returned (1-500, default 100)
    pub limit: Option<i64>,
}

/// GET /complaints/urgent query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UrgentQuery {
    /// Maximum number of complaints returned (1-500, default 100)
    pub limit: Option<i64>,
}

/// PATCH /complaints/{id} request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ComplaintStatus,
}

fn resolve_limit(limit: Option<i64>) -> ApiResult<i64> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(_) => Err(ApiError::invalid(
            &["query", "limit"],
            format!("limit must be between 1 and {}", MAX_LIMIT),
            "value_error.number.out_of_range",
        )),
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Complaint {} not found", id))
}

/// Submit a complaint
///
/// Validates the submission, tags it with a category and sentiment, then
/// stores it.
#[utoipa::path(
    post,
    path = "/complaints",
    tag = "complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint created and tagged", body = Complaint),
        (status = 400, description = "Malformed JSON body", body = ErrorDetail),
        (status = 422, description = "Submission failed validation", body = ValidationErrorBody),
        (status = 500, description = "Classification or storage failed", body = ErrorDetail)
    )
)]
pub async fn create_complaint(
    State(state): State<AppState>,
    payload: Result<Json<CreateComplaintRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Complaint>)> {
    let Json(request) = payload?;
    state.rules.validate(&request).map_err(ApiError::Validation)?;

    let classification = state.classifier.classify(&request.message).await.map_err(|e| {
        error!(
            customer_id = request.customer_id,
            classifier = state.classifier.name(),
            error = %e,
            "Complaint classification failed"
        );
        ApiError::Classification(e)
    })?;

    let new = NewComplaint {
        customer_id: request.customer_id,
        message: request.message,
        email: request.email,
        category: classification.category,
        sentiment: classification.sentiment,
        sentiment_score: classification.sentiment_score,
    };

    let complaint = store::insert_complaint(&state.db, &new).await.map_err(|e| {
        error!(customer_id = new.customer_id, error = %e, "Failed to store complaint");
        ApiError::Internal(format!("Failed to create complaint: {}", e))
    })?;

    info!(
        complaint_id = complaint.id,
        customer_id = complaint.customer_id,
        category = %complaint.category,
        sentiment = %complaint.sentiment,
        sentiment_score = complaint.sentiment_score,
        "Complaint created"
    );

    Ok((StatusCode::CREATED, Json(complaint)))
}

/// List complaints, newest first
#[utoipa::path(
    get,
    path = "/complaints",
    tag = "complaints",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching complaints", body = [Complaint]),
        (status = 422, description = "Invalid filter or limit", body = ValidationErrorBody)
    )
)]
pub async fn list_complaints(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Complaint>>> {
    let Query(query) = query?;
    let limit = resolve_limit(query.limit)?;

    let filter = ComplaintFilter {
        category: query.category,
        sentiment: query.sentiment,
        status: query.status,
    };
    let complaints = store::list_complaints(&state.db, &filter, limit).await?;

    tracing::debug!(?filter, limit, returned = complaints.len(), "Listed complaints");
    Ok(Json(complaints))
}

/// List urgent complaints
///
/// Not-closed complaints with NEGATIVE sentiment at or above the urgent
/// threshold, most negative first.
#[utoipa::path(
    get,
    path = "/complaints/urgent",
    tag = "complaints",
    params(UrgentQuery),
    responses(
        (status = 200, description = "Urgent complaints", body = [Complaint]),
        (status = 422, description = "Invalid limit", body = ValidationErrorBody)
    )
)]
pub async fn list_urgent(
    State(state): State<AppState>,
    query: Result<Query<UrgentQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Complaint>>> {
    let Query(query) = query?;
    let limit = resolve_limit(query.limit)?;

    let complaints = store::list_urgent(&state.db, state.urgent_threshold, limit).await?;
    Ok(Json(complaints))
}

/// Complaint counts per category, sentiment and status
#[utoipa::path(
    get,
    path = "/complaints/stats",
    tag = "complaints",
    responses((status = 200, description = "Complaint counts", body = ComplaintStats))
)]
pub async fn complaint_stats(State(state): State<AppState>) -> ApiResult<Json<ComplaintStats>> {
    Ok(Json(store::complaint_stats(&state.db).await?))
}

/// Fetch one complaint
#[utoipa::path(
    get,
    path = "/complaints/{id}",
    tag = "complaints",
    params(("id" = i64, Path, description = "Complaint id")),
    responses(
        (status = 200, description = "The complaint", body = Complaint),
        (status = 404, description = "No such complaint", body = ErrorDetail)
    )
)]
pub async fn get_complaint(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Complaint>> {
    let Path(id) = id?;
    store::get_complaint(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Change a complaint's status
#[utoipa::path(
    patch,
    path = "/complaints/{id}",
    tag = "complaints",
    params(("id" = i64, Path, description = "Complaint id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated complaint", body = Complaint),
        (status = 404, description = "No such complaint", body = ErrorDetail),
        (status = 422, description = "Invalid status", body = ValidationErrorBody)
    )
)]
pub async fn update_complaint_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Complaint>> {
    let Path(id) = id?;
    let Json(request) = payload?;

    let complaint = store::update_status(&state.db, id, request.status)
        .await?
        .ok_or_else(|| not_found(id))?;

    info!(complaint_id = id, status = %complaint.status, "Complaint status updated");
    Ok(Json(complaint))
}

/// Delete a complaint
#[utoipa::path(
    delete,
    path = "/complaints/{id}",
    tag = "complaints",
    params(("id" = i64, Path, description = "Complaint id")),
    responses(
        (status = 204, description = "Complaint deleted"),
        (status = 404, description = "No such complaint", body = ErrorDetail)
    )
)]
pub async fn delete_complaint(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    if !store::delete_complaint(&state.db, id).await? {
        return Err(not_found(id));
    }

    info!(complaint_id = id, "Complaint deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Build complaint routes
pub fn complaint_routes() -> Router<AppState> {
    Router::new()
        .route("/complaints", post(create_complaint).get(list_complaints))
        .route("/complaints/urgent", get(list_urgent))
        .route("/complaints/stats", get(complaint_stats))
        .route(
            "/complaints/:id",
            get(get_complaint)
                .patch(update_complaint_status)
                .delete(delete_complaint),
        )
}
