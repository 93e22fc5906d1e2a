//! Generated API documentation
//!
//! `/openapi.json` serves the document derived from the handler
//! annotations; `/docs` renders it with the bundled Swagger UI assets.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TagDesk API",
        description = "Submit customer complaints, auto-tagged with a category and sentiment."
    ),
    paths(
        crate::api::root::service_info,
        crate::api::health::health_check,
        crate::api::complaints::create_complaint,
        crate::api::complaints::list_complaints,
        crate::api::complaints::list_urgent,
        crate::api::complaints::complaint_stats,
        crate::api::complaints::get_complaint,
        crate::api::complaints::update_complaint_status,
        crate::api::complaints::delete_complaint,
    ),
    components(schemas(
        tagdesk_common::db::Complaint,
        tagdesk_common::db::Category,
        tagdesk_common::db::Sentiment,
        tagdesk_common::db::ComplaintStatus,
        crate::validation::CreateComplaintRequest,
        crate::api::complaints::UpdateStatusRequest,
        crate::db::ComplaintStats,
        crate::error::ErrorDetail,
        crate::error::FieldError,
        crate::error::ValidationErrorBody,
        crate::api::health::HealthResponse,
        crate::api::root::ServiceInfo,
    )),
    tags(
        (name = "complaints", description = "Complaint intake and triage"),
        (name = "service", description = "Service metadata and health")
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, backed by the document served at `/openapi.json`
pub fn docs_routes() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}
