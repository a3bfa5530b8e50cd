//! Job and feedback record intake (the raw rows behind analytics).

use std::sync::Arc;

use axum::{
    Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::post,
};
use chrono::Utc;

use detailops_analytics::{FeedbackRecord, JobRecord};
use detailops_core::EntityId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/jobs", post(record_job))
        .route("/feedback", post(record_feedback))
}

pub async fn record_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RecordJobRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "jobs.manage") {
        return errors::authz_error_to_response(e);
    }

    let date = match body.date.as_deref() {
        Some(s) => match dto::parse_datetime(s, "date") {
            Ok(v) => v,
            Err(resp) => return resp,
        },
        None => Utc::now(),
    };

    if body.service_name.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "service_name must not be empty",
        );
    }

    let id = EntityId::new();
    services.jobs.upsert(
        tenant.tenant_id(),
        id,
        JobRecord {
            date,
            amount: body.amount,
            service_name: body.service_name,
            completed: body.completed.unwrap_or(true),
        },
    );

    (
        StatusCode::CREATED,
        Json(serde_json::json!({"id": id.to_string()})),
    )
        .into_response()
}

pub async fn record_feedback(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RecordFeedbackRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "feedback.submit") {
        return errors::authz_error_to_response(e);
    }

    if !(0.0..=5.0).contains(&body.rating) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "rating must be between 0 and 5",
        );
    }

    let date = match body.date.as_deref() {
        Some(s) => match dto::parse_datetime(s, "date") {
            Ok(v) => v,
            Err(resp) => return resp,
        },
        None => Utc::now(),
    };

    let id = EntityId::new();
    services.feedback.upsert(
        tenant.tenant_id(),
        id,
        FeedbackRecord {
            date,
            rating: body.rating,
        },
    );

    (
        StatusCode::CREATED,
        Json(serde_json::json!({"id": id.to_string()})),
    )
        .into_response()
}
