use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use detailops_assessments::{AssessmentId, IntakeDraft, MediaItem, VehicleDetails};
use detailops_core::EntityId;
use detailops_services::{SelectedField, ServiceId, ServiceSelection};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_assessments).post(submit_assessment))
        .route("/questions", post(generate_questions))
        .route("/:id", get(get_assessment))
        .route("/:id/approve", post(approve_assessment))
        .route("/:id/reject", post(reject_assessment))
        .route("/:id/insights", post(generate_insight))
        .route("/:id/estimate", post(ai_estimate))
        .route("/:id/deposit", post(request_deposit))
}

fn vehicle_from(dto: dto::VehicleDto) -> VehicleDetails {
    VehicleDetails {
        make: dto.make,
        model: dto.model,
        year: dto.year,
        vin: dto.vin,
        condition: dto.condition,
    }
}

fn parse_assessment_id(s: &str) -> Result<AssessmentId, axum::response::Response> {
    s.parse::<EntityId>().map(AssessmentId::new).map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid assessment id")
    })
}

pub async fn submit_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::SubmitAssessmentRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.submit") {
        return errors::authz_error_to_response(e);
    }

    let mut draft = IntakeDraft::new(body.client_name, body.client_email);

    if let Err(e) = draft.set_vehicle(vehicle_from(body.vehicle)) {
        return errors::domain_error_to_response(e);
    }

    for hotspot in body.hotspots {
        let severity = match dto::parse_severity(&hotspot.severity) {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        if let Err(e) = draft.report_hotspot(hotspot.part, hotspot.issue, severity) {
            return errors::domain_error_to_response(e);
        }
    }

    for selection in body.selected_services {
        let service_id = match selection.service_id.parse::<EntityId>() {
            Ok(id) => ServiceId::new(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid service id",
                );
            }
        };

        let mut custom_fields = Vec::with_capacity(selection.custom_fields.len());
        for field in selection.custom_fields {
            let value = match dto::parse_field_value(&field.value) {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            custom_fields.push(SelectedField {
                name: field.name,
                value,
            });
        }

        draft.select_service(ServiceSelection {
            service_id,
            quantity: selection.quantity,
            custom_fields,
        });
    }

    for media in body.media {
        draft.attach_media(MediaItem {
            url: media.url,
            content_type: media.content_type,
            filename: media.filename,
        });
    }

    let submission = match draft.finish() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .intake
        .submit(tenant.tenant_id(), submission, Utc::now())
    {
        Ok(assessment) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": assessment.id_typed().to_string(),
                "estimated_price": assessment.estimated_price(),
                "status": assessment.status(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_assessments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.review") {
        return errors::authz_error_to_response(e);
    }

    let items = services
        .assessments
        .list(tenant.tenant_id())
        .iter()
        .map(dto::assessment_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.review") {
        return errors::authz_error_to_response(e);
    }

    let id = match parse_assessment_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.assessments.get(tenant.tenant_id(), &id) {
        Some(assessment) => {
            (StatusCode::OK, Json(dto::assessment_to_json(&assessment))).into_response()
        }
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "assessment not found"),
    }
}

async fn review(
    services: Arc<AppServices>,
    tenant: TenantContext,
    principal: PrincipalContext,
    id: String,
    approve: bool,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.review") {
        return errors::authz_error_to_response(e);
    }

    let id = match parse_assessment_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Some(mut assessment) = services.assessments.get(tenant.tenant_id(), &id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "assessment not found");
    };

    let verdict = if approve {
        assessment.approve(Utc::now())
    } else {
        assessment.reject(Utc::now())
    };
    if let Err(e) = verdict {
        return errors::domain_error_to_response(e);
    }

    let status = assessment.status();
    services.assessments.upsert(tenant.tenant_id(), id, assessment);
    (
        StatusCode::OK,
        Json(serde_json::json!({"id": id.to_string(), "status": status})),
    )
        .into_response()
}

pub async fn approve_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    review(services, tenant, principal, id, true).await
}

pub async fn reject_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    review(services, tenant, principal, id, false).await
}

pub async fn generate_insight(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.review") {
        return errors::authz_error_to_response(e);
    }

    let id = match parse_assessment_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    // Best-effort: a provider failure yields summary = null, not an error.
    match services
        .intake
        .generate_insight(tenant.tenant_id(), id, Utc::now())
        .await
    {
        Ok(summary) => {
            (StatusCode::OK, Json(serde_json::json!({ "summary": summary }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn ai_estimate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.review") {
        return errors::authz_error_to_response(e);
    }

    let id = match parse_assessment_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.intake.ai_estimate(tenant.tenant_id(), id).await {
        Ok(estimate) => {
            (StatusCode::OK, Json(serde_json::json!({ "estimate": estimate }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn request_deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.submit") {
        return errors::authz_error_to_response(e);
    }

    let id = match parse_assessment_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.intake.request_deposit(tenant.tenant_id(), id).await {
        Ok(deposit) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "amount": deposit.amount,
                "client_secret": deposit.client_secret,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn generate_questions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::QuestionsRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "assessments.submit") {
        return errors::authz_error_to_response(e);
    }

    match services
        .intake
        .generate_questions(&vehicle_from(body.vehicle))
        .await
    {
        Ok(questions) => {
            (StatusCode::OK, Json(serde_json::json!({ "questions": questions }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
