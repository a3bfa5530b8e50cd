use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::Utc;

use detailops_clients::ClientId;
use detailops_core::{EntityId, UserId};
use detailops_infra::Pagination;
use detailops_scheduling::{Appointment, AppointmentId, SlotWindow};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/:id", patch(update_appointment))
        .route("/:id/cancel", post(cancel_appointment))
}

fn parse_entity_id(s: &str, what: &'static str) -> Result<EntityId, axum::response::Response> {
    s.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid {what}"),
        )
    })
}

pub async fn create_appointment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateAppointmentRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "appointments.manage") {
        return errors::authz_error_to_response(e);
    }

    let start = match dto::parse_datetime(&body.start_time, "start_time") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let end = match dto::parse_datetime(&body.end_time, "end_time") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let window = match SlotWindow::new(start, end) {
        Ok(w) => w,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let client_id = match body.client_id {
        Some(ref raw) => match parse_entity_id(raw, "client id") {
            Ok(id) => Some(ClientId::new(id)),
            Err(resp) => return resp,
        },
        None => None,
    };
    let technician = match body.technician_id {
        Some(ref raw) => match raw.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid technician id",
                );
            }
        },
        None => None,
    };

    let created_by = UserId::from_uuid(*principal.principal_id().as_uuid());
    let appointment = match Appointment::schedule(
        AppointmentId::new(EntityId::new()),
        tenant.tenant_id(),
        body.service,
        client_id,
        technician,
        window,
        body.notes,
        created_by,
        Utc::now(),
    ) {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let id = appointment.id_typed();
    if let Err(e) = services.scheduling.insert_appointment(appointment) {
        return errors::store_error_to_response(e);
    }

    (
        StatusCode::CREATED,
        Json(serde_json::json!({"id": id.to_string()})),
    )
        .into_response()
}

pub async fn list_appointments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "appointments.read") {
        return errors::authz_error_to_response(e);
    }

    let start = match query.start.as_deref() {
        Some(s) => match dto::parse_datetime(s, "start") {
            Ok(v) => Some(v),
            Err(resp) => return resp,
        },
        None => None,
    };
    let end = match query.end.as_deref() {
        Some(s) => match dto::parse_datetime(s, "end") {
            Ok(v) => Some(v),
            Err(resp) => return resp,
        },
        None => None,
    };

    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(Pagination::DEFAULT_PAGE_SIZE),
    );

    let items = services.scheduling.list_appointments(tenant.tenant_id());
    let filtered: Vec<_> = items
        .into_iter()
        .filter(|a| start.is_none_or(|s| a.start_time() >= s))
        .filter(|a| end.is_none_or(|e| a.start_time() < e))
        .collect();

    let page = pagination
        .apply(filtered)
        .iter()
        .map(dto::appointment_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": page }))).into_response()
}

pub async fn update_appointment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateAppointmentRequest>,
) -> axum::response::Response {
    let id = match parse_entity_id(&id, "appointment id") {
        Ok(v) => AppointmentId::new(v),
        Err(resp) => return resp,
    };

    let Some(mut appointment) = services.scheduling.get_appointment(tenant.tenant_id(), id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "appointment not found");
    };

    // Manage capability or assigned technician; fails closed with no write.
    if let Err(e) = authz::can_manage_appointment(&tenant, &principal, &appointment) {
        return errors::authz_error_to_response(e);
    }

    let now = Utc::now();

    let window = match (body.start_time.as_deref(), body.end_time.as_deref()) {
        (None, None) => None,
        (start, end) => {
            let start = match start {
                Some(s) => match dto::parse_datetime(s, "start_time") {
                    Ok(v) => v,
                    Err(resp) => return resp,
                },
                None => appointment.start_time(),
            };
            let end = match end {
                Some(s) => match dto::parse_datetime(s, "end_time") {
                    Ok(v) => v,
                    Err(resp) => return resp,
                },
                None => appointment.end_time(),
            };
            Some(SlotWindow { start, end })
        }
    };

    let technician = match body.technician_id {
        Some(ref raw) => match raw.parse::<UserId>() {
            Ok(t) => Some(Some(t)),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid technician id",
                );
            }
        },
        None => None,
    };

    if let Err(e) = appointment.update_details(
        body.service,
        window,
        body.notes.map(Some),
        technician,
        now,
    ) {
        return errors::domain_error_to_response(e);
    }

    if let Some(ref status) = body.status {
        let status = match dto::parse_appointment_status(status) {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        if let Err(e) = appointment.transition(status, now) {
            return errors::domain_error_to_response(e);
        }
    }

    match services.scheduling.update_appointment(appointment) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn cancel_appointment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_entity_id(&id, "appointment id") {
        Ok(v) => AppointmentId::new(v),
        Err(resp) => return resp,
    };

    let Some(mut appointment) = services.scheduling.get_appointment(tenant.tenant_id(), id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "appointment not found");
    };

    if let Err(e) = authz::can_manage_appointment(&tenant, &principal, &appointment) {
        return errors::authz_error_to_response(e);
    }

    if let Err(e) = appointment.cancel(Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    match services.scheduling.update_appointment(appointment) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
