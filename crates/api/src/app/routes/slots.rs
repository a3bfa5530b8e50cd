use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use detailops_core::{EntityId, UserId};
use detailops_infra::Pagination;
use detailops_scheduling::{Appointment, AppointmentId, AppointmentStatus, SlotWindow};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new().route("/", get(list_slots).post(create_slots))
}

pub async fn create_slots(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateSlotsRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "slots.manage") {
        return errors::authz_error_to_response(e);
    }
    if let Err(e) = services
        .rate_limiter
        .check(&principal.principal_id().to_string(), Utc::now())
    {
        return errors::rate_limit_to_response(e);
    }

    let created_by = UserId::from_uuid(*principal.principal_id().as_uuid());
    let now = Utc::now();

    let mut slots = Vec::with_capacity(body.slots.len());
    for slot in body.slots {
        let start = match dto::parse_datetime(&slot.start_time, "start_time") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let end = match dto::parse_datetime(&slot.end_time, "end_time") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let window = match SlotWindow::new(start, end) {
            Ok(w) => w,
            Err(e) => return errors::domain_error_to_response(e),
        };

        match Appointment::open_slot(
            AppointmentId::new(EntityId::new()),
            tenant.tenant_id(),
            body.service.clone(),
            window,
            created_by,
            now,
        ) {
            Ok(a) => slots.push(a),
            Err(e) => return errors::domain_error_to_response(e),
        }
    }

    match services.scheduling.insert_slots(slots) {
        Ok(ids) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "ids": ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_slots(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "slots.read") {
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

    let now = Utc::now();
    let cache_key = (
        tenant.tenant_id(),
        format!(
            "{}..{}#{}#{}",
            query.start.as_deref().unwrap_or("-"),
            query.end.as_deref().unwrap_or("-"),
            pagination.page,
            pagination.page_size
        ),
    );

    // Stale reads up to the TTL are accepted; there is no invalidation hook.
    let page = match services.slots_cache.get(&cache_key, now) {
        Some(cached) => cached,
        None => {
            let open: Vec<Appointment> = services
                .scheduling
                .list_appointments(tenant.tenant_id())
                .into_iter()
                .filter(|a| a.status() == AppointmentStatus::Available)
                .filter(|a| start.is_none_or(|s| a.start_time() >= s))
                .filter(|a| end.is_none_or(|e| a.start_time() < e))
                .collect();
            let page = pagination.apply(open);
            services.slots_cache.put(cache_key, page.clone(), now);
            page
        }
    };

    let items = page
        .iter()
        .map(dto::appointment_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
