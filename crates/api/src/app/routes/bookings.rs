use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use detailops_core::{EntityId, UserId};
use detailops_scheduling::{
    Appointment, AppointmentId, AppointmentStatus, Booking, BookingId, BookingStatus,
};
use detailops_services::ServiceId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/:id/status", post(update_booking_status))
        .route("/:id/cancel", post(cancel_booking))
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

/// Release a scheduled appointment back to the open pool, leaving other
/// states untouched.
fn released(appointment: &Appointment, now: chrono::DateTime<Utc>) -> Appointment {
    let mut appointment = appointment.clone();
    if Appointment::can_transition(appointment.status(), AppointmentStatus::Available) {
        // Transition membership was just checked.
        let _ = appointment.release(now);
    }
    appointment
}

pub async fn create_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateBookingRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "bookings.create") {
        return errors::authz_error_to_response(e);
    }

    let appointment_id = match parse_entity_id(&body.appointment_id, "appointment id") {
        Ok(v) => AppointmentId::new(v),
        Err(resp) => return resp,
    };
    let service_id = match parse_entity_id(&body.service_id, "service id") {
        Ok(v) => ServiceId::new(v),
        Err(resp) => return resp,
    };

    let Some(mut appointment) = services
        .scheduling
        .get_appointment(tenant.tenant_id(), appointment_id)
    else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "appointment not found");
    };

    if appointment.status() != AppointmentStatus::Available {
        return errors::json_error(StatusCode::CONFLICT, "conflict", "slot is not available");
    }

    let now = Utc::now();
    if let Err(e) = appointment.transition(AppointmentStatus::Scheduled, now) {
        return errors::domain_error_to_response(e);
    }

    let booking = Booking::create(
        BookingId::new(EntityId::new()),
        tenant.tenant_id(),
        UserId::from_uuid(*principal.principal_id().as_uuid()),
        appointment_id,
        service_id,
        now,
    );
    let booking_id = booking.id_typed();

    if let Err(e) = services.scheduling.insert_booking(booking) {
        return errors::store_error_to_response(e);
    }
    if let Err(e) = services.scheduling.update_appointment(appointment) {
        return errors::store_error_to_response(e);
    }

    (
        StatusCode::CREATED,
        Json(serde_json::json!({"id": booking_id.to_string()})),
    )
        .into_response()
}

pub async fn list_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let all = services.scheduling.list_bookings(tenant.tenant_id());

    // Staff see everything; customers only their own bookings.
    let items: Vec<Booking> = if authz::require(&tenant, &principal, "bookings.manage").is_ok() {
        all
    } else {
        if let Err(e) = authz::require(&tenant, &principal, "bookings.create") {
            return errors::authz_error_to_response(e);
        }
        let me = UserId::from_uuid(*principal.principal_id().as_uuid());
        all.into_iter().filter(|b| b.user_id() == me).collect()
    };

    let items = items.iter().map(dto::booking_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn update_booking_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateBookingStatusRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "bookings.manage") {
        return errors::authz_error_to_response(e);
    }
    if let Err(e) = services
        .rate_limiter
        .check(&principal.principal_id().to_string(), Utc::now())
    {
        return errors::rate_limit_to_response(e);
    }

    let booking_id = match parse_entity_id(&id, "booking id") {
        Ok(v) => BookingId::new(v),
        Err(resp) => return resp,
    };
    let status = match dto::parse_booking_status(&body.status) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Some(mut booking) = services.scheduling.get_booking(tenant.tenant_id(), booking_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "booking not found");
    };

    let now = Utc::now();
    if let Err(e) = booking.set_status(status, now) {
        return errors::domain_error_to_response(e);
    }

    // Cancellation releases the linked appointment in the same grouped write.
    let result = if status == BookingStatus::Cancelled {
        let Some(appointment) = services
            .scheduling
            .get_appointment(tenant.tenant_id(), booking.appointment_id())
        else {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "appointment not found");
        };
        services
            .scheduling
            .apply_booking_cancellation(booking, released(&appointment, now))
    } else {
        services.scheduling.update_booking(booking)
    };

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"id": booking_id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn cancel_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "bookings.cancel") {
        return errors::authz_error_to_response(e);
    }
    if let Err(e) = services
        .rate_limiter
        .check(&principal.principal_id().to_string(), Utc::now())
    {
        return errors::rate_limit_to_response(e);
    }

    let booking_id = match parse_entity_id(&id, "booking id") {
        Ok(v) => BookingId::new(v),
        Err(resp) => return resp,
    };

    let Some(mut booking) = services.scheduling.get_booking(tenant.tenant_id(), booking_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "booking not found");
    };

    // Holders cancel their own bookings; staff can cancel any.
    let me = UserId::from_uuid(*principal.principal_id().as_uuid());
    if booking.user_id() != me
        && authz::require(&tenant, &principal, "bookings.manage").is_err()
    {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "not your booking");
    }

    let Some(appointment) = services
        .scheduling
        .get_appointment(tenant.tenant_id(), booking.appointment_id())
    else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "appointment not found");
    };

    let now = Utc::now();
    if let Err(e) = booking.cancel(appointment.start_time(), now) {
        // Window or transition failure: nothing was written.
        return errors::domain_error_to_response(e);
    }

    match services
        .scheduling
        .apply_booking_cancellation(booking, released(&appointment, now))
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"id": booking_id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
