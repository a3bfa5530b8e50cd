use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::Utc;

use detailops_clients::ClientId;
use detailops_core::EntityId;
use detailops_invoicing::{Invoice, InvoiceId, InvoiceStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:id", patch(update_invoice))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateInvoiceRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "invoices.manage") {
        return errors::authz_error_to_response(e);
    }

    let client_id = match body.client_id.parse::<EntityId>() {
        Ok(id) => ClientId::new(id),
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid client id");
        }
    };
    let due_date = match dto::parse_datetime(&body.due_date, "due_date") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let invoice = match Invoice::create(
        InvoiceId::new(EntityId::new()),
        tenant.tenant_id(),
        client_id,
        body.amount,
        due_date,
        Utc::now(),
    ) {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let id = invoice.id_typed();
    // Invoice insert + client counter bump, one grouped write.
    match services.billing.create_invoice(invoice) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "invoices.read") {
        return errors::authz_error_to_response(e);
    }

    let items = services
        .billing
        .list_invoices(tenant.tenant_id())
        .iter()
        .map(dto::invoice_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateInvoiceRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "invoices.manage") {
        return errors::authz_error_to_response(e);
    }

    let invoice_id = match id.parse::<EntityId>() {
        Ok(id) => InvoiceId::new(id),
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id");
        }
    };

    let Some(mut invoice) = services.billing.get_invoice(tenant.tenant_id(), invoice_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found");
    };

    let due_date = match body.due_date.as_deref() {
        Some(s) => match dto::parse_datetime(s, "due_date") {
            Ok(v) => Some(v),
            Err(resp) => return resp,
        },
        None => None,
    };

    if body.amount.is_some() || due_date.is_some() {
        if let Err(e) = invoice.update(body.amount, due_date) {
            return errors::domain_error_to_response(e);
        }
    }

    if let Some(ref status) = body.status {
        let target = match dto::parse_invoice_status(status) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let transition = match target {
            InvoiceStatus::Paid => invoice.mark_paid(),
            InvoiceStatus::Void => invoice.void(),
            InvoiceStatus::Pending => Err(detailops_core::DomainError::invariant(
                "invoices cannot be reopened",
            )),
        };
        if let Err(e) = transition {
            return errors::domain_error_to_response(e);
        }
    }

    match services.billing.update_invoice(invoice) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"id": invoice_id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
