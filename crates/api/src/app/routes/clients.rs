use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::Utc;

use detailops_clients::{Client, ClientId};
use detailops_core::EntityId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", patch(update_client).delete(remove_client))
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateClientRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "clients.manage") {
        return errors::authz_error_to_response(e);
    }

    let client = match Client::create(
        ClientId::new(EntityId::new()),
        tenant.tenant_id(),
        body.name,
        body.email,
        Utc::now(),
    ) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let id = client.id_typed();
    if let Err(e) = services.billing.insert_client(client) {
        return errors::store_error_to_response(e);
    }

    (
        StatusCode::CREATED,
        Json(serde_json::json!({"id": id.to_string()})),
    )
        .into_response()
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "clients.read") {
        return errors::authz_error_to_response(e);
    }

    let items = services
        .billing
        .list_clients(tenant.tenant_id())
        .iter()
        .map(dto::client_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateClientRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "clients.manage") {
        return errors::authz_error_to_response(e);
    }

    let id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid client id"),
    };
    let client_id = ClientId::new(id);

    let Some(mut client) = services.billing.get_client(tenant.tenant_id(), client_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "client not found");
    };

    if let Some(name) = body.name {
        if let Err(e) = client.rename(name) {
            return errors::domain_error_to_response(e);
        }
    }
    if let Some(email) = body.email {
        if let Err(e) = client.change_email(email) {
            return errors::domain_error_to_response(e);
        }
    }
    if let Some(active) = body.active {
        if active {
            client.reactivate();
        } else {
            client.deactivate();
        }
    }

    match services.billing.update_client(client) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"id": client_id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn remove_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "clients.manage") {
        return errors::authz_error_to_response(e);
    }

    let id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid client id"),
    };

    match services
        .billing
        .remove_client(tenant.tenant_id(), ClientId::new(id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
