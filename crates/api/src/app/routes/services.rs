use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::Utc;

use detailops_core::EntityId;
use detailops_services::{CustomField, Service, ServiceId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_services).post(create_service))
        .route("/:id", patch(update_service))
}

fn custom_fields_from(
    fields: Vec<dto::CustomFieldDto>,
) -> Result<Vec<CustomField>, axum::response::Response> {
    fields
        .into_iter()
        .map(|f| {
            Ok(CustomField {
                name: f.name,
                field_type: dto::parse_field_type(&f.field_type)?,
                options: f.options,
                affects_price: f.affects_price,
                price_modifier: f.price_modifier,
            })
        })
        .collect()
}

pub async fn create_service(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateServiceRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "services.manage") {
        return errors::authz_error_to_response(e);
    }

    let price_type = match dto::parse_price_type(&body.price_type) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let custom_fields = match custom_fields_from(body.custom_fields) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let service = match Service::create(
        ServiceId::new(EntityId::new()),
        tenant.tenant_id(),
        body.name,
        body.description,
        body.base_price,
        price_type,
        custom_fields,
        Utc::now(),
    ) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let id = service.id_typed();
    services.catalog.upsert(tenant.tenant_id(), id, service);

    (
        StatusCode::CREATED,
        Json(serde_json::json!({"id": id.to_string()})),
    )
        .into_response()
}

pub async fn list_services(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "services.read") {
        return errors::authz_error_to_response(e);
    }

    let items = services
        .catalog
        .list(tenant.tenant_id())
        .iter()
        .map(dto::service_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn update_service(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateServiceRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "services.manage") {
        return errors::authz_error_to_response(e);
    }

    let id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid service id");
        }
    };
    let service_id = ServiceId::new(id);

    let Some(mut service) = services.catalog.get(tenant.tenant_id(), &service_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "service not found");
    };

    if body.base_price.is_some() || body.price_type.is_some() {
        let price_type = match body.price_type {
            Some(ref s) => match dto::parse_price_type(s) {
                Ok(v) => v,
                Err(resp) => return resp,
            },
            None => service.price_type(),
        };
        service.update_pricing(body.base_price.unwrap_or(service.base_price()), price_type);
    }

    if let Some(fields) = body.custom_fields {
        let custom_fields = match custom_fields_from(fields) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        if let Err(e) = service.replace_custom_fields(custom_fields) {
            return errors::domain_error_to_response(e);
        }
    }

    services.catalog.upsert(tenant.tenant_id(), service_id, service);
    (
        StatusCode::OK,
        Json(serde_json::json!({"id": service_id.to_string()})),
    )
        .into_response()
}
