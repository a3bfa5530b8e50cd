use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use detailops_assessments::IntakeProfile;
use detailops_infra::providers::qr_data_url;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(upsert_profile))
        .route("/me", get(get_profile))
}

/// Create (or refresh) the tenant's public intake profile, idempotently
/// keyed by tenant.
pub async fn upsert_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProfileRequest>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "tenants.manage") {
        return errors::authz_error_to_response(e);
    }

    let tenant_id = tenant.tenant_id();
    let intake_url = IntakeProfile::intake_url_for(&services.public_base_url, tenant_id);
    let qr_code_url = match qr_data_url(&intake_url) {
        Ok(url) => url,
        Err(e) => return errors::json_error(StatusCode::BAD_GATEWAY, "provider_error", e.to_string()),
    };

    let now = Utc::now();
    let (status, profile) = match services.profiles.get(tenant_id, &tenant_id) {
        Some(mut existing) => {
            if let Err(e) = existing.refresh(body.name, intake_url, qr_code_url, now) {
                return errors::domain_error_to_response(e);
            }
            (StatusCode::OK, existing)
        }
        None => match IntakeProfile::create(tenant_id, body.name, intake_url, qr_code_url, now) {
            Ok(profile) => (StatusCode::CREATED, profile),
            Err(e) => return errors::domain_error_to_response(e),
        },
    };

    services.profiles.upsert(tenant_id, tenant_id, profile.clone());
    (status, Json(dto::profile_to_json(&profile))).into_response()
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "tenants.manage") {
        return errors::authz_error_to_response(e);
    }

    match services.profiles.get(tenant.tenant_id(), &tenant.tenant_id()) {
        Some(profile) => (StatusCode::OK, Json(dto::profile_to_json(&profile))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "no intake profile yet"),
    }
}
