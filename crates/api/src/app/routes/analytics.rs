use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use detailops_analytics::{TimeRange, build_overview, build_report};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/report", get(report))
        .route("/overview", get(overview))
}

pub async fn report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    // Fail closed before touching any data.
    if let Err(e) = authz::require(&tenant, &principal, "analytics.read") {
        return errors::authz_error_to_response(e);
    }

    let range = match query.time_range.as_deref() {
        Some(s) => match s.parse::<TimeRange>() {
            Ok(r) => r,
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => TimeRange::Month,
    };

    let now = Utc::now();
    let cache_key = (tenant.tenant_id(), range);

    // Reports are cached per (tenant, range); staleness up to the TTL is
    // caller-accepted, nothing invalidates on writes.
    if let Some(cached) = services.report_cache.get(&cache_key, now) {
        return (StatusCode::OK, Json(serde_json::json!(cached))).into_response();
    }

    let (clients, invoices, jobs, feedback) = services.analytics_rows(tenant.tenant_id());
    let report = build_report(now, range, &clients, &invoices, &jobs, &feedback);
    services.report_cache.put(cache_key, report.clone(), now);

    (StatusCode::OK, Json(serde_json::json!(report))).into_response()
}

pub async fn overview(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = authz::require(&tenant, &principal, "analytics.read") {
        return errors::authz_error_to_response(e);
    }

    let (clients, invoices, jobs, _feedback) = services.analytics_rows(tenant.tenant_id());
    let overview = build_overview(Utc::now(), &clients, &invoices, &jobs);

    (StatusCode::OK, Json(serde_json::json!(overview))).into_response()
}
