use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use detailops_auth::AuthzError;
use detailops_core::DomainError;
use detailops_infra::StoreError;
use detailops_infra::rate_limit::RateLimitError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Authentication => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "unauthenticated")
        }
        DomainError::Authorization(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        DomainError::Provider(msg) => json_error(StatusCode::BAD_GATEWAY, "provider_error", msg),
        DomainError::CancellationWindow(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "cancellation_window", msg)
        }
        DomainError::Overlap(msg) => json_error(StatusCode::CONFLICT, "overlap", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Overlap(msg) => json_error(StatusCode::CONFLICT, "overlap", msg),
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn rate_limit_to_response(err: RateLimitError) -> axum::response::Response {
    json_error(StatusCode::TOO_MANY_REQUESTS, "rate_limited", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
