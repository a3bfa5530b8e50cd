use axum::{Router, routing::get};

pub mod analytics;
pub mod appointments;
pub mod assessments;
pub mod bookings;
pub mod clients;
pub mod invoices;
pub mod records;
pub mod services;
pub mod slots;
pub mod system;
pub mod tenants;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/clients", clients::router())
        .nest("/services", services::router())
        .nest("/appointments", appointments::router())
        .nest("/slots", slots::router())
        .nest("/bookings", bookings::router())
        .nest("/assessments", assessments::router())
        .nest("/invoices", invoices::router())
        .nest("/analytics", analytics::router())
        .nest("/tenants", tenants::router())
        .merge(records::router())
}
