//! Request/response DTOs and JSON mapping helpers.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use detailops_assessments::{Assessment, IntakeProfile, Severity};
use detailops_clients::Client;
use detailops_invoicing::{Invoice, InvoiceStatus};
use detailops_scheduling::{Appointment, AppointmentStatus, Booking, BookingStatus};
use detailops_services::{FieldType, FieldValue, PriceType, Service};

use crate::app::errors;

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CustomFieldDto {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub options: Option<Vec<String>>,
    pub affects_price: bool,
    pub price_modifier: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: u64,
    pub price_type: String,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldDto>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub base_price: Option<u64>,
    pub price_type: Option<String>,
    pub custom_fields: Option<Vec<CustomFieldDto>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub service: String,
    pub client_id: Option<String>,
    pub technician_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub service: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub technician_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotDto {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSlotsRequest {
    pub service: String,
    pub slots: Vec<SlotDto>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub appointment_id: String,
    pub service_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct VehicleDto {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub vin: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HotspotDto {
    pub part: String,
    pub issue: String,
    pub severity: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectedFieldDto {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct SelectionDto {
    pub service_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub custom_fields: Vec<SelectedFieldDto>,
}

#[derive(Debug, Deserialize)]
pub struct MediaDto {
    pub url: String,
    pub content_type: String,
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    pub client_name: String,
    pub client_email: String,
    pub vehicle: VehicleDto,
    #[serde(default)]
    pub hotspots: Vec<HotspotDto>,
    pub selected_services: Vec<SelectionDto>,
    #[serde(default)]
    pub media: Vec<MediaDto>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsRequest {
    pub vehicle: VehicleDto,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: String,
    pub amount: u64,
    pub due_date: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub amount: Option<u64>,
    pub due_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordJobRequest {
    pub service_name: String,
    pub amount: u64,
    pub completed: Option<bool>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordFeedbackRequest {
    pub rating: f64,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub time_range: Option<String>,
}

// ─── Parse helpers ───────────────────────────────────────────────────────────

pub fn parse_datetime(
    s: &str,
    field: &'static str,
) -> Result<DateTime<Utc>, axum::response::Response> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_datetime",
                format!("{field} must be RFC3339"),
            )
        })
}

pub fn parse_price_type(s: &str) -> Result<PriceType, axum::response::Response> {
    match s {
        "fixed" => Ok(PriceType::Fixed),
        "hourly" => Ok(PriceType::Hourly),
        "variable" => Ok(PriceType::Variable),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_price_type",
            "price_type must be one of: fixed, hourly, variable",
        )),
    }
}

pub fn parse_field_type(s: &str) -> Result<FieldType, axum::response::Response> {
    match s {
        "text" => Ok(FieldType::Text),
        "number" => Ok(FieldType::Number),
        "select" => Ok(FieldType::Select),
        "multiselect" => Ok(FieldType::Multiselect),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_field_type",
            "type must be one of: text, number, select, multiselect",
        )),
    }
}

pub fn parse_severity(s: &str) -> Result<Severity, axum::response::Response> {
    match s {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_severity",
            "severity must be one of: low, medium, high",
        )),
    }
}

pub fn parse_appointment_status(s: &str) -> Result<AppointmentStatus, axum::response::Response> {
    match s {
        "available" => Ok(AppointmentStatus::Available),
        "scheduled" => Ok(AppointmentStatus::Scheduled),
        "completed" => Ok(AppointmentStatus::Completed),
        "cancelled" => Ok(AppointmentStatus::Cancelled),
        "unavailable" => Ok(AppointmentStatus::Unavailable),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: available, scheduled, completed, cancelled, unavailable",
        )),
    }
}

pub fn parse_booking_status(s: &str) -> Result<BookingStatus, axum::response::Response> {
    match s {
        "pending" => Ok(BookingStatus::Pending),
        "confirmed" => Ok(BookingStatus::Confirmed),
        "cancelled" => Ok(BookingStatus::Cancelled),
        "completed" => Ok(BookingStatus::Completed),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: pending, confirmed, cancelled, completed",
        )),
    }
}

pub fn parse_invoice_status(s: &str) -> Result<InvoiceStatus, axum::response::Response> {
    match s {
        "pending" => Ok(InvoiceStatus::Pending),
        "paid" => Ok(InvoiceStatus::Paid),
        "void" => Ok(InvoiceStatus::Void),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: pending, paid, void",
        )),
    }
}

/// Custom-field answers arrive as JSON strings or numbers.
pub fn parse_field_value(value: &Value) -> Result<FieldValue, axum::response::Response> {
    match value {
        Value::Number(n) => n.as_f64().map(FieldValue::Number).ok_or_else(|| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_field_value",
                "numeric field value out of range",
            )
        }),
        Value::String(s) => Ok(FieldValue::Text(s.clone())),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_field_value",
            "field values must be strings or numbers",
        )),
    }
}

// ─── Response mapping ────────────────────────────────────────────────────────

pub fn client_to_json(client: &Client) -> Value {
    json!({
        "id": client.id_typed().to_string(),
        "name": client.name(),
        "email": client.email(),
        "active": client.is_active(),
        "total_invoiced": client.total_invoiced(),
        "created_at": client.created_at().to_rfc3339(),
    })
}

pub fn service_to_json(service: &Service) -> Value {
    json!({
        "id": service.id_typed().to_string(),
        "name": service.name(),
        "description": service.description(),
        "base_price": service.base_price(),
        "price_type": service.price_type(),
        "custom_fields": service.custom_fields(),
        "created_at": service.created_at().to_rfc3339(),
    })
}

pub fn appointment_to_json(appointment: &Appointment) -> Value {
    json!({
        "id": appointment.id_typed().to_string(),
        "service": appointment.service(),
        "client_id": appointment.client_id().map(|c| c.to_string()),
        "technician_id": appointment.technician().map(|t| t.to_string()),
        "start_time": appointment.start_time().to_rfc3339(),
        "end_time": appointment.end_time().to_rfc3339(),
        "notes": appointment.notes(),
        "status": appointment.status(),
        "created_by": appointment.created_by().to_string(),
        "created_at": appointment.created_at().to_rfc3339(),
        "updated_at": appointment.updated_at().to_rfc3339(),
    })
}

pub fn booking_to_json(booking: &Booking) -> Value {
    json!({
        "id": booking.id_typed().to_string(),
        "user_id": booking.user_id().to_string(),
        "appointment_id": booking.appointment_id().to_string(),
        "service_id": booking.service_id().to_string(),
        "status": booking.status(),
        "created_at": booking.created_at().to_rfc3339(),
        "updated_at": booking.updated_at().to_rfc3339(),
    })
}

pub fn assessment_to_json(assessment: &Assessment) -> Value {
    json!({
        "id": assessment.id_typed().to_string(),
        "client_name": assessment.client_name(),
        "client_email": assessment.client_email(),
        "vehicle": assessment.vehicle(),
        "hotspots": assessment.hotspots(),
        "selected_services": assessment.selections(),
        "media": assessment.media(),
        "estimated_price": assessment.estimated_price(),
        "ai_summary": assessment.ai_summary(),
        "status": assessment.status(),
        "created_at": assessment.created_at().to_rfc3339(),
        "updated_at": assessment.updated_at().to_rfc3339(),
    })
}

pub fn invoice_to_json(invoice: &Invoice) -> Value {
    json!({
        "id": invoice.id_typed().to_string(),
        "client_id": invoice.client_id().to_string(),
        "amount": invoice.amount(),
        "due_date": invoice.due_date().to_rfc3339(),
        "status": invoice.status(),
        "created_at": invoice.created_at().to_rfc3339(),
    })
}

pub fn profile_to_json(profile: &IntakeProfile) -> Value {
    json!({
        "tenant_id": profile.tenant_id().to_string(),
        "name": profile.name(),
        "intake_url": profile.intake_url(),
        "qr_code_url": profile.qr_code_url(),
        "created_at": profile.created_at().to_rfc3339(),
        "updated_at": profile.updated_at().to_rfc3339(),
    })
}
