//! `detailops-services` — service catalog and price estimation.

pub mod pricing;
pub mod service;

pub use pricing::{FieldValue, SelectedField, ServiceSelection, estimate_total};
pub use service::{CustomField, FieldType, PriceType, Service, ServiceId};
