//! `detailops-invoicing` — client invoices.

pub mod invoice;

pub use invoice::{Invoice, InvoiceId, InvoiceStatus};
