//! Row snapshots consumed by the aggregator.
//!
//! These deliberately carry only the fields the reductions read, so the
//! aggregator stays decoupled from the stored entity shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub date: DateTime<Utc>,
    /// Amount in smallest currency unit (e.g., cents).
    pub amount: u64,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub date: DateTime<Utc>,
    /// Amount in smallest currency unit (e.g., cents).
    pub amount: u64,
    pub service_name: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub date: DateTime<Utc>,
    pub rating: f64,
}
