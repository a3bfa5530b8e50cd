//! `detailops-assessments` — vehicle condition intake.
//!
//! Covers the assessment entity, the hotspot condition report, the step-wise
//! intake draft assembled by the public intake flow, and the tenant's public
//! intake profile (QR identity).

pub mod assessment;
pub mod hotspot;
pub mod intake;
pub mod profile;
pub mod vehicle;

pub use assessment::{Assessment, AssessmentId, AssessmentStatus, MediaItem};
pub use hotspot::{Hotspot, HotspotReport, Severity};
pub use intake::{IntakeDraft, IntakeSubmission};
pub use profile::IntakeProfile;
pub use vehicle::VehicleDetails;
