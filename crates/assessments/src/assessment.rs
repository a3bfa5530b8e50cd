use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use detailops_clients::validate_email;
use detailops_core::{DomainError, DomainResult, Entity, EntityId, TenantId};
use detailops_services::ServiceSelection;

use crate::hotspot::Hotspot;
use crate::vehicle::VehicleDetails;

/// Assessment identifier (tenant-scoped via the `tenant_id` field).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub EntityId);

impl AssessmentId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Assessment review lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    Pending,
    Approved,
    Rejected,
}

/// Uploaded media reference (the bytes live in external object storage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    pub content_type: String,
    pub filename: Option<String>,
}

/// Entity: Assessment — one submitted vehicle-condition intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    id: AssessmentId,
    tenant_id: TenantId,
    client_name: String,
    client_email: String,
    vehicle: VehicleDetails,
    hotspots: Vec<Hotspot>,
    selections: Vec<ServiceSelection>,
    media: Vec<MediaItem>,
    /// Estimated price in smallest currency unit (e.g., cents).
    estimated_price: u64,
    ai_summary: Option<String>,
    status: AssessmentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Assessment {
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        id: AssessmentId,
        tenant_id: TenantId,
        client_name: impl Into<String>,
        client_email: impl Into<String>,
        vehicle: VehicleDetails,
        hotspots: Vec<Hotspot>,
        selections: Vec<ServiceSelection>,
        media: Vec<MediaItem>,
        estimated_price: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let client_name = client_name.into();
        let client_email = client_email.into();

        if client_name.trim().is_empty() {
            return Err(DomainError::validation("client name must not be empty"));
        }
        validate_email(&client_email)?;
        vehicle.validate()?;
        if selections.is_empty() {
            return Err(DomainError::validation(
                "an assessment needs at least one selected service",
            ));
        }

        Ok(Self {
            id,
            tenant_id,
            client_name,
            client_email,
            vehicle,
            hotspots,
            selections,
            media,
            estimated_price,
            ai_summary: None,
            status: AssessmentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> AssessmentId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn vehicle(&self) -> &VehicleDetails {
        &self.vehicle
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn selections(&self) -> &[ServiceSelection] {
        &self.selections
    }

    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    pub fn estimated_price(&self) -> u64 {
        self.estimated_price
    }

    pub fn ai_summary(&self) -> Option<&str> {
        self.ai_summary.as_deref()
    }

    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Attach (or overwrite) the optional AI-generated condition summary.
    pub fn attach_ai_summary(&mut self, summary: impl Into<String>, now: DateTime<Utc>) {
        self.ai_summary = Some(summary.into());
        self.updated_at = now;
    }

    pub fn approve(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.review(AssessmentStatus::Approved, now)
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.review(AssessmentStatus::Rejected, now)
    }

    fn review(&mut self, verdict: AssessmentStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != AssessmentStatus::Pending {
            return Err(DomainError::invariant(format!(
                "assessment already reviewed ({:?})",
                self.status
            )));
        }
        self.status = verdict;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Assessment {
    type Id = AssessmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotspot::Severity;
    use detailops_services::ServiceId;

    fn selection() -> ServiceSelection {
        ServiceSelection {
            service_id: ServiceId::new(EntityId::new()),
            quantity: 1,
            custom_fields: vec![],
        }
    }

    fn vehicle() -> VehicleDetails {
        VehicleDetails {
            make: "Mazda".to_string(),
            model: "3".to_string(),
            year: 2021,
            vin: None,
            condition: Some("daily driver".to_string()),
        }
    }

    fn submitted() -> Assessment {
        Assessment::submit(
            AssessmentId::new(EntityId::new()),
            TenantId::new(),
            "Kim Osei",
            "kim@example.com",
            vehicle(),
            vec![Hotspot {
                part: "hood".to_string(),
                issue: "swirl marks".to_string(),
                severity: Severity::Medium,
            }],
            vec![selection()],
            vec![],
            150_00,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn submit_requires_a_service_selection() {
        let err = Assessment::submit(
            AssessmentId::new(EntityId::new()),
            TenantId::new(),
            "Kim Osei",
            "kim@example.com",
            vehicle(),
            vec![],
            vec![],
            vec![],
            0,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn submit_validates_client_email() {
        let err = Assessment::submit(
            AssessmentId::new(EntityId::new()),
            TenantId::new(),
            "Kim Osei",
            "not-an-email",
            vehicle(),
            vec![],
            vec![selection()],
            vec![],
            0,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approval_is_single_shot() {
        let mut assessment = submitted();
        assessment.approve(Utc::now()).unwrap();
        assert_eq!(assessment.status(), AssessmentStatus::Approved);
        assert!(assessment.reject(Utc::now()).is_err());
    }

    #[test]
    fn ai_summary_is_optional_and_attachable_later() {
        let mut assessment = submitted();
        assert_eq!(assessment.ai_summary(), None);
        assessment.attach_ai_summary("clear coat in good shape", Utc::now());
        assert_eq!(assessment.ai_summary(), Some("clear coat in good shape"));
    }
}
