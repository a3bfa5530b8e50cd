//! Step-wise intake draft.
//!
//! The public intake page walks a customer through vehicle details, hotspot
//! condition, service selection, media upload and an optional AI step. Each
//! step lands in this draft; `finish()` validates the combined payload.

use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult};
use detailops_services::ServiceSelection;

use crate::assessment::MediaItem;
use crate::hotspot::{Hotspot, HotspotReport, Severity};
use crate::vehicle::VehicleDetails;

/// Accumulating intake state, one per in-progress submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeDraft {
    client_name: String,
    client_email: String,
    vehicle: Option<VehicleDetails>,
    hotspots: HotspotReport,
    selections: Vec<ServiceSelection>,
    media: Vec<MediaItem>,
}

/// Validated payload produced by [`IntakeDraft::finish`], ready for pricing
/// and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeSubmission {
    pub client_name: String,
    pub client_email: String,
    pub vehicle: VehicleDetails,
    pub hotspots: Vec<Hotspot>,
    pub selections: Vec<ServiceSelection>,
    pub media: Vec<MediaItem>,
}

impl IntakeDraft {
    pub fn new(client_name: impl Into<String>, client_email: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            client_email: client_email.into(),
            ..Self::default()
        }
    }

    /// Step 1: vehicle details (replaces any prior value).
    pub fn set_vehicle(&mut self, vehicle: VehicleDetails) -> DomainResult<&mut Self> {
        vehicle.validate()?;
        self.vehicle = Some(vehicle);
        Ok(self)
    }

    /// Step 2: report a hotspot; re-reporting a part replaces its entry.
    pub fn report_hotspot(
        &mut self,
        part: impl Into<String>,
        issue: impl Into<String>,
        severity: Severity,
    ) -> DomainResult<&mut Self> {
        self.hotspots.report(part, issue, severity)?;
        Ok(self)
    }

    /// Step 3: select a service (appends).
    pub fn select_service(&mut self, selection: ServiceSelection) -> &mut Self {
        self.selections.push(selection);
        self
    }

    /// Step 4: record uploaded media metadata (appends).
    pub fn attach_media(&mut self, item: MediaItem) -> &mut Self {
        self.media.push(item);
        self
    }

    pub fn vehicle(&self) -> Option<&VehicleDetails> {
        self.vehicle.as_ref()
    }

    pub fn hotspots(&self) -> &HotspotReport {
        &self.hotspots
    }

    pub fn selections(&self) -> &[ServiceSelection] {
        &self.selections
    }

    /// Validate and seal the draft into a submission payload.
    pub fn finish(self) -> DomainResult<IntakeSubmission> {
        let vehicle = self
            .vehicle
            .ok_or_else(|| DomainError::validation("vehicle details are required"))?;

        if self.selections.is_empty() {
            return Err(DomainError::validation(
                "select at least one service before submitting",
            ));
        }

        Ok(IntakeSubmission {
            client_name: self.client_name,
            client_email: self.client_email,
            vehicle,
            hotspots: self.hotspots.into_entries(),
            selections: self.selections,
            media: self.media,
        })
    }
}
