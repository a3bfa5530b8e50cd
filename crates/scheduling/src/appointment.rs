use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use detailops_clients::ClientId;
use detailops_core::{DomainError, DomainResult, Entity, EntityId, TenantId, UserId};

use crate::slot::SlotWindow;

/// Appointment identifier (tenant-scoped via the `tenant_id` field).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub EntityId);

impl AppointmentId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Appointment status lifecycle.
///
/// Allowed transitions:
/// `available → scheduled`, `scheduled → completed`,
/// `available|scheduled → cancelled`, `available → unavailable`,
/// plus the compensating release `scheduled → available` performed when a
/// booking is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Available,
    Scheduled,
    Completed,
    Cancelled,
    Unavailable,
}

/// Entity: Appointment (a staff-created booking or an open slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    id: AppointmentId,
    tenant_id: TenantId,
    service: String,
    client_id: Option<ClientId>,
    technician: Option<UserId>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    notes: Option<String>,
    status: AppointmentStatus,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Staff-created appointment: starts in `scheduled`.
    #[allow(clippy::too_many_arguments)]
    pub fn schedule(
        id: AppointmentId,
        tenant_id: TenantId,
        service: impl Into<String>,
        client_id: Option<ClientId>,
        technician: Option<UserId>,
        window: SlotWindow,
        notes: Option<String>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::new_with_status(
            id,
            tenant_id,
            service,
            client_id,
            technician,
            window,
            notes,
            AppointmentStatus::Scheduled,
            created_by,
            now,
        )
    }

    /// Open slot: starts in `available`, unassigned.
    pub fn open_slot(
        id: AppointmentId,
        tenant_id: TenantId,
        service: impl Into<String>,
        window: SlotWindow,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::new_with_status(
            id,
            tenant_id,
            service,
            None,
            None,
            window,
            None,
            AppointmentStatus::Available,
            created_by,
            now,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new_with_status(
        id: AppointmentId,
        tenant_id: TenantId,
        service: impl Into<String>,
        client_id: Option<ClientId>,
        technician: Option<UserId>,
        window: SlotWindow,
        notes: Option<String>,
        status: AppointmentStatus,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        window.validate()?;
        let service = service.into();
        if service.trim().is_empty() {
            return Err(DomainError::validation("service must not be empty"));
        }

        Ok(Self {
            id,
            tenant_id,
            service,
            client_id,
            technician,
            start_time: window.start,
            end_time: window.end,
            notes,
            status,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> AppointmentId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn technician(&self) -> Option<UserId> {
        self.technician
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn window(&self) -> SlotWindow {
        SlotWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `from → to` is in the allowed transition set.
    pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (from, to),
            (Available, Scheduled)
                | (Scheduled, Completed)
                | (Available, Cancelled)
                | (Scheduled, Cancelled)
                | (Available, Unavailable)
                // Compensating release on booking cancellation.
                | (Scheduled, Available)
        )
    }

    /// Perform a status transition, rejecting anything outside the allowed set.
    pub fn transition(&mut self, to: AppointmentStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if !Self::can_transition(self.status, to) {
            return Err(DomainError::invariant(format!(
                "illegal appointment transition {:?} -> {to:?}",
                self.status
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Book an open slot for a client.
    pub fn book(
        &mut self,
        client_id: ClientId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.transition(AppointmentStatus::Scheduled, now)?;
        self.client_id = Some(client_id);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.transition(AppointmentStatus::Cancelled, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.transition(AppointmentStatus::Completed, now)
    }

    /// Compensating action: return a scheduled appointment to the open pool.
    pub fn release(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.transition(AppointmentStatus::Available, now)?;
        self.client_id = None;
        Ok(())
    }

    /// Patch mutable details (service/window/notes). Status is not touched
    /// here; use [`Self::transition`].
    pub fn update_details(
        &mut self,
        service: Option<String>,
        window: Option<SlotWindow>,
        notes: Option<Option<String>>,
        technician: Option<Option<UserId>>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(service) = service {
            if service.trim().is_empty() {
                return Err(DomainError::validation("service must not be empty"));
            }
            self.service = service;
        }
        if let Some(window) = window {
            window.validate()?;
            self.start_time = window.start;
            self.end_time = window.end;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
        if let Some(technician) = technician {
            self.technician = technician;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Appointment {
    type Id = AppointmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
