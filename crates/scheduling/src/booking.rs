use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use detailops_core::{DomainError, DomainResult, Entity, EntityId, TenantId, UserId};
use detailops_services::ServiceId;

use crate::appointment::AppointmentId;

/// Hours before the appointment start after which cancellation is refused.
pub const CANCELLATION_CUTOFF_HOURS: i64 = 24;

/// Booking identifier (tenant-scoped via the `tenant_id` field).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub EntityId);

impl BookingId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for BookingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Booking status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Entity: Booking — links a user to an appointment + service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    id: BookingId,
    tenant_id: TenantId,
    user_id: UserId,
    appointment_id: AppointmentId,
    service_id: ServiceId,
    status: BookingStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn create(
        id: BookingId,
        tenant_id: TenantId,
        user_id: UserId,
        appointment_id: AppointmentId,
        service_id: ServiceId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            user_id,
            appointment_id,
            service_id,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_typed(&self) -> BookingId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn appointment_id(&self) -> AppointmentId {
        self.appointment_id
    }

    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `from → to` is in the allowed transition set.
    pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (from, to),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }

    /// Staff-driven status update (no cancellation-window gate).
    pub fn set_status(&mut self, to: BookingStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if !Self::can_transition(self.status, to) {
            return Err(DomainError::invariant(format!(
                "illegal booking transition {:?} -> {to:?}",
                self.status
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    pub fn confirm(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.set_status(BookingStatus::Confirmed, now)
    }

    /// Latest instant at which the holder may still cancel.
    pub fn cancellation_deadline(appointment_start: DateTime<Utc>) -> DateTime<Utc> {
        appointment_start - Duration::hours(CANCELLATION_CUTOFF_HOURS)
    }

    /// Holder-driven cancellation, gated by the 24-hour cutoff.
    ///
    /// The caller is responsible for releasing the linked appointment in the
    /// same grouped write.
    pub fn cancel(
        &mut self,
        appointment_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let deadline = Self::cancellation_deadline(appointment_start);
        if now > deadline {
            return Err(DomainError::cancellation_window(format!(
                "cancellation closed at {deadline}, appointment starts at {appointment_start}"
            )));
        }
        self.set_status(BookingStatus::Cancelled, now)
    }
}

impl Entity for Booking {
    type Id = BookingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(now: DateTime<Utc>) -> Booking {
        Booking::create(
            BookingId::new(EntityId::new()),
            TenantId::new(),
            UserId::new(),
            AppointmentId::new(EntityId::new()),
            ServiceId::new(EntityId::new()),
            now,
        )
    }

    #[test]
    fn cancel_succeeds_outside_the_cutoff() {
        let now = Utc::now();
        let start = now + Duration::hours(25);
        let mut b = booking(now);

        b.cancel(start, now).unwrap();
        assert_eq!(b.status(), BookingStatus::Cancelled);
    }

    #[test]
    fn cancel_fails_inside_the_cutoff_and_leaves_status_unchanged() {
        let now = Utc::now();
        let start = now + Duration::hours(23);
        let mut b = booking(now);

        let err = b.cancel(start, now).unwrap_err();
        assert!(matches!(err, DomainError::CancellationWindow(_)));
        assert_eq!(b.status(), BookingStatus::Pending);
    }

    #[test]
    fn cancel_at_exactly_the_deadline_is_allowed() {
        let now = Utc::now();
        let start = now + Duration::hours(CANCELLATION_CUTOFF_HOURS);
        let mut b = booking(now);
        b.cancel(start, now).unwrap();
        assert_eq!(b.status(), BookingStatus::Cancelled);
    }

    #[test]
    fn completed_and_cancelled_are_terminal() {
        let now = Utc::now();
        let mut b = booking(now);
        b.confirm(now).unwrap();
        b.set_status(BookingStatus::Completed, now).unwrap();

        assert!(b.set_status(BookingStatus::Cancelled, now).is_err());
        assert!(b.set_status(BookingStatus::Confirmed, now).is_err());
    }
}
