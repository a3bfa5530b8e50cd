//! Grouped-write store for appointments and bookings.
//!
//! Slot-batch creation (overlap-checked) and booking cancellation (with the
//! compensating appointment release) are the two places the platform needs
//! multiple writes to land together; both run under one lock here, so a
//! reader never observes half of either operation.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use detailops_core::TenantId;
use detailops_scheduling::{Appointment, AppointmentId, AppointmentStatus, Booking, BookingId};

/// Storage-layer failure (distinct from domain errors).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("overlapping slot at {0}")]
    Overlap(String),

    #[error("not found")]
    NotFound,

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Appointment/booking persistence with grouped-write operations.
pub trait SchedulingStore: Send + Sync {
    fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError>;

    /// Insert a batch of open slots, all-or-nothing.
    ///
    /// Fails with [`StoreError::Overlap`] when any slot overlaps an existing
    /// non-cancelled appointment or another slot in the same batch.
    fn insert_slots(&self, slots: Vec<Appointment>) -> Result<Vec<AppointmentId>, StoreError>;

    fn get_appointment(&self, tenant_id: TenantId, id: AppointmentId) -> Option<Appointment>;

    /// Replace a stored appointment (last-write-wins).
    fn update_appointment(&self, appointment: Appointment) -> Result<(), StoreError>;

    fn list_appointments(&self, tenant_id: TenantId) -> Vec<Appointment>;

    fn insert_booking(&self, booking: Booking) -> Result<(), StoreError>;

    fn get_booking(&self, tenant_id: TenantId, id: BookingId) -> Option<Booking>;

    fn update_booking(&self, booking: Booking) -> Result<(), StoreError>;

    fn list_bookings(&self, tenant_id: TenantId) -> Vec<Booking>;

    /// Persist a cancelled booking and its released appointment in one
    /// grouped write.
    fn apply_booking_cancellation(
        &self,
        booking: Booking,
        appointment: Appointment,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct SchedulingState {
    appointments: HashMap<(TenantId, AppointmentId), Appointment>,
    bookings: HashMap<(TenantId, BookingId), Booking>,
}

/// In-memory scheduling store. One lock over both maps makes the grouped
/// writes atomic.
#[derive(Debug, Default)]
pub struct InMemorySchedulingStore {
    inner: RwLock<SchedulingState>,
}

impl InMemorySchedulingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn occupies_window(status: AppointmentStatus) -> bool {
    !matches!(status, AppointmentStatus::Cancelled)
}

impl SchedulingStore for InMemorySchedulingStore {
    fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        state.appointments.insert(
            (appointment.tenant_id(), appointment.id_typed()),
            appointment,
        );
        Ok(())
    }

    fn insert_slots(&self, slots: Vec<Appointment>) -> Result<Vec<AppointmentId>, StoreError> {
        if slots.is_empty() {
            return Ok(vec![]);
        }

        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        // Validate the whole batch before committing any of it.
        for (idx, slot) in slots.iter().enumerate() {
            let candidate = slot.window();

            let conflict = state
                .appointments
                .values()
                .filter(|a| a.tenant_id() == slot.tenant_id() && occupies_window(a.status()))
                .map(|a| a.window())
                .chain(slots[..idx].iter().map(|s| s.window()))
                .find(|w| w.overlaps(&candidate));

            if conflict.is_some() {
                return Err(StoreError::Overlap(candidate.start.to_rfc3339()));
            }
        }

        let mut ids = Vec::with_capacity(slots.len());
        for slot in slots {
            ids.push(slot.id_typed());
            state
                .appointments
                .insert((slot.tenant_id(), slot.id_typed()), slot);
        }
        Ok(ids)
    }

    fn get_appointment(&self, tenant_id: TenantId, id: AppointmentId) -> Option<Appointment> {
        let state = self.inner.read().ok()?;
        state.appointments.get(&(tenant_id, id)).cloned()
    }

    fn update_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let key = (appointment.tenant_id(), appointment.id_typed());
        if !state.appointments.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        state.appointments.insert(key, appointment);
        Ok(())
    }

    fn list_appointments(&self, tenant_id: TenantId) -> Vec<Appointment> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut items: Vec<Appointment> = state
            .appointments
            .iter()
            .filter_map(|((t, _), a)| (*t == tenant_id).then(|| a.clone()))
            .collect();
        items.sort_by_key(|a| a.start_time());
        items
    }

    fn insert_booking(&self, booking: Booking) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        state
            .bookings
            .insert((booking.tenant_id(), booking.id_typed()), booking);
        Ok(())
    }

    fn get_booking(&self, tenant_id: TenantId, id: BookingId) -> Option<Booking> {
        let state = self.inner.read().ok()?;
        state.bookings.get(&(tenant_id, id)).cloned()
    }

    fn update_booking(&self, booking: Booking) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let key = (booking.tenant_id(), booking.id_typed());
        if !state.bookings.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        state.bookings.insert(key, booking);
        Ok(())
    }

    fn list_bookings(&self, tenant_id: TenantId) -> Vec<Booking> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut items: Vec<Booking> = state
            .bookings
            .iter()
            .filter_map(|((t, _), b)| (*t == tenant_id).then(|| b.clone()))
            .collect();
        items.sort_by_key(|b| b.created_at());
        items
    }

    fn apply_booking_cancellation(
        &self,
        booking: Booking,
        appointment: Appointment,
    ) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let booking_key = (booking.tenant_id(), booking.id_typed());
        let appointment_key = (appointment.tenant_id(), appointment.id_typed());
        if !state.bookings.contains_key(&booking_key)
            || !state.appointments.contains_key(&appointment_key)
        {
            return Err(StoreError::NotFound);
        }

        state.bookings.insert(booking_key, booking);
        state.appointments.insert(appointment_key, appointment);
        Ok(())
    }
}
