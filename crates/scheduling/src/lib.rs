//! `detailops-scheduling` — appointments, open slots and bookings.

pub mod appointment;
pub mod booking;
pub mod slot;

pub use appointment::{Appointment, AppointmentId, AppointmentStatus};
pub use booking::{Booking, BookingId, BookingStatus, CANCELLATION_CUTOFF_HOURS};
pub use slot::{SlotWindow, find_overlap};
