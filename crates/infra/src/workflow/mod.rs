//! Cross-entity workflow orchestration.

pub mod intake;

pub use intake::{AssessmentIntake, DEPOSIT_PERCENT, DepositIntent};
