//! `detailops-clients` — client (customer account) domain model.

pub mod client;
pub mod contact;

pub use client::{Client, ClientId};
pub use contact::validate_email;
