//! `detailops-ai`
//!
//! **Responsibility:** Optional AI subsystem boundary.
//!
//! This crate is intentionally **not** part of the domain model:
//! - It must not depend on domain entities (appointments/invoices/etc).
//! - It must not mutate domain state and performs no IO.
//! - It builds prompts and parses provider responses, nothing more.
//!
//! Provider responses are untrusted free text; every parse here is
//! best-effort and returns a typed error instead of panicking.

pub mod estimate;
pub mod questions;
pub mod result;
pub mod snapshot;

pub use estimate::{estimate_prompt, parse_estimate, summary_prompt};
pub use questions::{AssessmentQuestion, QuestionType, parse_questions, questions_prompt};
pub use result::AiError;
pub use snapshot::{AssessmentSnapshot, HotspotNote, QuestionAnswer};
