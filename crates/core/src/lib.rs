//! Celine Core
//!
//! Domain logic for the Celine virtual-nurse service, which walks a patient
//! through the CIWA (Clinical Institute Withdrawal Assessment) questionnaire.
//! This crate owns the session state machine, the question sequence, the
//! transcript store, and the orchestrator that ties them to an external
//! text-generation backend. It contains no HTTP concerns; the `celine-api`
//! service crate wraps it in an axum server.

pub mod engine;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod prompts;
pub mod questions;
pub mod session;
pub mod snapshot;
pub mod transcript;
