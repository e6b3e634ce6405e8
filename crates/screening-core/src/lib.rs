//! screening-core
//!
//! Pure domain types for screening flows, sessions, support-role
//! recommendations and patient-order triage. No storage or runtime
//! dependency; this is the shared vocabulary of the screening workspace.

pub mod error;
pub mod models;
