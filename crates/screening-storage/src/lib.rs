//! screening-storage
//!
//! Row storage for definitions, catalog entries, sessions, recommendations
//! and triage groups. All tables live behind one [`store::Store`]; every
//! write is a transaction that either commits in full (and is appended to
//! the change log, when a state file is configured) or is rolled back.

pub mod error;
pub mod state;
pub mod store;
pub mod table;
pub mod tables;
pub mod versions;
