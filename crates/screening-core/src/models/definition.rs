use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A named, versioned definition (a flow or a screening).
///
/// Versions live in an append-only log; `active_version_id` is the only
/// mutable pointer into that log.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Definition<A> {
    pub id: Uuid,
    pub name: String,
    pub active_version_id: Option<Uuid>,
    pub attributes: A,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// One immutable version of a [`Definition`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct VersionRecord<P> {
    pub id: Uuid,
    pub definition_id: Uuid,
    /// Monotonic per definition, starting at 1.
    pub version_number: u32,
    pub payload: P,
    pub created_at: jiff::Timestamp,
}
