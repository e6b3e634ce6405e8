//! screening-engine
//!
//! Session runtime for screening flows: definition administration, answer
//! validation, the forward-only session state machine, rule evaluation
//! under time and step limits, and projection of recommendations and
//! patient-order triage.

pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod definitions;
pub mod error;
pub mod evaluate;
pub mod locks;
pub mod projector;
pub mod session;
pub mod snapshot;

use std::sync::Arc;

use screening_storage::store::Store;

use collaborators::Collaborators;
use config::EngineConfig;
use error::EngineError;
use locks::KeyedLocks;

pub struct ScreeningEngine {
    store: Arc<Store>,
    config: EngineConfig,
    collaborators: Collaborators,
    session_locks: KeyedLocks,
    patient_order_locks: KeyedLocks,
}

impl ScreeningEngine {
    pub fn new(store: Arc<Store>, config: EngineConfig, collaborators: Collaborators) -> Self {
        Self {
            store,
            config,
            collaborators,
            session_locks: KeyedLocks::new("session"),
            patient_order_locks: KeyedLocks::new("patient order"),
        }
    }

    /// Build an engine whose store follows `config.state_path`.
    pub fn open(config: EngineConfig, collaborators: Collaborators) -> Result<Self, EngineError> {
        let store = match &config.state_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "opening screening state");
                Store::open(path)?
            }
            None => Store::in_memory(),
        };
        Ok(Self::new(Arc::new(store), config, collaborators))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
