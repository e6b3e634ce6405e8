//! Narrow interfaces to the systems the engine consults but does not own.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_core::models::flow::FlowType;

use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: Uuid,
    pub institution_id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

pub trait AccountDirectory: Send + Sync {
    fn account(&self, account_id: Uuid) -> Option<Account>;
}

pub trait InstitutionDirectory: Send + Sync {
    /// The flow an institution uses for `flow_type`, if it configures one.
    fn flow_for(&self, institution_id: &str, flow_type: FlowType) -> Option<Uuid>;
}

pub trait PatientOrderDirectory: Send + Sync {
    fn patient_order_exists(&self, patient_order_id: Uuid) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisSource {
    AnswerOption,
    Orchestration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisAlert {
    pub session_id: Uuid,
    pub target_account_id: Uuid,
    pub patient_order_id: Option<Uuid>,
    pub source: CrisisSource,
}

pub trait CrisisNotifier: Send + Sync {
    fn crisis_indicated(&self, alert: &CrisisAlert);
}

/// Every collaborator the engine needs.
#[derive(Clone)]
pub struct Collaborators {
    pub accounts: Arc<dyn AccountDirectory>,
    pub institutions: Arc<dyn InstitutionDirectory>,
    pub patient_orders: Arc<dyn PatientOrderDirectory>,
    pub crisis: Arc<dyn CrisisNotifier>,
}

impl Collaborators {
    /// Accept any account and patient order; institutions come from config.
    pub fn permissive(config: &EngineConfig, default_institution_id: &str) -> Self {
        Self {
            accounts: Arc::new(OpenAccounts {
                institution_id: default_institution_id.to_string(),
            }),
            institutions: Arc::new(ConfiguredInstitutions::new(config)),
            patient_orders: Arc::new(AnyPatientOrder),
            crisis: Arc::new(LogCrisisNotifier),
        }
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// Treats every account id as an account of one institution.
#[derive(Debug, Clone)]
pub struct OpenAccounts {
    pub institution_id: String,
}

impl AccountDirectory for OpenAccounts {
    fn account(&self, account_id: Uuid) -> Option<Account> {
        Some(Account {
            account_id,
            institution_id: self.institution_id.clone(),
            attributes: BTreeMap::new(),
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccounts {
    pub fn insert(&self, account: Account) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.account_id, account);
    }
}

impl AccountDirectory for InMemoryAccounts {
    fn account(&self, account_id: Uuid) -> Option<Account> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&account_id)
            .cloned()
    }
}

// ============================================================================
// Institutions
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ConfiguredInstitutions {
    config: EngineConfig,
}

impl ConfiguredInstitutions {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl InstitutionDirectory for ConfiguredInstitutions {
    fn flow_for(&self, institution_id: &str, flow_type: FlowType) -> Option<Uuid> {
        self.config.flow_for(institution_id, flow_type)
    }
}

// ============================================================================
// Patient orders
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct AnyPatientOrder;

impl PatientOrderDirectory for AnyPatientOrder {
    fn patient_order_exists(&self, _patient_order_id: Uuid) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPatientOrders {
    orders: RwLock<HashSet<Uuid>>,
}

impl InMemoryPatientOrders {
    pub fn insert(&self, patient_order_id: Uuid) {
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(patient_order_id);
    }
}

impl PatientOrderDirectory for InMemoryPatientOrders {
    fn patient_order_exists(&self, patient_order_id: Uuid) -> bool {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&patient_order_id)
    }
}

// ============================================================================
// Crisis
// ============================================================================

/// Emits a structured warning; delivery is handled downstream of the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrisisNotifier;

impl CrisisNotifier for LogCrisisNotifier {
    fn crisis_indicated(&self, alert: &CrisisAlert) {
        tracing::warn!(
            session_id = %alert.session_id,
            target_account_id = %alert.target_account_id,
            patient_order_id = ?alert.patient_order_id,
            source = ?alert.source,
            "crisis_indicated"
        );
    }
}
