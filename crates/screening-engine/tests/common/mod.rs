#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, mpsc};

use uuid::Uuid;

use screening_core::models::flow::{Flow, FlowType, FlowVersion, FlowVersionSpec, NewFlow};
use screening_core::models::question::{AnswerFormat, AnswerOptionDraft, QuestionDraft};
use screening_core::models::screening::{NewScreening, ScreeningVersionDetail, ScreeningVersionDraft};
use screening_core::models::session::{AnswerSubmission, Session, StartSession};
use screening_core::models::flow::FlowSelector;
use screening_engine::ScreeningEngine;
use screening_engine::collaborators::{
    Account, AccountDirectory, Collaborators, ConfiguredInstitutions, CrisisAlert, CrisisNotifier,
    InMemoryAccounts, InMemoryPatientOrders, PatientOrderDirectory,
};
use screening_engine::config::EngineConfig;
use screening_storage::store::Store;

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<CrisisAlert>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

impl CrisisNotifier for RecordingNotifier {
    fn crisis_indicated(&self, alert: &CrisisAlert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

/// Blocks the next collaborator call until the test releases it, so a
/// request can be held mid-flight while it owns its locks.
#[derive(Default)]
pub struct Gate {
    armed: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

impl Gate {
    /// Returns (entered, release): `entered` fires once a call is parked,
    /// sending on `release` lets it continue.
    pub fn arm(&self) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.armed.lock().unwrap() = Some((entered_tx, release_rx));
        (entered_rx, release_tx)
    }

    fn pass(&self) {
        let armed = self.armed.lock().unwrap().take();
        if let Some((entered, release)) = armed {
            let _ = entered.send(());
            let _ = release.recv();
        }
    }
}

struct GatedAccounts {
    inner: Arc<InMemoryAccounts>,
    gate: Arc<Gate>,
}

impl AccountDirectory for GatedAccounts {
    fn account(&self, account_id: Uuid) -> Option<Account> {
        self.gate.pass();
        self.inner.account(account_id)
    }
}

struct GatedPatientOrders {
    inner: Arc<InMemoryPatientOrders>,
    gate: Arc<Gate>,
}

impl PatientOrderDirectory for GatedPatientOrders {
    fn patient_order_exists(&self, patient_order_id: Uuid) -> bool {
        self.gate.pass();
        self.inner.patient_order_exists(patient_order_id)
    }
}

pub struct Fixture {
    pub engine: Arc<ScreeningEngine>,
    pub crisis: Arc<RecordingNotifier>,
    pub accounts: Arc<InMemoryAccounts>,
    pub patient_orders: Arc<InMemoryPatientOrders>,
    pub account_gate: Arc<Gate>,
    pub patient_order_gate: Arc<Gate>,
    pub patient: Uuid,
    pub staff: Uuid,
}

pub const INSTITUTION: &str = "acme";

pub fn fixture() -> Fixture {
    fixture_with(EngineConfig::default())
}

pub fn fixture_with(config: EngineConfig) -> Fixture {
    let store = Arc::new(Store::in_memory());
    fixture_on(store, config)
}

pub fn fixture_on(store: Arc<Store>, config: EngineConfig) -> Fixture {
    let crisis = Arc::new(RecordingNotifier::default());
    let accounts = Arc::new(InMemoryAccounts::default());
    let patient_orders = Arc::new(InMemoryPatientOrders::default());
    let patient = Uuid::new_v4();
    let staff = Uuid::new_v4();
    for (account_id, role) in [(patient, "patient"), (staff, "staff")] {
        accounts.insert(Account {
            account_id,
            institution_id: INSTITUTION.to_string(),
            attributes: BTreeMap::from([("role".to_string(), role.to_string())]),
        });
    }
    let account_gate = Arc::new(Gate::default());
    let patient_order_gate = Arc::new(Gate::default());
    let collaborators = Collaborators {
        accounts: Arc::new(GatedAccounts {
            inner: accounts.clone(),
            gate: account_gate.clone(),
        }),
        institutions: Arc::new(ConfiguredInstitutions::new(&config)),
        patient_orders: Arc::new(GatedPatientOrders {
            inner: patient_orders.clone(),
            gate: patient_order_gate.clone(),
        }),
        crisis: crisis.clone(),
    };
    Fixture {
        engine: Arc::new(ScreeningEngine::new(store, config, collaborators)),
        crisis,
        accounts,
        patient_orders,
        account_gate,
        patient_order_gate,
        patient,
        staff,
    }
}

pub fn option(text: &str, score: i32) -> AnswerOptionDraft {
    AnswerOptionDraft {
        answer_option_text: text.to_string(),
        score,
        indicates_crisis: false,
        freeform_supplement: None,
        extensions: BTreeMap::new(),
    }
}

pub fn crisis_option(text: &str, score: i32) -> AnswerOptionDraft {
    AnswerOptionDraft {
        indicates_crisis: true,
        ..option(text, score)
    }
}

pub fn single_select(text: &str, options: Vec<AnswerOptionDraft>) -> QuestionDraft {
    QuestionDraft {
        answer_format: AnswerFormat::SingleSelect,
        content_hint: Default::default(),
        question_text: text.to_string(),
        intro_text: None,
        minimum_answer_count: 1,
        maximum_answer_count: 1,
        config: Default::default(),
        extensions: BTreeMap::new(),
        options,
    }
}

pub fn multi_select(text: &str, min: u32, max: u32, options: Vec<AnswerOptionDraft>) -> QuestionDraft {
    QuestionDraft {
        answer_format: AnswerFormat::MultiSelect,
        minimum_answer_count: min,
        maximum_answer_count: max,
        ..single_select(text, options)
    }
}

/// Create and publish a screening scored with `option_sum`.
pub fn published_screening(
    engine: &ScreeningEngine,
    name: &str,
    questions: Vec<QuestionDraft>,
) -> ScreeningVersionDetail {
    let screening = engine
        .create_screening(NewScreening {
            name: name.to_string(),
            screening_type: name.to_ascii_lowercase(),
        })
        .unwrap();
    let detail = engine
        .create_screening_version(
            screening.id,
            ScreeningVersionDraft {
                scoring_rule: "option_sum".to_string(),
                questions,
            },
        )
        .unwrap();
    engine
        .publish_screening_version(screening.id, detail.version.id)
        .unwrap();
    detail
}

pub struct FlowRules<'a> {
    pub orchestration: &'a str,
    pub results: Option<&'a str>,
    pub destination: &'a str,
    pub skippable: bool,
    pub confirmation_prompt: Option<&'a str>,
}

impl Default for FlowRules<'_> {
    fn default() -> Self {
        Self {
            orchestration: "finish",
            results: None,
            destination: "destination_home",
            skippable: false,
            confirmation_prompt: None,
        }
    }
}

pub fn flow_version_spec(initial_screening_id: Uuid, rules: &FlowRules<'_>) -> FlowVersionSpec {
    FlowVersionSpec {
        initial_screening_id,
        orchestration_rule: rules.orchestration.to_string(),
        results_rule: rules.results.map(str::to_string),
        destination_rule: rules.destination.to_string(),
        skippable: rules.skippable,
        pre_completion_confirmation_prompt: rules.confirmation_prompt.map(str::to_string),
        created_by_account_id: Uuid::new_v4(),
    }
}

/// Create a flow with one published version.
pub fn published_flow(
    engine: &ScreeningEngine,
    flow_type: FlowType,
    initial_screening_id: Uuid,
    rules: FlowRules<'_>,
) -> (Flow, FlowVersion) {
    let flow = engine
        .create_flow(NewFlow {
            name: "Test flow".to_string(),
            flow_type,
            institution_id: None,
        })
        .unwrap();
    let version = engine
        .create_flow_version(flow.id, flow_version_spec(initial_screening_id, &rules))
        .unwrap();
    engine.publish_flow_version(flow.id, version.id).unwrap();
    (flow, version)
}

pub fn start(fixture: &Fixture, flow_id: Uuid) -> Session {
    fixture
        .engine
        .start_session(StartSession {
            flow: FlowSelector::Id(flow_id),
            target_account_id: fixture.patient,
            created_by_account_id: fixture.staff,
            patient_order_id: None,
        })
        .unwrap()
}

pub fn choose(question_id: Uuid, option_ids: &[Uuid]) -> AnswerSubmission {
    AnswerSubmission {
        question_id,
        answer_option_ids: option_ids.to_vec(),
        freeform_text: None,
    }
}

/// (question id, option ids) for question `index` of a version.
pub fn question(detail: &ScreeningVersionDetail, index: usize) -> (Uuid, Vec<Uuid>) {
    let entry = &detail.questions[index];
    (
        entry.question.id,
        entry.options.iter().map(|o| o.id).collect(),
    )
}
