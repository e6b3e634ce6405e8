use uuid::Uuid;

use screening_core::models::destination::Destination;
use screening_core::models::flow::{FlowSelector, FlowType};
use screening_core::models::session::Session;
use screening_core::models::triage::{CareType, FocusTypeId};

#[test]
fn focus_type_ids_are_normalised() {
    assert_eq!(FocusTypeId::parse(" sud ").unwrap().as_str(), "SUD");
    assert_eq!(FocusTypeId::parse("Trauma_2").unwrap().to_string(), "TRAUMA_2");
    assert!(FocusTypeId::parse("").is_err());
    assert!(FocusTypeId::parse("bad-id").is_err());
    assert!(FocusTypeId::parse(&"X".repeat(65)).is_err());

    let parsed: FocusTypeId = serde_json::from_str("\"general\"").unwrap();
    assert_eq!(parsed.as_str(), "GENERAL");
    assert!(serde_json::from_str::<FocusTypeId>("\"no spaces\"").is_err());
}

#[test]
fn care_types_order_by_acuity() {
    assert!(CareType::Specialty > CareType::Collaborative);
    assert!(CareType::Collaborative > CareType::Subclinical);
    assert_eq!(
        CareType::most_acute([CareType::Subclinical, CareType::Specialty, CareType::Collaborative]),
        CareType::Specialty
    );
    assert_eq!(CareType::most_acute(Vec::new()), CareType::Unspecified);
}

#[test]
fn destinations_are_tagged_by_kind() {
    let json = serde_json::to_value(Destination::ProviderList).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "provider_list" }));

    let triage: Destination = serde_json::from_value(serde_json::json!({
        "kind": "clinical_triage",
        "care_type": "collaborative",
        "focus_type": "general",
        "reason": "mild symptoms",
    }))
    .unwrap();
    assert_eq!(
        triage,
        Destination::ClinicalTriage {
            care_type: CareType::Collaborative,
            focus_type: FocusTypeId::parse("GENERAL").unwrap(),
            reason: "mild symptoms".to_string(),
        }
    );
    assert!(!triage.is_crisis());
    assert!(Destination::Crisis.is_crisis());
}

#[test]
fn flow_selectors_accept_id_or_type() {
    let id = Uuid::new_v4();
    let by_id: FlowSelector = serde_json::from_value(serde_json::json!({ "id": id })).unwrap();
    assert_eq!(by_id, FlowSelector::Id(id));
    let by_type: FlowSelector =
        serde_json::from_value(serde_json::json!({ "type": "integrated_care" })).unwrap();
    assert_eq!(by_type, FlowSelector::Type(FlowType::IntegratedCare));
}

#[test]
fn crisis_flag_is_set_once() {
    let now = jiff::Timestamp::now();
    let mut session = Session {
        id: Uuid::new_v4(),
        flow_id: Uuid::new_v4(),
        flow_version_id: Uuid::new_v4(),
        target_account_id: Uuid::new_v4(),
        created_by_account_id: Uuid::new_v4(),
        patient_order_id: None,
        completed: false,
        completed_at: None,
        skipped: false,
        skipped_at: None,
        crisis_indicated: false,
        crisis_indicated_at: None,
        destination: None,
        created_at: now,
        updated_at: now,
    };
    assert!(!session.is_terminal());
    assert!(session.indicate_crisis(now));
    let first = session.crisis_indicated_at;
    assert!(!session.indicate_crisis(jiff::Timestamp::now()));
    assert_eq!(session.crisis_indicated_at, first);

    session.skipped = true;
    assert!(session.is_terminal());
}
