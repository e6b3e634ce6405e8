use screening_core::models::flow::FlowType;
use screening_engine::ScreeningEngine;
use screening_engine::collaborators::Collaborators;
use screening_engine::config::EngineConfig;
use screening_rules::RuleSpec;
use screening_rules::strategies::orchestration::OrchestrationRule;

#[test]
fn definitions_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        state_path: Some(dir.path().join("state.json")),
        ..EngineConfig::default()
    };
    let open = || {
        ScreeningEngine::open(config.clone(), Collaborators::permissive(&config, "acme")).unwrap()
    };

    let flow_id = {
        let engine = open();
        engine
            .register_rule(
                "just_finish",
                RuleSpec::Orchestration(OrchestrationRule::Finish { crisis_when: None, skip_when: None }),
            )
            .unwrap();
        engine
            .create_flow(screening_core::models::flow::NewFlow {
                name: "Persisted".to_string(),
                flow_type: FlowType::Intake,
                institution_id: None,
            })
            .unwrap()
            .id
    };
    assert!(dir.path().join("state.json.log").exists());

    let engine = open();
    assert!(dir.path().join("state.json").exists());
    assert_eq!(engine.flow(flow_id).unwrap().name, "Persisted");
    assert!(engine.rule("just_finish").is_ok());
    assert!(engine.rule("option_sum").is_ok());
}
