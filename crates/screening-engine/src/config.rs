use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_core::models::flow::FlowType;
use screening_rules::budget::EvaluationLimits;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub evaluation_timeout_ms: u64,
    pub evaluation_step_budget: u32,
    /// JSON state file; in-memory only when unset.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    #[serde(default)]
    pub institutions: Vec<InstitutionConfig>,
}

/// Which flow serves each flow type for an institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionConfig {
    pub institution_id: String,
    #[serde(default)]
    pub flows: Vec<InstitutionFlow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionFlow {
    pub flow_type: FlowType,
    pub flow_id: Uuid,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = EvaluationLimits::default();
        Self {
            config_version: CURRENT_VERSION,
            evaluation_timeout_ms: limits.timeout.as_millis() as u64,
            evaluation_step_budget: limits.max_steps,
            state_path: None,
            institutions: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn limits(&self) -> EvaluationLimits {
        EvaluationLimits {
            timeout: Duration::from_millis(self.evaluation_timeout_ms),
            max_steps: self.evaluation_step_budget,
        }
    }

    pub fn flow_for(&self, institution_id: &str, flow_type: FlowType) -> Option<Uuid> {
        self.institutions
            .iter()
            .find(|i| i.institution_id == institution_id)?
            .flows
            .iter()
            .find(|f| f.flow_type == flow_type)
            .map(|f| f.flow_id)
    }
}

/// Load a config file, running migrations first. A missing file yields defaults.
pub fn load_config(path: &Path) -> eyre::Result<EngineConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        return Ok(EngineConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: EngineConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        ));
    }

    // v0 → v1: pre-versioned configs already have the v1 shape
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("stamped pre-versioned config as v1");
    }

    // Future migrations go here:
    // if from_version < 2 { ... }

    Ok(json)
}

pub fn save_config(config: &EngineConfig, path: &Path) -> eyre::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
