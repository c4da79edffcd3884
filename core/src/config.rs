use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::{ConfigError, Result};

pub const CONFIG_ENV_VAR: &str = "GREETER_CONFIG";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionConfig {
    /// Fail the invocation on a bad event. When false, answer with a
    /// structured 400 instead.
    #[serde(default = "default_strict_events")]
    pub strict_events: bool,
    #[serde(default)]
    pub log_filter: Option<String>,
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<CapabilitySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CapabilitySpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: CapabilityKind,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Self-test of the response body encoder.
    Json,
    /// A file or directory that must exist, e.g. a Lambda layer.
    Path { path: String },
    /// An environment variable that must be set to a non-empty value.
    Env { var: String },
}

fn default_strict_events() -> bool {
    true
}

fn default_capabilities() -> Vec<CapabilitySpec> {
    vec![CapabilitySpec {
        name: "json".to_string(),
        kind: CapabilityKind::Json,
        required: false,
    }]
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            strict_events: default_strict_events(),
            log_filter: None,
            capabilities: default_capabilities(),
        }
    }
}

pub fn load_config(config_path: Option<&str>) -> Result<FunctionConfig> {
    let config = match config_path {
        Some(path) => FunctionConfig::from_file(path)?,
        None => FunctionConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

impl FunctionConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            origin: path.to_string(),
            error: Box::new(e),
        })?;
        Self::from_yaml(&content)
    }

    /// Reads inline YAML from `GREETER_CONFIG`, falling back to the defaults
    /// when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(config_str) => Self::from_yaml(&config_str),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                origin: CONFIG_ENV_VAR.to_string(),
                error: Box::new(e),
            }
            .into()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: FunctionConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for capability in &self.capabilities {
            if capability.name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "capabilities[].name".to_string(),
                }
                .into());
            }
            if !seen.insert(capability.name.as_str()) {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("duplicate capability name: {}", capability.name),
                }
                .into());
            }
            match &capability.kind {
                CapabilityKind::Path { path } if path.is_empty() => {
                    return Err(ConfigError::Invalid {
                        message: format!("capability {} has an empty path", capability.name),
                    }
                    .into());
                }
                CapabilityKind::Env { var } if var.is_empty() => {
                    return Err(ConfigError::Invalid {
                        message: format!("capability {} has an empty variable name", capability.name),
                    }
                    .into());
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn required_capabilities(&self) -> impl Iterator<Item = &CapabilitySpec> {
        self.capabilities.iter().filter(|c| c.required)
    }
}
