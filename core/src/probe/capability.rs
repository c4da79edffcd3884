use std::path::Path;

use crate::config::{CapabilityKind, CapabilitySpec};
use crate::encoding::encode_body;
use crate::errors::ProbeError;
use crate::probe::Capability;

const JSON_PROBE_TEXT: &str = "probe \u{e9}\u{1f600}";

/// A capability declared in the function configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredCapability {
    spec: CapabilitySpec,
}

impl ConfiguredCapability {
    pub fn new(spec: CapabilitySpec) -> Self {
        Self { spec }
    }

    fn unavailable(&self, reason: impl Into<String>) -> ProbeError {
        ProbeError::Unavailable {
            capability: self.spec.name.clone(),
            reason: reason.into(),
        }
    }

    fn probe_json(&self) -> Result<(), ProbeError> {
        let encoded = encode_body(JSON_PROBE_TEXT).map_err(|e| self.unavailable(e.to_string()))?;
        if !encoded.is_ascii() {
            return Err(self.unavailable("encoder produced non-ASCII output"));
        }

        let decoded: String =
            serde_json::from_str(&encoded).map_err(|e| self.unavailable(e.to_string()))?;
        if decoded != JSON_PROBE_TEXT {
            return Err(self.unavailable(format!("round trip mismatch: {decoded:?}")));
        }
        Ok(())
    }

    fn probe_path(&self, path: &str) -> Result<(), ProbeError> {
        Path::new(path)
            .try_exists()
            .map_err(|e| self.unavailable(format!("cannot stat {path}: {e}")))
            .and_then(|exists| {
                if exists {
                    Ok(())
                } else {
                    Err(self.unavailable(format!("No such file or directory: {path}")))
                }
            })
    }

    fn probe_env(&self, var: &str) -> Result<(), ProbeError> {
        match std::env::var_os(var) {
            Some(value) if !value.is_empty() => Ok(()),
            Some(_) => Err(self.unavailable(format!("environment variable {var} is empty"))),
            None => Err(self.unavailable(format!("environment variable {var} is not set"))),
        }
    }
}

impl Capability for ConfiguredCapability {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn required(&self) -> bool {
        self.spec.required
    }

    fn probe(&self) -> Result<(), ProbeError> {
        match &self.spec.kind {
            CapabilityKind::Json => self.probe_json(),
            CapabilityKind::Path { path } => self.probe_path(path),
            CapabilityKind::Env { var } => self.probe_env(var),
        }
    }
}

pub fn from_specs(specs: &[CapabilitySpec]) -> Vec<Box<dyn Capability>> {
    specs
        .iter()
        .cloned()
        .map(|spec| Box::new(ConfiguredCapability::new(spec)) as Box<dyn Capability>)
        .collect()
}
