pub mod capability;

use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

use crate::errors::ProbeError;

pub use capability::{from_specs, ConfiguredCapability};

/// Something the function may depend on at runtime: a library, a layer
/// mounted on disk, a secret in the environment.
pub trait Capability: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the function must refuse to start without this capability.
    fn required(&self) -> bool {
        false
    }

    /// Checks availability. Must not have side effects beyond the check.
    fn probe(&self) -> Result<(), ProbeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CapabilityStatus {
    Available,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub name: String,
    pub required: bool,
    #[serde(flatten)]
    pub status: CapabilityStatus,
}

impl ProbeOutcome {
    pub fn is_available(&self) -> bool {
        self.status == CapabilityStatus::Available
    }
}

/// Result of the one-time startup probe. Read-only once built; handed to the
/// request handler at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub outcomes: Vec<ProbeOutcome>,
}

/// Probes every capability in order. Never returns early and never lets an
/// error or panic from a probe escape.
pub fn probe_capabilities(capabilities: &[Box<dyn Capability>]) -> StartupReport {
    let outcomes = capabilities
        .iter()
        .map(|capability| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| capability.probe()));
            let status = match result {
                Ok(Ok(())) => CapabilityStatus::Available,
                Ok(Err(e)) => CapabilityStatus::Unavailable {
                    reason: e.to_string(),
                },
                Err(payload) => CapabilityStatus::Unavailable {
                    reason: panic_message(payload.as_ref()),
                },
            };
            ProbeOutcome {
                name: capability.name().to_string(),
                required: capability.required(),
                status,
            }
        })
        .collect();

    StartupReport { outcomes }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("probe panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("probe panicked: {s}")
    } else {
        "probe panicked".to_string()
    }
}

impl StartupReport {
    pub fn is_healthy(&self) -> bool {
        self.outcomes.iter().all(ProbeOutcome::is_available)
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.name == name && o.is_available())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| !o.is_available())
    }

    /// Emits the report to the log sink: one `Errors : ...` line per failed
    /// capability, then a summary.
    pub fn log(&self) {
        for outcome in self.failures() {
            if let CapabilityStatus::Unavailable { reason } = &outcome.status {
                warn!(
                    capability = %outcome.name,
                    required = outcome.required,
                    "Errors : {} ",
                    reason
                );
            }
        }

        let failed = self.failures().count();
        info!(
            probed = self.outcomes.len(),
            failed,
            "Startup probe finished"
        );
    }

    pub fn ensure_required(&self) -> Result<(), ProbeError> {
        let names: Vec<String> = self
            .failures()
            .filter(|o| o.required)
            .map(|o| o.name.clone())
            .collect();

        if names.is_empty() {
            Ok(())
        } else {
            Err(ProbeError::RequiredUnavailable { names })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::capture::capture_logs;

    struct Stub {
        name: &'static str,
        required: bool,
        fail: Option<&'static str>,
    }

    impl Capability for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn required(&self) -> bool {
            self.required
        }

        fn probe(&self) -> Result<(), ProbeError> {
            match self.fail {
                Some(reason) => Err(ProbeError::Unavailable {
                    capability: self.name.to_string(),
                    reason: reason.to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    struct Panics;

    impl Capability for Panics {
        fn name(&self) -> &str {
            "sklearn"
        }

        fn probe(&self) -> Result<(), ProbeError> {
            panic!("No module named 'sklearn'")
        }
    }

    fn stub(name: &'static str, required: bool, fail: Option<&'static str>) -> Box<dyn Capability> {
        Box::new(Stub { name, required, fail })
    }

    #[test]
    fn test_all_available() {
        let report = probe_capabilities(&[stub("json", false, None), stub("numpy", false, None)]);

        assert!(report.is_healthy());
        assert!(report.is_available("numpy"));
        assert_eq!(report.failures().count(), 0);
        assert!(report.ensure_required().is_ok());
    }

    #[test]
    fn test_optional_failure_is_collected_not_fatal() {
        let report = probe_capabilities(&[
            stub("pandas", false, Some("not installed")),
            stub("json", false, None),
        ]);

        assert!(!report.is_healthy());
        assert!(!report.is_available("pandas"));
        assert!(report.is_available("json"));
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.ensure_required().is_ok());
    }

    #[test]
    fn test_required_failure_fails_startup() {
        let report = probe_capabilities(&[
            stub("requests", true, Some("not installed")),
            stub("numpy", true, None),
        ]);

        assert_eq!(
            report.ensure_required(),
            Err(ProbeError::RequiredUnavailable {
                names: vec!["requests".to_string()]
            })
        );
    }

    #[test]
    fn test_panicking_probe_is_contained() {
        let report = probe_capabilities(&[Box::new(Panics), stub("json", false, None)]);

        assert_eq!(report.outcomes.len(), 2);
        match &report.outcomes[0].status {
            CapabilityStatus::Unavailable { reason } => {
                assert!(reason.contains("No module named 'sklearn'"));
            }
            other => panic!("unexpected status: {other:?}"),
        }
        assert!(report.is_available("json"));
    }

    #[test]
    fn test_unknown_name_is_not_available() {
        let report = probe_capabilities(&[]);
        assert!(report.is_healthy());
        assert!(!report.is_available("json"));
    }

    #[test]
    fn test_log_emits_one_errors_line_per_failure() {
        let report = probe_capabilities(&[
            stub("pandas", false, Some("No module named 'pandas'")),
            stub("json", false, None),
            stub("numpy", false, Some("No module named 'numpy'")),
        ]);

        let ((), logs) = capture_logs(|| report.log());

        assert!(
            logs.contains("Errors : capability pandas is unavailable: No module named 'pandas' "),
            "logs: {logs}"
        );
        assert!(
            logs.contains("Errors : capability numpy is unavailable: No module named 'numpy' "),
            "logs: {logs}"
        );
        assert_eq!(logs.matches("Errors : ").count(), 2);
        assert!(logs.contains("Startup probe finished"));
    }

    #[test]
    fn test_log_healthy_report_has_no_errors_line() {
        let report = probe_capabilities(&[stub("json", false, None)]);
        let ((), logs) = capture_logs(|| report.log());

        assert!(!logs.contains("Errors : "), "logs: {logs}");
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = probe_capabilities(&[stub("pandas", false, Some("gone"))]);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "outcomes": [{
                    "name": "pandas",
                    "required": false,
                    "status": "unavailable",
                    "reason": "capability pandas is unavailable: gone"
                }]
            })
        );
    }
}
