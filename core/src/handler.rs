use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, info_span, warn};

use crate::config::FunctionConfig;
use crate::encoding::encode_body;
use crate::errors::{RequestError, Result};
use crate::probe::{self, StartupReport};

pub const NAME_FIELD: &str = "name";
pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;

/// HTTP-style response returned to the platform. `body` holds a serialized
/// JSON value, not a raw string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingResponse {
    pub status_code: u16,
    pub body: String,
}

/// Reads the `name` field from an event. Every value is accepted: strings
/// verbatim, `null` and booleans as `None`/`True`/`False`, anything else as
/// its compact JSON text.
pub fn extract_name(event: &Value) -> std::result::Result<String, RequestError> {
    let value = event
        .get(NAME_FIELD)
        .ok_or_else(|| RequestError::missing(NAME_FIELD))?;

    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    })
}

pub fn greet(name: &str) -> Result<GreetingResponse> {
    Ok(GreetingResponse {
        status_code: STATUS_OK,
        body: encode_body(&format!("My name is {name}"))?,
    })
}

pub fn bad_request(err: &RequestError) -> Result<GreetingResponse> {
    Ok(GreetingResponse {
        status_code: STATUS_BAD_REQUEST,
        body: encode_body(&json!({ "error": err.to_string() }))?,
    })
}

pub struct GreetingHandler {
    report: StartupReport,
    strict_events: bool,
}

impl GreetingHandler {
    pub fn new(report: StartupReport) -> Self {
        Self {
            report,
            strict_events: true,
        }
    }

    /// Strict (the default): a bad event fails the invocation. Otherwise it
    /// is answered with a structured 400 response.
    pub fn strict(mut self, strict_events: bool) -> Self {
        self.strict_events = strict_events;
        self
    }

    /// Runs the startup probe for the configured capabilities and builds the
    /// handler. Fails only when a required capability is unavailable.
    pub fn from_config(config: &FunctionConfig) -> Result<Self> {
        let capabilities = probe::from_specs(&config.capabilities);
        let report = probe::probe_capabilities(&capabilities);
        report.log();
        report.ensure_required()?;

        Ok(Self::new(report).strict(config.strict_events))
    }

    pub fn report(&self) -> &StartupReport {
        &self.report
    }

    pub fn is_strict(&self) -> bool {
        self.strict_events
    }

    pub fn handle(&self, event: &Value, request_id: &str) -> Result<GreetingResponse> {
        let span = info_span!("invocation", request_id = %request_id);
        let _enter = span.enter();

        info!("Starting Lambda function..");

        match extract_name(event) {
            Ok(name) => {
                debug!(name = %name, "Greeting");
                greet(&name)
            }
            Err(e) if self.strict_events => Err(e.into()),
            Err(e) => {
                warn!(error = %e, degraded = !self.report.is_healthy(), "Rejecting event");
                bad_request(&e)
            }
        }
    }
}
