//! Core of the name-greeter function: a one-time capability probe and the
//! event-to-response mapping. Runners in this workspace wire it to a platform.

pub mod config;
pub mod encoding;
pub mod errors;
pub mod handler;
pub mod probe;
pub mod telemetry;

pub use config::{load_config, FunctionConfig};
pub use errors::{GreeterError, Result};
pub use handler::{GreetingHandler, GreetingResponse};
pub use probe::{probe_capabilities, Capability, StartupReport};
