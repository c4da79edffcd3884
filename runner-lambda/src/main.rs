use greeter_core::telemetry::init_tracing;
use greeter_core::{load_config, GreetingHandler, GreetingResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

pub async fn lambda_handler(
    handler: &GreetingHandler,
    event: LambdaEvent<Value>,
) -> Result<GreetingResponse, Error> {
    let (payload, context) = event.into_parts();
    let response = handler.handle(&payload, &context.request_id)?;
    Ok(response)
}

/// The probe runs once here, before the runtime starts polling for events.
#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = load_config(None)?;
    init_tracing(config.log_filter.as_deref());

    let handler = GreetingHandler::from_config(&config)?;
    tracing::info!(
        strict_events = handler.is_strict(),
        healthy = handler.report().is_healthy(),
        "Greeter ready"
    );

    let handler = &handler;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        lambda_handler(handler, event).await
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use greeter_core::StartupReport;
    use lambda_runtime::Context;
    use serde_json::json;

    fn event(payload: Value) -> LambdaEvent<Value> {
        LambdaEvent::new(payload, Context::default())
    }

    #[tokio::test]
    async fn test_lambda_handler_greets() {
        let handler = GreetingHandler::new(StartupReport::default());
        let response = lambda_handler(&handler, event(json!({ "name": "Alice" })))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "\"My name is Alice\"");
    }

    #[tokio::test]
    async fn test_lambda_handler_missing_name_is_400_when_not_strict() {
        let handler = GreetingHandler::new(StartupReport::default()).strict(false);
        let response = lambda_handler(&handler, event(json!({})))
            .await
            .unwrap();

        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_lambda_handler_missing_name_fails_invocation() {
        let handler = GreetingHandler::new(StartupReport::default());
        let err = lambda_handler(&handler, event(json!({ "id": 1 })))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Bad request: Missing required field: name"
        );
    }
}
