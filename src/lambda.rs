#[cfg(feature = "lambda")]
use feedback_relay::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use feedback_relay::{ChatClient, FeedbackRelay, HttpEvent, HttpResponse, RelayConfig};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

#[cfg(feature = "lambda")]
async fn function_handler(
    relay: &FeedbackRelay<ChatClient>,
    event: LambdaEvent<HttpEvent>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("Handling request {}", event.context.request_id);
    Ok(relay.handle(event.payload).await)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = RelayConfig::from_env()?;
    config.validate()?;
    let relay = FeedbackRelay::from_config(&config)?;
    let relay = &relay;

    run(service_fn(move |event: LambdaEvent<HttpEvent>| async move {
        function_handler(relay, event).await
    }))
    .await
}
