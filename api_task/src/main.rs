use enablr_core::clients;
use enablr_core::http::{caller_sub, text_response};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use tracing::debug;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    debug!("request: {:?}", event);
    if caller_sub(&event).is_none() {
        return text_response(401, "please authenticate");
    }

    let path = event.uri().path().to_owned();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let client = clients::ddb_client().await;

    match (event.method().as_str(), segments.as_slice()) {
        ("GET", ["task", "tasks"]) => api_task::get_tasks(&client).await,
        _ => text_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();

    run(service_fn(function_handler)).await
}
