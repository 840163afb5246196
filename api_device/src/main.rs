use enablr_core::clients;
use enablr_core::http::{authorizer_context, parse_body, text_response};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use tracing::debug;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    debug!("request: {:?}", event);
    let registration_id = match authorizer_context(&event, "registration_id") {
        Some(id) => id,
        None => return text_response(401, "please authenticate"),
    };

    let client = clients::ddb_client().await;
    let registration = match api_device::active_registration(&client, &registration_id).await? {
        Some(registration) => registration,
        None => return api_device::revoked_response(),
    };

    let path = event.uri().path().to_owned();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (event.method().as_str(), segments.as_slice()) {
        ("GET", ["device", "individual"]) => {
            api_device::get_individual(&client, &registration).await
        }
        ("GET", ["device", "reminders", task_id, beginning]) => {
            let beginning = match beginning.parse::<i64>() {
                Ok(value) => value,
                Err(_) => return text_response(400, "beginning must be a timestamp"),
            };
            api_device::get_reminders_from_date(&client, &registration, task_id, beginning).await
        }
        ("POST", ["device", "update-reminder", task_id]) => {
            let request = match parse_body(&event) {
                Ok(request) => request,
                Err(e) => return text_response(400, &format!("{}", e)),
            };
            api_device::update_reminder(&client, &registration, task_id, request).await
        }
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
