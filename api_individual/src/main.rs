use enablr_core::clients;
use enablr_core::http::{caller_sub, parse_body, text_response};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use tracing::debug;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    debug!("request: {:?}", event);
    let supporter_id = match caller_sub(&event) {
        Some(sub) => sub,
        None => return text_response(401, "please authenticate"),
    };

    let path = event.uri().path().to_owned();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let client = clients::ddb_client().await;

    match (event.method().as_str(), segments.as_slice()) {
        ("GET", ["individual", "reminders", individual_id, reminder_id]) => {
            api_individual::get_reminders(&client, individual_id, &supporter_id, reminder_id).await
        }
        ("GET", ["individual", "reminders", individual_id, reminder_id, beginning]) => {
            let beginning = match beginning.parse::<i64>() {
                Ok(value) => value,
                Err(_) => return text_response(400, "beginning must be a timestamp"),
            };
            api_individual::get_reminders_from_date(
                &client,
                individual_id,
                &supporter_id,
                reminder_id,
                beginning,
            )
            .await
        }
        ("GET", ["individual", "register-device", individual_id]) => {
            api_individual::get_register_device(&client, individual_id, &supporter_id).await
        }
        ("GET", ["individual", "devices", individual_id]) => {
            api_individual::get_registered_devices(&client, individual_id, &supporter_id).await
        }
        ("POST", ["individual", "devices", "revoke", individual_id]) => {
            let request = match parse_body(&event) {
                Ok(request) => request,
                Err(e) => return text_response(400, &format!("{}", e)),
            };
            api_individual::revoke_device(&client, individual_id, &supporter_id, request).await
        }
        ("POST", ["individual", individual_id, "tasks"]) => {
            let request = match parse_body(&event) {
                Ok(request) => request,
                Err(e) => return text_response(400, &format!("{}", e)),
            };
            api_individual::update_individual_tasks(&client, individual_id, &supporter_id, request)
                .await
        }
        ("GET", ["individual", individual_id]) => {
            api_individual::get_individual(&client, individual_id, &supporter_id).await
        }
        ("POST", ["individual", individual_id]) => {
            let details = match parse_body(&event) {
                Ok(details) => details,
                Err(e) => return text_response(400, &format!("{}", e)),
            };
            api_individual::update_individual(&client, individual_id, &supporter_id, details).await
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
