use enablr_core::http::{caller_sub, parse_body, text_response};
use enablr_core::clients;
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
        ("GET", ["supporter", "details"]) => {
            api_supporter::get_details(&client, &supporter_id).await
        }
        ("GET", ["supporter", "shared-details", share_identifier]) => {
            api_supporter::get_shared_details(&client, share_identifier).await
        }
        ("POST", ["supporter", "add-supporter", individual_id]) => {
            let request = match parse_body(&event) {
                Ok(request) => request,
                Err(e) => return text_response(400, &format!("{}", e)),
            };
            api_supporter::add_supporter(&client, individual_id, &supporter_id, request).await
        }
        ("POST", ["supporter", "remove-supporter", individual_id]) => {
            let request = match parse_body(&event) {
                Ok(request) => request,
                Err(e) => return text_response(400, &format!("{}", e)),
            };
            api_supporter::remove_supporter(&client, individual_id, &supporter_id, request).await
        }
        ("GET", ["supporter", "individuals"]) => {
            api_supporter::get_individuals(&client, &supporter_id).await
        }
        ("GET", ["supporter", "supporters", individual_id]) => {
            api_supporter::get_individual_supporters(&client, individual_id, &supporter_id).await
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
