use lambda_http::{run, service_fn, Body, Error, Request, Response};
use register::{register_device, RegisterDeviceRequest, INVALID_REGISTRATION};
use tracing::info;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    if event.method() != "POST" || !event.uri().path().ends_with("/register/device") {
        return Ok(Response::builder()
            .status(404)
            .header("content-type", "text/plain")
            .body("Not found".into())
            .map_err(Box::new)?);
    }

    let request: serde_json::Result<RegisterDeviceRequest> = match event.body() {
        Body::Text(s) => serde_json::from_str(s),
        Body::Binary(b) => serde_json::from_slice(b),
        Body::Empty => {
            return Ok(Response::builder()
                .status(400)
                .header("content-type", "text/plain")
                .body("Expected a request body.".into())
                .map_err(Box::new)?)
        }
    };

    match request {
        Ok(request) => {
            info!("registering device for code {}", request.registration_id);
            match register_device(request).await {
                Ok(response) => Ok(Response::builder()
                    .status(200)
                    .header("content-type", "application/json")
                    .body(serde_json::to_string(&response)?.into())
                    .map_err(Box::new)?),
                Err(e) if e.downcast_ref::<enablr_core::DomainError>().is_some() => {
                    Ok(Response::builder()
                        .status(403)
                        .header("content-type", "text/plain")
                        .body(INVALID_REGISTRATION.into())
                        .map_err(Box::new)?)
                }
                Err(e) => {
                    info!("error registering device: {}", e);
                    Ok(Response::builder()
                        .status(500)
                        .header("content-type", "text/plain")
                        .body(format!("{}", e).into())
                        .map_err(Box::new)?)
                }
            }
        }
        Err(e) => Ok(Response::builder()
            .status(400)
            .header("content-type", "application/json")
            .body(format!("{{\"error\":\"{}\"}}", e).into())
            .map_err(Box::new)?),
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
