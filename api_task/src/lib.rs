use aws_sdk_dynamodb as ddb;
use enablr_core::http::json_response;
use enablr_core::{tasks, Error};
use lambda_http::{Body, Response};
use serde_json::json;

/// The predefined task catalog. Gated by the Cognito authorizer at the
/// gateway; every signed-in supporter sees the same list.
pub async fn get_tasks(client: &ddb::Client) -> Result<Response<Body>, Error> {
    let tasks = tasks::get_all_tasks(client).await?;
    json_response(200, &json!({ "tasks": tasks }))
}
