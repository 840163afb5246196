use aws_sdk_dynamodb as ddb;
use enablr_core::http::{json_response, text_response};
use enablr_core::types::{reminder_key, RegistrationRecord};
use enablr_core::{individuals, registrations, reminders, Error};
use lambda_http::{Body, Response};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    pub due: i64,
    pub note: String,
}

pub fn revoked_response() -> Result<Response<Body>, Error> {
    text_response(403, "Revoked")
}

/// The token only proves the device once held a valid registration; the
/// row is re-read per request so revocation takes effect immediately.
pub async fn active_registration(
    client: &ddb::Client,
    registration_id: &str,
) -> Result<Option<RegistrationRecord>, Error> {
    Ok(registrations::get_registration(client, registration_id)
        .await?
        .filter(RegistrationRecord::is_active))
}

/// The record of the individual this device is bound to.
pub async fn get_individual(
    client: &ddb::Client,
    registration: &RegistrationRecord,
) -> Result<Response<Body>, Error> {
    let individual = individuals::get_individual(client, &registration.individual_id).await?;
    json_response(200, &individual)
}

pub async fn get_reminders_from_date(
    client: &ddb::Client,
    registration: &RegistrationRecord,
    task_id: &str,
    beginning: i64,
) -> Result<Response<Body>, Error> {
    let reminder_id = reminder_key(&registration.individual_id, task_id);
    let beginning = reminders::normalize_beginning(beginning);
    let rows = reminders::get_reminders_since(client, &reminder_id, beginning).await?;
    let result: Vec<_> = rows
        .iter()
        .map(|r| {
            json!({
                "reminder_id": r.reminder_id,
                "task_id": r.task_id,
                "due": r.due,
                "completed": r.completed,
                "note": r.note,
            })
        })
        .collect();
    json_response(200, &json!({ "reminders": result }))
}

/// Mark one occurrence done, with an optional note from the device.
pub async fn update_reminder(
    client: &ddb::Client,
    registration: &RegistrationRecord,
    task_id: &str,
    request: UpdateReminderRequest,
) -> Result<Response<Body>, Error> {
    let reminder_id = reminder_key(&registration.individual_id, task_id);
    reminders::complete_reminder(client, &reminder_id, request.due, &request.note).await?;
    json_response(200, &json!({ "reminder_id": reminder_id }))
}
