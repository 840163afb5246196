use aws_sdk_dynamodb as ddb;
use chrono::Utc;
use enablr_core::http::{denied_response, json_response};
use enablr_core::types::{AssignedTask, IndividualDetails, Relationship};
use enablr_core::{access, individuals, registrations, reminders, Error};
use lambda_http::{Body, Response};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct UpdateTasksRequest {
    pub tasks: Vec<AssignedTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeDeviceRequest {
    pub registration_id: String,
}

/// Any non-DENIED tier may read and edit the individual; device
/// management stays PRIMARY-only.
async fn relationship(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
) -> Result<Relationship, Error> {
    let access = access::get_access_permission(client, individual_id, supporter_id).await?;
    Ok(access.relationship)
}

pub async fn get_individual(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? == Relationship::Denied {
        return denied_response();
    }
    let individual = individuals::get_individual(client, individual_id).await?;
    json_response(200, &individual)
}

pub async fn update_individual(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    details: IndividualDetails,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? == Relationship::Denied {
        return denied_response();
    }
    let individual = individuals::update_individual_details(client, individual_id, &details).await?;
    json_response(200, &individual)
}

/// Replace the assigned task list. The table stream turns the diff into
/// reminder work, so nothing else happens here.
pub async fn update_individual_tasks(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    request: UpdateTasksRequest,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? == Relationship::Denied {
        return denied_response();
    }
    let individual =
        individuals::update_individual_tasks(client, individual_id, &request.tasks).await?;
    json_response(200, &individual)
}

/// The trailing month of reminders for one (individual, task) key.
pub async fn get_reminders(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    reminder_id: &str,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? == Relationship::Denied {
        return denied_response();
    }
    let rows =
        reminders::get_recent_reminders(client, reminder_id, Utc::now().timestamp()).await?;
    let result: Vec<_> = rows
        .iter()
        .map(|r| json!({ "reminder_id": r.reminder_id, "due": r.due }))
        .collect();
    json_response(200, &json!({ "reminders": result }))
}

/// Reminders since an arbitrary timestamp, with completion state, for
/// the history charts.
pub async fn get_reminders_from_date(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    reminder_id: &str,
    beginning: i64,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? == Relationship::Denied {
        return denied_response();
    }
    let beginning = reminders::normalize_beginning(beginning);
    let rows = reminders::get_reminders_since(client, reminder_id, beginning).await?;
    let result: Vec<_> = rows
        .iter()
        .map(|r| {
            json!({
                "reminder_id": r.reminder_id,
                "due": r.due,
                "completed": r.completed,
                "note": r.note,
            })
        })
        .collect();
    json_response(200, &json!({ "reminders": result }))
}

/// Mint a short-lived registration code for pairing a device.
pub async fn get_register_device(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? != Relationship::Primary {
        return denied_response();
    }
    let registration =
        registrations::new_registration(client, individual_id, Utc::now().timestamp()).await?;
    json_response(
        200,
        &json!({ "registrationId": registration.registration_id }),
    )
}

pub async fn get_registered_devices(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? != Relationship::Primary {
        return denied_response();
    }
    let devices = registrations::get_devices(client, individual_id).await?;
    let result: Vec<_> = devices
        .iter()
        .map(|d| {
            json!({
                "registration_id": d.registration_id,
                "device_name": d.device_name,
            })
        })
        .collect();
    json_response(200, &json!({ "devices": result }))
}

pub async fn revoke_device(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    request: RevokeDeviceRequest,
) -> Result<Response<Body>, Error> {
    if relationship(client, individual_id, supporter_id).await? != Relationship::Primary {
        return denied_response();
    }
    let devices = registrations::get_devices(client, individual_id).await?;
    let status = if devices
        .iter()
        .any(|d| d.registration_id == request.registration_id)
    {
        registrations::revoke_registration(client, &request.registration_id).await?;
        "Revoked"
    } else {
        "Already revoked or not found"
    };
    json_response(200, &json!({ "status": status }))
}
