use crate::types::RegistrationRecord;
use crate::Error;
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::model::AttributeValue;
use serde_dynamo::aws_sdk_dynamodb_0_24::{from_item, from_items, to_item};
use std::env;
use tokio_stream::StreamExt;
use uuid::Uuid;

pub const REGISTRATION_TABLE_NAME: &str = "REGISTRATION_TABLE_NAME";
pub const REGISTRATION_TABLE_INDEX_NAME: &str = "REGISTRATION_TABLE_INDEX_NAME";

/// Registration codes are short-lived; a device has an hour to claim one.
const REGISTRATION_TTL_SECS: i64 = 60 * 60;

pub async fn new_registration(
    client: &ddb::Client,
    individual_id: &str,
    now: i64,
) -> Result<RegistrationRecord, Error> {
    let record = RegistrationRecord {
        registration_id: Uuid::new_v4().to_string(),
        individual_id: individual_id.to_owned(),
        expiry: now + REGISTRATION_TTL_SECS,
        device_id: None,
        device_name: None,
        revoked: None,
    };
    let table_name = env::var(REGISTRATION_TABLE_NAME)?;
    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(to_item(record.clone())?))
        .send()
        .await?;
    Ok(record)
}

pub async fn get_registration(
    client: &ddb::Client,
    registration_id: &str,
) -> Result<Option<RegistrationRecord>, Error> {
    let table_name = env::var(REGISTRATION_TABLE_NAME)?;
    let result = client
        .get_item()
        .table_name(table_name)
        .key(
            "registration_id",
            AttributeValue::S(registration_id.to_owned()),
        )
        .send()
        .await?;
    match result.item() {
        Some(item) => Ok(Some(from_item(item.clone())?)),
        None => Ok(None),
    }
}

/// Claim a registration code for a device.
pub async fn bind_device(
    client: &ddb::Client,
    registration_id: &str,
    device_id: &str,
    device_name: &str,
) -> Result<(), Error> {
    let table_name = env::var(REGISTRATION_TABLE_NAME)?;
    client
        .update_item()
        .table_name(table_name)
        .key(
            "registration_id",
            AttributeValue::S(registration_id.to_owned()),
        )
        .update_expression("SET device_id = :d, device_name = :n")
        .expression_attribute_values(":d", AttributeValue::S(device_id.to_owned()))
        .expression_attribute_values(":n", AttributeValue::S(device_name.to_owned()))
        .send()
        .await?;
    Ok(())
}

/// Bound, non-revoked registrations for an individual. Unclaimed codes
/// and revoked devices are filtered out.
pub async fn get_devices(
    client: &ddb::Client,
    individual_id: &str,
) -> Result<Vec<RegistrationRecord>, Error> {
    let table_name = env::var(REGISTRATION_TABLE_NAME)?;
    let index_name = env::var(REGISTRATION_TABLE_INDEX_NAME)?;
    let mut results = client
        .query()
        .table_name(table_name)
        .index_name(index_name)
        .key_condition_expression("individual_id = :individual_id")
        .expression_attribute_values(":individual_id", AttributeValue::S(individual_id.to_owned()))
        .into_paginator()
        .send();
    let mut devices: Vec<RegistrationRecord> = Vec::new();
    while let Some(res) = results.next().await {
        match res?.items() {
            Some(items) => {
                let records: Vec<RegistrationRecord> = from_items(items.to_vec())?;
                devices.extend(records.into_iter().filter(RegistrationRecord::is_active));
            }
            None => break,
        }
    }
    Ok(devices)
}

pub async fn revoke_registration(
    client: &ddb::Client,
    registration_id: &str,
) -> Result<(), Error> {
    let table_name = env::var(REGISTRATION_TABLE_NAME)?;
    client
        .update_item()
        .table_name(table_name)
        .key(
            "registration_id",
            AttributeValue::S(registration_id.to_owned()),
        )
        .update_expression("SET revoked = :r")
        .expression_attribute_values(":r", AttributeValue::S(String::from("REVOKED")))
        .send()
        .await?;
    Ok(())
}
