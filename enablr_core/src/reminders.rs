use crate::types::Reminder;
use crate::Error;
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::model::{AttributeValue, DeleteRequest, PutRequest, WriteRequest};
use serde_dynamo::aws_sdk_dynamodb_0_24::{from_items, to_item};
use std::env;
use tokio_stream::StreamExt;

pub const REMINDER_TABLE_NAME: &str = "REMINDER_TABLE_NAME";

/// DynamoDB caps batch writes at 25 requests.
const MAX_BATCH_WRITE: usize = 25;

const FOUR_WEEKS_SECS: i64 = 4 * 7 * 24 * 60 * 60;

/// Older frontend builds sent JavaScript millisecond timestamps where the
/// API expects seconds; anything that large is scaled down.
const MILLIS_CUTOVER: i64 = 167_372_820_000;

pub fn normalize_beginning(beginning: i64) -> i64 {
    if beginning > MILLIS_CUTOVER {
        beginning / 1000
    } else {
        beginning
    }
}

pub async fn get_reminders_since(
    client: &ddb::Client,
    reminder_id: &str,
    beginning: i64,
) -> Result<Vec<Reminder>, Error> {
    let table_name = env::var(REMINDER_TABLE_NAME)?;
    let mut results = client
        .query()
        .table_name(table_name)
        .key_condition_expression("reminder_id = :reminder_id AND due > :due")
        .expression_attribute_values(":reminder_id", AttributeValue::S(reminder_id.to_owned()))
        .expression_attribute_values(":due", AttributeValue::N(beginning.to_string()))
        .into_paginator()
        .send();
    let mut reminders: Vec<Reminder> = Vec::new();
    while let Some(res) = results.next().await {
        match res?.items() {
            Some(items) => reminders.extend(from_items(items.to_vec())?),
            None => break,
        }
    }
    Ok(reminders)
}

/// The trailing month of reminders, the default window the frontend
/// charts from.
pub async fn get_recent_reminders(
    client: &ddb::Client,
    reminder_id: &str,
    now: i64,
) -> Result<Vec<Reminder>, Error> {
    get_reminders_since(client, reminder_id, now - FOUR_WEEKS_SECS).await
}

/// Everything still ahead of `now` under one reminder key.
pub async fn query_future(
    client: &ddb::Client,
    reminder_id: &str,
    now: i64,
) -> Result<Vec<Reminder>, Error> {
    get_reminders_since(client, reminder_id, now).await
}

/// Mark one occurrence done, attaching the optional free-text note.
pub async fn complete_reminder(
    client: &ddb::Client,
    reminder_id: &str,
    due: i64,
    note: &str,
) -> Result<(), Error> {
    let table_name = env::var(REMINDER_TABLE_NAME)?;
    client
        .update_item()
        .table_name(table_name)
        .key("reminder_id", AttributeValue::S(reminder_id.to_owned()))
        .key("due", AttributeValue::N(due.to_string()))
        .update_expression("SET note = :n, completed = :c")
        .expression_attribute_values(":n", AttributeValue::S(note.to_owned()))
        .expression_attribute_values(":c", AttributeValue::Bool(true))
        .send()
        .await?;
    Ok(())
}

pub fn put_request(reminder: &Reminder) -> Result<WriteRequest, Error> {
    Ok(WriteRequest::builder()
        .put_request(
            PutRequest::builder()
                .set_item(Some(to_item(reminder.clone())?))
                .build(),
        )
        .build())
}

pub fn delete_request(reminder: &Reminder) -> WriteRequest {
    WriteRequest::builder()
        .delete_request(
            DeleteRequest::builder()
                .key(
                    "reminder_id",
                    AttributeValue::S(reminder.reminder_id.clone()),
                )
                .key("due", AttributeValue::N(reminder.due.to_string()))
                .build(),
        )
        .build()
}

/// Flush writes against the reminder table in 25-item chunks.
pub async fn write_reminder_batches(
    client: &ddb::Client,
    requests: Vec<WriteRequest>,
) -> Result<(), Error> {
    let table_name = env::var(REMINDER_TABLE_NAME)?;
    for chunk in requests.chunks(MAX_BATCH_WRITE) {
        client
            .batch_write_item()
            .request_items(table_name.clone(), chunk.to_vec())
            .send()
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_timestamps_are_scaled_to_seconds() {
        assert_eq!(normalize_beginning(1_674_622_537_050), 1_674_622_537);
        assert_eq!(normalize_beginning(1_674_622_537), 1_674_622_537);
        assert_eq!(normalize_beginning(0), 0);
    }
}
