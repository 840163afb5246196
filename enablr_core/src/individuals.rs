use crate::types::{AssignedTask, IndividualDetails, IndividualRecord};
use crate::{DomainError, Error};
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::model::AttributeValue;
use serde_dynamo::aws_sdk_dynamodb_0_24::{from_item, from_items, to_attribute_value};
use std::env;
use tokio_stream::StreamExt;

pub const INDIVIDUAL_TABLE_NAME: &str = "INDIVIDUAL_TABLE_NAME";

pub async fn get_individual(
    client: &ddb::Client,
    individual_id: &str,
) -> Result<IndividualRecord, Error> {
    let table_name = env::var(INDIVIDUAL_TABLE_NAME)?;
    let result = client
        .get_item()
        .table_name(table_name)
        .key("individual_id", AttributeValue::S(individual_id.to_owned()))
        .send()
        .await?;
    match result.item() {
        Some(item) => Ok(from_item(item.clone())?),
        None => Err(DomainError::new(format!("unknown individual {}", individual_id)).into()),
    }
}

pub async fn update_individual_details(
    client: &ddb::Client,
    individual_id: &str,
    details: &IndividualDetails,
) -> Result<IndividualRecord, Error> {
    let table_name = env::var(INDIVIDUAL_TABLE_NAME)?;
    let result = client
        .update_item()
        .table_name(table_name)
        .key("individual_id", AttributeValue::S(individual_id.to_owned()))
        .update_expression(
            "SET details.firstName = :f, details.lastName = :l, details.birthday = :b, \
             details.tz = :t, details.primaryColor = :p, details.secondaryColor = :c",
        )
        .expression_attribute_values(":f", AttributeValue::S(details.first_name.clone()))
        .expression_attribute_values(":l", AttributeValue::S(details.last_name.clone()))
        .expression_attribute_values(":b", AttributeValue::S(details.birthday.clone()))
        .expression_attribute_values(":t", AttributeValue::S(details.tz.clone()))
        .expression_attribute_values(":p", AttributeValue::S(details.primary_color.clone()))
        .expression_attribute_values(":c", AttributeValue::S(details.secondary_color.clone()))
        .return_values(ddb::model::ReturnValue::AllNew)
        .send()
        .await?;
    match result.attributes() {
        Some(item) => Ok(from_item(item.clone())?),
        None => Err(DomainError::new("update returned no attributes").into()),
    }
}

/// Straight replacement of the assigned-task list. The individual-table
/// stream picks the change up and fans reminder work out from the diff.
pub async fn update_individual_tasks(
    client: &ddb::Client,
    individual_id: &str,
    tasks: &[AssignedTask],
) -> Result<IndividualRecord, Error> {
    let table_name = env::var(INDIVIDUAL_TABLE_NAME)?;
    let result = client
        .update_item()
        .table_name(table_name)
        .key("individual_id", AttributeValue::S(individual_id.to_owned()))
        .update_expression("SET tasks = :t")
        .expression_attribute_values(":t", to_attribute_value(tasks.to_vec())?)
        .return_values(ddb::model::ReturnValue::AllNew)
        .send()
        .await?;
    match result.attributes() {
        Some(item) => Ok(from_item(item.clone())?),
        None => Err(DomainError::new("update returned no attributes").into()),
    }
}

/// Full scan, used by the periodic rematerialization.
pub async fn scan_individuals(client: &ddb::Client) -> Result<Vec<IndividualRecord>, Error> {
    let table_name = env::var(INDIVIDUAL_TABLE_NAME)?;
    let mut results = client
        .scan()
        .table_name(table_name)
        .into_paginator()
        .send();
    let mut records: Vec<IndividualRecord> = Vec::new();
    while let Some(res) = results.next().await {
        match res?.items() {
            Some(items) => records.extend(from_items(items.to_vec())?),
            None => break,
        }
    }
    Ok(records)
}
