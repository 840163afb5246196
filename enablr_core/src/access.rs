use crate::types::{AccessRecord, Relationship};
use crate::{DomainError, Error};
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::model::AttributeValue;
use serde_dynamo::aws_sdk_dynamodb_0_24::{from_item, from_items, to_item};
use std::env;
use tokio_stream::StreamExt;

pub const ACCESS_TABLE_NAME: &str = "ACCESS_TABLE_NAME";
pub const ACCESS_TABLE_INDEX_NAME: &str = "ACCESS_TABLE_INDEX_NAME";

/// Look up the caller's relationship to an individual. A missing row is
/// reported as DENIED rather than an error so route guards stay uniform.
pub async fn get_access_permission(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
) -> Result<AccessRecord, Error> {
    let table_name = env::var(ACCESS_TABLE_NAME)?;
    let result = client
        .get_item()
        .table_name(table_name)
        .key("individual_id", AttributeValue::S(individual_id.to_owned()))
        .key("supporter_id", AttributeValue::S(supporter_id.to_owned()))
        .send()
        .await?;
    match result.item() {
        Some(item) => Ok(from_item(item.clone())?),
        None => Ok(AccessRecord {
            individual_id: individual_id.to_owned(),
            supporter_id: supporter_id.to_owned(),
            relationship: Relationship::Denied,
        }),
    }
}

/// True when granting `relationship` would give the individual a second
/// PRIMARY supporter. There is at most one PRIMARY per individual.
pub fn primary_conflict(existing: &[AccessRecord], relationship: Relationship) -> bool {
    relationship == Relationship::Primary
        && existing
            .iter()
            .any(|access| access.relationship == Relationship::Primary)
}

pub async fn add_supporter_permission(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    relationship: Relationship,
) -> Result<(), Error> {
    if relationship == Relationship::Denied {
        return Err(DomainError::new("DENIED is not a grantable relationship").into());
    }
    let existing = get_individual_supporters(client, individual_id).await?;
    if primary_conflict(&existing, relationship) {
        return Err(DomainError::new("This individual already has a PRIMARY supporter").into());
    }

    let record = AccessRecord {
        individual_id: individual_id.to_owned(),
        supporter_id: supporter_id.to_owned(),
        relationship,
    };
    let table_name = env::var(ACCESS_TABLE_NAME)?;
    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(to_item(record)?))
        .send()
        .await?;
    Ok(())
}

pub async fn delete_supporter_permission(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
) -> Result<(), Error> {
    let table_name = env::var(ACCESS_TABLE_NAME)?;
    client
        .delete_item()
        .table_name(table_name)
        .key("individual_id", AttributeValue::S(individual_id.to_owned()))
        .key("supporter_id", AttributeValue::S(supporter_id.to_owned()))
        .send()
        .await?;
    Ok(())
}

/// Every supporter with access to an individual.
pub async fn get_individual_supporters(
    client: &ddb::Client,
    individual_id: &str,
) -> Result<Vec<AccessRecord>, Error> {
    let table_name = env::var(ACCESS_TABLE_NAME)?;
    let mut results = client
        .query()
        .table_name(table_name)
        .key_condition_expression("#ind = :ind")
        .expression_attribute_names("#ind", "individual_id")
        .expression_attribute_values(":ind", AttributeValue::S(individual_id.to_owned()))
        .into_paginator()
        .send();
    let mut records: Vec<AccessRecord> = Vec::new();
    while let Some(res) = results.next().await {
        match res?.items() {
            Some(items) => records.extend(from_items(items.to_vec())?),
            None => break,
        }
    }
    Ok(records)
}

/// Every individual a supporter has access to, via the supporter-keyed
/// index.
pub async fn get_supporter_access(
    client: &ddb::Client,
    supporter_id: &str,
) -> Result<Vec<AccessRecord>, Error> {
    let table_name = env::var(ACCESS_TABLE_NAME)?;
    let index_name = env::var(ACCESS_TABLE_INDEX_NAME)?;
    let mut results = client
        .query()
        .table_name(table_name)
        .index_name(index_name)
        .key_condition_expression("#sup = :sup")
        .expression_attribute_names("#sup", "supporter_id")
        .expression_attribute_values(":sup", AttributeValue::S(supporter_id.to_owned()))
        .into_paginator()
        .send();
    let mut records: Vec<AccessRecord> = Vec::new();
    while let Some(res) = results.next().await {
        match res?.items() {
            Some(items) => records.extend(from_items(items.to_vec())?),
            None => break,
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(supporter_id: &str, relationship: Relationship) -> AccessRecord {
        AccessRecord {
            individual_id: String::from("ind-1"),
            supporter_id: supporter_id.to_owned(),
            relationship,
        }
    }

    #[test]
    fn second_primary_is_a_conflict() {
        let existing = vec![
            grant("sup-1", Relationship::Primary),
            grant("sup-2", Relationship::Secondary),
        ];
        assert!(primary_conflict(&existing, Relationship::Primary));
    }

    #[test]
    fn non_primary_grants_never_conflict() {
        let existing = vec![grant("sup-1", Relationship::Primary)];
        assert!(!primary_conflict(&existing, Relationship::Secondary));
        assert!(!primary_conflict(&existing, Relationship::Tertiary));
    }

    #[test]
    fn first_primary_is_allowed() {
        let existing = vec![grant("sup-2", Relationship::Secondary)];
        assert!(!primary_conflict(&existing, Relationship::Primary));
        assert!(!primary_conflict(&[], Relationship::Primary));
    }
}
