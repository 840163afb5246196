use crate::types::SupporterRecord;
use crate::{DomainError, Error};
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::model::AttributeValue;
use serde_dynamo::aws_sdk_dynamodb_0_24::{from_item, to_item};
use std::env;

pub const SUPPORTER_TABLE_NAME: &str = "SUPPORTER_TABLE_NAME";
pub const SHARE_SUPPORTER_INDEX_NAME: &str = "SHARE_SUPPORTER_INDEX_NAME";

pub async fn get_supporter_details(
    client: &ddb::Client,
    supporter_id: &str,
) -> Result<SupporterRecord, Error> {
    let table_name = env::var(SUPPORTER_TABLE_NAME)?;
    let result = client
        .get_item()
        .table_name(table_name)
        .key("supporter_id", AttributeValue::S(supporter_id.to_owned()))
        .send()
        .await?;
    match result.item() {
        Some(item) => Ok(from_item(item.clone())?),
        None => Err(DomainError::new(format!("unknown supporter {}", supporter_id)).into()),
    }
}

/// Share codes are unique by construction, so the first index hit is the
/// supporter. `None` means the code doesn't exist.
pub async fn find_supporter_by_share(
    client: &ddb::Client,
    share_identifier: &str,
) -> Result<Option<SupporterRecord>, Error> {
    let table_name = env::var(SUPPORTER_TABLE_NAME)?;
    let index_name = env::var(SHARE_SUPPORTER_INDEX_NAME)?;
    let result = client
        .query()
        .table_name(table_name)
        .index_name(index_name)
        .key_condition_expression("shareIdentifier = :share")
        .expression_attribute_values(":share", AttributeValue::S(share_identifier.to_owned()))
        .send()
        .await?;
    match result.items() {
        Some([item, ..]) => Ok(Some(from_item(item.clone())?)),
        _ => Ok(None),
    }
}

pub async fn put_supporter(client: &ddb::Client, record: &SupporterRecord) -> Result<(), Error> {
    let table_name = env::var(SUPPORTER_TABLE_NAME)?;
    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(to_item(record.clone())?))
        .send()
        .await?;
    Ok(())
}
