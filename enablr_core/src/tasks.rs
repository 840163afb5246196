use crate::types::CatalogTask;
use crate::Error;
use aws_sdk_dynamodb as ddb;
use serde_dynamo::aws_sdk_dynamodb_0_24::from_items;
use std::env;
use tokio_stream::StreamExt;

pub const TASK_TABLE_NAME: &str = "TASK_TABLE_NAME";

/// The whole predefined task catalog. Small enough to scan.
pub async fn get_all_tasks(client: &ddb::Client) -> Result<Vec<CatalogTask>, Error> {
    let table_name = env::var(TASK_TABLE_NAME)?;
    let mut results = client
        .scan()
        .table_name(table_name)
        .into_paginator()
        .send();
    let mut tasks: Vec<CatalogTask> = Vec::new();
    while let Some(res) = results.next().await {
        match res?.items() {
            Some(items) => tasks.extend(from_items(items.to_vec())?),
            None => break,
        }
    }
    Ok(tasks)
}
