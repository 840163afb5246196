use aws_config::meta::region::RegionProviderChain;
use aws_config::SdkConfig;
use aws_sdk_dynamodb as ddb;
use std::env;

const DYNAMODB_ENDPOINT: &str = "DYNAMODB_ENDPOINT";

pub async fn load_config() -> SdkConfig {
    let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
    aws_config::from_env().region(region_provider).load().await
}

/// DynamoDB client honoring the local-endpoint override used by the
/// integration environment.
pub fn ddb_client_with(config: &SdkConfig) -> ddb::Client {
    let ddb_config = match env::var(DYNAMODB_ENDPOINT) {
        Ok(endpoint) => ddb::config::Builder::from(config)
            .endpoint_url(endpoint)
            .build(),
        _ => ddb::config::Builder::from(config).build(),
    };
    ddb::Client::from_conf(ddb_config)
}

pub async fn ddb_client() -> ddb::Client {
    let config = load_config().await;
    ddb_client_with(&config)
}
