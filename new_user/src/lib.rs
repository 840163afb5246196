use aws_sdk_cognitoidentityprovider as cognito;
use enablr_core::types::{SupporterDetails, SupporterRecord};
use enablr_core::{clients, supporters, DomainError, Error};
use lambda_runtime::LambdaEvent;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

const USER_POOL_ID: &str = "USER_POOL_ID";

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUserResponse {
    pub supporter_id: String,
    pub share_identifier: String,
}

/// The code a supporter hands out so others can request access:
/// four groups of three digits.
pub fn new_share_code<R: Rng>(rng: &mut R) -> String {
    let mut parts = Vec::with_capacity(4);
    for _ in 0..4 {
        parts.push(format!("{}", rng.gen_range(100..1000)));
    }
    parts.join("-")
}

/// Operator-invoked provisioning: create the Cognito user (email
/// delivery for the temporary password), then write the supporter row
/// keyed by the generated sub.
pub async fn function_handler(
    event: LambdaEvent<NewUserRequest>,
) -> Result<NewUserResponse, Error> {
    let request = event.payload;
    let user_pool_id = env::var(USER_POOL_ID)?;
    let config = clients::load_config().await;
    let cognito_client = cognito::Client::new(&config);
    let ddb_client = clients::ddb_client_with(&config);

    let response = cognito_client
        .admin_create_user()
        .user_pool_id(user_pool_id)
        .username(&request.email)
        .user_attributes(
            cognito::model::AttributeType::builder()
                .name("email_verified")
                .value("true")
                .build(),
        )
        .user_attributes(
            cognito::model::AttributeType::builder()
                .name("email")
                .value(&request.email)
                .build(),
        )
        .desired_delivery_mediums(cognito::model::DeliveryMediumType::Email)
        .send()
        .await?;

    let sub = response
        .user()
        .and_then(|user| user.attributes())
        .and_then(|attributes| {
            attributes
                .iter()
                .find(|attribute| attribute.name() == Some("sub"))
        })
        .and_then(|attribute| attribute.value())
        .ok_or_else(|| Error::from(DomainError::new("created user has no sub attribute")))?
        .to_owned();

    let record = SupporterRecord {
        supporter_id: sub.clone(),
        email: request.email,
        details: SupporterDetails {
            first_name: request.first_name,
            last_name: request.last_name,
        },
        share_identifier: new_share_code(&mut rand::thread_rng()),
    };
    supporters::put_supporter(&ddb_client, &record).await?;

    info!("created supporter {}", sub);
    Ok(NewUserResponse {
        supporter_id: record.supporter_id,
        share_identifier: record.share_identifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn share_codes_are_four_digit_groups() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = new_share_code(&mut rng);
        let groups: Vec<&str> = code.split('-').collect();
        assert_eq!(groups.len(), 4);
        for group in groups {
            assert_eq!(group.len(), 3);
            assert!(group.chars().all(|c| c.is_ascii_digit()));
            assert!(!group.starts_with('0'));
        }
    }

    #[test]
    fn share_codes_vary() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = new_share_code(&mut rng);
        let second = new_share_code(&mut rng);
        assert_ne!(first, second);
    }
}
