use aws_sdk_kms as kms;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use enablr_core::{clients, registrations, DomainError, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

const SIGNING_KEY_ID: &str = "SIGNING_KEY_ID";

/// Device tokens outlive the registration code by a wide margin; the
/// revocation row is the kill switch in between renewals.
const TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

pub const INVALID_REGISTRATION: &str = "Registration expired or invalid";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    pub registration_id: String,
    pub device_id: String,
    pub device_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterDeviceResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceClaims {
    pub sub: String,
    pub nbf: u64,
    pub exp: u64,
}

impl DeviceClaims {
    pub fn new(registration_id: &str, now: i64) -> DeviceClaims {
        DeviceClaims {
            sub: registration_id.to_owned(),
            nbf: now as u64,
            exp: (now + TOKEN_TTL_SECS) as u64,
        }
    }
}

/// The `header.claims` signing input of the token. Base64url without
/// padding, as JWT requires.
pub fn signing_input(key_id: &str, claims: &DeviceClaims) -> Result<String, Error> {
    let header = HashMap::from([
        (String::from("typ"), String::from("JWT")),
        (String::from("alg"), String::from("RS256")),
        (String::from("kid"), key_id.to_owned()),
    ]);
    let encoded_header = URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
    let encoded_claims = URL_SAFE_NO_PAD.encode(serde_json::to_string(claims)?);
    Ok([encoded_header, encoded_claims].join("."))
}

/// Sign with KMS so the private key never exists outside it. RS256
/// signatures come back as raw PKCS#1 bytes and drop straight into the
/// token.
async fn sign_token(
    kms_client: &kms::Client,
    key_id: &str,
    claims: &DeviceClaims,
) -> Result<String, Error> {
    let input = signing_input(key_id, claims)?;
    let sign_result = kms_client
        .sign()
        .set_signing_algorithm(Some(kms::model::SigningAlgorithmSpec::RsassaPkcs1V15Sha256))
        .set_key_id(Some(key_id.to_owned()))
        .set_message(Some(kms::types::Blob::new(input.as_bytes())))
        .send()
        .await?;
    let signature = sign_result
        .signature()
        .ok_or_else(|| Error::from(DomainError::new("KMS returned no signature")))?;
    let encoded_sig = URL_SAFE_NO_PAD.encode(signature.as_ref());
    Ok([input, encoded_sig].join("."))
}

/// Exchange a registration code for a signed device token. The code must
/// exist, be unexpired, and not already be claimed by another device.
pub async fn register_device(
    request: RegisterDeviceRequest,
) -> Result<RegisterDeviceResponse, Error> {
    let signing_key_id = env::var(SIGNING_KEY_ID)?;
    let config = clients::load_config().await;
    let ddb_client = clients::ddb_client_with(&config);
    let kms_client = kms::Client::new(&config);
    let now = Utc::now().timestamp();

    let registration = registrations::get_registration(&ddb_client, &request.registration_id)
        .await?
        .filter(|r| r.can_register(now))
        .ok_or_else(|| Error::from(DomainError::new(INVALID_REGISTRATION)))?;

    registrations::bind_device(
        &ddb_client,
        &registration.registration_id,
        &request.device_id,
        &request.device_name,
    )
    .await?;

    let claims = DeviceClaims::new(&registration.registration_id, now);
    let token = sign_token(&kms_client, &signing_key_id, &claims).await?;
    Ok(RegisterDeviceResponse { token })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_input_is_base64url_jwt_shaped() {
        let claims = DeviceClaims::new("reg-1", 1_675_000_000);
        let input = signing_input("key-1", &claims).unwrap();

        let parts: Vec<&str> = input.split('.').collect();
        assert_eq!(parts.len(), 2);

        let header: HashMap<String, String> =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
        assert_eq!(header.get("alg"), Some(&String::from("RS256")));
        assert_eq!(header.get("kid"), Some(&String::from("key-1")));

        let decoded: DeviceClaims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(decoded.sub, "reg-1");
    }

    #[test]
    fn tokens_expire_after_thirty_days() {
        let claims = DeviceClaims::new("reg-1", 1_675_000_000);
        assert_eq!(claims.exp - claims.nbf, 30 * 24 * 60 * 60);
    }
}
