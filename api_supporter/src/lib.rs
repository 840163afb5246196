use aws_sdk_dynamodb as ddb;
use enablr_core::http::{denied_response, json_response, text_response};
use enablr_core::types::Relationship;
use enablr_core::{access, individuals, supporters, DomainError, Error};
use lambda_http::{Body, Response};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSupporterRequest {
    pub share_identifier: String,
    pub relationship: Relationship,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveSupporterRequest {
    pub supporter_id: String,
}

/// The caller's own profile. The Cognito sub is the supporter id.
pub async fn get_details(
    client: &ddb::Client,
    supporter_id: &str,
) -> Result<Response<Body>, Error> {
    let supporter = supporters::get_supporter_details(client, supporter_id).await?;
    json_response(
        200,
        &json!({
            "id": supporter.supporter_id,
            "details": supporter.details,
            "shareIdentifier": supporter.share_identifier,
        }),
    )
}

/// Look a supporter up by share code, exposing only their name. Unknown
/// codes come back flagged invalid rather than erroring, so the frontend
/// can keep the form open.
pub async fn get_shared_details(
    client: &ddb::Client,
    share_identifier: &str,
) -> Result<Response<Body>, Error> {
    match supporters::find_supporter_by_share(client, share_identifier).await? {
        Some(supporter) => json_response(
            200,
            &json!({
                "id": supporter.supporter_id,
                "firstName": supporter.details.first_name,
                "lastName": supporter.details.last_name,
            }),
        ),
        None => json_response(200, &json!({ "invalid": true })),
    }
}

/// Grant another supporter access to an individual, by their share code.
/// PRIMARY-gated; a second PRIMARY grant is rejected.
pub async fn add_supporter(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    request: AddSupporterRequest,
) -> Result<Response<Body>, Error> {
    let access = access::get_access_permission(client, individual_id, supporter_id).await?;
    if access.relationship != Relationship::Primary {
        return denied_response();
    }

    let new_supporter =
        match supporters::find_supporter_by_share(client, &request.share_identifier).await? {
            Some(supporter) => supporter,
            None => return text_response(400, "Unknown share identifier"),
        };

    match access::add_supporter_permission(
        client,
        individual_id,
        &new_supporter.supporter_id,
        request.relationship,
    )
    .await
    {
        Ok(()) => json_response(200, &json!({ "status": "done" })),
        Err(e) => match e.downcast_ref::<DomainError>() {
            Some(domain) => text_response(400, &domain.reason),
            None => Err(e),
        },
    }
}

/// Revoke a supporter's access. PRIMARY-gated, and you cannot remove
/// yourself (that would orphan the individual).
pub async fn remove_supporter(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
    request: RemoveSupporterRequest,
) -> Result<Response<Body>, Error> {
    if request.supporter_id == supporter_id {
        return text_response(
            403,
            "You cannot remove yourself as supporter to this individual",
        );
    }

    let access = access::get_access_permission(client, individual_id, supporter_id).await?;
    if access.relationship != Relationship::Primary {
        return denied_response();
    }

    access::delete_supporter_permission(client, individual_id, &request.supporter_id).await?;
    json_response(200, &json!({ "status": "done" }))
}

/// Every individual the caller has access to, with the loaded record so
/// the home screen renders in one round trip.
pub async fn get_individuals(
    client: &ddb::Client,
    supporter_id: &str,
) -> Result<Response<Body>, Error> {
    let grants = access::get_supporter_access(client, supporter_id).await?;
    let mut result = Vec::with_capacity(grants.len());
    for grant in &grants {
        let individual = individuals::get_individual(client, &grant.individual_id).await?;
        result.push(json!({
            "individual": individual,
            "relationship": grant.relationship,
        }));
    }
    json_response(
        200,
        &json!({ "supporter_id": supporter_id, "individuals": result }),
    )
}

/// Everyone with access to an individual. PRIMARY-gated.
pub async fn get_individual_supporters(
    client: &ddb::Client,
    individual_id: &str,
    supporter_id: &str,
) -> Result<Response<Body>, Error> {
    let access = access::get_access_permission(client, individual_id, supporter_id).await?;
    if access.relationship != Relationship::Primary {
        return denied_response();
    }

    let grants = access::get_individual_supporters(client, individual_id).await?;
    let mut result = Vec::with_capacity(grants.len());
    for grant in &grants {
        let supporter = supporters::get_supporter_details(client, &grant.supporter_id).await?;
        result.push(json!({
            "supporter": { "id": supporter.supporter_id, "details": supporter.details },
            "relationship": grant.relationship,
        }));
    }
    json_response(
        200,
        &json!({ "individual_id": individual_id, "supporters": result }),
    )
}
