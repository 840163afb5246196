use crate::{DomainError, Error};
use lambda_http::request::RequestContext;
use lambda_http::{Body, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// The Cognito subject of the caller, taken from the user-pool
/// authorizer claims the gateway attaches to the request context.
pub fn caller_sub(event: &Request) -> Option<String> {
    match event.request_context() {
        RequestContext::ApiGatewayV1(ctx) => ctx
            .authorizer
            .get("claims")
            .and_then(|claims| claims.get("sub"))
            .and_then(|sub| sub.as_str())
            .map(String::from),
        _ => None,
    }
}

/// Context value injected by the custom device authorizer.
pub fn authorizer_context(event: &Request, key: &str) -> Option<String> {
    match event.request_context() {
        RequestContext::ApiGatewayV1(ctx) => match ctx.authorizer.get(key) {
            Some(Value::String(value)) => Some(value.to_owned()),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_body<T: DeserializeOwned>(event: &Request) -> Result<T, Error> {
    match event.body() {
        Body::Text(s) => Ok(serde_json::from_str(s)?),
        Body::Binary(b) => Ok(serde_json::from_slice(b)?),
        Body::Empty => Err(DomainError::new("Expected a request body.").into()),
    }
}

pub fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

pub fn text_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "text/plain")
        .body(message.into())
        .map_err(Box::new)?)
}

pub fn denied_response() -> Result<Response<Body>, Error> {
    text_response(403, "Insufficient access permission to this individual")
}
