//! Shared response handling for the HTTP clients.

use docchat_core::{DocchatError, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Sends the request and decodes a successful JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T> {
    let response = send(service, request).await?;
    decode_json(service, response).await
}

/// Decodes the JSON body of a response that was already accepted.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T> {
    response.json::<T>().await.map_err(|err| {
        DocchatError::remote(
            service,
            None,
            format!("Failed to parse {service} response: {err}"),
        )
    })
}

/// Sends the request and turns transport failures and non-2xx statuses into errors.
pub(crate) async fn send(service: &'static str, request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(|err| {
        DocchatError::remote(service, None, format!("{service} request failed: {err}"))
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| format!("Failed to read {service} error body"));
        return Err(map_http_error(service, status, body));
    }

    Ok(response)
}

pub(crate) fn map_http_error(service: &'static str, status: StatusCode, body: String) -> DocchatError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message").or(Some(err)))
                .or_else(|| json.get("detail").and_then(|d| d.get("error").or(Some(d))))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.clone()
            }
        });

    DocchatError::remote(service, Some(status.as_u16()), message)
}
