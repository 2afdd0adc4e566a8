//! Shared HTTP exchange used by every network adapter

use crate::LlmError;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Send a prepared request and read the whole body, racing the caller's token
///
/// Non-success statuses become [`LlmError::Provider`], with the provider's
/// structured error text extracted when the body carries one.
pub(crate) async fn send(
    cancel: &CancellationToken,
    backend: &str,
    request: RequestBuilder,
) -> Result<String, LlmError> {
    let exchange = async {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        Ok::<_, LlmError>((status, body))
    };

    let (status, body) = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("{} request cancelled by caller", backend);
            return Err(LlmError::Cancelled);
        }
        result = exchange => result?,
    };

    debug!("{} responded HTTP {} ({} bytes)", backend, status, body.len());

    if !status.is_success() {
        return Err(LlmError::Provider {
            status: status.as_u16(),
            message: provider_error_message(&body),
        });
    }

    Ok(body)
}

/// Decode a success body into the adapter's wire type
pub(crate) fn decode<T: DeserializeOwned>(backend: &str, body: &str) -> Result<T, LlmError> {
    serde_json::from_str(body)
        .map_err(|e| LlmError::Parse(format!("{} response: {}", backend, e)))
}

fn transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Communication(format!("Request failed: {}", e))
    }
}

/// `{"error": {"type": ..., "message": ...}}` as returned by vendor APIs
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

/// Pull `type: message` out of a structured error body, else return the body
pub(crate) fn provider_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => match (error.kind, error.message) {
            (Some(kind), Some(message)) => format!("{}: {}", kind, message),
            (None, Some(message)) => message,
            (Some(kind), None) => kind,
            (None, None) => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}
