//! Reading service client
//!
//! `GET <endpoint>` lists readings, `PUT <endpoint>/<reading_id>` stores
//! coordinates for one reading. No request is retried.
//!
//! The list response is sometimes wrapped by the API gateway as
//! `{"statusCode": 200, "body": "<JSON string of the array>"}` and sometimes
//! delivered as the bare array. [`decode_envelope`] accepts both.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use wqm_common::{Coordinates, Reading};

use crate::error::{TriageError, TriageResult};

const USER_AGENT: &str = concat!("wqm-ui/", env!("CARGO_PKG_VERSION"));
const DEFAULT_UPDATE_ERROR: &str = "Failed to update coordinates";

/// Operations the views need from the reading service
#[async_trait]
pub trait ReadingService: Send + Sync {
    /// Fetch the full current reading set
    async fn fetch_readings(&self) -> TriageResult<Vec<Reading>>;

    /// Store coordinates for one reading
    async fn update_reading(&self, reading_id: &str, coords: Coordinates) -> TriageResult<UpdateAck>;
}

/// Optional success payload of an update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAck {
    pub message: Option<String>,
    #[serde(rename = "updatedAttributes")]
    pub updated_attributes: Option<Value>,
}

/// HTTP implementation of [`ReadingService`]
pub struct ReadingServiceClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl ReadingServiceClient {
    /// Create a client for `endpoint` (no trailing slash)
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> TriageResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TriageError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    /// Base URL for list and update requests
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReadingService for ReadingServiceClient {
    async fn fetch_readings(&self) -> TriageResult<Vec<Reading>> {
        debug!(url = %self.endpoint, "Fetching readings");

        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| TriageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::Transport {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TriageError::Network(e.to_string()))?;
        let envelope: Value = serde_json::from_str(&body)
            .map_err(|e| TriageError::Schema(format!("response is not JSON: {}", e)))?;

        let readings = decode_envelope(envelope)?;
        debug!(count = readings.len(), "Fetched readings");
        Ok(readings)
    }

    async fn update_reading(&self, reading_id: &str, coords: Coordinates) -> TriageResult<UpdateAck> {
        let url = format!("{}/{}", self.endpoint, reading_id);
        debug!(url = %url, latitude = coords.latitude, longitude = coords.longitude, "Sending coordinate update");

        let response = self
            .http_client
            .put(&url)
            .json(&coords)
            .send()
            .await
            .map_err(|e| TriageError::Network(e.to_string()))?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(reading_id = %reading_id, error = %e, "Failed to read update response body");
                String::new()
            }
        };
        let payload: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = payload
                .as_ref()
                .and_then(server_error_message)
                .unwrap_or_else(|| DEFAULT_UPDATE_ERROR.to_string());
            return Err(TriageError::Update(message));
        }

        let ack: UpdateAck = payload
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        info!(
            reading_id = %reading_id,
            message = ack.message.as_deref().unwrap_or(""),
            updated = %ack.updated_attributes.as_ref().map(serde_json::Value::to_string).unwrap_or_default(),
            "Coordinates updated"
        );
        Ok(ack)
    }
}

/// Normalize a list response into readings
///
/// Stage one reads `body` as a JSON-encoded string. Any failure there falls
/// back to treating the whole envelope as the payload; that fallback is
/// format tolerance, not an error. The payload must then be an array.
/// Elements that are not objects are skipped so one bad record cannot hide
/// the rest.
pub fn decode_envelope(envelope: Value) -> TriageResult<Vec<Reading>> {
    let payload = match unwrap_body(&envelope) {
        Some(inner) => inner,
        None => envelope,
    };

    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(TriageError::Schema(format!(
                "not an array (got {})",
                json_kind(&other)
            )))
        }
    };

    let readings = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match Reading::from_value(item) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed reading");
                None
            }
        })
        .collect();
    Ok(readings)
}

fn unwrap_body(envelope: &Value) -> Option<Value> {
    let encoded = envelope.get("body")?.as_str()?;
    serde_json::from_str(encoded).ok()
}

/// `error` string from a failure response, top-level or double-encoded
fn server_error_message(payload: &Value) -> Option<String> {
    let direct = payload.get("error").and_then(Value::as_str);
    let nested = || unwrap_body(payload).and_then(|inner| inner.get("error")?.as_str().map(str::to_string));

    direct
        .map(str::to_string)
        .or_else(nested)
        .filter(|msg| !msg.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_double_encoded_matches_bare_array() {
        let array = json!([
            {"reading_id": "a", "latitude": 12.9, "longitude": 77.6, "is_potable": 1},
            {"reading_id": "b", "ph": "7.20"}
        ]);
        let wrapped = json!({"statusCode": 200, "body": array.to_string()});

        let from_wrapped = decode_envelope(wrapped).unwrap();
        let from_bare = decode_envelope(array).unwrap();

        assert_eq!(from_wrapped, from_bare);
        assert_eq!(from_bare.len(), 2);
    }

    #[test]
    fn test_unparseable_body_falls_back_to_envelope() {
        // `body` is not valid JSON, so the envelope itself is the payload,
        // which is an object and therefore not an array.
        let envelope = json!({"body": "not json"});
        assert!(matches!(decode_envelope(envelope), Err(TriageError::Schema(_))));
    }

    #[test]
    fn test_body_decoding_to_object_is_schema_error() {
        let envelope = json!({"statusCode": 403, "body": "{\"message\": \"Forbidden\"}"});
        assert!(matches!(decode_envelope(envelope), Err(TriageError::Schema(_))));
    }

    #[test]
    fn test_non_array_payloads_are_schema_errors() {
        for payload in [json!(null), json!("[]"), json!(17), json!({"items": []})] {
            assert!(
                matches!(decode_envelope(payload.clone()), Err(TriageError::Schema(_))),
                "{} should be rejected",
                payload
            );
        }
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let payload = json!([
            {"reading_id": "a", "latitude": 12.9, "longitude": 77.6, "is_potable": 1},
            "junk",
            5,
            null,
            {"reading_id": "b"}
        ]);

        let readings = decode_envelope(payload).unwrap();

        let keys: Vec<_> = readings.iter().map(Reading::display_key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(readings[0].is_geotagged());
    }

    #[test]
    fn test_non_string_body_is_ignored() {
        // An array-valued `body` is not the double-encoding convention; the
        // envelope (an object) is used and rejected.
        let envelope = json!({"body": [{"reading_id": "a"}]});
        assert!(matches!(decode_envelope(envelope), Err(TriageError::Schema(_))));
    }

    #[test]
    fn test_server_error_message_sources() {
        assert_eq!(
            server_error_message(&json!({"error": "Invalid or missing latitude/longitude"})),
            Some("Invalid or missing latitude/longitude".to_string())
        );
        assert_eq!(
            server_error_message(&json!({"body": "{\"error\": \"Missing reading_id in path\"}"})),
            Some("Missing reading_id in path".to_string())
        );
        assert_eq!(server_error_message(&json!({"message": "nope"})), None);
        assert_eq!(server_error_message(&json!({"error": ""})), None);
    }
}
