// Handler module - request/response envelopes around the mockup pipeline
//
// Events follow the API Gateway proxy shape: the request fields either sit
// at the top level or are nested under `body`, as a JSON string or object.
// Every outcome, including failures, becomes a `ResponseEnvelope`.

use crate::mockup::{MockupOutcome, MockupRequest, MockupService};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const MESSAGE_CREATED: &str = "Mockup created successfully";
pub const MESSAGE_MISSING_PARAMETERS: &str =
    "Missing required parameters: logoUrl and email are required";

/// Response returned to the invoking environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON document serialized as a string
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody<'a> {
    message: &'a str,
    mockup_url: &'a str,
    email: &'a str,
    name: &'a str,
    expires_in: u64,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

impl ResponseEnvelope {
    fn new(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: default_headers(),
            body,
        }
    }

    /// 200 response carrying the signed URL
    pub fn success(outcome: &MockupOutcome) -> Self {
        let body = SuccessBody {
            message: MESSAGE_CREATED,
            mockup_url: &outcome.mockup_url,
            email: &outcome.email,
            name: &outcome.name,
            expires_in: outcome.expires_in,
        };
        Self::new(200, to_json(&body))
    }

    /// Response with only a `message` field
    pub fn message(status_code: u16, message: &str) -> Self {
        Self::new(status_code, to_json(&MessageBody { message }))
    }

    /// Parsed `body` field, for callers that need the structured document
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// `Content-Type` and CORS headers sent with every response
pub fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ])
}

fn to_json<T: Serialize>(body: &T) -> String {
    // Serializing these structs of strings and integers cannot fail
    serde_json::to_string(body).unwrap_or_else(|_| String::from("{}"))
}

/// Extract the request from an event.
///
/// A string `body` must hold a JSON object; an object `body` is used as is;
/// without `body` the event itself is the request.
pub fn parse_event(event: Value) -> Result<MockupRequest, String> {
    let body = match event {
        Value::Object(mut map) => match map.remove("body") {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(&raw)
                .map_err(|e| format!("request body is not valid JSON: {}", e))?,
            Some(other) => other,
            None => Value::Object(map),
        },
        other => other,
    };

    if !body.is_object() {
        return Err("request body must be a JSON object".to_string());
    }

    serde_json::from_value(body).map_err(|e| format!("invalid request body: {}", e))
}

/// Handle one event end to end
pub async fn handle_event(service: &MockupService, event: Value) -> ResponseEnvelope {
    let request = match parse_event(event) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Error processing request");
            return ResponseEnvelope::message(500, &format!("Error processing request: {}", e));
        }
    };

    match service.create_mockup(request).await {
        Ok(outcome) => ResponseEnvelope::success(&outcome),
        Err(e) if e.status_code() == 400 => {
            ResponseEnvelope::message(400, MESSAGE_MISSING_PARAMETERS)
        }
        Err(e) => ResponseEnvelope::message(
            e.status_code(),
            &format!("Error creating mockup: {}", e),
        ),
    }
}

/// Handle a raw request body (HTTP surface). Bytes that are not JSON are
/// reported like any other envelope-level failure.
pub async fn handle_body(service: &MockupService, body: &[u8]) -> ResponseEnvelope {
    match serde_json::from_slice::<Value>(body) {
        Ok(event) => handle_event(service, event).await,
        Err(e) => {
            tracing::error!(error = %e, "Error processing request");
            ResponseEnvelope::message(500, &format!("Error processing request: {}", e))
        }
    }
}
