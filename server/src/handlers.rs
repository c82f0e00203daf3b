//! Route handlers for the webhook listener.
//!
//! Every successfully-parsed request answers HTTP 200; for the pre-send
//! route the verdict travels in the response body. Request logging is
//! best-effort and never affects the response.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use hooktap_shared::config::ServiceConfig;
use hooktap_shared::decision;
use hooktap_shared::protocol::{PostSendAck, MAX_JSON_BODY};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::body;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/webhook", post(echo))
        .route("/webhook/pre-send", post(pre_send))
        .route("/webhook/post-send", post(post_send))
        // The extractor cap sits above the JSON limit so oversized JSON
        // reaches the handler and degrades to absent instead of a 413
        .layer(DefaultBodyLimit::max(2 * MAX_JSON_BODY))
        .with_state(state)
}

/// GET / — liveness probe
async fn liveness(State(state): State<AppState>) -> String {
    state.config.liveness_message()
}

/// POST /webhook — log and acknowledge, unconditionally
async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> impl IntoResponse {
    let decoded = decode_lenient(&headers, &bytes);
    log_request(&method, &uri, &headers, &decoded, &bytes);
    Json(json!({"echo": "received"}))
}

/// POST /webhook/pre-send — gate the message through the decision builder
async fn pre_send(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> impl IntoResponse {
    let decoded = decode_lenient(&headers, &bytes);
    log_request(&method, &uri, &headers, &decoded, &bytes);

    let response = decision::build(&state.config, &decoded);
    let payload_json = serde_json::to_value(&response.payload).unwrap_or(Value::Null);
    info!(
        "pre-send decision: valid={} payload={}",
        response.valid, payload_json
    );
    Json(response)
}

/// POST /webhook/post-send — log the delivery notification, constant ack
async fn post_send(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> impl IntoResponse {
    let decoded = decode_lenient(&headers, &bytes);
    log_request(&method, &uri, &headers, &decoded, &bytes);

    info!(
        "message delivered: msg_id={} from={} to={}",
        field_or_dash(&decoded, "msg_id"),
        field_or_dash(&decoded, "from"),
        field_or_dash(&decoded, "to"),
    );
    Json(PostSendAck::default())
}

/// Decode the body, degrading any failure to "content absent". The
/// listener never rejects a request over its body.
fn decode_lenient(headers: &HeaderMap, bytes: &[u8]) -> Value {
    match body::decode(headers, bytes) {
        Ok(value) => value,
        Err(err) => {
            warn!("ignoring undecodable body: {err}");
            Value::Null
        }
    }
}

/// Dump one request to the log: timestamped line, headers, body.
fn log_request(method: &Method, uri: &Uri, headers: &HeaderMap, decoded: &Value, raw: &[u8]) {
    info!(
        "[{}] {} {}",
        chrono::Utc::now().to_rfc3339(),
        method,
        uri.path()
    );

    let header_obj: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                Value::String(String::from_utf8_lossy(v.as_bytes()).to_string()),
            )
        })
        .collect();
    let headers_json = Value::Object(header_obj);
    info!("headers:\n{}", pretty(&headers_json));

    if decoded.is_null() && !raw.is_empty() {
        info!(
            "body ({} bytes, raw):\n{}",
            raw.len(),
            String::from_utf8_lossy(raw)
        );
    } else {
        info!("body:\n{}", pretty(decoded));
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn field_or_dash<'a>(body: &'a Value, field: &str) -> std::borrow::Cow<'a, str> {
    match body.get(field) {
        Some(Value::String(s)) => s.as_str().into(),
        Some(other) if !other.is_null() => other.to_string().into(),
        _ => "-".into(),
    }
}
