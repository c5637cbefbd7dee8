//! Request/response/event envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command sent to a target.
///
/// ```json
/// { "id": 7, "method": "Runtime.evaluate", "params": { "expression": "1+1" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	pub id: u32,
	pub method: String,
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub params: Value,
}

/// Reply correlated to a [`Request`] by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
}

/// Protocol-level error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
}

/// Unsolicited notification (no `id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

/// Anything that can arrive on the websocket.
///
/// Responses carry an `id`; events don't, so `untagged` picks the right arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	Response(Response),
	Event(Event),
}
