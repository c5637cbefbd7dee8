//! `Runtime` domain.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
	pub expression: String,
	pub return_by_value: bool,
	pub await_promise: bool,
}

impl EvaluateParams {
	pub fn new(expression: impl Into<String>) -> Self {
		Self {
			expression: expression.into(),
			return_by_value: true,
			await_promise: true,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
	pub result: RemoteObject,
	#[serde(default)]
	pub exception_details: Option<ExceptionDetails>,
}

/// Mirror object for a JS value. With `returnByValue` the payload is in `value`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub subtype: Option<String>,
	#[serde(default)]
	pub value: Option<Value>,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
	pub text: String,
	#[serde(default)]
	pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
	/// Best human-readable message: the thrown error's description, else the summary text.
	pub fn message(&self) -> String {
		self.exception
			.as_ref()
			.and_then(|e| e.description.clone())
			.unwrap_or_else(|| self.text.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn evaluate_params_request_value_and_await() {
		let params = serde_json::to_value(EvaluateParams::new("document.title")).unwrap();
		assert_eq!(params, json!({ "expression": "document.title", "returnByValue": true, "awaitPromise": true }));
	}

	#[test]
	fn exception_message_prefers_description() {
		let result: EvaluateResult = serde_json::from_value(json!({
			"result": { "type": "object", "subtype": "error" },
			"exceptionDetails": {
				"text": "Uncaught",
				"exception": { "type": "object", "description": "Error: selector not found: #x" }
			}
		}))
		.unwrap();
		assert_eq!(result.exception_details.unwrap().message(), "Error: selector not found: #x");
	}
}
