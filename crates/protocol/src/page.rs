//! `Page` domain.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct NavigateParams {
	pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResult {
	pub frame_id: String,
	/// Set when the navigation itself failed (DNS, TLS, aborted...).
	#[serde(default)]
	pub error_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotParams {
	pub format: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub capture_beyond_viewport: Option<bool>,
}

impl Default for CaptureScreenshotParams {
	fn default() -> Self {
		Self {
			format: "png".into(),
			capture_beyond_viewport: Some(true),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureScreenshotResult {
	/// Base64-encoded image bytes.
	pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserAgentParams {
	pub user_agent: String,
}
