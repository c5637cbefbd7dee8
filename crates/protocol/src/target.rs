//! HTTP discovery endpoint payloads.

use serde::Deserialize;

/// `/json/version` response subset.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
	#[serde(rename = "User-Agent")]
	pub user_agent: Option<String>,
}

/// One entry of `/json/list` (or the reply of `/json/new`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub title: String,
	pub web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
	pub fn is_page(&self) -> bool {
		self.kind == "page"
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_json_list_entry() {
		let raw = r#"[{
			"description": "",
			"devtoolsFrontendUrl": "/devtools/inspector.html?ws=127.0.0.1:9222/devtools/page/ABC",
			"id": "ABC",
			"title": "about:blank",
			"type": "page",
			"url": "about:blank",
			"webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/ABC"
		}]"#;
		let targets: Vec<TargetInfo> = serde_json::from_str(raw).unwrap();
		assert_eq!(targets.len(), 1);
		assert!(targets[0].is_page());
		assert_eq!(targets[0].web_socket_debugger_url.as_deref(), Some("ws://127.0.0.1:9222/devtools/page/ABC"));
	}
}
