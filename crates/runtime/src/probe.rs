//! DevTools HTTP endpoint probing and target discovery.

use std::time::Duration;

use rebook_protocol::{TargetInfo, VersionInfo};

use crate::error::{DriverError, Result};

fn client() -> Result<reqwest::Client> {
	reqwest::Client::builder()
		.timeout(Duration::from_millis(800))
		.build()
		.map_err(|e| DriverError::Probe(format!("failed to create HTTP client: {e}")))
}

/// Resolves `/json/version` on `port`.
pub async fn fetch_version(port: u16) -> Result<VersionInfo> {
	let url = format!("http://127.0.0.1:{port}/json/version");
	let response = client()?.get(&url).send().await?;
	if !response.status().is_success() {
		return Err(DriverError::Probe(format!("unexpected status {} from {url}", response.status())));
	}
	Ok(response.json().await?)
}

/// Lists the browser's targets.
pub async fn list_targets(port: u16) -> Result<Vec<TargetInfo>> {
	let url = format!("http://127.0.0.1:{port}/json/list");
	Ok(client()?.get(&url).send().await?.json().await?)
}

/// Returns a page target to attach to, creating a blank one when none exists.
pub async fn page_target(port: u16) -> Result<TargetInfo> {
	if let Some(existing) = list_targets(port).await?.into_iter().find(|t| t.is_page() && t.web_socket_debugger_url.is_some()) {
		return Ok(existing);
	}

	// Recent Chromium builds reject GET on /json/new.
	let url = format!("http://127.0.0.1:{port}/json/new?about:blank");
	let target: TargetInfo = client()?.put(&url).send().await?.json().await?;
	if target.web_socket_debugger_url.is_none() {
		return Err(DriverError::Probe(format!("new target {} has no websocket url", target.id)));
	}
	Ok(target)
}
