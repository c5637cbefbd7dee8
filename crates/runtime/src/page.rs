//! High-level page handle over a [`Connection`].

use std::time::Duration;

use base64::Engine;
use rebook_protocol::{CaptureScreenshotParams, CaptureScreenshotResult, EvaluateParams, EvaluateResult, NavigateParams, NavigateResult, SetUserAgentParams};
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::{DriverError, Result};

/// Marker set on `window` before an action that may navigate; a fresh
/// document won't carry it.
const STALE_MARKER: &str = "__rebookStale";
const READY_POLL: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct PageOptions {
	/// Per-command DevTools timeout.
	pub command_timeout: Duration,
	/// How long a navigation may take to reach `readyState == "complete"`.
	pub navigation_timeout: Duration,
	pub user_agent: Option<String>,
}

impl Default for PageOptions {
	fn default() -> Self {
		Self {
			command_timeout: Duration::from_millis(crate::DEFAULT_TIMEOUT_MS),
			navigation_timeout: Duration::from_millis(crate::DEFAULT_TIMEOUT_MS),
			user_agent: None,
		}
	}
}

/// One attached page target.
pub struct Page {
	conn: Connection,
	navigation_timeout: Duration,
}

impl Page {
	/// Connects to a page target's websocket and enables the domains we use.
	pub async fn attach(ws_url: &str, options: &PageOptions) -> Result<Self> {
		let conn = Connection::connect(ws_url, options.command_timeout).await?;
		conn.call("Page.enable", Value::Null).await?;
		conn.call("Runtime.enable", Value::Null).await?;
		if let Some(user_agent) = &options.user_agent {
			let params = SetUserAgentParams {
				user_agent: user_agent.clone(),
			};
			conn.call("Network.setUserAgentOverride", serde_json::to_value(params)?).await?;
		}
		Ok(Self {
			conn,
			navigation_timeout: options.navigation_timeout,
		})
	}

	/// Evaluates `expression` in the page, awaiting promises, and returns the value.
	///
	/// A thrown exception becomes [`DriverError::Script`].
	pub async fn evaluate(&self, expression: &str) -> Result<Value> {
		let raw = self.conn.call("Runtime.evaluate", serde_json::to_value(EvaluateParams::new(expression))?).await?;
		let result: EvaluateResult = serde_json::from_value(raw)?;
		if let Some(exception) = result.exception_details {
			return Err(DriverError::Script(exception.message()));
		}
		Ok(result.result.value.unwrap_or(Value::Null))
	}

	/// Navigates and waits for the new document to finish loading.
	pub async fn goto(&self, url: &str) -> Result<()> {
		info!(target = "rebook.cdp", %url, "navigate");
		self.mark_stale().await?;
		let params = serde_json::to_value(NavigateParams { url: url.to_string() })?;
		let result: NavigateResult = serde_json::from_value(self.conn.call("Page.navigate", params).await?)?;
		if let Some(reason) = result.error_text {
			return Err(DriverError::Navigation {
				url: url.to_string(),
				reason,
			});
		}

		if !self.wait_for_fresh_document(self.navigation_timeout).await? {
			return Err(DriverError::Timeout {
				ms: self.navigation_timeout.as_millis() as u64,
				what: format!("load of {url}"),
			});
		}
		Ok(())
	}

	/// Runs `expression` (typically a click) and, if it triggers a navigation
	/// within `settle`, waits for the new document. Returns whether the page navigated.
	pub async fn run_and_settle(&self, expression: &str, settle: Duration) -> Result<bool> {
		self.mark_stale().await?;
		self.evaluate(expression).await?;
		let navigated = self.wait_for_fresh_document(settle).await?;
		if navigated {
			debug!(target = "rebook.cdp", "action navigated");
		}
		Ok(navigated)
	}

	pub async fn screenshot(&self) -> Result<Vec<u8>> {
		let params = serde_json::to_value(CaptureScreenshotParams::default())?;
		let result: CaptureScreenshotResult = serde_json::from_value(self.conn.call("Page.captureScreenshot", params).await?)?;
		base64::engine::general_purpose::STANDARD
			.decode(result.data)
			.map_err(|e| DriverError::Script(format!("screenshot payload is not base64: {e}")))
	}

	pub async fn close(self) {
		let _ = self.conn.call("Page.close", json!({})).await;
		self.conn.close().await;
	}

	async fn mark_stale(&self) -> Result<()> {
		self.evaluate(&format!("window.{STALE_MARKER} = true")).await.map(|_| ())
	}

	/// Polls until a document without the stale marker reports `complete`.
	///
	/// Evaluation errors while a navigation tears down the old context are
	/// expected and treated as "still loading". Returns `false` if the old
	/// document is still there when `limit` runs out.
	async fn wait_for_fresh_document(&self, limit: Duration) -> Result<bool> {
		let deadline = Instant::now() + limit;
		let probe = format!("window.{STALE_MARKER} === true ? 'stale' : document.readyState");
		let mut last = String::from("stale");

		loop {
			match self.evaluate(&probe).await {
				Ok(Value::String(state)) if state == "complete" => return Ok(true),
				Ok(Value::String(state)) => last = state,
				Ok(_) => {}
				Err(err) if err.is_timeout() => return Err(err),
				Err(err) => debug!(target = "rebook.cdp", error = %err, "context busy during navigation"),
			}

			if Instant::now() >= deadline {
				if last == "stale" {
					return Ok(false);
				}
				return Err(DriverError::Timeout {
					ms: limit.as_millis() as u64,
					what: format!("document readyState (last: {last})"),
				});
			}
			tokio::time::sleep(READY_POLL).await;
		}
	}
}
