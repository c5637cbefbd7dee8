//! Outbound notifications.
//!
//! Delivery is best-effort: [`Notifications`] logs failures and timeouts and
//! never hands them back to the caller, so a dead channel cannot break a cycle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;

mod log;
mod telegram;

pub use log::LogNotifier;
pub use telegram::TelegramNotifier;

/// Channel contract. New channels only need to implement this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
	/// Stable channel identifier used in logs.
	fn id(&self) -> &'static str;

	async fn send_text(&self, text: &str) -> Result<()>;

	/// Sends a PNG with an optional caption.
	async fn send_image(&self, png: &[u8], caption: Option<&str>) -> Result<()>;
}

#[derive(Clone)]
pub struct Notifications {
	inner: Arc<dyn Notifier>,
	timeout: Duration,
}

impl Notifications {
	pub fn new(inner: Arc<dyn Notifier>) -> Self {
		Self {
			inner,
			timeout: Duration::from_secs(15),
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn channel(&self) -> &'static str {
		self.inner.id()
	}

	/// Returns whether the message was delivered.
	pub async fn text(&self, text: &str) -> bool {
		debug!(target = "rebook.notify", channel = self.inner.id(), %text, "sending text");
		self.settle("text", tokio::time::timeout(self.timeout, self.inner.send_text(text)).await)
	}

	pub async fn image(&self, png: &[u8], caption: Option<&str>) -> bool {
		debug!(target = "rebook.notify", channel = self.inner.id(), bytes = png.len(), "sending image");
		self.settle("image", tokio::time::timeout(self.timeout, self.inner.send_image(png, caption)).await)
	}

	fn settle(&self, what: &str, result: std::result::Result<Result<()>, tokio::time::error::Elapsed>) -> bool {
		match result {
			Ok(Ok(())) => true,
			Ok(Err(err)) => {
				warn!(target = "rebook.notify", channel = self.inner.id(), what, error = %err, "notification failed");
				false
			}
			Err(_) => {
				warn!(target = "rebook.notify", channel = self.inner.id(), what, timeout_ms = self.timeout.as_millis() as u64, "notification timed out");
				false
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RebookError;

	struct Broken;

	#[async_trait]
	impl Notifier for Broken {
		fn id(&self) -> &'static str {
			"broken"
		}

		async fn send_text(&self, _text: &str) -> Result<()> {
			Err(RebookError::Notify("channel down".into()))
		}

		async fn send_image(&self, _png: &[u8], _caption: Option<&str>) -> Result<()> {
			std::future::pending().await
		}
	}

	#[tokio::test]
	async fn failures_are_swallowed() {
		let notifications = Notifications::new(Arc::new(Broken));
		assert!(!notifications.text("hello").await);
	}

	#[tokio::test(start_paused = true)]
	async fn hung_channel_times_out() {
		let notifications = Notifications::new(Arc::new(Broken)).with_timeout(Duration::from_secs(1));
		assert!(!notifications.image(b"png", None).await);
	}
}
