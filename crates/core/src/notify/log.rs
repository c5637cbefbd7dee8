use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::Notifier;
use crate::error::Result;

/// Writes messages to the log, and images to `screenshot_dir` when set.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
	screenshot_dir: Option<PathBuf>,
}

impl LogNotifier {
	pub fn new(screenshot_dir: Option<PathBuf>) -> Self {
		Self { screenshot_dir }
	}
}

#[async_trait]
impl Notifier for LogNotifier {
	fn id(&self) -> &'static str {
		"log"
	}

	async fn send_text(&self, text: &str) -> Result<()> {
		info!(target = "rebook.notify", "{text}");
		Ok(())
	}

	async fn send_image(&self, png: &[u8], caption: Option<&str>) -> Result<()> {
		let Some(dir) = &self.screenshot_dir else {
			info!(target = "rebook.notify", bytes = png.len(), caption = caption.unwrap_or_default(), "screenshot discarded");
			return Ok(());
		};
		tokio::fs::create_dir_all(dir).await?;
		let path = dir.join(format!("screenshot-{}.png", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
		tokio::fs::write(&path, png).await?;
		info!(target = "rebook.notify", path = %path.display(), caption = caption.unwrap_or_default(), "screenshot saved");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn images_land_in_the_screenshot_dir() {
		let dir = tempfile::tempdir().unwrap();
		let notifier = LogNotifier::new(Some(dir.path().join("shots")));
		notifier.send_image(b"\x89PNG", Some("booked")).await.unwrap();

		let saved: Vec<_> = std::fs::read_dir(dir.path().join("shots")).unwrap().collect();
		assert_eq!(saved.len(), 1);
	}
}
