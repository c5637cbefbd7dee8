use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use super::Notifier;
use crate::error::{RebookError, Result};

pub const TELEGRAM_API: &str = "https://api.telegram.org";

/// Telegram bot channel posting to a single chat.
pub struct TelegramNotifier {
	token: String,
	chat_id: String,
	api_base: String,
	client: reqwest::Client,
}

impl TelegramNotifier {
	pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
		Self {
			token: token.into(),
			chat_id: chat_id.into(),
			api_base: TELEGRAM_API.to_string(),
			client: reqwest::Client::new(),
		}
	}

	/// Points the client at another Bot API host.
	pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
		self.api_base = api_base.into();
		self
	}

	fn endpoint(&self, method: &str) -> String {
		format!("{}/bot{}/{method}", self.api_base.trim_end_matches('/'), self.token)
	}

	async fn check(method: &str, response: reqwest::Response) -> Result<()> {
		let status = response.status();
		let body: Value = response.json().await.unwrap_or(Value::Null);
		if !status.is_success() || body.get("ok") != Some(&Value::Bool(true)) {
			let description = body.get("description").and_then(Value::as_str).unwrap_or("no description");
			return Err(RebookError::Notify(format!("telegram {method} failed ({status}): {description}")));
		}
		Ok(())
	}
}

#[async_trait]
impl Notifier for TelegramNotifier {
	fn id(&self) -> &'static str {
		"telegram"
	}

	async fn send_text(&self, text: &str) -> Result<()> {
		let response = self
			.client
			.post(self.endpoint("sendMessage"))
			.json(&json!({ "chat_id": self.chat_id, "text": text }))
			.send()
			.await
			.map_err(|e| RebookError::Notify(format!("telegram sendMessage: {e}")))?;
		Self::check("sendMessage", response).await
	}

	async fn send_image(&self, png: &[u8], caption: Option<&str>) -> Result<()> {
		let photo = Part::bytes(png.to_vec())
			.file_name("screenshot.png")
			.mime_str("image/png")
			.map_err(|e| RebookError::Notify(format!("telegram photo part: {e}")))?;
		let mut form = Form::new().text("chat_id", self.chat_id.clone()).part("photo", photo);
		if let Some(caption) = caption {
			form = form.text("caption", caption.to_string());
		}
		let response = self
			.client
			.post(self.endpoint("sendPhoto"))
			.multipart(form)
			.send()
			.await
			.map_err(|e| RebookError::Notify(format!("telegram sendPhoto: {e}")))?;
		Self::check("sendPhoto", response).await
	}
}
