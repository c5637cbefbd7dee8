//! Posts the booking form without touching its widgets.

use async_trait::async_trait;
use tracing::debug;

use super::{AttemptTracker, RebookState, RebookStrategy, RebookTarget};
use crate::error::{RebookError, Result};
use crate::session::{FormPayload, RemoteSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSelectors {
	pub csrf_meta: String,
	pub authenticity_input: String,
	pub capacity: String,
	pub limit_message: String,
}

impl Default for TokenSelectors {
	fn default() -> Self {
		Self {
			csrf_meta: r#"meta[name="csrf-token"]"#.into(),
			authenticity_input: r#"input[name="authenticity_token"]"#.into(),
			capacity: r#"input[name="use_consulate_appointment_capacity"]"#.into(),
			limit_message: r#"input[name="confirmed_limit_message"]"#.into(),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct DirectSubmitStrategy {
	selectors: TokenSelectors,
}

impl DirectSubmitStrategy {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_selectors(mut self, selectors: TokenSelectors) -> Self {
		self.selectors = selectors;
		self
	}

	async fn token(&self, session: &dyn RemoteSession) -> Result<String> {
		for selector in [&self.selectors.csrf_meta, &self.selectors.authenticity_input] {
			if let Some(token) = session.read_field(selector).await?.filter(|t| !t.trim().is_empty()) {
				return Ok(token);
			}
		}
		Err(RebookError::Session("anti-forgery token not found on the booking page".into()))
	}

	/// The form fields the booking page posts, in page order.
	pub fn payload(target: &RebookTarget, token: &str, capacity: &str, limit_message: &str) -> FormPayload {
		FormPayload::new(&target.appointment_url)
			.field("utf8", "✓")
			.field("authenticity_token", token)
			.field("confirmed_limit_message", limit_message)
			.field("use_consulate_appointment_capacity", capacity)
			.field("appointments[consulate_appointment][facility_id]", &target.facility_id)
			.field("appointments[consulate_appointment][date]", target.date.format("%Y-%m-%d").to_string())
			.field("appointments[consulate_appointment][time]", &target.time)
	}
}

#[async_trait]
impl RebookStrategy for DirectSubmitStrategy {
	fn name(&self) -> &'static str {
		"direct"
	}

	async fn apply(&self, session: &dyn RemoteSession, target: &RebookTarget, tracker: &mut AttemptTracker) -> Result<()> {
		tracker.advance(RebookState::NavigatingForm);
		session.navigate(&target.appointment_url).await?;
		let token = self.token(session).await?;
		let capacity = session.read_field(&self.selectors.capacity).await?.unwrap_or_else(|| "true".into());
		let limit_message = session.read_field(&self.selectors.limit_message).await?.unwrap_or_else(|| "1".into());

		tracker.advance(RebookState::FillingDate);
		tracker.advance(RebookState::FillingTime);
		let payload = Self::payload(target, &token, &capacity, &limit_message);

		tracker.advance(RebookState::Submitting);
		let response = session.submit_form(&payload).await?;
		debug!(target = "rebook.rebook", status = response.status, url = %response.url, "form submitted");

		tracker.advance(RebookState::Confirming);
		if !response.is_success() {
			return Err(RebookError::Session(format!("booking form rejected with status {}", response.status)));
		}
		if response.url.contains("/users/sign_in") {
			return Err(RebookError::Session("booking form redirected to sign-in".into()));
		}
		Ok(())
	}
}
