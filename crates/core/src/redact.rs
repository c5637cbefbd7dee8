//! Screenshots with personal fields hidden.

use tracing::warn;

use crate::error::{RebookError, Result};
use crate::session::RemoteSession;

/// Account details shown on the booking pages.
pub const DEFAULT_REDACT_SELECTORS: &[&str] = &[
	".consular-appt strong",
	"#consulate-appointment-fields .applicant-name",
	"table.medium-12 td",
	"#main .applicant_details",
];

const MARKER: &str = "data-rebook-redacted";

/// Selectors hidden for the duration of a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionList {
	selectors: Vec<String>,
}

impl Default for RedactionList {
	fn default() -> Self {
		Self::new(DEFAULT_REDACT_SELECTORS.iter().map(|s| s.to_string()))
	}
}

impl RedactionList {
	pub fn new<I, S>(selectors: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			selectors: selectors.into_iter().map(Into::into).filter(|s: &String| !s.trim().is_empty()).collect(),
		}
	}

	pub fn selectors(&self) -> &[String] {
		&self.selectors
	}

	pub fn is_empty(&self) -> bool {
		self.selectors.is_empty()
	}

	/// Hides every listed element, captures, then restores them. Restoring
	/// happens even when the capture fails.
	pub async fn capture(&self, session: &dyn RemoteSession) -> Result<Vec<u8>> {
		if self.is_empty() {
			return session.screenshot().await;
		}
		session.evaluate(&self.hide_script()?).await?;
		let shot = session.screenshot().await;
		if let Err(err) = session.evaluate(&restore_script()).await {
			warn!(target = "rebook.rebook", error = %err, "failed to restore redacted fields");
		}
		shot
	}

	pub fn hide_script(&self) -> Result<String> {
		let selectors = serde_json::to_string(&self.selectors).map_err(|e| RebookError::Session(format!("cannot encode redaction list: {e}")))?;
		Ok(format!(
			r#"(() => {{
				let hidden = 0;
				for (const sel of {selectors}) {{
					for (const el of document.querySelectorAll(sel)) {{
						if (!el.hasAttribute('{MARKER}')) el.setAttribute('{MARKER}', el.style.visibility || '');
						el.style.visibility = 'hidden';
						hidden++;
					}}
				}}
				return hidden;
			}})()"#
		))
	}
}

pub fn restore_script() -> String {
	format!(
		r#"(() => {{
			const els = document.querySelectorAll('[{MARKER}]');
			for (const el of els) {{
				el.style.visibility = el.getAttribute('{MARKER}');
				el.removeAttribute('{MARKER}');
			}}
			return els.length;
		}})()"#
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_selectors_are_dropped() {
		let list = RedactionList::new(["#a", " ", "", ".b"]);
		assert_eq!(list.selectors(), ["#a".to_string(), ".b".to_string()]);
	}

	#[test]
	fn hide_script_embeds_selectors_as_json() {
		let list = RedactionList::new([r#"input[name="x"]"#]);
		let script = list.hide_script().unwrap();
		assert!(script.contains(r#"["input[name=\"x\"]"]"#));
		assert!(script.contains(MARKER));
	}
}
