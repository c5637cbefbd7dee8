use chrono::NaiveDate;
use rebook_runtime::DriverError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RebookError>;

#[derive(Debug, Error)]
pub enum RebookError {
	/// Remote interaction failed: navigation, missing element, timeout.
	#[error("session error: {0}")]
	Session(String),

	/// A response did not have the expected shape.
	///
	/// `likely_logged_out` is set when the body looks like a sign-in page or
	/// an error object rather than a malformed list, which usually means the
	/// session expired instead of the site changing.
	#[error("parse error: {detail}")]
	Parse { detail: String, likely_logged_out: bool },

	/// A business rule forbids acting, e.g. the candidate is inside the lead time.
	#[error("not actionable: {0}")]
	Application(String),

	/// A rebooking attempt did not produce the expected active booking.
	#[error("verification mismatch: expected active booking {expected}, found {actual}")]
	VerificationMismatch { expected: NaiveDate, actual: NaiveDate },

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("notification failed: {0}")]
	Notify(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl RebookError {
	pub fn parse(detail: impl Into<String>) -> Self {
		RebookError::Parse {
			detail: detail.into(),
			likely_logged_out: false,
		}
	}

	pub fn logged_out(detail: impl Into<String>) -> Self {
		RebookError::Parse {
			detail: detail.into(),
			likely_logged_out: true,
		}
	}

	/// Stable code used in logs and notifications.
	pub fn kind(&self) -> &'static str {
		match self {
			RebookError::Session(_) => "SESSION_ERROR",
			RebookError::Parse { .. } => "PARSE_ERROR",
			RebookError::Application(_) => "APPLICATION_ERROR",
			RebookError::VerificationMismatch { .. } => "VERIFICATION_MISMATCH",
			RebookError::Config(_) => "CONFIG_ERROR",
			RebookError::Notify(_) => "NOTIFY_ERROR",
			RebookError::Io(_) => "IO_ERROR",
		}
	}

	/// Expected "not yet actionable" outcomes are logged but not relayed.
	pub fn is_notifiable(&self) -> bool {
		!matches!(self, RebookError::Application(_))
	}
}

impl From<DriverError> for RebookError {
	fn from(err: DriverError) -> Self {
		RebookError::Session(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn driver_timeouts_surface_as_session_errors() {
		let err: RebookError = DriverError::Timeout {
			ms: 30_000,
			what: "Page.navigate".into(),
		}
		.into();
		assert_eq!(err.kind(), "SESSION_ERROR");
		assert!(err.to_string().contains("Page.navigate"));
	}

	#[test]
	fn application_errors_are_not_notifiable() {
		assert!(!RebookError::Application("inside lead time".into()).is_notifiable());
		assert!(RebookError::logged_out("html body").is_notifiable());
	}
}
