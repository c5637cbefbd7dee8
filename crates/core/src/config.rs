//! Typed configuration handed to the core by the binary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{RebookError, Result};

pub const DEFAULT_BASE_URL: &str = "https://ais.usvisa-info.com";
pub const DEFAULT_COUNTRY_CODE: &str = "en-ca";

/// Where the schedule lives on the remote site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
	pub base_url: String,
	pub country_code: String,
	pub schedule_id: String,
	pub facility_id: String,
}

impl SiteConfig {
	pub fn new(schedule_id: impl Into<String>, facility_id: impl Into<String>) -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			country_code: DEFAULT_COUNTRY_CODE.to_string(),
			schedule_id: schedule_id.into(),
			facility_id: facility_id.into(),
		}
	}

	pub fn niv_url(&self) -> String {
		format!("{}/{}/niv", self.base_url.trim_end_matches('/'), self.country_code)
	}

	pub fn sign_in_url(&self) -> String {
		format!("{}/users/sign_in", self.niv_url())
	}

	/// Landing page after sign-in; shows the current appointment.
	pub fn account_url(&self) -> String {
		format!("{}/account", self.niv_url())
	}

	pub fn appointment_url(&self) -> String {
		format!("{}/schedule/{}/appointment", self.niv_url(), self.schedule_id)
	}

	pub fn days_json_url(&self) -> String {
		format!("{}/days/{}.json?appointments%5Bexpedite%5D=false", self.appointment_url(), self.facility_id)
	}

	pub fn times_json_url(&self, date: NaiveDate) -> String {
		format!(
			"{}/times/{}.json?date={}&appointments%5Bexpedite%5D=false",
			self.appointment_url(),
			self.facility_id,
			date.format("%Y-%m-%d")
		)
	}

	pub fn validate(&self) -> Result<()> {
		for (name, value) in [
			("base url", &self.base_url),
			("country code", &self.country_code),
			("schedule id", &self.schedule_id),
			("facility id", &self.facility_id),
		] {
			if value.trim().is_empty() {
				return Err(RebookError::Config(format!("{name} must not be empty")));
			}
		}
		Ok(())
	}
}

/// Account credentials. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials").field("email", &self.email).field("password", &"<redacted>").finish()
	}
}

/// Local hours during which the loop stays idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
	/// First idle hour.
	pub sleep_hour: u32,
	/// First active hour after the idle window.
	pub wakeup_hour: u32,
}

impl QuietHours {
	/// Whether `hour` falls inside the idle window; the window may wrap midnight.
	pub fn contains(&self, hour: u32) -> bool {
		if self.sleep_hour == self.wakeup_hour {
			return false;
		}
		if self.sleep_hour > self.wakeup_hour {
			hour >= self.sleep_hour || hour < self.wakeup_hour
		} else {
			hour >= self.sleep_hour && hour < self.wakeup_hour
		}
	}
}

/// Loop and policy parameters.
#[derive(Debug, Clone)]
pub struct WatchConfig {
	pub poll_interval: Duration,
	pub max_tries: u32,
	/// Only slots strictly before this date are worth rebooking to.
	pub notify_before: NaiveDate,
	/// Minimum whole days between today and an actionable slot.
	pub min_lead_days: i64,
	pub quiet_hours: Option<QuietHours>,
	/// Bound on forward page-advances through the calendar widget.
	pub max_calendar_pages: u32,
	/// Selectors hidden before any screenshot leaves the process.
	pub redact_selectors: Vec<String>,
	pub history_path: PathBuf,
}

impl WatchConfig {
	pub fn validate(&self) -> Result<()> {
		if self.max_tries == 0 {
			return Err(RebookError::Config("max tries must be at least 1".into()));
		}
		if self.min_lead_days < 0 {
			return Err(RebookError::Config(format!("minimum lead days must not be negative (got {})", self.min_lead_days)));
		}
		if self.max_calendar_pages == 0 {
			return Err(RebookError::Config("calendar page bound must be at least 1".into()));
		}
		if let Some(quiet) = self.quiet_hours {
			if quiet.sleep_hour > 23 || quiet.wakeup_hour > 23 {
				return Err(RebookError::Config(format!("quiet hours must be within 0-23 (got {}-{})", quiet.sleep_hour, quiet.wakeup_hour)));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_follow_site_layout() {
		let mut site = SiteConfig::new("4242", "94");
		site.base_url = "https://example.test/".into();
		assert_eq!(site.sign_in_url(), "https://example.test/en-ca/niv/users/sign_in");
		assert_eq!(site.appointment_url(), "https://example.test/en-ca/niv/schedule/4242/appointment");
		assert_eq!(
			site.days_json_url(),
			"https://example.test/en-ca/niv/schedule/4242/appointment/days/94.json?appointments%5Bexpedite%5D=false"
		);
		let date = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
		assert!(site.times_json_url(date).contains("/times/94.json?date=2026-04-10"));
	}

	#[test]
	fn empty_identifiers_are_rejected() {
		let site = SiteConfig::new("", "94");
		assert!(matches!(site.validate(), Err(RebookError::Config(_))));
	}

	#[test]
	fn quiet_hours_wrap_midnight() {
		let night = QuietHours {
			sleep_hour: 22,
			wakeup_hour: 6,
		};
		assert!(night.contains(23));
		assert!(night.contains(0));
		assert!(night.contains(5));
		assert!(!night.contains(6));
		assert!(!night.contains(12));

		let early = QuietHours {
			sleep_hour: 1,
			wakeup_hour: 5,
		};
		assert!(early.contains(3));
		assert!(!early.contains(23));
	}

	#[test]
	fn credentials_debug_hides_password() {
		let creds = Credentials {
			email: "me@example.com".into(),
			password: "hunter2".into(),
		};
		let printed = format!("{creds:?}");
		assert!(printed.contains("me@example.com"));
		assert!(!printed.contains("hunter2"));
	}
}
