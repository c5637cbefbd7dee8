//! Reads the held booking and the open slots from the remote site.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Credentials, SiteConfig};
use crate::date::{BookingDate, CandidateTimes};
use crate::error::{RebookError, Result};
use crate::session::RemoteSession;

/// Selectors of the sign-in form and the profile view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSelectors {
	pub form: String,
	pub email: String,
	pub password: String,
	pub policy: String,
	pub submit: String,
	/// Element whose text carries the held appointment.
	pub appointment: String,
}

impl Default for LoginSelectors {
	fn default() -> Self {
		Self {
			form: "form#sign_in_form".into(),
			email: r#"form#sign_in_form input[name="user[email]"]"#.into(),
			password: r#"form#sign_in_form input[name="user[password]"]"#.into(),
			policy: r#"form#sign_in_form input[name="policy_confirmed"]"#.into(),
			submit: r#"form#sign_in_form input[name="commit"]"#.into(),
			appointment: "p.consular-appt".into(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct SlotObserver {
	site: SiteConfig,
	credentials: Credentials,
	selectors: LoginSelectors,
}

impl SlotObserver {
	pub fn new(site: SiteConfig, credentials: Credentials) -> Self {
		Self {
			site,
			credentials,
			selectors: LoginSelectors::default(),
		}
	}

	pub fn with_selectors(mut self, selectors: LoginSelectors) -> Self {
		self.selectors = selectors;
		self
	}

	pub fn site(&self) -> &SiteConfig {
		&self.site
	}

	/// Signs in unless the session already shows the profile view.
	pub async fn login(&self, session: &dyn RemoteSession) -> Result<()> {
		info!(target = "rebook.observer", url = %self.site.sign_in_url(), "logging in");
		session.navigate(&self.site.sign_in_url()).await?;

		if session.read_field(&self.selectors.form).await?.is_none() {
			if session.read_field(&self.selectors.appointment).await?.is_some() {
				debug!(target = "rebook.observer", "already signed in");
				return Ok(());
			}
			return Err(RebookError::Session("login form not found on the page".into()));
		}

		for selector in [&self.selectors.email, &self.selectors.password, &self.selectors.policy, &self.selectors.submit] {
			if session.read_field(selector).await?.is_none() {
				return Err(RebookError::Session(format!("login form field {selector} not found")));
			}
		}

		session.fill(&self.selectors.email, &self.credentials.email).await?;
		session.fill(&self.selectors.password, &self.credentials.password).await?;
		session.click(&self.selectors.policy).await?;
		session.click(&self.selectors.submit).await?;
		Ok(())
	}

	/// Logs in and reads the appointment currently held by the account.
	pub async fn fetch_active_booking_date(&self, session: &dyn RemoteSession) -> Result<BookingDate> {
		self.login(session).await?;
		self.read_active_booking_date(session).await
	}

	/// Re-reads the held appointment on an already signed-in session.
	pub async fn read_active_booking_date(&self, session: &dyn RemoteSession) -> Result<BookingDate> {
		let text = match session.read_field(&self.selectors.appointment).await? {
			Some(text) => text,
			None => {
				session.navigate(&self.site.account_url()).await?;
				session
					.read_field(&self.selectors.appointment)
					.await?
					.ok_or_else(|| RebookError::Session(format!("profile field {} not found", self.selectors.appointment)))?
			}
		};
		let active = BookingDate::parse_profile_text(&text)?;
		info!(target = "rebook.observer", active = %active, "active booking");
		Ok(active)
	}

	/// Reloads the account page and reads the held appointment from it, so a
	/// stale view can never confirm a change.
	pub async fn reload_active_booking_date(&self, session: &dyn RemoteSession) -> Result<BookingDate> {
		session.navigate(&self.site.account_url()).await?;
		self.read_active_booking_date(session).await
	}

	/// All open dates for the facility, earliest first.
	pub async fn fetch_open_dates(&self, session: &dyn RemoteSession) -> Result<Vec<BookingDate>> {
		let body = self.fetch_json(session, &self.site.days_json_url()).await?;
		let items = match body {
			Value::Array(items) => items,
			other => {
				warn!(target = "rebook.observer", body = %other, "days payload is not a list, probably logged out");
				return Err(RebookError::logged_out(format!("days payload is not a list: {other}")));
			}
		};

		let mut dates = items
			.iter()
			.map(|item| {
				item.get("date")
					.and_then(Value::as_str)
					.ok_or_else(|| RebookError::parse(format!("malformed day entry: {item}")))
					.and_then(BookingDate::parse_iso)
			})
			.collect::<Result<Vec<_>>>()
			.inspect_err(|err| warn!(target = "rebook.observer", error = %err, "malformed day entry"))?;
		dates.sort_by_key(BookingDate::date);
		Ok(dates)
	}

	pub async fn fetch_earliest_open_slot(&self, session: &dyn RemoteSession) -> Result<Option<BookingDate>> {
		let earliest = self.fetch_open_dates(session).await?.into_iter().next();
		match earliest {
			Some(date) => info!(target = "rebook.observer", earliest = %date, "earliest open date"),
			None => info!(target = "rebook.observer", "no open dates"),
		}
		Ok(earliest)
	}

	pub async fn is_still_open(&self, session: &dyn RemoteSession, date: NaiveDate) -> Result<bool> {
		Ok(self.fetch_open_dates(session).await?.iter().any(|d| d.date() == date))
	}

	/// Time options for `date`. A null-only list is returned as unavailable,
	/// never as an error.
	pub async fn fetch_available_times(&self, session: &dyn RemoteSession, date: NaiveDate) -> Result<CandidateTimes> {
		let body = self.fetch_json(session, &self.site.times_json_url(date)).await?;
		let times = CandidateTimes::from_json(&body)?;
		debug!(target = "rebook.observer", %date, times = %times.joined("|"), unavailable = times.is_unavailable(), "available times");
		Ok(times)
	}

	async fn fetch_json(&self, session: &dyn RemoteSession, url: &str) -> Result<Value> {
		let response = session.fetch(url).await?;
		if !response.is_success() {
			return Err(RebookError::Session(format!("GET {url} returned {}", response.status)));
		}
		serde_json::from_str(&response.body).map_err(|e| {
			warn!(target = "rebook.observer", %url, "response is not JSON, probably logged out");
			RebookError::logged_out(format!("response from {url} is not JSON: {e}"))
		})
	}
}
