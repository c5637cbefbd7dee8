//! Drives the booking form the way a person would.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::paging::{self, Paginated};
use super::{AttemptTracker, RebookState, RebookStrategy, RebookTarget};
use crate::error::{RebookError, Result};
use crate::session::RemoteSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSelectors {
	pub facility: String,
	pub date_input: String,
	pub next_month: String,
	pub time_select: String,
	pub submit: String,
	pub confirm: String,
}

impl Default for FormSelectors {
	fn default() -> Self {
		Self {
			facility: "#appointments_consulate_appointment_facility_id".into(),
			date_input: "#appointments_consulate_appointment_date".into(),
			next_month: "a.ui-datepicker-next".into(),
			time_select: "#appointments_consulate_appointment_time".into(),
			submit: "#appointments_submit".into(),
			confirm: "a.button.alert".into(),
		}
	}
}

impl FormSelectors {
	/// Day cell link in the calendar widget; months are zero-based there.
	pub fn day(date: NaiveDate) -> String {
		format!(
			r#"td[data-handler="selectDay"][data-month="{}"][data-year="{}"] a[data-date="{}"]"#,
			date.month0(),
			date.year(),
			date.day()
		)
	}

	pub fn time_option(&self, time: &str) -> String {
		format!(r#"{} option[value="{time}"]"#, self.time_select)
	}
}

#[derive(Debug, Clone)]
pub struct InteractiveFormStrategy {
	selectors: FormSelectors,
	max_calendar_pages: u32,
	/// Polls for the time list, which loads after the day is picked.
	time_polls: u32,
	time_poll_interval: Duration,
}

impl InteractiveFormStrategy {
	pub fn new(max_calendar_pages: u32) -> Self {
		Self {
			selectors: FormSelectors::default(),
			max_calendar_pages,
			time_polls: 10,
			time_poll_interval: Duration::from_millis(500),
		}
	}

	pub fn with_selectors(mut self, selectors: FormSelectors) -> Self {
		self.selectors = selectors;
		self
	}

	async fn wait_for_time(&self, session: &dyn RemoteSession, time: &str) -> Result<()> {
		let option = self.selectors.time_option(time);
		for _ in 0..self.time_polls {
			if session.read_field(&option).await?.is_some() {
				return Ok(());
			}
			tokio::time::sleep(self.time_poll_interval).await;
		}
		Err(RebookError::Session(format!("time {time} never appeared in {}", self.selectors.time_select)))
	}
}

struct Calendar<'a> {
	session: &'a dyn RemoteSession,
	day: String,
	next: &'a str,
}

#[async_trait]
impl Paginated for Calendar<'_> {
	async fn probe(&mut self) -> Result<bool> {
		Ok(self.session.read_field(&self.day).await?.is_some())
	}

	async fn advance(&mut self) -> Result<()> {
		if self.session.read_field(self.next).await?.is_none() {
			return Err(RebookError::Session("calendar has no next-month control".into()));
		}
		self.session.click(self.next).await
	}
}

#[async_trait]
impl RebookStrategy for InteractiveFormStrategy {
	fn name(&self) -> &'static str {
		"interactive"
	}

	async fn apply(&self, session: &dyn RemoteSession, target: &RebookTarget, tracker: &mut AttemptTracker) -> Result<()> {
		tracker.advance(RebookState::NavigatingForm);
		session.navigate(&target.appointment_url).await?;
		session.select(&self.selectors.facility, &target.facility_id).await?;

		tracker.advance(RebookState::FillingDate);
		session.click(&self.selectors.date_input).await?;
		let mut calendar = Calendar {
			session,
			day: FormSelectors::day(target.date),
			next: &self.selectors.next_month,
		};
		let pages = paging::search(&mut calendar, self.max_calendar_pages).await?;
		debug!(target = "rebook.rebook", pages, date = %target.date, "calendar day found");
		session.click(&calendar.day).await?;

		tracker.advance(RebookState::FillingTime);
		self.wait_for_time(session, &target.time).await?;
		session.select(&self.selectors.time_select, &target.time).await?;

		tracker.advance(RebookState::Submitting);
		session.click(&self.selectors.submit).await?;

		tracker.advance(RebookState::Confirming);
		session.click(&self.selectors.confirm).await
	}
}
