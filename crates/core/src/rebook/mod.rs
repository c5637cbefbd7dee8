//! Moving the held booking to an earlier slot.
//!
//! Strategies run as a fallback chain; whatever they report, the active
//! booking is re-read afterwards and only that re-read decides success.

use std::fmt;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::date::BookingDate;
use crate::eligibility::EligibilityPolicy;
use crate::error::{RebookError, Result};
use crate::notify::Notifications;
use crate::observer::SlotObserver;
use crate::redact::RedactionList;
use crate::session::RemoteSession;

mod direct;
mod interactive;
pub mod paging;
mod state;
mod strategy;

pub use direct::{DirectSubmitStrategy, TokenSelectors};
pub use interactive::{FormSelectors, InteractiveFormStrategy};
pub use state::{AttemptTracker, RebookState};
pub use strategy::RebookStrategy;

/// Chain runs per call: the first pass plus one retry after a mismatch.
const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebookTarget {
	pub facility_id: String,
	pub date: NaiveDate,
	/// Time-of-day option to pick, as the site lists it.
	pub time: String,
	pub appointment_url: String,
}

impl RebookTarget {
	pub fn new(site: &SiteConfig, date: NaiveDate, time: impl Into<String>) -> Self {
		Self {
			facility_id: site.facility_id.clone(),
			date,
			time: time.into(),
			appointment_url: site.appointment_url(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
	/// The re-read active booking is not the target.
	VerificationMismatch { actual: NaiveDate },
	/// The active booking could not be re-read at all.
	Unverified(String),
}

impl fmt::Display for FailureReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FailureReason::VerificationMismatch { actual } => write!(f, "active booking is still {actual}"),
			FailureReason::Unverified(detail) => write!(f, "could not verify the active booking: {detail}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescheduleOutcome {
	Success { date: NaiveDate, time: String },
	Failed { date: NaiveDate, time: String, reason: FailureReason },
}

impl RescheduleOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, RescheduleOutcome::Success { .. })
	}
}

pub struct Rebooker {
	strategies: Vec<Box<dyn RebookStrategy>>,
	observer: SlotObserver,
	policy: EligibilityPolicy,
	redaction: RedactionList,
	notifications: Notifications,
}

impl Rebooker {
	pub fn new(
		strategies: Vec<Box<dyn RebookStrategy>>,
		observer: SlotObserver,
		policy: EligibilityPolicy,
		redaction: RedactionList,
		notifications: Notifications,
	) -> Self {
		Self {
			strategies,
			observer,
			policy,
			redaction,
			notifications,
		}
	}

	/// Interactive form first, direct submission as the fallback.
	pub fn with_default_strategies(
		max_calendar_pages: u32,
		observer: SlotObserver,
		policy: EligibilityPolicy,
		redaction: RedactionList,
		notifications: Notifications,
	) -> Self {
		let strategies: Vec<Box<dyn RebookStrategy>> = vec![Box::new(InteractiveFormStrategy::new(max_calendar_pages)), Box::new(DirectSubmitStrategy::new())];
		Self::new(strategies, observer, policy, redaction, notifications)
	}

	/// Attempts the move and verifies it.
	///
	/// Returns `Err` only when the target is inside the lead time, in which
	/// case the page is never touched. Every other failure is reported as
	/// [`RescheduleOutcome::Failed`].
	pub async fn reschedule(&self, session: &dyn RemoteSession, target: &RebookTarget, today: NaiveDate) -> Result<RescheduleOutcome> {
		self.policy.ensure_lead_time(&BookingDate::new(target.date), today)?;

		let mut attempt = 0;
		loop {
			attempt += 1;
			let mut tracker = AttemptTracker::new(attempt);
			if let Err(err) = self.run_chain(session, target, &mut tracker).await {
				warn!(target = "rebook.rebook", attempt, kind = err.kind(), error = %err, "every strategy failed, verifying anyway");
			}

			// Verification navigates away, so the result page is captured first.
			let capture = self.capture(session).await;
			tracker.advance(RebookState::Verifying);
			let actual = match self.observer.reload_active_booking_date(session).await {
				Ok(actual) => actual,
				Err(err) => {
					tracker.advance(RebookState::Failed);
					let reason = FailureReason::Unverified(err.to_string());
					self.report_failure(target, &reason, capture.as_deref()).await;
					return Ok(failed(target, reason));
				}
			};

			if actual.date() == target.date {
				tracker.advance(RebookState::Succeeded);
				self.report_success(target, capture.as_deref()).await;
				return Ok(RescheduleOutcome::Success {
					date: target.date,
					time: target.time.clone(),
				});
			}

			tracker.advance(RebookState::Failed);
			let mismatch = RebookError::VerificationMismatch {
				expected: target.date,
				actual: actual.date(),
			};
			warn!(target = "rebook.rebook", attempt, kind = mismatch.kind(), "{mismatch}");
			let reason = FailureReason::VerificationMismatch { actual: actual.date() };
			self.report_failure(target, &reason, capture.as_deref()).await;

			if attempt >= MAX_ATTEMPTS {
				return Ok(failed(target, reason));
			}
			match self.observer.is_still_open(session, target.date).await {
				Ok(true) => info!(target = "rebook.rebook", date = %target.date, "date still open, retrying once"),
				Ok(false) => return Ok(failed(target, reason)),
				Err(err) => {
					warn!(target = "rebook.rebook", kind = err.kind(), error = %err, "could not re-check availability");
					return Ok(failed(target, reason));
				}
			}
		}
	}

	async fn run_chain(&self, session: &dyn RemoteSession, target: &RebookTarget, tracker: &mut AttemptTracker) -> Result<()> {
		let mut last = RebookError::Session("no rebooking strategy configured".into());
		for strategy in &self.strategies {
			tracker.use_strategy(strategy.name());
			match strategy.apply(session, target, tracker).await {
				Ok(()) => {
					info!(target = "rebook.rebook", strategy = strategy.name(), "change request accepted");
					return Ok(());
				}
				Err(err) => {
					warn!(target = "rebook.rebook", strategy = strategy.name(), kind = err.kind(), error = %err, "strategy failed");
					last = err;
				}
			}
		}
		Err(last)
	}

	async fn report_success(&self, target: &RebookTarget, capture: Option<&[u8]>) {
		let text = format!("Rescheduled to {} {}", target.date.format("%Y-%m-%d"), target.time);
		info!(target = "rebook.rebook", date = %target.date, time = %target.time, "rescheduled");
		self.notifications.text(&text).await;
		self.send_capture(capture, &text).await;
	}

	async fn report_failure(&self, target: &RebookTarget, reason: &FailureReason, capture: Option<&[u8]>) {
		let text = format!("Failed to reschedule to {} {}: {reason}", target.date.format("%Y-%m-%d"), target.time);
		self.notifications.text(&text).await;
		self.send_capture(capture, &text).await;
	}

	async fn capture(&self, session: &dyn RemoteSession) -> Option<Vec<u8>> {
		match self.redaction.capture(session).await {
			Ok(png) => Some(png),
			Err(err) => {
				warn!(target = "rebook.rebook", error = %err, "screenshot failed");
				None
			}
		}
	}

	async fn send_capture(&self, capture: Option<&[u8]>, caption: &str) {
		if let Some(png) = capture {
			self.notifications.image(png, Some(caption)).await;
		}
	}
}

fn failed(target: &RebookTarget, reason: FailureReason) -> RescheduleOutcome {
	RescheduleOutcome::Failed {
		date: target.date,
		time: target.time.clone(),
		reason,
	}
}
