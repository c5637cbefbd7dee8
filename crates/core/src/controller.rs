//! The poll loop.
//!
//! One cycle opens a fresh session, observes, maybe rebooks, and always closes
//! the session again. Errors end the cycle, never the loop; only the try
//! budget does that.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::WatchConfig;
use crate::date::{AvailableSlot, BookingDate};
use crate::eligibility::{EligibilityPolicy, Ineligible};
use crate::error::{RebookError, Result};
use crate::history::{HistoryLog, HistoryRecord};
use crate::notify::Notifications;
use crate::observer::SlotObserver;
use crate::rebook::{RebookTarget, Rebooker, RescheduleOutcome};
use crate::session::{RemoteSession, SessionFactory};

/// Try budget owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
	tries_remaining: u32,
	cycles: u32,
}

impl ControllerState {
	pub fn new(max_tries: u32) -> Self {
		Self {
			tries_remaining: max_tries,
			cycles: 0,
		}
	}

	pub fn tries_remaining(&self) -> u32 {
		self.tries_remaining
	}

	pub fn cycles(&self) -> u32 {
		self.cycles
	}

	/// Consumes one try; `false` once the budget is spent.
	pub fn take_try(&mut self) -> bool {
		if self.tries_remaining == 0 {
			return false;
		}
		self.tries_remaining -= 1;
		self.cycles += 1;
		true
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
	QuietHours,
	NoSlot,
	Ineligible { candidate: BookingDate, reason: Ineligible },
	Rescheduled(RescheduleOutcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
	pub cycles: u32,
	pub rescheduled: u32,
	pub failed_reschedules: u32,
	pub errors: u32,
}

/// What one read-only pass saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
	pub active: BookingDate,
	pub slot: Option<AvailableSlot>,
}

pub struct PollController {
	factory: Arc<dyn SessionFactory>,
	observer: SlotObserver,
	rebooker: Rebooker,
	policy: EligibilityPolicy,
	history: HistoryLog,
	notifications: Notifications,
	clock: Arc<dyn Clock>,
	config: WatchConfig,
	state: ControllerState,
}

impl PollController {
	pub fn new(
		factory: Arc<dyn SessionFactory>,
		observer: SlotObserver,
		rebooker: Rebooker,
		notifications: Notifications,
		clock: Arc<dyn Clock>,
		config: WatchConfig,
	) -> Self {
		Self {
			factory,
			observer,
			rebooker,
			policy: EligibilityPolicy::new(config.min_lead_days, config.notify_before),
			history: HistoryLog::new(config.history_path.clone()),
			notifications,
			clock,
			state: ControllerState::new(config.max_tries),
			config,
		}
	}

	pub fn state(&self) -> ControllerState {
		self.state
	}

	/// Polls until the try budget is spent.
	pub async fn run(&mut self) -> RunSummary {
		let mut summary = RunSummary::default();
		info!(target = "rebook.loop", tries = self.state.tries_remaining(), interval_s = self.config.poll_interval.as_secs(), "starting");
		loop {
			let hour = self.clock.local_hour();
			if self.config.quiet_hours.is_some_and(|q| q.contains(hour)) {
				debug!(target = "rebook.loop", hour, "quiet hours, doing nothing");
				tokio::time::sleep(self.config.poll_interval).await;
				continue;
			}

			if !self.state.take_try() {
				info!(target = "rebook.loop", cycles = summary.cycles, "reached max tries");
				self.notifications.text("Reached max tries, stopping").await;
				return summary;
			}
			summary.cycles += 1;
			info!(target = "rebook.loop", cycle = self.state.cycles(), tries_left = self.state.tries_remaining(), at = %self.clock.now_utc(), "cycle started");

			match self.run_cycle().await {
				Ok(outcome) => {
					match &outcome {
						CycleOutcome::Rescheduled(RescheduleOutcome::Success { .. }) => summary.rescheduled += 1,
						CycleOutcome::Rescheduled(RescheduleOutcome::Failed { .. }) => summary.failed_reschedules += 1,
						_ => {}
					}
					info!(target = "rebook.loop", cycle = self.state.cycles(), outcome = ?outcome, at = %self.clock.now_utc(), "cycle finished");
				}
				Err(err) => {
					summary.errors += 1;
					self.report_error(&err).await;
				}
			}

			tokio::time::sleep(self.config.poll_interval).await;
		}
	}

	/// One cycle outside the budget; quiet hours are honoured.
	pub async fn run_cycle(&self) -> Result<CycleOutcome> {
		if self.config.quiet_hours.is_some_and(|q| q.contains(self.clock.local_hour())) {
			return Ok(CycleOutcome::QuietHours);
		}
		let session = self.factory.open().await?;
		let result = self.observe_and_act(session.as_ref()).await;
		if let Err(err) = session.close().await {
			warn!(target = "rebook.loop", error = %err, "failed to close session");
		}
		result
	}

	/// Read-only pass: logs in, observes and records history, never rebooks.
	pub async fn check_once(&self) -> Result<(Observation, Option<std::result::Result<(), Ineligible>>)> {
		let session = self.factory.open().await?;
		let result = self.observe(session.as_ref()).await;
		if let Err(err) = session.close().await {
			warn!(target = "rebook.loop", error = %err, "failed to close session");
		}
		let observation = result?;
		let today = self.clock.today();
		let verdict = observation
			.slot
			.as_ref()
			.map(|slot| self.policy.evaluate(&observation.active, &slot.date, &slot.candidate_times, today));
		Ok((observation, verdict))
	}

	async fn observe(&self, session: &dyn RemoteSession) -> Result<Observation> {
		let active = self.observer.fetch_active_booking_date(session).await?;
		let Some(earliest) = self.observer.fetch_earliest_open_slot(session).await? else {
			return Ok(Observation { active, slot: None });
		};
		// The date is recorded even when the times fetch fails.
		let times = self.observer.fetch_available_times(session, earliest.date()).await;
		let recorded: Vec<String> = times.as_ref().map(|t| t.real().map(String::from).collect()).unwrap_or_default();
		self.record(&earliest, recorded).await;
		let candidate_times = times?;

		Ok(Observation {
			active,
			slot: Some(AvailableSlot {
				date: earliest,
				candidate_times,
			}),
		})
	}

	async fn record(&self, earliest: &BookingDate, candidate_times: Vec<String>) {
		let record = HistoryRecord {
			observed_at: self.clock.now_utc(),
			candidate_date: earliest.date(),
			days_difference: earliest.days_from(self.clock.today()),
			candidate_times,
		};
		if let Err(err) = self.history.append(&record).await {
			warn!(target = "rebook.loop", path = %self.history.path().display(), error = %err, "failed to record observation");
		}
	}

	async fn observe_and_act(&self, session: &dyn RemoteSession) -> Result<CycleOutcome> {
		let Observation { active, slot } = self.observe(session).await?;
		let Some(slot) = slot else {
			return Ok(CycleOutcome::NoSlot);
		};

		let today = self.clock.today();
		match self.policy.evaluate(&active, &slot.date, &slot.candidate_times, today) {
			Ok(()) => {}
			Err(reason @ Ineligible::InsideLeadTime { .. }) => return Err(reason.into()),
			Err(reason) => {
				info!(target = "rebook.loop", active = %active, candidate = %slot.date, %reason, "not eligible");
				return Ok(CycleOutcome::Ineligible { candidate: slot.date, reason });
			}
		}

		let time = slot
			.candidate_times
			.first()
			.ok_or_else(|| RebookError::Application(format!("no time to book on {}", slot.date)))?
			.to_string();
		info!(target = "rebook.loop", active = %active, candidate = %slot.date, %time, "earlier date found");
		self.notifications
			.text(&format!("Earlier date found: {} {time} (currently {active})", slot.date.date().format("%Y-%m-%d")))
			.await;

		let target = RebookTarget::new(self.observer.site(), slot.date.date(), time);
		let outcome = self.rebooker.reschedule(session, &target, today).await?;
		Ok(CycleOutcome::Rescheduled(outcome))
	}

	async fn report_error(&self, err: &RebookError) {
		if !err.is_notifiable() {
			info!(target = "rebook.loop", kind = err.kind(), error = %err, at = %self.clock.now_utc(), "cycle skipped");
			return;
		}
		if let RebookError::Parse { likely_logged_out: true, .. } = err {
			warn!(target = "rebook.loop", "session looks logged out");
		}
		error!(target = "rebook.loop", kind = err.kind(), error = %err, at = %self.clock.now_utc(), "cycle failed");
		self.notifications.text(&format!("{}: {err}", err.kind())).await;
	}
}
