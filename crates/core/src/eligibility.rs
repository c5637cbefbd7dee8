//! Whether an observed slot is worth acting on.
//!
//! Pure: no I/O, no clock. `today` is passed in so the rules can be checked
//! against any calendar day.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::date::{BookingDate, CandidateTimes};
use crate::error::{RebookError, Result};

/// Why a candidate was rejected. Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
	/// No real time-of-day on offer.
	NoRealTimes,
	/// Not strictly earlier than the booking already held.
	NotEarlierThanActive,
	/// Earlier than today plus the minimum lead time.
	InsideLeadTime { earliest_allowed: NaiveDate },
	/// Not strictly before the configured threshold.
	NotBeforeThreshold { threshold: NaiveDate },
}

impl fmt::Display for Ineligible {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Ineligible::NoRealTimes => write!(f, "no real times available"),
			Ineligible::NotEarlierThanActive => write!(f, "not earlier than the active booking"),
			Ineligible::InsideLeadTime { earliest_allowed } => write!(f, "earlier than the minimum lead date {earliest_allowed}"),
			Ineligible::NotBeforeThreshold { threshold } => write!(f, "not before {threshold}"),
		}
	}
}

impl From<Ineligible> for RebookError {
	fn from(reason: Ineligible) -> Self {
		RebookError::Application(reason.to_string())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityPolicy {
	pub min_lead_days: i64,
	pub notify_before: NaiveDate,
}

impl EligibilityPolicy {
	pub fn new(min_lead_days: i64, notify_before: NaiveDate) -> Self {
		Self { min_lead_days, notify_before }
	}

	/// First date a slot may be booked for when evaluated on `today`.
	pub fn earliest_allowed(&self, today: NaiveDate) -> NaiveDate {
		if self.min_lead_days <= 0 {
			return today;
		}
		today.checked_add_days(Days::new(self.min_lead_days as u64)).unwrap_or(NaiveDate::MAX)
	}

	pub fn evaluate(&self, active: &BookingDate, candidate: &BookingDate, times: &CandidateTimes, today: NaiveDate) -> std::result::Result<(), Ineligible> {
		if times.is_unavailable() {
			return Err(Ineligible::NoRealTimes);
		}
		if !candidate.is_before(active) {
			return Err(Ineligible::NotEarlierThanActive);
		}
		self.check_lead_time(candidate, today)?;
		if candidate.date() >= self.notify_before {
			return Err(Ineligible::NotBeforeThreshold { threshold: self.notify_before });
		}
		Ok(())
	}

	/// Lead-time rule alone, re-checked right before any page interaction.
	pub fn ensure_lead_time(&self, candidate: &BookingDate, today: NaiveDate) -> Result<()> {
		self.check_lead_time(candidate, today).map_err(RebookError::from)
	}

	fn check_lead_time(&self, candidate: &BookingDate, today: NaiveDate) -> std::result::Result<(), Ineligible> {
		let earliest_allowed = self.earliest_allowed(today);
		if candidate.date() < earliest_allowed {
			return Err(Ineligible::InsideLeadTime { earliest_allowed });
		}
		Ok(())
	}
}

pub fn is_eligible(
	active: &BookingDate,
	candidate: &BookingDate,
	times: &CandidateTimes,
	today: NaiveDate,
	min_lead_days: i64,
	notify_before: NaiveDate,
) -> bool {
	EligibilityPolicy::new(min_lead_days, notify_before).evaluate(active, candidate, times, today).is_ok()
}
