//! Daily digest of the closest dates seen in the history log.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::history::HistoryRecord;

const SLOTS: usize = 3;
const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosestDates {
	pub day: NaiveDate,
	/// Exactly three entries, padded with `N/A`.
	pub entries: Vec<String>,
}

impl ClosestDates {
	pub fn message(&self) -> String {
		format!("Closest Dates found on {}: [ {} ]", self.day.format("%Y-%m-%d"), self.entries.join(", "))
	}
}

/// The three earliest distinct `date time` entries observed on `day` (UTC),
/// or `None` when nothing was observed that day.
pub fn closest_dates(records: &[HistoryRecord], day: NaiveDate) -> Option<ClosestDates> {
	let distinct: BTreeSet<(NaiveDate, String)> = records
		.iter()
		.filter(|r| r.observed_at.date_naive() == day)
		.map(|r| {
			let label = match r.candidate_times.first() {
				Some(time) => format!("{} {time}", r.candidate_date.format("%Y-%m-%d")),
				None => r.candidate_date.format("%Y-%m-%d").to_string(),
			};
			(r.candidate_date, label)
		})
		.collect();
	if distinct.is_empty() {
		return None;
	}

	let mut entries: Vec<String> = distinct.into_iter().take(SLOTS).map(|(_, label)| label).collect();
	entries.resize(SLOTS, PLACEHOLDER.to_string());
	Some(ClosestDates { day, entries })
}
