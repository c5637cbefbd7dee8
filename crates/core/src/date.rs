//! Booking dates, slot times and the parsing rules for both.

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RebookError, Result};

/// "10 June, 2026, 08:15" and "10 June 2026".
static DAY_FIRST: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(\d{1,2})\s+([A-Za-z]{3,9}),?\s+(\d{4})(?:,?\s+(\d{1,2}:\d{2}))?").expect("day-first date regex should compile"));

/// "June 10, 2026, 08:15".
static MONTH_FIRST: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"([A-Za-z]{3,9})\s+(\d{1,2}),\s+(\d{4})(?:,?\s+(\d{1,2}:\d{2}))?").expect("month-first date regex should compile"));

/// An appointment date, either held or offered.
///
/// Ordering questions are always answered on [`date`](Self::date); the time
/// is carried along for display and form submission only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingDate {
	date: NaiveDate,
	time: Option<NaiveTime>,
}

impl BookingDate {
	pub fn new(date: NaiveDate) -> Self {
		Self { date, time: None }
	}

	pub fn with_time(date: NaiveDate, time: NaiveTime) -> Self {
		Self { date, time: Some(time) }
	}

	pub fn date(&self) -> NaiveDate {
		self.date
	}

	pub fn time(&self) -> Option<NaiveTime> {
		self.time
	}

	pub fn is_before(&self, other: &BookingDate) -> bool {
		self.date < other.date
	}

	/// Whole days from `today` to this date (negative when in the past).
	pub fn days_from(&self, today: NaiveDate) -> i64 {
		(self.date - today).num_days()
	}

	/// Parses `YYYY-MM-DD`, optionally followed by `T`/space and `HH:MM`.
	pub fn parse_iso(raw: &str) -> Result<Self> {
		let raw = raw.trim();
		let (date_part, time_part) = match raw.find(['T', ' ']) {
			Some(idx) => (&raw[..idx], Some(&raw[idx + 1..])),
			None => (raw, None),
		};
		let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| RebookError::parse(format!("invalid date {raw:?}: {e}")))?;
		let time = time_part.map(|t| parse_time(t.get(..5).unwrap_or(t))).transpose()?;
		Ok(Self { date, time })
	}

	/// Extracts the appointment date from free text such as
	/// `"Consular Appointment: 10 June, 2026, 08:15 Toronto local time"`.
	pub fn parse_profile_text(text: &str) -> Result<Self> {
		if let Some(caps) = DAY_FIRST.captures(text) {
			return Self::from_parts(&caps[1], &caps[2], &caps[3], caps.get(4).map(|m| m.as_str()), text);
		}
		if let Some(caps) = MONTH_FIRST.captures(text) {
			return Self::from_parts(&caps[2], &caps[1], &caps[3], caps.get(4).map(|m| m.as_str()), text);
		}
		Err(RebookError::parse(format!("no appointment date in {text:?}")))
	}

	fn from_parts(day: &str, month: &str, year: &str, time: Option<&str>, source: &str) -> Result<Self> {
		let date = NaiveDate::parse_from_str(&format!("{day} {month} {year}"), "%d %B %Y")
			.map_err(|e| RebookError::parse(format!("unrecognised date in {source:?}: {e}")))?;
		let time = time.map(parse_time).transpose()?;
		Ok(Self { date, time })
	}
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
	NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| RebookError::parse(format!("invalid time {raw:?}: {e}")))
}

impl From<NaiveDate> for BookingDate {
	fn from(date: NaiveDate) -> Self {
		Self::new(date)
	}
}

impl fmt::Display for BookingDate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.time {
			Some(time) => write!(f, "{} {}", self.date.format("%Y-%m-%d"), time.format("%H:%M")),
			None => write!(f, "{}", self.date.format("%Y-%m-%d")),
		}
	}
}

/// Time-of-day options offered for a date, in site order.
///
/// `None` entries are the site's "no real time" placeholder; a list holding
/// only placeholders means the date is effectively unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTimes(Vec<Option<String>>);

impl CandidateTimes {
	pub fn new(entries: Vec<Option<String>>) -> Self {
		Self(entries)
	}

	pub fn from_times<I, S>(times: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(times.into_iter().map(|t| Some(t.into())).collect())
	}

	/// Real (non-placeholder, non-blank) times.
	pub fn real(&self) -> impl Iterator<Item = &str> {
		self.0.iter().filter_map(|t| t.as_deref()).map(str::trim).filter(|t| !t.is_empty())
	}

	pub fn is_unavailable(&self) -> bool {
		self.real().next().is_none()
	}

	pub fn first(&self) -> Option<&str> {
		self.real().next()
	}

	/// Real times joined with `sep`, as stored in the history log.
	pub fn joined(&self, sep: &str) -> String {
		self.real().collect::<Vec<_>>().join(sep)
	}

	/// Reads the site's times payload: `{"available_times": [...]}` or a bare array.
	pub fn from_json(body: &Value) -> Result<Self> {
		let list = match body {
			Value::Array(items) => items,
			Value::Object(map) => match map.get("available_times") {
				Some(Value::Array(items)) => items,
				Some(Value::Null) => return Ok(Self::default()),
				_ => return Err(RebookError::logged_out(format!("times payload has no available_times list: {body}"))),
			},
			other => return Err(RebookError::parse(format!("unexpected times payload: {other}"))),
		};

		list.iter()
			.map(|item| match item {
				Value::Null => Ok(None),
				Value::String(s) => Ok(Some(s.clone())),
				other => Err(RebookError::parse(format!("unexpected time entry: {other}"))),
			})
			.collect::<Result<Vec<_>>>()
			.map(Self)
	}
}

/// An open date together with its time options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableSlot {
	pub date: BookingDate,
	pub candidate_times: CandidateTimes,
}
