use chrono::{DateTime, Local, NaiveDate, Timelike, Utc};

/// Source of "now" for the loop; swapped for a fixed clock in tests.
pub trait Clock: Send + Sync {
	fn now_utc(&self) -> DateTime<Utc>;

	/// Calendar date in the local timezone, the one lead times are counted from.
	fn today(&self) -> NaiveDate;

	/// Local hour of day, for quiet hours.
	fn local_hour(&self) -> u32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_utc(&self) -> DateTime<Utc> {
		Utc::now()
	}

	fn today(&self) -> NaiveDate {
		Local::now().date_naive()
	}

	fn local_hour(&self) -> u32 {
		Local::now().hour()
	}
}
