use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use rebook::{ClosestDates, HistoryLog, Notifications, closest_dates};
use tracing::info;

use crate::settings::Settings;

pub async fn execute(settings: &Settings, date: Option<NaiveDate>, no_notify: bool) -> Result<()> {
	let day = match date {
		Some(day) => day,
		None => Utc::now().date_naive().checked_sub_days(Days::new(1)).context("date out of range")?,
	};
	let Some(closest) = closest(settings, day).await? else {
		return Ok(());
	};

	let message = closest.message();
	println!("{message}");
	if !no_notify {
		Notifications::new(settings.notifier()?).text(&message).await;
	}
	Ok(())
}

/// Reads the history file and picks the closest dates observed on `day`.
pub async fn closest(settings: &Settings, day: NaiveDate) -> Result<Option<ClosestDates>> {
	let log = HistoryLog::new(&settings.history_file);
	let records = log.read_all().await.with_context(|| format!("failed to read {}", log.path().display()))?;
	let closest = closest_dates(&records, day);
	if closest.is_none() {
		info!(target = "rebook", %day, records = records.len(), "no observations that day");
	}
	Ok(closest)
}
