//! Append-only log of observed earliest dates.
//!
//! One line per observation:
//! `observedAtUtc,candidateDateISO,daysDifference,candidateTimesJoined`, times
//! joined with `|`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::{RebookError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
	pub observed_at: DateTime<Utc>,
	pub candidate_date: NaiveDate,
	/// Days from the observation day to the candidate.
	pub days_difference: i64,
	pub candidate_times: Vec<String>,
}

impl HistoryRecord {
	pub fn to_line(&self) -> String {
		format!(
			"{},{},{},{}",
			self.observed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
			self.candidate_date.format("%Y-%m-%d"),
			self.days_difference,
			self.candidate_times.join("|")
		)
	}

	/// Older lines carry only the first three fields.
	pub fn parse_line(line: &str) -> Result<Self> {
		let mut parts = line.trim().splitn(4, ',');
		let (Some(observed), Some(date), Some(days)) = (parts.next(), parts.next(), parts.next()) else {
			return Err(RebookError::parse(format!("history line has too few fields: {line:?}")));
		};
		let observed_at = DateTime::parse_from_rfc3339(observed)
			.map_err(|e| RebookError::parse(format!("bad timestamp {observed:?}: {e}")))?
			.with_timezone(&Utc);
		let candidate_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| RebookError::parse(format!("bad date {date:?}: {e}")))?;
		let days_difference = days.parse().map_err(|e| RebookError::parse(format!("bad day count {days:?}: {e}")))?;
		let candidate_times = parts
			.next()
			.map(|t| t.split('|').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect())
			.unwrap_or_default();
		Ok(Self {
			observed_at,
			candidate_date,
			days_difference,
			candidate_times,
		})
	}
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
	path: PathBuf,
}

impl HistoryLog {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub async fn append(&self, record: &HistoryRecord) -> Result<()> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(parent).await?;
		}
		let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(&self.path).await?;
		file.write_all(format!("{}\n", record.to_line()).as_bytes()).await?;
		file.flush().await?;
		Ok(())
	}

	/// Every parseable record; a missing file reads as empty.
	pub async fn read_all(&self) -> Result<Vec<HistoryRecord>> {
		let contents = match tokio::fs::read_to_string(&self.path).await {
			Ok(contents) => contents,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(err) => return Err(err.into()),
		};
		Ok(contents
			.lines()
			.enumerate()
			.filter(|(_, line)| !line.trim().is_empty())
			.filter_map(|(idx, line)| match HistoryRecord::parse_line(line) {
				Ok(record) => Some(record),
				Err(err) => {
					warn!(target = "rebook.loop", path = %self.path.display(), line = idx + 1, error = %err, "skipping history line");
					None
				}
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;

	fn record() -> HistoryRecord {
		HistoryRecord {
			observed_at: Utc.with_ymd_and_hms(2026, 3, 1, 14, 30, 0).unwrap(),
			candidate_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
			days_difference: 40,
			candidate_times: vec!["09:00".into(), "09:15".into()],
		}
	}

	#[test]
	fn line_format() {
		assert_eq!(record().to_line(), "2026-03-01T14:30:00.000Z,2026-04-10,40,09:00|09:15");
	}

	#[test]
	fn three_field_lines_parse() {
		let parsed = HistoryRecord::parse_line("2026-03-01T14:30:00.000Z,2026-04-10,40").unwrap();
		assert_eq!(parsed.days_difference, 40);
		assert!(parsed.candidate_times.is_empty());
	}

	#[tokio::test]
	async fn written_records_read_back() {
		let dir = tempfile::tempdir().unwrap();
		let log = HistoryLog::new(dir.path().join("nested").join("dates.csv"));
		log.append(&record()).await.unwrap();
		tokio::fs::OpenOptions::new()
			.append(true)
			.open(log.path())
			.await
			.unwrap()
			.write_all(b"garbage\n")
			.await
			.unwrap();
		log.append(&record()).await.unwrap();

		let read = log.read_all().await.unwrap();
		assert_eq!(read.len(), 2);
		assert_eq!(read[0].candidate_date, record().candidate_date);
		assert_eq!(read[0].days_difference, 40);
		assert_eq!(read[1], record());
	}

	#[tokio::test]
	async fn missing_file_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		assert!(HistoryLog::new(dir.path().join("none.csv")).read_all().await.unwrap().is_empty());
	}
}
