use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "rebook")]
#[command(about = "Watch an appointment schedule and move the booking to an earlier slot")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(flatten)]
	pub settings: Settings,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
	/// Poll until the try budget runs out, rebooking when an earlier slot opens
	Watch,

	/// Observe once and report, without rebooking
	Check,

	/// Send the closest dates seen on one day of the history file
	Summary {
		/// Day to summarise (defaults to yesterday, UTC)
		#[arg(long, value_name = "YYYY-MM-DD")]
		date: Option<NaiveDate>,

		/// Print only, do not notify
		#[arg(long)]
		no_notify: bool,
	},
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	#[test]
	fn parse_watch_with_site_options() {
		let args = vec!["rebook", "--schedule-id", "4242", "--facility-id", "94", "--notify-before", "2026-05-01", "watch"];
		let cli = Cli::try_parse_from(args).unwrap();

		assert_eq!(cli.command, Commands::Watch);
		assert_eq!(cli.settings.schedule_id.as_deref(), Some("4242"));
		assert_eq!(cli.settings.facility_id.as_deref(), Some("94"));
		assert_eq!(cli.settings.notify_before, NaiveDate::from_ymd_opt(2026, 5, 1));
	}

	#[test]
	fn parse_defaults() {
		let cli = Cli::try_parse_from(["rebook", "check"]).unwrap();

		assert_eq!(cli.command, Commands::Check);
		assert_eq!(cli.settings.country_code, "en-ca");
		assert_eq!(cli.settings.poll_minutes, 15);
		assert_eq!(cli.settings.max_tries, 250);
		assert_eq!(cli.settings.earliest_date_shift, 1);
		assert_eq!(cli.settings.calendar_max_pages, 12);
		assert_eq!(cli.settings.history_file, PathBuf::from("dates.csv"));
		assert!(cli.settings.headless);
	}

	#[test]
	fn parse_summary_date() {
		let cli = Cli::try_parse_from(["rebook", "summary", "--date", "2026-03-01", "--no-notify"]).unwrap();

		match cli.command {
			Commands::Summary { date, no_notify } => {
				assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 1));
				assert!(no_notify);
			}
			_ => panic!("Expected Summary command"),
		}
	}

	#[test]
	fn verbosity_counts() {
		let cli = Cli::try_parse_from(["rebook", "watch", "-vv"]).unwrap();
		assert_eq!(cli.verbose, 2);
	}

	#[test]
	fn rejects_bad_dates() {
		assert!(Cli::try_parse_from(["rebook", "summary", "--date", "01/03/2026"]).is_err());
	}
}
