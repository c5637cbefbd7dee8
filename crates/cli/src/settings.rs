//! Command-line and environment configuration.
//!
//! Every option can come from a flag or from the environment (a `.env` file
//! is loaded first). Values are turned into the core's typed configs here and
//! validated before anything starts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{ArgAction, Args};
use rebook::config::{DEFAULT_BASE_URL, DEFAULT_COUNTRY_CODE};
use rebook::redact::DEFAULT_REDACT_SELECTORS;
use rebook::{Credentials, LogNotifier, Notifier, QuietHours, SiteConfig, TelegramNotifier, WatchConfig};
use rebook_runtime::{LaunchOptions, PageOptions};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

#[derive(Args, Debug, Clone)]
pub struct Settings {
	/// Account email
	#[arg(long, env = "EMAIL")]
	pub email: Option<String>,

	/// Account password
	#[arg(long, env = "PASSWORD", hide_env_values = true)]
	pub password: Option<String>,

	/// Site root
	#[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
	pub base_url: String,

	/// Locale segment of the site's URLs
	#[arg(long, env = "COUNTRY_CODE", default_value = DEFAULT_COUNTRY_CODE)]
	pub country_code: String,

	#[arg(long, env = "SCHEDULE_ID")]
	pub schedule_id: Option<String>,

	#[arg(long, env = "FACILITY_ID")]
	pub facility_id: Option<String>,

	/// Minutes between polls
	#[arg(long = "poll-minutes", env = "NEXT_SCHEDULE_POLL_MIN", default_value_t = 15)]
	pub poll_minutes: u64,

	/// Cycles before stopping
	#[arg(long, env = "MAX_NUMBER_OF_POLL", default_value_t = 250)]
	pub max_tries: u32,

	/// Only act on slots strictly before this date
	#[arg(long, env = "NOTIFY_ON_DATE_BEFORE", value_name = "YYYY-MM-DD")]
	pub notify_before: Option<NaiveDate>,

	/// Minimum whole days between today and a slot worth taking
	#[arg(long, env = "EARLIEST_DATE_SHIFT", default_value_t = 1)]
	pub earliest_date_shift: i64,

	/// Local hour from which polling pauses
	#[arg(long, env = "SLEEP_HOUR")]
	pub sleep_hour: Option<u32>,

	/// Local hour at which polling resumes
	#[arg(long, env = "WAKEUP_HOUR")]
	pub wakeup_hour: Option<u32>,

	#[arg(long, env = "NOTIFY_TG_CHAT_ID")]
	pub tg_chat_id: Option<String>,

	#[arg(long, env = "NOTIFY_TG_TOKEN", hide_env_values = true)]
	pub tg_token: Option<String>,

	/// Observation log
	#[arg(long, env = "HISTORY_FILE", default_value = "dates.csv")]
	pub history_file: PathBuf,

	/// Forward page-advances allowed in the calendar widget
	#[arg(long, env = "CALENDAR_MAX_PAGES", default_value_t = 12)]
	pub calendar_max_pages: u32,

	/// Comma-separated selectors hidden before screenshots leave the process
	#[arg(long, env = "REDACT_SELECTORS", value_delimiter = ',')]
	pub redact_selectors: Vec<String>,

	/// Where screenshots go when no chat channel is configured
	#[arg(long, env = "SCREENSHOT_DIR")]
	pub screenshot_dir: Option<PathBuf>,

	/// Chromium-family browser binary (discovered when unset)
	#[arg(long, env = "CHROME_PATH")]
	pub chrome_path: Option<PathBuf>,

	#[arg(long, env = "HEADLESS", default_value_t = true, action = ArgAction::Set)]
	pub headless: bool,

	/// Disable the browser sandbox (containers)
	#[arg(long, env = "NO_SANDBOX")]
	pub no_sandbox: bool,

	#[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
	pub user_agent: String,
}

impl Settings {
	pub fn site(&self) -> Result<SiteConfig> {
		let site = SiteConfig {
			base_url: self.base_url.clone(),
			country_code: self.country_code.clone(),
			schedule_id: self.schedule_id.clone().context("SCHEDULE_ID is required")?,
			facility_id: self.facility_id.clone().context("FACILITY_ID is required")?,
		};
		site.validate()?;
		Ok(site)
	}

	pub fn credentials(&self) -> Result<Credentials> {
		Ok(Credentials {
			email: self.email.clone().filter(|e| !e.trim().is_empty()).context("EMAIL is required")?,
			password: self.password.clone().filter(|p| !p.is_empty()).context("PASSWORD is required")?,
		})
	}

	pub fn quiet_hours(&self) -> Result<Option<QuietHours>> {
		match (self.sleep_hour, self.wakeup_hour) {
			(Some(sleep_hour), Some(wakeup_hour)) => Ok(Some(QuietHours { sleep_hour, wakeup_hour })),
			(None, None) => Ok(None),
			_ => bail!("SLEEP_HOUR and WAKEUP_HOUR must be set together"),
		}
	}

	pub fn redact_selectors(&self) -> Vec<String> {
		if self.redact_selectors.is_empty() {
			DEFAULT_REDACT_SELECTORS.iter().map(|s| s.to_string()).collect()
		} else {
			self.redact_selectors.clone()
		}
	}

	pub fn watch_config(&self) -> Result<WatchConfig> {
		let config = WatchConfig {
			poll_interval: Duration::from_secs(self.poll_minutes.saturating_mul(60)),
			max_tries: self.max_tries,
			notify_before: self.notify_before.context("NOTIFY_ON_DATE_BEFORE is required")?,
			min_lead_days: self.earliest_date_shift,
			quiet_hours: self.quiet_hours()?,
			max_calendar_pages: self.calendar_max_pages,
			redact_selectors: self.redact_selectors(),
			history_path: self.history_file.clone(),
		};
		config.validate()?;
		Ok(config)
	}

	pub fn launch_options(&self) -> LaunchOptions {
		LaunchOptions {
			executable: self.chrome_path.clone(),
			headless: self.headless,
			no_sandbox: self.no_sandbox,
			..LaunchOptions::default()
		}
	}

	pub fn page_options(&self) -> PageOptions {
		PageOptions {
			user_agent: Some(self.user_agent.clone()),
			..PageOptions::default()
		}
	}

	/// Telegram when both chat id and token are set, the log otherwise.
	pub fn notifier(&self) -> Result<Arc<dyn Notifier>> {
		match (&self.tg_token, &self.tg_chat_id) {
			(Some(token), Some(chat_id)) => Ok(Arc::new(TelegramNotifier::new(token, chat_id))),
			(None, None) => Ok(Arc::new(LogNotifier::new(self.screenshot_dir.clone()))),
			_ => bail!("NOTIFY_TG_TOKEN and NOTIFY_TG_CHAT_ID must be set together"),
		}
	}
}
