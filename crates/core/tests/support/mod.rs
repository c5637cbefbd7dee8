//! Scripted stand-ins for the remote site, the notifier and the clock.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use parking_lot::Mutex;
use rebook::observer::LoginSelectors;
use rebook::rebook::{FormSelectors, TokenSelectors};
use rebook::{
	Clock, Credentials, EligibilityPolicy, FormPayload, FormResponse, Notifications, Notifier, PollController, QuietHours, RebookError, Rebooker,
	RedactionList, RemoteSession, Result, SessionFactory, SiteConfig, SlotObserver, WatchConfig,
};
use serde_json::{Value, json};
use tempfile::TempDir;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn site_config() -> SiteConfig {
	let mut site = SiteConfig::new("4242", "94");
	site.base_url = "https://visa.test".into();
	site
}

/// State of the fake site shared by every session it hands out.
pub struct SiteState {
	pub site: SiteConfig,
	pub active: NaiveDate,
	pub open_days: Vec<NaiveDate>,
	pub times: HashMap<NaiveDate, Value>,
	/// Replaces the days JSON body verbatim.
	pub days_body: Option<String>,
	pub login_form: bool,
	/// First month the calendar shows when opened.
	pub calendar_start: (i32, u32),
	/// The date input is missing, so the interactive flow cannot start.
	pub interactive_broken: bool,
	/// Confirming the interactive form moves the booking.
	pub interactive_books: bool,
	/// A direct form post moves the booking.
	pub direct_books: bool,
	pub direct_status: u16,
	pub csrf_token: Option<String>,

	pub navigations: Vec<String>,
	pub payloads: Vec<FormPayload>,
	pub evaluations: Vec<String>,
	pub confirms: u32,
	pub calendar_advances: u32,
	pub screenshots: u32,
	/// Page URL at the time of each screenshot.
	pub screenshot_urls: Vec<String>,
	pub opened: u32,
	pub closed: u32,
}

impl SiteState {
	pub fn new(active: NaiveDate) -> Self {
		Self {
			site: site_config(),
			active,
			open_days: Vec::new(),
			times: HashMap::new(),
			days_body: None,
			login_form: true,
			calendar_start: (active.year(), active.month()),
			interactive_broken: false,
			interactive_books: true,
			direct_books: true,
			direct_status: 200,
			csrf_token: Some("csrf-abc".into()),
			navigations: Vec::new(),
			payloads: Vec::new(),
			evaluations: Vec::new(),
			confirms: 0,
			calendar_advances: 0,
			screenshots: 0,
			screenshot_urls: Vec::new(),
			opened: 0,
			closed: 0,
		}
	}

	pub fn with_slot(mut self, date: NaiveDate, times: Value) -> Self {
		self.open_days.push(date);
		self.times.insert(date, times);
		self
	}

	pub fn calendar_from(mut self, year: i32, month: u32) -> Self {
		self.calendar_start = (year, month);
		self
	}

	fn appointment_navigations(&self) -> usize {
		self.navigations.iter().filter(|u| **u == self.site.appointment_url()).count()
	}
}

#[derive(Default)]
struct PageState {
	url: String,
	logged_in: bool,
	closed: bool,
	calendar: Option<(i32, u32)>,
	picked_day: Option<NaiveDate>,
	selected_time: Option<String>,
	submitted: bool,
}

pub struct FakeSession {
	site: Arc<Mutex<SiteState>>,
	page: Mutex<PageState>,
}

impl FakeSession {
	pub fn new(site: Arc<Mutex<SiteState>>) -> Self {
		Self {
			site,
			page: Mutex::new(PageState::default()),
		}
	}

	fn missing(selector: &str) -> RebookError {
		RebookError::Session(format!("no element for {selector}"))
	}

	fn ensure_open(&self) -> Result<()> {
		if self.page.lock().closed {
			return Err(RebookError::Session("session already closed".into()));
		}
		Ok(())
	}
}

#[async_trait]
impl RemoteSession for FakeSession {
	async fn navigate(&self, url: &str) -> Result<()> {
		self.ensure_open()?;
		let mut site = self.site.lock();
		let mut page = self.page.lock();
		site.navigations.push(url.to_string());
		let sign_in = site.site.sign_in_url();
		page.url = if url == sign_in && page.logged_in {
			site.site.account_url()
		} else if url != sign_in && !page.logged_in {
			sign_in
		} else {
			url.to_string()
		};
		page.calendar = None;
		page.picked_day = None;
		page.selected_time = None;
		page.submitted = false;
		Ok(())
	}

	async fn read_field(&self, selector: &str) -> Result<Option<String>> {
		self.ensure_open()?;
		let site = self.site.lock();
		let page = self.page.lock();
		let login = LoginSelectors::default();
		let form = FormSelectors::default();
		let tokens = TokenSelectors::default();

		if page.url == site.site.sign_in_url() && !page.logged_in && site.login_form {
			let fields = [&login.form, &login.email, &login.password, &login.policy, &login.submit];
			return Ok(fields.iter().any(|f| f.as_str() == selector).then(String::new));
		}
		if page.url == site.site.account_url() && selector == login.appointment {
			return Ok(Some(format!("Consular Appointment: {}, 08:15 Toronto local time", site.active.format("%-d %B, %Y"))));
		}
		if page.url != site.site.appointment_url() {
			return Ok(None);
		}

		if selector == form.facility {
			return Ok(Some(site.site.facility_id.clone()));
		}
		if selector == form.date_input {
			return Ok((!site.interactive_broken).then(|| page.picked_day.map(|d| d.to_string()).unwrap_or_default()));
		}
		if selector == form.next_month {
			return Ok(page.calendar.map(|_| "Next".to_string()));
		}
		if selector == form.time_select {
			return Ok(page.selected_time.clone());
		}
		if selector == form.submit {
			return Ok(Some("Reschedule".into()));
		}
		if selector == form.confirm {
			return Ok(page.submitted.then(|| "Confirm".to_string()));
		}
		if selector == tokens.csrf_meta {
			return Ok(site.csrf_token.clone());
		}
		if selector == tokens.capacity {
			return Ok(Some("true".into()));
		}
		if let Some((year, month)) = page.calendar {
			for day in &site.open_days {
				if day.year() == year && day.month() == month && selector == FormSelectors::day(*day) {
					return Ok(Some(day.day().to_string()));
				}
			}
		}
		if let Some(day) = page.picked_day {
			let times = site.times.get(&day).and_then(|v| v.get("available_times")).and_then(Value::as_array);
			for time in times.into_iter().flatten().filter_map(Value::as_str) {
				if selector == form.time_option(time) {
					return Ok(Some(time.to_string()));
				}
			}
		}
		Ok(None)
	}

	async fn fill(&self, selector: &str, _value: &str) -> Result<()> {
		self.ensure_open()?;
		if self.read_field(selector).await?.is_none() {
			return Err(Self::missing(selector));
		}
		Ok(())
	}

	async fn click(&self, selector: &str) -> Result<()> {
		if self.read_field(selector).await?.is_none() {
			return Err(Self::missing(selector));
		}
		let mut site = self.site.lock();
		let mut page = self.page.lock();
		let login = LoginSelectors::default();
		let form = FormSelectors::default();

		if selector == login.submit {
			page.logged_in = true;
			page.url = site.site.account_url();
		} else if selector == form.date_input {
			page.calendar = Some(site.calendar_start);
		} else if selector == form.next_month {
			let (year, month) = page.calendar.unwrap_or(site.calendar_start);
			page.calendar = Some(if month == 12 { (year + 1, 1) } else { (year, month + 1) });
			site.calendar_advances += 1;
		} else if selector == form.submit {
			page.submitted = true;
		} else if selector == form.confirm {
			site.confirms += 1;
			if let (true, true, Some(day)) = (page.submitted, site.interactive_books, page.picked_day) {
				site.active = day;
			}
		} else if let Some(day) = site.open_days.iter().copied().find(|d| selector == FormSelectors::day(*d)) {
			page.picked_day = Some(day);
			page.calendar = None;
		}
		Ok(())
	}

	async fn select(&self, selector: &str, value: &str) -> Result<()> {
		self.ensure_open()?;
		let form = FormSelectors::default();
		let site = self.site.lock();
		let mut page = self.page.lock();
		if page.url != site.site.appointment_url() {
			return Err(Self::missing(selector));
		}
		if selector == form.facility && value == site.site.facility_id {
			return Ok(());
		}
		if selector == form.time_select && page.picked_day.is_some() {
			page.selected_time = Some(value.to_string());
			return Ok(());
		}
		Err(RebookError::Session(format!("no option {value} in {selector}")))
	}

	async fn evaluate(&self, script: &str) -> Result<Value> {
		self.ensure_open()?;
		self.site.lock().evaluations.push(script.to_string());
		Ok(json!(0))
	}

	async fn screenshot(&self) -> Result<Vec<u8>> {
		self.ensure_open()?;
		let mut site = self.site.lock();
		site.screenshots += 1;
		site.screenshot_urls.push(self.page.lock().url.clone());
		Ok(b"\x89PNG fake".to_vec())
	}

	async fn fetch(&self, url: &str) -> Result<FormResponse> {
		self.ensure_open()?;
		let site = self.site.lock();
		let page = self.page.lock();
		let body = if !page.logged_in {
			"<html><body>Sign in</body></html>".to_string()
		} else if url == site.site.days_json_url() {
			site.days_body.clone().unwrap_or_else(|| {
				let days: Vec<Value> = site.open_days.iter().map(|d| json!({ "date": d.to_string(), "business_day": true })).collect();
				Value::Array(days).to_string()
			})
		} else if let Some((_, times)) = site.times.iter().find(|(day, _)| url == site.site.times_json_url(**day)) {
			times.to_string()
		} else {
			json!({ "available_times": [], "business_times": [] }).to_string()
		};
		Ok(FormResponse {
			status: 200,
			url: url.to_string(),
			body,
		})
	}

	async fn submit_form(&self, payload: &FormPayload) -> Result<FormResponse> {
		self.ensure_open()?;
		let mut site = self.site.lock();
		site.payloads.push(payload.clone());
		if site.direct_books && site.direct_status < 400 {
			if let Some(date) = payload.get("appointments[consulate_appointment][date]").and_then(|d| d.parse::<NaiveDate>().ok()) {
				site.active = date;
			}
		}
		Ok(FormResponse {
			status: site.direct_status,
			url: payload.action.clone(),
			body: String::new(),
		})
	}

	async fn close(&self) -> Result<()> {
		let mut page = self.page.lock();
		if !page.closed {
			page.closed = true;
			self.site.lock().closed += 1;
		}
		Ok(())
	}
}

pub struct FakeFactory {
	pub site: Arc<Mutex<SiteState>>,
}

#[async_trait]
impl SessionFactory for FakeFactory {
	async fn open(&self) -> Result<Box<dyn RemoteSession>> {
		self.site.lock().opened += 1;
		Ok(Box::new(FakeSession::new(self.site.clone())))
	}
}

#[derive(Default)]
pub struct RecordingNotifier {
	pub texts: Mutex<Vec<String>>,
	pub images: Mutex<Vec<Option<String>>>,
}

impl RecordingNotifier {
	pub fn texts(&self) -> Vec<String> {
		self.texts.lock().clone()
	}

	pub fn image_count(&self) -> usize {
		self.images.lock().len()
	}
}

#[async_trait]
impl Notifier for RecordingNotifier {
	fn id(&self) -> &'static str {
		"recording"
	}

	async fn send_text(&self, text: &str) -> Result<()> {
		self.texts.lock().push(text.to_string());
		Ok(())
	}

	async fn send_image(&self, _png: &[u8], caption: Option<&str>) -> Result<()> {
		self.images.lock().push(caption.map(String::from));
		Ok(())
	}
}

pub struct FixedClock {
	pub now: DateTime<Utc>,
}

impl FixedClock {
	pub fn at(y: i32, m: u32, day: u32, hour: u32) -> Self {
		Self {
			now: Utc.with_ymd_and_hms(y, m, day, hour, 0, 0).unwrap(),
		}
	}
}

impl Clock for FixedClock {
	fn now_utc(&self) -> DateTime<Utc> {
		self.now
	}

	fn today(&self) -> NaiveDate {
		self.now.date_naive()
	}

	fn local_hour(&self) -> u32 {
		self.now.hour()
	}
}

pub struct Harness {
	pub site: Arc<Mutex<SiteState>>,
	pub notifier: Arc<RecordingNotifier>,
	pub config: WatchConfig,
	_dir: TempDir,
}

impl Harness {
	pub fn new(state: SiteState) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let config = WatchConfig {
			poll_interval: Duration::from_secs(15 * 60),
			max_tries: 2,
			notify_before: d(2026, 5, 1),
			min_lead_days: 1,
			quiet_hours: None,
			max_calendar_pages: 12,
			redact_selectors: vec![".consular-appt strong".into()],
			history_path: dir.path().join("dates.csv"),
		};
		Self {
			site: Arc::new(Mutex::new(state)),
			notifier: Arc::new(RecordingNotifier::default()),
			config,
			_dir: dir,
		}
	}

	pub fn history_path(&self) -> PathBuf {
		self.config.history_path.clone()
	}

	pub fn session(&self) -> FakeSession {
		FakeSession::new(self.site.clone())
	}

	pub fn observer(&self) -> SlotObserver {
		SlotObserver::new(
			site_config(),
			Credentials {
				email: "me@example.com".into(),
				password: "secret".into(),
			},
		)
	}

	pub fn notifications(&self) -> Notifications {
		Notifications::new(self.notifier.clone())
	}

	pub fn policy(&self) -> EligibilityPolicy {
		EligibilityPolicy::new(self.config.min_lead_days, self.config.notify_before)
	}

	pub fn rebooker(&self) -> Rebooker {
		Rebooker::with_default_strategies(
			self.config.max_calendar_pages,
			self.observer(),
			self.policy(),
			RedactionList::new(self.config.redact_selectors.clone()),
			self.notifications(),
		)
	}

	pub fn controller(&self, clock: FixedClock) -> PollController {
		PollController::new(
			Arc::new(FakeFactory { site: self.site.clone() }),
			self.observer(),
			self.rebooker(),
			self.notifications(),
			Arc::new(clock),
			self.config.clone(),
		)
	}

	pub fn with_quiet_hours(mut self, sleep_hour: u32, wakeup_hour: u32) -> Self {
		self.config.quiet_hours = Some(QuietHours { sleep_hour, wakeup_hour });
		self
	}

	pub fn appointment_navigations(&self) -> usize {
		self.site.lock().appointment_navigations()
	}
}
