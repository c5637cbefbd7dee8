use std::sync::Arc;

use anyhow::Result;
use rebook::{CdpSessionFactory, EligibilityPolicy, Notifications, PollController, RedactionList, Rebooker, SlotObserver, SystemClock};
use tracing::{info, warn};

use crate::settings::Settings;

/// Wires the browser-backed session, the configured channel and the system
/// clock into a controller.
pub(crate) fn controller(settings: &Settings) -> Result<PollController> {
	let site = settings.site()?;
	let credentials = settings.credentials()?;
	let config = settings.watch_config()?;
	let notifications = Notifications::new(settings.notifier()?);

	let observer = SlotObserver::new(site, credentials);
	let policy = EligibilityPolicy::new(config.min_lead_days, config.notify_before);
	let rebooker = Rebooker::with_default_strategies(
		config.max_calendar_pages,
		observer.clone(),
		policy,
		RedactionList::new(config.redact_selectors.clone()),
		notifications.clone(),
	);
	let factory = Arc::new(CdpSessionFactory::new(settings.launch_options(), settings.page_options()));
	Ok(PollController::new(factory, observer, rebooker, notifications, Arc::new(SystemClock), config))
}

pub async fn execute(settings: &Settings) -> Result<()> {
	let mut controller = controller(settings)?;
	tokio::select! {
		summary = controller.run() => {
			info!(
				target = "rebook",
				cycles = summary.cycles,
				rescheduled = summary.rescheduled,
				failed = summary.failed_reschedules,
				errors = summary.errors,
				"finished"
			);
		}
		_ = tokio::signal::ctrl_c() => {
			warn!(target = "rebook", "interrupted, stopping");
		}
	}
	Ok(())
}
