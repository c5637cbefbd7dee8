mod support;

use rebook::rebook::{AttemptTracker, InteractiveFormStrategy, RebookStrategy};
use rebook::{FailureReason, RebookTarget, RescheduleOutcome};
use serde_json::json;
use support::{Harness, SiteState, d, site_config};

fn open_slot() -> SiteState {
	SiteState::new(d(2026, 6, 1))
		.with_slot(d(2026, 4, 10), json!({ "available_times": ["09:00", "09:15"], "business_times": ["09:00", "09:15"] }))
		.calendar_from(2026, 3)
}

fn target() -> RebookTarget {
	RebookTarget::new(&site_config(), d(2026, 4, 10), "09:00")
}

#[tokio::test]
async fn interactive_form_moves_the_booking() {
	let harness = Harness::new(open_slot());
	let session = harness.session();
	harness.observer().login(&session).await.unwrap();

	let outcome = harness.rebooker().reschedule(&session, &target(), d(2026, 3, 1)).await.unwrap();

	assert_eq!(
		outcome,
		RescheduleOutcome::Success {
			date: d(2026, 4, 10),
			time: "09:00".into()
		}
	);
	let site = harness.site.lock();
	assert_eq!(site.active, d(2026, 4, 10));
	assert_eq!(site.calendar_advances, 1);
	assert!(site.payloads.is_empty());
	assert_eq!(site.screenshots, 1);
	assert_eq!(site.screenshot_urls, [site_config().appointment_url()]);
	// hide and restore around the capture
	assert_eq!(site.evaluations.len(), 2);
	drop(site);

	assert_eq!(harness.notifier.texts(), ["Rescheduled to 2026-04-10 09:00"]);
	assert_eq!(harness.notifier.image_count(), 1);
}

#[tokio::test]
async fn falls_back_to_direct_submission() {
	let mut state = open_slot();
	state.interactive_broken = true;
	let harness = Harness::new(state);
	let session = harness.session();
	harness.observer().login(&session).await.unwrap();

	let outcome = harness.rebooker().reschedule(&session, &target(), d(2026, 3, 1)).await.unwrap();

	assert!(outcome.is_success());
	let site = harness.site.lock();
	assert_eq!(site.payloads.len(), 1);
	assert_eq!(site.payloads[0].get("authenticity_token"), Some("csrf-abc"));
	assert_eq!(site.payloads[0].get("appointments[consulate_appointment][time]"), Some("09:00"));
	assert_eq!(site.active, d(2026, 4, 10));
}

#[tokio::test]
async fn inside_lead_time_never_touches_the_page() {
	let harness = Harness::new(open_slot());
	let session = harness.session();
	harness.observer().login(&session).await.unwrap();
	let navigations = harness.site.lock().navigations.len();

	let err = harness.rebooker().reschedule(&session, &target(), d(2026, 4, 10)).await.unwrap_err();

	assert_eq!(err.kind(), "APPLICATION_ERROR");
	assert_eq!(harness.site.lock().navigations.len(), navigations);
	assert_eq!(harness.appointment_navigations(), 0);
	assert!(harness.notifier.texts().is_empty());
}

#[tokio::test]
async fn unverified_submission_retries_once_then_fails() {
	let mut state = open_slot();
	state.interactive_books = false;
	state.direct_books = false;
	let harness = Harness::new(state);
	let session = harness.session();
	harness.observer().login(&session).await.unwrap();

	let outcome = harness.rebooker().reschedule(&session, &target(), d(2026, 3, 1)).await.unwrap();

	assert_eq!(
		outcome,
		RescheduleOutcome::Failed {
			date: d(2026, 4, 10),
			time: "09:00".into(),
			reason: FailureReason::VerificationMismatch { actual: d(2026, 6, 1) },
		}
	);
	assert_eq!(harness.site.lock().confirms, 2);
	let texts = harness.notifier.texts();
	assert_eq!(texts.len(), 2);
	assert!(texts.iter().all(|t| t.starts_with("Failed to reschedule to 2026-04-10 09:00")));
	assert_eq!(harness.notifier.image_count(), 2);
	let appointment = site_config().appointment_url();
	assert!(harness.site.lock().screenshot_urls.iter().all(|url| *url == appointment));
}

#[tokio::test]
async fn no_retry_when_the_date_is_gone() {
	let mut state = open_slot();
	state.interactive_books = false;
	state.direct_books = false;
	state.days_body = Some("[]".into());
	let harness = Harness::new(state);
	let session = harness.session();
	harness.observer().login(&session).await.unwrap();

	let outcome = harness.rebooker().reschedule(&session, &target(), d(2026, 3, 1)).await.unwrap();

	assert!(!outcome.is_success());
	assert_eq!(harness.site.lock().confirms, 1);
}

#[tokio::test]
async fn calendar_paging_is_bounded() {
	let harness = Harness::new(open_slot().calendar_from(2025, 1));
	let session = harness.session();
	harness.observer().login(&session).await.unwrap();

	let strategy = InteractiveFormStrategy::new(3);
	let mut tracker = AttemptTracker::new(1);
	let err = strategy.apply(&session, &target(), &mut tracker).await.unwrap_err();

	assert_eq!(err.kind(), "SESSION_ERROR");
	assert_eq!(harness.site.lock().calendar_advances, 3);
	assert_eq!(harness.site.lock().confirms, 0);
}
