//! Monitor-and-rebook orchestration.
//!
//! The crate watches a scheduling site for an appointment slot earlier than
//! the one already held and, when a qualifying slot appears, moves the booking
//! to it. The moving parts, leaves first:
//!
//! * [`session::RemoteSession`] / [`notify::Notifier`]: the remote automation
//!   and notification capabilities, consumed through traits.
//! * [`observer::SlotObserver`]: reads the active booking and the open slots.
//! * [`eligibility`]: the pure decision whether a slot is worth acting on.
//! * [`rebook::Rebooker`]: the two-strategy rebooking protocol with mandatory
//!   verification.
//! * [`controller::PollController`]: the indefinite poll loop with try budget,
//!   quiet hours and failure isolation.

pub mod clock;
pub mod config;
pub mod controller;
pub mod date;
pub mod eligibility;
pub mod error;
pub mod history;
pub mod notify;
pub mod observer;
pub mod rebook;
pub mod redact;
pub mod session;
pub mod summary;

pub use clock::{Clock, SystemClock};
pub use config::{Credentials, QuietHours, SiteConfig, WatchConfig};
pub use controller::{ControllerState, CycleOutcome, Observation, PollController, RunSummary};
pub use date::{AvailableSlot, BookingDate, CandidateTimes};
pub use eligibility::{EligibilityPolicy, Ineligible, is_eligible};
pub use error::{RebookError, Result};
pub use history::{HistoryLog, HistoryRecord};
pub use notify::{LogNotifier, Notifications, Notifier, TelegramNotifier};
pub use observer::{LoginSelectors, SlotObserver};
pub use rebook::{
	DirectSubmitStrategy, FailureReason, InteractiveFormStrategy, RebookState, RebookStrategy, RebookTarget, Rebooker, RescheduleOutcome,
};
pub use redact::RedactionList;
pub use session::{CdpSession, CdpSessionFactory, FormPayload, FormResponse, RemoteSession, SessionFactory};
pub use summary::{ClosestDates, closest_dates};
