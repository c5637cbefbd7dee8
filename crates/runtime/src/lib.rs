//! Chromium process lifecycle and DevTools protocol connection.
//!
//! [`BrowserProcess`] finds and launches a Chromium-family executable with a
//! remote-debugging port and a throwaway profile; [`Page`] attaches to one of
//! its page targets and exposes the handful of primitives the watcher needs
//! (navigate, evaluate, screenshot, user-agent override).

mod browser_finder;
pub mod connection;
pub mod error;
pub mod launcher;
pub mod page;
pub mod probe;
pub mod process;

pub use connection::Connection;
pub use error::{DriverError, Result};
pub use launcher::{BrowserProcess, LaunchOptions};
pub use page::{Page, PageOptions};

/// Default per-command timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
