//! Browser process launch and teardown.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use rebook_protocol::VersionInfo;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::browser_finder::find_browser;
use crate::error::{DriverError, Result};
use crate::page::{Page, PageOptions};
use crate::probe;
use crate::process::{free_port, port_available};

#[derive(Debug, Clone)]
pub struct LaunchOptions {
	/// Explicit browser binary; discovered when `None`.
	pub executable: Option<PathBuf>,
	pub headless: bool,
	/// Debugging port; a free one is picked when `None`.
	pub port: Option<u16>,
	/// Pass `--no-sandbox` (needed in most containers).
	pub no_sandbox: bool,
	pub extra_args: Vec<String>,
	/// Probes of `/json/version` before giving up on a fresh process.
	pub startup_attempts: u32,
}

impl Default for LaunchOptions {
	fn default() -> Self {
		Self {
			executable: None,
			headless: true,
			port: None,
			no_sandbox: false,
			extra_args: Vec::new(),
			startup_attempts: 25,
		}
	}
}

/// A running browser with remote debugging enabled.
///
/// The process is killed and its throwaway profile removed on [`close`](Self::close)
/// or drop.
pub struct BrowserProcess {
	child: Child,
	port: u16,
	version: VersionInfo,
	_profile: TempDir,
}

impl BrowserProcess {
	pub async fn launch(options: &LaunchOptions) -> Result<Self> {
		let executable = find_browser(options.executable.as_deref()).ok_or_else(|| {
			DriverError::Launch("could not find a Chromium-family executable; install Chromium or set the browser path explicitly".into())
		})?;

		let port = match options.port {
			Some(port) if !port_available(port) => {
				return Err(DriverError::Launch(format!("debugging port {port} is already in use")));
			}
			Some(port) => port,
			None => free_port()?,
		};

		let profile = tempfile::Builder::new().prefix("rebook-profile-").tempdir()?;
		let mut args = vec![
			format!("--remote-debugging-port={port}"),
			format!("--user-data-dir={}", profile.path().display()),
			"--no-first-run".to_string(),
			"--no-default-browser-check".to_string(),
			"--disable-blink-features=AutomationControlled".to_string(),
		];
		if options.headless {
			args.push("--headless=new".to_string());
		}
		if options.no_sandbox {
			args.push("--no-sandbox".to_string());
			args.push("--disable-setuid-sandbox".to_string());
		}
		args.extend(options.extra_args.iter().cloned());

		let mut cmd = Command::new(&executable);
		cmd.args(&args).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
		#[cfg(unix)]
		std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

		let mut child = cmd
			.spawn()
			.map_err(|e| DriverError::Launch(format!("failed to start {}: {e}", executable.display())))?;
		debug!(target = "rebook.cdp", executable = %executable.display(), port, pid = child.id(), "browser spawned");

		let mut last_error = "endpoint not reachable".to_string();
		for _ in 0..options.startup_attempts.max(1) {
			tokio::time::sleep(Duration::from_millis(200)).await;

			if let Ok(Some(status)) = child.try_wait() {
				return Err(DriverError::Launch(format!("browser exited before the debugging endpoint came up (status: {status})")));
			}

			match probe::fetch_version(port).await {
				Ok(version) => {
					info!(target = "rebook.cdp", port, browser = version.browser.as_deref().unwrap_or("unknown"), "browser ready");
					return Ok(Self {
						child,
						port,
						version,
						_profile: profile,
					});
				}
				Err(err) => last_error = err.to_string(),
			}
		}

		let _ = child.kill();
		let _ = child.wait();
		Err(DriverError::Launch(format!("debugging endpoint on port {port} never became available: {last_error}")))
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn version(&self) -> &VersionInfo {
		&self.version
	}

	/// Attaches to the browser's page target.
	pub async fn open_page(&self, options: &PageOptions) -> Result<Page> {
		let target = probe::page_target(self.port).await?;
		let ws_url = target
			.web_socket_debugger_url
			.ok_or_else(|| DriverError::Probe(format!("target {} has no websocket url", target.id)))?;
		Page::attach(&ws_url, options).await
	}

	pub fn close(mut self) {
		self.terminate();
	}

	fn terminate(&mut self) {
		match self.child.try_wait() {
			Ok(Some(_)) => {}
			_ => {
				if let Err(err) = self.child.kill() {
					warn!(target = "rebook.cdp", pid = self.child.id(), error = %err, "failed to kill browser");
				}
				let _ = self.child.wait();
			}
		}
	}
}

impl Drop for BrowserProcess {
	fn drop(&mut self) {
		self.terminate();
	}
}
