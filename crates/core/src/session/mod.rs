//! Remote session capability.
//!
//! The orchestration never talks to a browser directly; it drives a
//! [`RemoteSession`] obtained from a [`SessionFactory`] once per cycle and
//! closes it at the end of that cycle.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

mod cdp;

pub use cdp::{CdpSession, CdpSessionFactory};

/// A form body posted directly, bypassing widget interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
	pub action: String,
	/// Ordered name/value pairs, urlencoded on submission.
	pub fields: Vec<(String, String)>,
}

impl FormPayload {
	pub fn new(action: impl Into<String>) -> Self {
		Self {
			action: action.into(),
			fields: Vec::new(),
		}
	}

	pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.fields.push((name.into(), value.into()));
		self
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
	}
}

/// Status and body of an HTTP exchange made from inside the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
	pub status: u16,
	/// Final URL after redirects.
	pub url: String,
	pub body: String,
}

impl FormResponse {
	pub fn is_success(&self) -> bool {
		(200..400).contains(&self.status)
	}
}

/// One exclusively-owned page on the remote site.
///
/// Every call is fallible; timeouts and missing elements surface as
/// [`RebookError::Session`](crate::RebookError::Session).
#[async_trait]
pub trait RemoteSession: Send + Sync {
	/// Loads `url` and waits for the document to finish loading.
	async fn navigate(&self, url: &str) -> Result<()>;

	/// Value of an input (or `content` of a meta tag, or text of any other
	/// element) matching `selector`; `None` when nothing matches.
	async fn read_field(&self, selector: &str) -> Result<Option<String>>;

	/// Types `value` into the input matching `selector`.
	async fn fill(&self, selector: &str, value: &str) -> Result<()>;

	/// Clicks the element and waits for any navigation it triggers.
	async fn click(&self, selector: &str) -> Result<()>;

	/// Chooses `value` in the `<select>` matching `selector`.
	async fn select(&self, selector: &str, value: &str) -> Result<()>;

	/// Evaluates a script in the page and returns its JSON value.
	async fn evaluate(&self, script: &str) -> Result<Value>;

	/// PNG capture of the current page.
	async fn screenshot(&self) -> Result<Vec<u8>>;

	/// XHR-style GET with the session's cookies.
	async fn fetch(&self, url: &str) -> Result<FormResponse>;

	/// Urlencoded POST of `payload` with the session's cookies.
	async fn submit_form(&self, payload: &FormPayload) -> Result<FormResponse>;

	/// Releases the page and its browser. Further calls fail.
	async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
	async fn open(&self) -> Result<Box<dyn RemoteSession>>;
}
