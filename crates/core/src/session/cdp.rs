//! [`RemoteSession`] backed by a headless Chromium over the DevTools protocol.

use std::time::Duration;

use async_trait::async_trait;
use rebook_runtime::{BrowserProcess, LaunchOptions, Page, PageOptions};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::debug;

use super::{FormPayload, FormResponse, RemoteSession, SessionFactory};
use crate::error::{RebookError, Result};

const XHR_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Launches one browser per [`open`](SessionFactory::open).
#[derive(Debug, Clone)]
pub struct CdpSessionFactory {
	pub launch: LaunchOptions,
	pub page: PageOptions,
	/// How long a click may take to start a navigation.
	pub settle: Duration,
}

impl CdpSessionFactory {
	pub fn new(launch: LaunchOptions, page: PageOptions) -> Self {
		Self {
			launch,
			page,
			settle: Duration::from_millis(1500),
		}
	}
}

#[async_trait]
impl SessionFactory for CdpSessionFactory {
	async fn open(&self) -> Result<Box<dyn RemoteSession>> {
		let browser = BrowserProcess::launch(&self.launch).await?;
		let page = browser.open_page(&self.page).await?;
		debug!(target = "rebook.cdp", port = browser.port(), "session opened");
		Ok(Box::new(CdpSession {
			page: Mutex::new(Some(page)),
			browser: Mutex::new(Some(browser)),
			settle: self.settle,
		}))
	}
}

pub struct CdpSession {
	page: Mutex<Option<Page>>,
	browser: Mutex<Option<BrowserProcess>>,
	settle: Duration,
}

impl CdpSession {
	async fn eval(&self, script: &str) -> Result<Value> {
		let guard = self.page.lock().await;
		let page = guard.as_ref().ok_or_else(closed)?;
		Ok(page.evaluate(script).await?)
	}

	async fn eval_response(&self, script: &str) -> Result<FormResponse> {
		let value = self.eval(script).await?;
		Ok(FormResponse {
			status: value.get("status").and_then(Value::as_u64).unwrap_or(0) as u16,
			url: value.get("url").and_then(Value::as_str).unwrap_or_default().to_string(),
			body: value.get("body").and_then(Value::as_str).unwrap_or_default().to_string(),
		})
	}
}

fn closed() -> RebookError {
	RebookError::Session("session already closed".into())
}

fn js(value: &str) -> Result<String> {
	serde_json::to_string(value).map_err(|e| RebookError::Session(format!("cannot encode script argument: {e}")))
}

#[async_trait]
impl RemoteSession for CdpSession {
	async fn navigate(&self, url: &str) -> Result<()> {
		let guard = self.page.lock().await;
		let page = guard.as_ref().ok_or_else(closed)?;
		Ok(page.goto(url).await?)
	}

	async fn read_field(&self, selector: &str) -> Result<Option<String>> {
		let script = format!(
			r#"(() => {{
				const el = document.querySelector({selector});
				if (!el) return null;
				if (el.tagName === 'META') return el.getAttribute('content');
				if (el.tagName === 'INPUT' || el.tagName === 'SELECT' || el.tagName === 'TEXTAREA') return el.value;
				return el.innerText;
			}})()"#,
			selector = js(selector)?
		);
		match self.eval(&script).await? {
			Value::Null => Ok(None),
			Value::String(s) => Ok(Some(s)),
			other => Ok(Some(other.to_string())),
		}
	}

	async fn fill(&self, selector: &str, value: &str) -> Result<()> {
		let script = format!(
			r#"(() => {{
				const el = document.querySelector({selector});
				if (!el) throw new Error('no element for ' + {selector});
				el.focus();
				el.value = {value};
				el.dispatchEvent(new Event('input', {{ bubbles: true }}));
				el.dispatchEvent(new Event('change', {{ bubbles: true }}));
				return true;
			}})()"#,
			selector = js(selector)?,
			value = js(value)?
		);
		self.eval(&script).await.map(|_| ())
	}

	async fn click(&self, selector: &str) -> Result<()> {
		let script = format!(
			r#"(() => {{
				const el = document.querySelector({selector});
				if (!el) throw new Error('no element for ' + {selector});
				el.click();
				return true;
			}})()"#,
			selector = js(selector)?
		);
		let guard = self.page.lock().await;
		let page = guard.as_ref().ok_or_else(closed)?;
		page.run_and_settle(&script, self.settle).await?;
		Ok(())
	}

	async fn select(&self, selector: &str, value: &str) -> Result<()> {
		let script = format!(
			r#"(() => {{
				const el = document.querySelector({selector});
				if (!el) throw new Error('no select for ' + {selector});
				if (![...el.options].some(o => o.value === {value})) throw new Error('no option ' + {value} + ' in ' + {selector});
				el.value = {value};
				el.dispatchEvent(new Event('change', {{ bubbles: true }}));
				return true;
			}})()"#,
			selector = js(selector)?,
			value = js(value)?
		);
		self.eval(&script).await.map(|_| ())
	}

	async fn evaluate(&self, script: &str) -> Result<Value> {
		self.eval(script).await
	}

	async fn screenshot(&self) -> Result<Vec<u8>> {
		let guard = self.page.lock().await;
		let page = guard.as_ref().ok_or_else(closed)?;
		Ok(page.screenshot().await?)
	}

	async fn fetch(&self, url: &str) -> Result<FormResponse> {
		let script = format!(
			r#"fetch({url}, {{
				credentials: 'same-origin',
				headers: {{ 'Accept': {accept}, 'X-Requested-With': 'XMLHttpRequest' }}
			}}).then(async r => ({{ status: r.status, url: r.url, body: await r.text() }}))"#,
			url = js(url)?,
			accept = js(XHR_ACCEPT)?
		);
		self.eval_response(&script).await
	}

	async fn submit_form(&self, payload: &FormPayload) -> Result<FormResponse> {
		let pairs: Vec<[&str; 2]> = payload.fields.iter().map(|(k, v)| [k.as_str(), v.as_str()]).collect();
		let script = format!(
			r#"fetch({action}, {{
				method: 'POST',
				credentials: 'same-origin',
				headers: {{ 'Content-Type': 'application/x-www-form-urlencoded' }},
				body: new URLSearchParams({pairs}).toString()
			}}).then(async r => ({{ status: r.status, url: r.url, body: await r.text() }}))"#,
			action = js(&payload.action)?,
			pairs = json!(pairs)
		);
		self.eval_response(&script).await
	}

	async fn close(&self) -> Result<()> {
		if let Some(page) = self.page.lock().await.take() {
			page.close().await;
		}
		if let Some(browser) = self.browser.lock().await.take() {
			browser.close();
		}
		Ok(())
	}
}
