use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
	#[error("browser launch failed: {0}")]
	Launch(String),

	#[error("debugging endpoint unavailable: {0}")]
	Probe(String),

	#[error("websocket transport error: {0}")]
	Transport(String),

	#[error("protocol error {code}: {message}")]
	Protocol { code: i64, message: String },

	#[error("script error: {0}")]
	Script(String),

	#[error("navigation to {url} failed: {reason}")]
	Navigation { url: String, reason: String },

	#[error("timed out after {ms}ms waiting for {what}")]
	Timeout { ms: u64, what: String },

	#[error("connection closed")]
	ChannelClosed,

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl DriverError {
	pub fn is_timeout(&self) -> bool {
		matches!(self, DriverError::Timeout { .. })
	}
}

impl From<tokio_tungstenite::tungstenite::Error> for DriverError {
	fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
		DriverError::Transport(err.to_string())
	}
}

impl From<reqwest::Error> for DriverError {
	fn from(err: reqwest::Error) -> Self {
		DriverError::Probe(err.to_string())
	}
}
