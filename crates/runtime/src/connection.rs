//! Request/response correlation over a DevTools websocket.
//!
//! Every command gets a sequential id and a oneshot channel parked in the
//! callback map; a background reader task resolves the channel when the
//! matching response arrives. Events have no id and are only traced.
//!
//! ```ignore
//! let conn = Connection::connect("ws://127.0.0.1:9222/devtools/page/ABC", Duration::from_secs(30)).await?;
//! let result = conn.call("Runtime.evaluate", json!({ "expression": "1 + 1" })).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rebook_protocol::{Message, Request};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::error::{DriverError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Callbacks = Arc<Mutex<HashMap<u32, oneshot::Sender<Result<Value>>>>>;

/// A live DevTools connection to one target.
pub struct Connection {
	last_id: AtomicU32,
	callbacks: Callbacks,
	sink: tokio::sync::Mutex<SplitSink<WsStream, WsMessage>>,
	reader: JoinHandle<()>,
	timeout: Duration,
}

impl Connection {
	/// Opens the websocket and starts the reader task.
	pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
		let (stream, _) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url))
			.await
			.map_err(|_| DriverError::Timeout {
				ms: timeout.as_millis() as u64,
				what: format!("websocket connect to {url}"),
			})??;
		let (sink, stream) = stream.split();
		let callbacks: Callbacks = Arc::new(Mutex::new(HashMap::new()));
		let reader = tokio::spawn(read_loop(stream, Arc::clone(&callbacks)));
		debug!(target = "rebook.cdp", %url, "connected");

		Ok(Self {
			last_id: AtomicU32::new(1),
			callbacks,
			sink: tokio::sync::Mutex::new(sink),
			reader,
			timeout,
		})
	}

	/// Sends `method` and awaits its result, bounded by the connection timeout.
	pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().insert(id, tx);

		let request = Request {
			id,
			method: method.to_string(),
			params,
		};
		let payload = serde_json::to_string(&request)?;
		trace!(target = "rebook.cdp", id, %method, "send");

		if let Err(err) = self.sink.lock().await.send(WsMessage::Text(payload.into())).await {
			self.callbacks.lock().remove(&id);
			return Err(err.into());
		}

		match tokio::time::timeout(self.timeout, rx).await {
			Ok(Ok(result)) => result,
			Ok(Err(_)) => Err(DriverError::ChannelClosed),
			Err(_) => {
				self.callbacks.lock().remove(&id);
				Err(DriverError::Timeout {
					ms: self.timeout.as_millis() as u64,
					what: method.to_string(),
				})
			}
		}
	}

	/// Number of commands still waiting for a response.
	pub fn pending(&self) -> usize {
		self.callbacks.lock().len()
	}

	/// Sends a close frame and stops the reader.
	pub async fn close(self) {
		if let Err(err) = self.sink.lock().await.close().await {
			debug!(target = "rebook.cdp", error = %err, "close frame not delivered");
		}
		self.reader.abort();
	}
}

async fn read_loop(mut stream: SplitStream<WsStream>, callbacks: Callbacks) {
	while let Some(frame) = stream.next().await {
		let text = match frame {
			Ok(WsMessage::Text(text)) => text.to_string(),
			Ok(WsMessage::Close(_)) => break,
			Ok(_) => continue,
			Err(err) => {
				warn!(target = "rebook.cdp", error = %err, "websocket read failed");
				break;
			}
		};

		match serde_json::from_str::<Message>(&text) {
			Ok(Message::Response(response)) => {
				let Some(callback) = callbacks.lock().remove(&response.id) else {
					debug!(target = "rebook.cdp", id = response.id, "response for unknown request");
					continue;
				};
				let result = match response.error {
					Some(error) => Err(DriverError::Protocol {
						code: error.code,
						message: error.message,
					}),
					None => Ok(response.result.unwrap_or(Value::Null)),
				};
				let _ = callback.send(result);
			}
			Ok(Message::Event(event)) => {
				trace!(target = "rebook.cdp", method = %event.method, "event");
			}
			Err(err) => {
				warn!(target = "rebook.cdp", error = %err, "unparseable frame");
			}
		}
	}

	// Dropping the senders wakes every waiter with ChannelClosed.
	callbacks.lock().clear();
	debug!(target = "rebook.cdp", "reader finished");
}
