//! Wire types for the Chrome DevTools Protocol.
//!
//! This crate contains the serde-serializable types exchanged with a
//! Chromium page target over its debugging websocket. Only the domains the
//! watcher actually drives are modelled: `Page`, `Runtime` and `Network`,
//! plus the HTTP discovery endpoints (`/json/version`, `/json/list`).
//!
//! Types in this crate are pure data. Connection handling lives in
//! `rebook-runtime`.

pub mod message;
pub mod page;
pub mod runtime;
pub mod target;

pub use message::*;
pub use page::*;
pub use runtime::*;
pub use target::*;
