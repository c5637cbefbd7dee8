//! Bounded linear search over a paginated remote resource.

use async_trait::async_trait;

use crate::error::{RebookError, Result};

#[async_trait]
pub trait Paginated: Send {
	/// Whether the wanted item is on the current page.
	async fn probe(&mut self) -> Result<bool>;

	/// Moves to the next page.
	async fn advance(&mut self) -> Result<()>;
}

/// Probes, advancing at most `max_advances` times. Returns the number of
/// advances taken; running past the bound is a [`RebookError::Session`].
pub async fn search<P: Paginated + ?Sized>(pages: &mut P, max_advances: u32) -> Result<u32> {
	let mut advances = 0;
	loop {
		if pages.probe().await? {
			return Ok(advances);
		}
		if advances >= max_advances {
			return Err(RebookError::Session(format!("item not found after paging forward {max_advances} times")));
		}
		pages.advance().await?;
		advances += 1;
	}
}
