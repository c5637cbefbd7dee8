use async_trait::async_trait;

use super::{AttemptTracker, RebookTarget};
use crate::error::Result;
use crate::session::RemoteSession;

/// One way of moving the booking to `target`.
///
/// A strategy returns once the site accepted the change request; whether the
/// booking actually moved is checked separately by the caller.
#[async_trait]
pub trait RebookStrategy: Send + Sync {
	fn name(&self) -> &'static str;

	async fn apply(&self, session: &dyn RemoteSession, target: &RebookTarget, tracker: &mut AttemptTracker) -> Result<()>;
}
