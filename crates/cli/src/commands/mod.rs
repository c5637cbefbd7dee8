use anyhow::Result;

use crate::cli::Commands;
use crate::settings::Settings;

pub mod check;
pub mod summary;
pub mod watch;

pub async fn dispatch(command: Commands, settings: Settings) -> Result<()> {
	match command {
		Commands::Watch => watch::execute(&settings).await,
		Commands::Check => check::execute(&settings).await,
		Commands::Summary { date, no_notify } => summary::execute(&settings, date, no_notify).await,
	}
}
