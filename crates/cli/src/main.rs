use clap::Parser;
use rebook_cli::{cli::Cli, commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	dotenv::dotenv().ok();
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli.command, cli.settings).await {
		error!(target = "rebook", error = format!("{err:#}"), "command failed");
		std::process::exit(1);
	}
}
