use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `-v` when set.
pub fn init_logging(verbose: u8) {
	let default = match verbose {
		0 => "warn,rebook=info",
		1 => "info,rebook=debug",
		_ => "debug,rebook=trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
