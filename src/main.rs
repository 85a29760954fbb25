use clap::Parser;
use cookmate_lib::bootstrap::{configured_log_dir, init_tracing_subscriber, resolve_config};
use cookmate_lib::cli::{self, Cli};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    let config = resolve_config(args.config.as_deref())?;
    init_tracing_subscriber(configured_log_dir(&config))?;

    let result = cli::run(args.command, &config).await;
    if let Err(err) = &result {
        error!("command failed: {err:#}");
    }
    result
}
