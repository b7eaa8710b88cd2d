use clap::Parser;
use tracing::info;

use deskprompt::cli::{self, Cli};
use deskprompt::clipboard::SystemClipboard;
use deskprompt::orchestrator::Orchestrator;
use deskprompt::server::{self, ToolHandler};
use deskprompt::target::OsaScriptApp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON-RPC stream, so logs go to stderr
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.init {
        return cli::init_config(&cli.config);
    }

    let config = cli::load_config(&cli.config)?;
    let target = OsaScriptApp::new(&config.target.app_name, &config.target.osascript);
    let orchestrator = Orchestrator::new(target, SystemClipboard, config.orchestrator_settings());
    let handler = ToolHandler::new(orchestrator, env!("CARGO_PKG_VERSION"));

    match cli::one_shot_request(&cli.command())? {
        Some(request) => cli::run_one_shot(&handler, &request).await,
        None => {
            info!(app = %config.target.app_name, "serving tool on stdio");
            server::serve_stdio(&handler).await?;
            Ok(())
        }
    }
}
