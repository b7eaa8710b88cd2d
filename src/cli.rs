use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::time::Duration;

use crate::clipboard::SideChannel;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::request::Request;
use crate::server::ToolHandler;
use crate::target::TargetApp;

/// Deskprompt - drive a desktop chat app as a tool
#[derive(Parser, Debug)]
#[command(name = "deskprompt")]
#[command(version)]
#[command(about = "Expose a desktop chat application as a callable tool")]
#[command(long_about = "Deskprompt sends prompts to a desktop chat application (ChatGPT by default)
through UI automation and returns the response once it stops growing.

By default it runs a JSON-RPC tool server on stdin/stdout with a single tool
offering two operations: 'ask' and 'get_conversations'.

Quick start:
  1. Run 'deskprompt --init' to write .deskprompt.toml
  2. Grant your terminal Accessibility permission (System Settings > Privacy)
  3. Register 'deskprompt serve' as a stdio tool server in your client")]
pub struct Cli {
    /// Path to config file (defaults to .deskprompt.toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a default config file and exit
    #[arg(long)]
    pub init: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the stdio tool server (default)
    Serve,
    /// Send one prompt and print the response
    Ask {
        /// The prompt to send
        prompt: String,
        /// Conversation to continue (matched against its visible label)
        #[arg(long)]
        conversation: Option<String>,
        /// Minimum milliseconds since the previous prompt
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// List visible conversations
    Conversations,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

/// Write a default config file unless one already exists.
pub fn init_config(config_path: &str) -> anyhow::Result<()> {
    if Path::new(config_path).exists() {
        println!("Config file '{}' already exists.", config_path);
        return Ok(());
    }

    Config::default()
        .save(config_path)
        .with_context(|| format!("Failed to write config to '{}'", config_path))?;

    println!("Created {} with default settings.", config_path);
    println!("\nNext steps:");
    println!("  1. Edit {} to change the target app or timing", config_path);
    println!("  2. Run 'deskprompt ask \"hello\"' to check automation works");
    Ok(())
}

pub fn load_config(config_path: &str) -> anyhow::Result<Config> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path))?;
    config.validate()?;
    Ok(config)
}

/// Build the request for a one-shot command line call.
pub fn one_shot_request(command: &Commands) -> anyhow::Result<Option<Request>> {
    match command {
        Commands::Serve => Ok(None),
        Commands::Conversations => Ok(Some(Request::get_conversations())),
        Commands::Ask {
            prompt,
            conversation,
            delay_ms,
        } => {
            let mut request = Request::ask(prompt.as_str())?;
            if let Some(id) = conversation {
                request = request.in_conversation(id.as_str());
            }
            if let Some(ms) = delay_ms {
                request = request.with_delay(Duration::from_millis(*ms));
            }
            Ok(Some(request))
        }
    }
}

/// Run a one-shot request and print its text. Tool errors become a failing exit.
pub async fn run_one_shot<T, C>(
    handler: &ToolHandler<T, C>,
    request: &Request,
) -> anyhow::Result<()>
where
    T: TargetApp,
    C: SideChannel,
{
    let output = handler.execute(request).await;
    if output.is_error {
        return Err(anyhow!("{}", output.first_text()));
    }
    println!("{}", output.first_text());
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
