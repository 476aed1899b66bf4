//! plannet - Provider directory export CLI
//!
//! Pulls organizations and the networks of their practitioner roles from a
//! Da Vinci PDex Plan-Net FHIR directory into CSV files.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "plannet")]
#[command(about = "Export provider directory organizations and networks to CSV")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./plannet.toml or ~/.config/plannet/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// FHIR base URL searches are built on
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory for the CSV files
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// What to do when a page fails or an entry is malformed
    #[arg(long, global = true, value_enum)]
    on_error: Option<OnErrorArg>,

    /// Stop each search after this many pages
    #[arg(long, global = true)]
    max_pages: Option<NonZeroUsize>,

    /// Request timeout in seconds (0 = none)
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum OnErrorArg {
    /// Log the failure, keep what was collected
    Partial,
    /// Fail the export without writing a file
    Abort,
}

impl From<OnErrorArg> for plannet_core::OnError {
    fn from(arg: OnErrorArg) -> Self {
        match arg {
            OnErrorArg::Partial => plannet_core::OnError::Partial,
            OnErrorArg::Abort => plannet_core::OnError::Abort,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Export organizations matching a name search
    Organizations(cmd::organizations::OrganizationsArgs),
    /// Export networks of an organization's practitioner roles
    Networks(cmd::networks::NetworksArgs),
    /// Export organizations, then the networks of every organization found
    Run(cmd::run::RunArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(plannet_core::ProgressContext::new());
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    plannet_core::init_logging(cli.debug, multi);

    let file_config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    // Config file defaults, CLI overrides
    let mut http = file_config.http;
    if let Some(timeout) = cli.timeout {
        http.timeout_secs = timeout;
    }
    plannet_core::set_http_config(http.to_http_config());

    let mut settings = file_config.directory_config();
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(dir) = cli.output_dir {
        settings.output_dir = dir;
    }
    if let Some(on_error) = cli.on_error {
        settings.on_error = on_error.into();
    }
    if cli.max_pages.is_some() {
        settings.max_pages = cli.max_pages;
    }

    match cli.command {
        Command::Organizations(args) => cmd::organizations::run(args, &settings, &progress),
        Command::Networks(args) => cmd::networks::run(args, &settings, &progress),
        Command::Run(args) => cmd::run::run(args, &settings, &progress),
        Command::Config => {
            let http = plannet_core::http_config();
            let timeout = http
                .timeout
                .map_or("none".to_string(), |t| format!("{}s", t.as_secs()));
            cmd::print_summary(
                "Setting",
                &[
                    ("Base URL", settings.base_url.clone()),
                    ("Accept", settings.accept.clone()),
                    (
                        "Organizations file",
                        settings.organizations_path().display().to_string(),
                    ),
                    (
                        "Networks file",
                        settings.networks_path().display().to_string(),
                    ),
                    ("On error", settings.on_error.to_string()),
                    (
                        "Max pages",
                        settings
                            .max_pages
                            .map_or("unlimited".to_string(), |n| n.to_string()),
                    ),
                    ("Timeout", timeout),
                    (
                        "Connect timeout",
                        format!("{}s", http.connect_timeout.as_secs()),
                    ),
                ],
            );
            Ok(())
        }
    }
}
