//! Command line front end for the hubchain resolver
//!
//! Thin boundary over the two core operations: resolve a source page
//! into quality chains, or resolve a single media id into direct
//! provider links. Reports are printed as pretty JSON; the process
//! exits non-zero only when the initial page fetch fails.

use clap::{Parser, Subcommand};
use hubchain_core::{ChainConfig, ChainResolver};

#[derive(Parser)]
#[command(name = "hubchain", version, about = "Multi-hop media link resolver")]
struct Cli {
    /// Base URL of the drive host (these domains rotate)
    #[arg(long)]
    drive_host: Option<String>,

    /// Number of chains resolved concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve every quality chain on a source page
    Source {
        /// Source page URL
        url: String,
    },
    /// Resolve a media id into direct provider links
    Media {
        /// Media id, e.g. "xy12ab"
        id: String,
    },
}

impl Cli {
    fn config(&self) -> ChainConfig {
        let mut config = ChainConfig::default();
        if let Some(host) = &self.drive_host {
            config.drive_base_url = host.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.client.timeout_secs = timeout;
        }
        config
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hubchain=info")),
        )
        .init();

    let cli = Cli::parse();

    let resolver = match ChainResolver::with_config(cli.config()) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let rendered = match &cli.command {
        Command::Source { url } => resolver.resolve_source_page(url).await.map(|r| render(&r)),
        Command::Media { id } => resolver.resolve_media_id(id).await.map(|r| render(&r)),
    };

    match rendered {
        Ok(json) => {
            println!("{json}");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn render<T: serde::Serialize>(report: &T) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
}
