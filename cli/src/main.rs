use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod util;

use commands::campaign::CampaignCommands;
use commands::tasks::TaskCommands;
use util::ProxyTarget;

#[derive(Parser)]
#[command(
    name = "crowdgate",
    version,
    about = "Crowdgate CLI: review marketplace tasks and steer campaigns through the proxy"
)]
struct Cli {
    /// Proxy base URL
    #[arg(long, env = "CROWDGATE_PROXY_URL", default_value = "http://localhost:3001")]
    proxy_url: String,

    /// Marketplace API key, sent as x-api-key (the proxy's default is used when omitted)
    #[arg(long, env = "CROWDGATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy health
    Health,
    /// Task operations
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Campaign lifecycle and updates
    Campaign {
        #[command(subcommand)]
        command: CampaignCommands,
    },
    /// Show how status filters translate to marketplace statuses (offline)
    StatusMap {
        /// Token to translate; omit to print the full table
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr so stdout stays pipeable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let target = ProxyTarget {
        base_url: cli.proxy_url,
        api_key: cli.api_key.filter(|k| !k.trim().is_empty()),
    };

    let code = match cli.command {
        Commands::Health => commands::health::run(&target).await,
        Commands::Tasks { command } => commands::tasks::run(&target, command).await,
        Commands::Campaign { command } => commands::campaign::run(&target, command).await,
        Commands::StatusMap { token } => commands::status_map::run(token.as_deref()),
    };

    std::process::exit(code);
}
