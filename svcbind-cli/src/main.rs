//! svcbind: manage ServiceBindings declared in a devfile
//!
//! - `add binding`: bind the devfile's workload to a service instance of the cluster
//! - `list binding` / `describe binding`: merge the devfile and cluster views
//! - `remove binding`: drop a binding from the devfile

mod asker;
mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::commands::{Commands, GlobalArgs};
use crate::config::CliConfig;

#[derive(Parser)]
#[clap(name = "svcbind", version, about = "Manage ServiceBindings between a devfile workload and cluster services")]
struct Cli {
    /// Devfile to read and update (default: ./devfile.yaml)
    #[clap(long, global = true, env = "SVCBIND_DEVFILE")]
    devfile: Option<PathBuf>,

    /// Namespace to use instead of the one of the current kubeconfig context
    #[clap(long, global = true, env = "SVCBIND_NAMESPACE")]
    namespace: Option<String>,

    /// Verbose logging on stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("❌ {e}");
        for cause in e.chain().skip(1) {
            eprintln!("   caused by: {cause}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = CliConfig::load();
    let globals = GlobalArgs {
        devfile: cli.devfile.or(config.devfile).unwrap_or_else(default_devfile),
        namespace: cli.namespace.or(config.namespace),
    };
    debug!("devfile {}", globals.devfile.display());

    commands::handle_command(cli.command, &globals).await
}

fn default_devfile() -> PathBuf {
    [".devfile.yaml", "devfile.yaml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from("devfile.yaml"))
}
