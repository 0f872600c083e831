use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "fleetsync", version, about = "Vehicle availability sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation passes
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// System status and auto-sync settings
    Status {
        #[command(subcommand)]
        action: commands::status::StatusAction,
    },
    /// Per-field sync policy
    Policy {
        #[command(subcommand)]
        action: commands::policy::PolicyAction,
    },
    /// Audit trail queries
    Audit {
        #[command(subcommand)]
        action: commands::audit::AuditAction,
    },
    /// Run the periodic sync loop in the foreground
    Watch(commands::watch::WatchArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sync { action } => commands::sync::run(action),
        Commands::Status { action } => commands::status::run(action),
        Commands::Policy { action } => commands::policy::run(action),
        Commands::Audit { action } => commands::audit::run(action),
        Commands::Watch(args) => commands::watch::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
