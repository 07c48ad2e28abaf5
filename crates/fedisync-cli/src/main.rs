use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fedisync_cli::cli::{run, CliCommand, CliConfig};
use fedisync_cli::tracing_setup::init_tracing;

#[derive(Parser)]
#[command(name = "fedisync")]
#[command(about = "Inspect the fedisync timeline cache and notification digests")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Debug logging on stderr
    #[arg(long, short)]
    verbose: bool,

    /// Path to JSON config file (dataDir, maxCacheItems)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Data directory, overrides the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Number of cached items for a session
    Count {
        /// Session key (account handle)
        session: String,
    },

    /// Delete the cached items of a session
    Clear {
        /// Session key (account handle)
        session: String,
    },

    /// Show the last-seen cursor, or overwrite it with --set
    LastSeen {
        /// Session key (account handle)
        session: String,
        /// Comma-separated ids, newest first
        #[arg(long, value_delimiter = ',')]
        set: Option<Vec<String>>,
    },

    /// Print the cached statuses of a session, newest first
    Dump {
        /// Session key (account handle)
        session: String,
    },

    /// Consolidate a JSON array of notifications into digest rows
    Consolidate {
        /// File containing the notifications
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => match CliConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        },
        None => CliConfig::default(),
    };
    let config = file_config.core_config(cli.data_dir.as_deref());

    let command = match cli.command {
        Commands::Count { session } => CliCommand::Count { session },
        Commands::Clear { session } => CliCommand::Clear { session },
        Commands::LastSeen { session, set } => CliCommand::LastSeen { session, set },
        Commands::Dump { session } => CliCommand::Dump { session },
        Commands::Consolidate { file } => CliCommand::Consolidate { file },
    };

    match run(command, &config) {
        Ok(value) => {
            let output = if cli.pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };
            match output {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
