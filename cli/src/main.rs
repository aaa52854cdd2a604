mod commands;
mod config;
mod page;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{cmd_add, cmd_list, cmd_stats};
use crate::config::Config;
use food_diary_core::RecordStore;

#[derive(Parser)]
#[command(
    name = "food-diary",
    version,
    about = "Track your daily food intake",
    after_help = "Meal types: breakfast, lunch, dinner, snack\nDate format: YYYY-MM-DD"
)]
struct Cli {
    /// Path to the diary data file (default: platform data directory)
    #[arg(long, global = true, env = "FOOD_DIARY_DATA", value_name = "PATH")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new food entry for today
    Add {
        /// Food name
        food_name: String,
        /// Calories (whole number, 0 or more)
        #[arg(allow_hyphen_values = true)]
        calories: String,
        /// Meal type: breakfast, lunch, dinner, snack
        meal_type: String,
        /// Optional notes; remaining words are joined with spaces
        #[arg(trailing_var_arg = true)]
        notes: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List entries for a date (defaults to today)
    List {
        /// Date to show (YYYY-MM-DD or today/yesterday/tomorrow)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show overall statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Serve { .. }));

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr. Commands stay quiet unless `RUST_LOG` says otherwise; the
/// server reports requests at info.
fn init_tracing(serving: bool) {
    let default = if serving {
        "info,tower_http=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data_file)?;
    let mut store = RecordStore::open(&config.data_file);

    match cli.command {
        Commands::Add {
            food_name,
            calories,
            meal_type,
            notes,
            json,
        } => cmd_add(&mut store, &food_name, &calories, &meal_type, &notes, json),
        Commands::List { date, json } => cmd_list(&store, date.as_deref(), json),
        Commands::Stats { json } => cmd_stats(&store, json),
        Commands::Serve { port, bind } => server::start_server(store, port, &bind).await,
    }
}
