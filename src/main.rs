use anyhow::{Context, Result};
use catfeed::{export, ui, Config, CuriousCatFetcher, ProfileSource};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catfeed")]
#[command(about = "Read public CuriousCat profile feeds in the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/catfeed/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse a profile feed interactively (default)
    Tui {
        /// Profile to pre-fill in the username field
        username: Option<String>,
    },
    /// Render a profile feed to a standalone HTML page
    Html {
        username: String,

        /// Start below this timestamp instead of at the newest post
        #[arg(long)]
        max_timestamp: Option<i64>,

        /// Number of pages to fetch, following the "load more" cursor
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(config: &Config, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log_level filter")?;

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let source: Arc<dyn ProfileSource> = Arc::new(CuriousCatFetcher::new(
        config.endpoint.clone(),
        &config.user_agent,
    ));

    match cli.command.unwrap_or(Commands::Tui { username: None }) {
        Commands::Tui { username } => {
            // stderr belongs to the alternate screen
            let log_file = config.log_file();
            init_logging(&config, Some(log_file.as_path()))?;
            ui::app::run(&config, source, username).await
        }
        Commands::Html {
            username,
            max_timestamp,
            pages,
            output,
        } => {
            init_logging(&config, None)?;
            let page =
                export::render_pages(&config, source, &username, max_timestamp, pages).await;
            match output {
                Some(path) => std::fs::write(&path, page)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", page),
            }
            Ok(())
        }
    }
}
