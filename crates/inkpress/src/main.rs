//! inkpress CLI - Markdown blog server.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(about = "Markdown blog server with reading-time summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to inkpress.toml config file
    #[arg(short, long, default_value = "inkpress.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config file and a first post
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Serve the blog
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Posts directory
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Open the blog in a browser
        #[arg(long)]
        open: bool,

        /// Do not reload posts when files change
        #[arg(long)]
        no_watch: bool,
    },

    /// Print plain-text summaries and reading times for Markdown files
    Summarize {
        /// Markdown files to summarize
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
        Commands::Serve {
            port,
            host,
            dir,
            open,
            no_watch,
        } => {
            let overrides = commands::serve::Overrides {
                port,
                host,
                dir,
                open,
                watch: !no_watch,
            };
            commands::serve::run(&cli.config, overrides).await?;
        }
        Commands::Summarize { files, json } => {
            commands::summarize::run(&files, json)?;
        }
    }

    Ok(())
}
