//! Cinefeed - movie catalog intermediary
//!
//! Serves compact, normalized movie listings from kinopoisk.dev over HTTP,
//! or runs a single listing from the command line.

use cinefeed_core::Error as CoreError;
use cinefeed_telemetry::{LogFormat, TelemetryConfig};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::net::SocketAddr;
use std::process::ExitCode;

mod commands;
mod config;
mod server;

use commands::{movies, serve};

/// Movie catalog intermediary for kinopoisk.dev
#[derive(Parser)]
#[command(name = "cinefeed")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    /// Log line format (compact, json)
    #[arg(long, global = true, env = "CINEFEED_LOG_FORMAT", default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "CINEFEED_BIND", default_value = config::DEFAULT_BIND)]
        bind: SocketAddr,

        /// Comma-separated browser origins allowed to call the API ("*" for any)
        #[arg(long, env = "ALLOWED_ORIGINS", default_value = config::ANY_ORIGIN)]
        allowed_origins: String,
    },

    /// List one page of movies for a genre
    Movies {
        /// Localized genre name, e.g. "комедия"
        genre: String,

        /// Minimum rating (0 disables the filter)
        #[arg(short, long, default_value = "0")]
        min_rating: f64,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Page size
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = if cli.verbose {
        TelemetryConfig::verbose()
    } else {
        TelemetryConfig::default()
    };
    if let Err(e) = cinefeed_telemetry::init_with_config(telemetry.with_format(cli.log_format)) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    let result = match cli.command {
        Commands::Serve { bind, allowed_origins } => serve::run(bind, &allowed_origins).await,

        Commands::Movies { genre, min_rating, page, limit } => {
            movies::run(genre, min_rating, page, limit, &cli.format).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, cli.format == "json");
            ExitCode::FAILURE
        }
    }
}

/// Print a failure, as an error report on stdout when JSON output was asked for
fn report_failure(err: &anyhow::Error, json: bool) {
    if json {
        if let Some(report) = err.downcast_ref::<CoreError>().map(CoreError::to_report) {
            if let Ok(rendered) = serde_json::to_string_pretty(&report) {
                println!("{rendered}");
                return;
            }
        }
    }
    eprintln!("{} {}", "Error:".red().bold(), err);
}
