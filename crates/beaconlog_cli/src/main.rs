//! Beaconlog CLI
//!
//! Runs the beacon server and inspects its log.
//!
//! # Commands
//!
//! - `serve` - Serve the tracking pixel and the retrieval endpoints
//! - `inspect` - Display log statistics
//! - `verify` - Check that every record parses with eight fields
//! - `dump` - Print the log as a table

mod commands;

use clap::{Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Tracking-pixel server and observation log tools.
#[derive(Parser)]
#[command(name = "beaconlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the observation log
    #[arg(global = true, short, long, env = "BEACONLOG_DATA", default_value = "requests.csv")]
    data: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tracking pixel and the retrieval endpoints
    Serve {
        /// Address to listen on
        #[arg(long, env = "BEACONLOG_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Path of the pixel image (created if missing)
        #[arg(long, env = "BEACONLOG_PIXEL", default_value = "pixel.png")]
        pixel: PathBuf,

        /// Shared key for /download-data and /view-data
        #[arg(long, env = "BEACONLOG_ACCESS_KEY", hide_env_values = true)]
        access_key: Option<String>,
    },

    /// Display log statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check that the log parses and every record has eight fields
    Verify {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the log as a table
    Dump {
        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            pixel,
            access_key,
        } => {
            let bind_addr = SocketAddr::new(host, port);
            commands::serve::run(bind_addr, &cli.data, &pixel, access_key)?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&cli.data, &format)?;
        }
        Commands::Verify { format } => {
            commands::verify::run(&cli.data, &format)?;
        }
        Commands::Dump { limit } => {
            commands::dump::run(&cli.data, limit)?;
        }
        Commands::Version => {
            println!("beaconlog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("beaconlog core v{}", beaconlog_core::VERSION);
        }
    }

    Ok(())
}
