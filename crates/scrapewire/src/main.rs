//! scrapewire launcher.
//!
//! Operator-facing utilities around the scrape-job relation interface:
//! render a captured job request exactly the way a consumer would, and
//! inspect a databag snapshot to see which entries a consumer would accept.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use scrapewire_logging::{init_logging, LogConfig};

mod cli;

#[derive(Parser, Debug)]
#[command(name = "scrapewire", about = "Scrape-job relation interface tools")]
struct Cli {
    /// Mirror full log output onto stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a job request file to its canonical config fragment
    Render {
        /// Path to a JSON job request (the databag entry format)
        request: PathBuf,

        /// Request id to append to the job name (random v4 UUID if omitted)
        #[arg(long)]
        request_id: Option<String>,

        /// Replacement path for ca_file fields
        #[arg(long)]
        ca_file: Option<PathBuf>,

        /// Replacement path for cert_file fields (requires --key-file)
        #[arg(long, requires = "key_file")]
        cert_file: Option<PathBuf>,

        /// Replacement path for key_file fields (requires --cert-file)
        #[arg(long, requires = "cert_file")]
        key_file: Option<PathBuf>,

        /// Print the change-detection fingerprint instead of the fragment
        #[arg(long)]
        fingerprint: bool,
    },

    /// List the jobs a consumer would accept from a databag snapshot
    Inspect {
        /// Path to a JSON object mapping databag keys to entries
        databag: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_logging(LogConfig {
        app_name: "scrapewire",
        verbose: args.verbose,
    }) {
        eprintln!("Failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    let result: Result<()> = match args.command {
        Command::Render {
            request,
            request_id,
            ca_file,
            cert_file,
            key_file,
            fingerprint,
        } => cli::render_request(
            &request,
            request_id,
            scrapewire_protocol::RenderPaths {
                ca_file,
                cert_file,
                key_file,
            },
            fingerprint,
        ),
        Command::Inspect { databag } => cli::inspect_databag(&databag),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
