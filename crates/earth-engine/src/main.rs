//! Command-line access to the Earth Engine helpers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use earth_engine::{default_credentials_path, mask_clouds, read_image, write_image, CredentialsBackend, Session};

#[derive(Parser, Debug)]
#[command(name = "ee-helper")]
#[command(about = "Earth Engine authentication and cloud masking")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true, env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a session, refreshing credentials once if needed
    Auth {
        /// Cloud project id
        #[arg(long, env = "EE_PROJECT")]
        project: String,

        /// Credentials file (default: ~/.config/earthengine/credentials)
        #[arg(long)]
        credentials: Option<PathBuf>,
    },

    /// Mask QA60 clouds and scale to reflectance
    MaskClouds {
        #[arg(long)]
        input: PathBuf,

        /// 1-based index of the QA60 band
        #[arg(long)]
        qa_band: usize,

        #[arg(long)]
        output: PathBuf,
    },
}

/// `RUST_LOG` directives, falling back to `--log-level`.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

fn main() -> Result<()> {
    let args = Args::parse();

    fmt()
        .with_env_filter(env_filter(&args.log_level))
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    match args.command {
        Command::Auth { project, credentials } => {
            let path = credentials
                .or_else(default_credentials_path)
                .context("HOME is not set; pass --credentials")?;
            let mut session = Session::new(CredentialsBackend::new(path));
            session
                .authenticate(&project)
                .with_context(|| format!("Could not start a session for project '{}'", project))?;
            info!(project = %project, "Authenticated");
        }
        Command::MaskClouds { input, qa_band, output } => {
            let image = read_image(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let masked = mask_clouds(&image, qa_band)?;
            write_image(&output, &masked).with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                input = %input.display(),
                output = %output.display(),
                bands = masked.band_count(),
                "Wrote cloud-masked image"
            );
        }
    }

    Ok(())
}
