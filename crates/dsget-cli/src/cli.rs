use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dsget_core::citation;
use dsget_core::config;
use dsget_core::fetch;
use dsget_core::transport::CurlTransport;
use std::path::PathBuf;

/// Top-level CLI for the dsget dataset fetcher.
#[derive(Debug, Parser)]
#[command(name = "dsget")]
#[command(about = "dsget: checksum-verified dataset downloads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the configured dataset files into a directory, verifying each
    /// against the published SHA256SUMS.txt.
    Fetch {
        /// Destination directory for the dataset files.
        dir: PathBuf,

        /// Also fetch the demo subset.
        #[arg(long)]
        demo: bool,

        /// Path to a datasets.toml (defaults to the XDG config dir).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Update a CITATION.cff with the latest published release.
    SyncCitation {
        /// Path to the CITATION.cff file.
        file: PathBuf,

        /// Repository as "owner/name".
        #[arg(long)]
        repo: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch { dir, demo, config: config_path } => {
                let cfg = config::load_or_init(config_path.as_deref())?;
                let transport = CurlTransport::new();
                let report = fetch::fetch_datasets(&dir, &cfg, demo, &transport)
                    .context("fetch run failed")?;
                if !report.is_clean() {
                    for failure in &report.failures {
                        tracing::error!(
                            "integrity failure: {} (expected {}, got {})",
                            failure.path.display(),
                            failure.expected,
                            failure.actual
                        );
                    }
                    bail!(
                        "{} file(s) failed checksum verification",
                        report.failures.len()
                    );
                }
                tracing::info!("fetched {} target(s) into {}", report.targets.len(), dir.display());
            }
            CliCommand::SyncCitation { file, repo } => {
                let transport = CurlTransport::new();
                let url = citation::latest_release_url(&repo);
                let release = citation::latest_release(&transport, &url)?;
                citation::sync_citation(&file, &release)?;
                println!("Updated: v{} ({})", release.version, release.date);
            }
        }

        Ok(())
    }
}
