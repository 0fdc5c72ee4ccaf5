//! CLI for the sonata download orchestration core.
//!
//! Deliberately thin (spec non-goal: no CLI/HTTP surface belongs to the
//! core) -- every subcommand here is a few lines that construct or talk to
//! a `sonata_core::manager::DownloadManager`.

mod commands;
pub mod control_socket;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sonata_core::config;

use commands::{run_add, run_cancel, run_pause, run_resume, run_run, run_status, run_stop_all, AddKind};

/// Top-level CLI for the sonata download orchestration core.
#[derive(Debug, Parser)]
#[command(name = "sonata")]
#[command(about = "sonata: catalog download orchestration core", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Queue a track, album, playlist, or cross-catalog custom-playlist download.
    Add {
        #[command(subcommand)]
        kind: AddKind,
    },

    /// Run the worker pool: recovers interrupted downloads, then processes
    /// the queue until interrupted (Ctrl-C).
    Run {
        /// Override `concurrentDownloads` from the config file for this run.
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Show queue items, optionally filtered by status.
    Status {
        /// Only show items in this status (pending, downloading, completed, failed).
        #[arg(long)]
        status: Option<String>,
    },

    /// Pause an item by id. A live `sonata run` cancels the in-flight job if
    /// any; the row always reverts to pending.
    Pause {
        /// Queue item id, e.g. `track_3135556`.
        id: String,
    },

    /// Resume a paused item by id.
    Resume {
        /// Queue item id.
        id: String,
    },

    /// Cancel an item outright: stop it if active and delete its row.
    Cancel {
        /// Queue item id.
        id: String,
    },

    /// Cancel every active job and clear the entire queue.
    StopAll,

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!(?cfg, "loaded config");

        match cli.command {
            CliCommand::Add { kind } => run_add(&cfg, kind).await?,
            CliCommand::Run { jobs } => run_run(cfg, jobs).await?,
            CliCommand::Status { status } => run_status(status.as_deref()).await?,
            CliCommand::Pause { id } => run_pause(&id).await?,
            CliCommand::Resume { id } => run_resume(&id).await?,
            CliCommand::Cancel { id } => run_cancel(&id).await?,
            CliCommand::StopAll => run_stop_all().await?,
            CliCommand::Completions { shell } => {
                let mut cmd = Cli::command();
                let name = cmd.get_name().to_string();
                clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
