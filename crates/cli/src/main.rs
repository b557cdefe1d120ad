//! `setlist` -- command-line front end for workout composition data.
//!
//! Reads JSON documents, runs one `setlist-core` pipeline, and prints the
//! result as pretty JSON on stdout. Logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable                     | Default | Description                          |
//! |------------------------------|---------|--------------------------------------|
//! | `RUST_LOG`                   | `setlist_cli=info,setlist_core=info` | Log filter |
//! | `SETLIST_DEFAULT_SETS`       | `3`     | Sets for newly added exercises       |
//! | `SETLIST_DEFAULT_REST_SECS`  | `60`    | Rest for newly added exercises       |
//! | `SETLIST_DEFAULT_REPS`       | `10`    | Reps for newly added exercises       |
//! | `SETLIST_CIRCUIT_ROUNDS`     | `3`     | Rounds for newly created circuits    |
//! | `SETLIST_CIRCUIT_REST_SECS`  | `60`    | Rest between circuit rounds          |

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use setlist_cli::commands;
use setlist_core::config::CompositionDefaults;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for setlist
#[derive(Parser, Debug)]
#[command(name = "setlist")]
#[command(about = "Compose, reconcile and analyse workout plans")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a workout tree into persisted records
    Flatten {
        /// Workout tree JSON
        tree: PathBuf,
    },
    /// Rebuild a workout tree from persisted records
    Inflate {
        /// Flat records JSON
        records: PathBuf,
    },
    /// Validate an edited tree and plan creates/updates/deletes
    Plan {
        /// Previously persisted records JSON
        previous: PathBuf,
        /// Edited workout tree JSON
        tree: PathBuf,
    },
    /// Apply edit operations to stored records and plan the save
    Edit {
        /// Edit operations JSON (array)
        ops: PathBuf,
        /// Stored records JSON; omit to start from an empty workout
        #[arg(long)]
        records: Option<PathBuf>,
    },
    /// Expand records into the per-set logging checklist
    Checklist {
        /// Flat records JSON
        records: PathBuf,
    },
    /// Compute load-over-time series from historical logs
    Metrics {
        /// Workout logs JSON
        logs: PathBuf,
        /// User whose logs to aggregate
        #[arg(long, env = "SETLIST_USER")]
        user: String,
        /// Restrict to one exercise
        #[arg(long)]
        exercise: Option<String>,
        /// volumeLoad, volumeLoadMetric, timeLoad or timeLoadMetric
        #[arg(long)]
        metric: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setlist_cli=info,setlist_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let defaults = CompositionDefaults::from_env();
    tracing::debug!(?defaults, "Loaded composition defaults");

    match args.command {
        Command::Flatten { tree } => print_json(&commands::flatten_file(&tree)?),
        Command::Inflate { records } => print_json(&commands::inflate_file(&records)?),
        Command::Plan { previous, tree } => print_json(&commands::plan_files(&previous, &tree)?),
        Command::Edit { ops, records } => {
            print_json(&commands::edit_files(records.as_deref(), &ops, defaults)?)
        }
        Command::Checklist { records } => print_json(&commands::checklist_file(&records)?),
        Command::Metrics {
            logs,
            user,
            exercise,
            metric,
        } => print_json(&commands::metrics_file(
            &logs,
            &user,
            exercise.as_deref(),
            metric.as_deref(),
        )?),
    }
}
