//! File-backed wrappers around `setlist-core` operations.
//!
//! Each command reads JSON documents from disk, runs one core pipeline, and
//! returns a serializable result. Printing is left to the binary.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use setlist_core::checklist::{expand_checklist, SetSlot};
use setlist_core::config::CompositionDefaults;
use setlist_core::flatten::{flatten, inflate, Inflated};
use setlist_core::metrics::{build_series, metric_series, MetricName, MetricSeries, WorkoutLog};
use setlist_core::prescription::{FlatRecord, Workout};
use setlist_core::reconcile::{plan_save, ReconcilePlan};
use setlist_core::session::{Applied, EditOp, EditSession};
use setlist_core::validation::validate_records;

/// Read and decode a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn flatten_file(tree: &Path) -> anyhow::Result<Vec<FlatRecord>> {
    let workout: Workout = read_json(tree)?;
    Ok(flatten(&workout))
}

pub fn inflate_file(records: &Path) -> anyhow::Result<Inflated> {
    let records: Vec<FlatRecord> = read_json(records)?;
    let inflated = inflate(&records);
    if !inflated.warnings.is_empty() {
        tracing::warn!(
            count = inflated.warnings.len(),
            "Inflated records contained circuit disagreements",
        );
    }
    Ok(inflated)
}

pub fn plan_files(previous: &Path, tree: &Path) -> anyhow::Result<ReconcilePlan> {
    let previous: Vec<FlatRecord> = read_json(previous)?;
    let workout: Workout = read_json(tree)?;
    let plan = plan_save(&previous, &workout)?;
    tracing::info!(
        create = plan.to_create.len(),
        update = plan.to_update.len(),
        delete = plan.to_delete.len(),
        "Save plan computed",
    );
    Ok(plan)
}

/// Result of replaying edit operations against a stored workout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub workout: Workout,
    pub unchanged_ops: usize,
    pub plan: ReconcilePlan,
}

/// Open `records` (or an empty workout), apply `ops` in order, and plan the save.
pub fn edit_files(
    records: Option<&Path>,
    ops: &Path,
    defaults: CompositionDefaults,
) -> anyhow::Result<EditOutcome> {
    let mut session = match records {
        Some(path) => {
            let stored: Vec<FlatRecord> = read_json(path)?;
            let (session, warnings) = EditSession::open(stored, defaults);
            if !warnings.is_empty() {
                tracing::warn!(count = warnings.len(), "Stored workout has circuit disagreements");
            }
            session
        }
        None => EditSession::new(defaults),
    };

    let ops: Vec<EditOp> = read_json(ops)?;
    let outcomes = session.apply_all(ops);
    let unchanged_ops = outcomes
        .iter()
        .filter(|o| matches!(o, Applied::Unchanged))
        .count();
    if unchanged_ops > 0 {
        tracing::info!(unchanged_ops, "Some operations did not apply");
    }

    let plan = session.plan_save()?;
    Ok(EditOutcome {
        workout: session.workout().clone(),
        unchanged_ops,
        plan,
    })
}

pub fn checklist_file(records: &Path) -> anyhow::Result<Vec<SetSlot>> {
    let records: Vec<FlatRecord> = read_json(records)?;
    validate_records(&records)?;
    Ok(expand_checklist(&records))
}

/// Metric series for a user.
///
/// A named exercise always gets one series per requested metric, empty when
/// it was never logged. Without an exercise, every logged exercise is
/// returned.
pub fn metrics_file(
    logs: &Path,
    user_id: &str,
    exercise_id: Option<&str>,
    metric: Option<&str>,
) -> anyhow::Result<Vec<MetricSeries>> {
    let logs: Vec<WorkoutLog> = read_json(logs)?;
    let metric = metric.map(str::parse::<MetricName>).transpose()?;
    let metrics = match metric {
        Some(m) => vec![m],
        None => MetricName::ALL.to_vec(),
    };

    let series = match exercise_id {
        Some(exercise_id) => metrics
            .into_iter()
            .map(|m| metric_series(&logs, user_id, exercise_id, m))
            .collect(),
        None => build_series(&logs, user_id)
            .into_iter()
            .filter(|s| metrics.contains(&s.metric))
            .collect(),
    };
    Ok(series)
}
