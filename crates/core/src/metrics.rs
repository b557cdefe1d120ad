//! Load-over-time metrics derived from historical set logs.
//!
//! Four metrics are computed per exercise per session:
//!
//! | Metric             | Per-set term                 | Unit |
//! |--------------------|------------------------------|------|
//! | `volumeLoad`       | `actualReps x load`          | lb   |
//! | `volumeLoadMetric` | `actualReps x load`          | kg   |
//! | `timeLoad`         | `time x load`                | lb   |
//! | `timeLoadMetric`   | `time x load`                | kg   |
//!
//! Loads recorded in the other unit are converted with [`KG_TO_LB`] /
//! [`LB_TO_KG`]. A set with no load, or a bodyweight set, contributes the
//! bare reps (or time). A set with neither reps nor a prescribed time
//! contributes zero.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prescription::{LogEntry, WeightUnit};
use crate::types::{ExerciseId, GroupId, Secs, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Conversion constants
// ---------------------------------------------------------------------------

/// Pounds per kilogram, as used by historical metrics.
pub const KG_TO_LB: f64 = 2.2;
/// Kilograms per pound, as used by historical metrics.
///
/// Not the exact reciprocal of [`KG_TO_LB`]; stored series depend on both
/// literal values.
pub const LB_TO_KG: f64 = 0.45;

// ---------------------------------------------------------------------------
// Metric names
// ---------------------------------------------------------------------------

/// The closed set of derived metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricName {
    VolumeLoad,
    VolumeLoadMetric,
    TimeLoad,
    TimeLoadMetric,
}

impl MetricName {
    pub const ALL: [MetricName; 4] = [
        Self::VolumeLoad,
        Self::VolumeLoadMetric,
        Self::TimeLoad,
        Self::TimeLoadMetric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VolumeLoad => "volumeLoad",
            Self::VolumeLoadMetric => "volumeLoadMetric",
            Self::TimeLoad => "timeLoad",
            Self::TimeLoadMetric => "timeLoadMetric",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CoreError::UnknownMetric(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Log input
// ---------------------------------------------------------------------------

/// The logged sets of one exercise occurrence within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    pub exercise_id: ExerciseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Prescribed duration per set, for timed exercises.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Secs>,
    pub sets: Vec<LogEntry>,
}

/// One historical session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub user_id: UserId,
    pub performed_at: Timestamp,
    pub exercises: Vec<ExerciseLog>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// All four metrics for one exercise in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    pub performed_at: Timestamp,
    pub volume_load: f64,
    pub volume_load_metric: f64,
    pub time_load: f64,
    pub time_load_metric: f64,
}

impl SessionMetrics {
    pub fn value(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::VolumeLoad => self.volume_load,
            MetricName::VolumeLoadMetric => self.volume_load_metric,
            MetricName::TimeLoad => self.time_load,
            MetricName::TimeLoadMetric => self.time_load_metric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: Timestamp,
    pub value: f64,
}

/// Plot-ready series for one `(user, exercise, metric)`, sorted by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    pub metric: MetricName,
    pub points: Vec<SeriesPoint>,
}

// ---------------------------------------------------------------------------
// Unit normalization
// ---------------------------------------------------------------------------

/// Load expressed in pounds, or `None` for bodyweight / unrecorded load.
pub fn load_in_pounds(load: Option<f64>, unit: WeightUnit) -> Option<f64> {
    match (load, unit) {
        (None, _) | (_, WeightUnit::Bodyweight) => None,
        (Some(l), WeightUnit::Pound) => Some(l),
        (Some(l), WeightUnit::Kilogram) => Some(l * KG_TO_LB),
    }
}

/// Load expressed in kilograms, or `None` for bodyweight / unrecorded load.
pub fn load_in_kilograms(load: Option<f64>, unit: WeightUnit) -> Option<f64> {
    match (load, unit) {
        (None, _) | (_, WeightUnit::Bodyweight) => None,
        (Some(l), WeightUnit::Pound) => Some(l * LB_TO_KG),
        (Some(l), WeightUnit::Kilogram) => Some(l),
    }
}

/// `base x load`, or the bare base when there is no load, or zero when
/// there is no base.
fn weighted(base: Option<f64>, load: Option<f64>) -> f64 {
    match base {
        Some(b) => b * load.unwrap_or(1.0),
        None => 0.0,
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    volume_load: f64,
    volume_load_metric: f64,
    time_load: f64,
    time_load_metric: f64,
}

impl Totals {
    fn add_set(&mut self, entry: &LogEntry, time: Option<Secs>) {
        let reps = entry.actual_reps.map(f64::from);
        let time = time.map(f64::from);
        let lb = load_in_pounds(entry.load, entry.unit);
        let kg = load_in_kilograms(entry.load, entry.unit);

        self.volume_load += weighted(reps, lb);
        self.volume_load_metric += weighted(reps, kg);
        self.time_load += weighted(time, lb);
        self.time_load_metric += weighted(time, kg);
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Compute the four metrics for every exercise in every session.
///
/// Occurrences of the same exercise within one session (e.g. in two
/// circuits) are merged into a single result. Results follow session order,
/// then first appearance of each exercise within the session.
pub fn aggregate_sessions(logs: &[WorkoutLog]) -> Vec<SessionMetrics> {
    let mut results = Vec::new();

    for log in logs {
        let mut order: Vec<&str> = Vec::new();
        let mut totals: HashMap<&str, Totals> = HashMap::new();

        for occurrence in &log.exercises {
            let id = occurrence.exercise_id.as_str();
            let acc = totals.entry(id).or_insert_with(|| {
                order.push(id);
                Totals::default()
            });
            for entry in &occurrence.sets {
                acc.add_set(entry, occurrence.time);
            }
        }

        results.extend(order.into_iter().map(|id| {
            let t = totals.get(id).copied().unwrap_or_default();
            SessionMetrics {
                user_id: log.user_id.clone(),
                exercise_id: id.to_string(),
                performed_at: log.performed_at,
                volume_load: t.volume_load,
                volume_load_metric: t.volume_load_metric,
                time_load: t.time_load,
                time_load_metric: t.time_load_metric,
            }
        }));
    }

    results
}

/// The series for one `(user, exercise, metric)`.
///
/// Sessions without the exercise produce no point; there is no gap filling.
pub fn metric_series(
    logs: &[WorkoutLog],
    user_id: &str,
    exercise_id: &str,
    metric: MetricName,
) -> MetricSeries {
    let user_logs: Vec<WorkoutLog> = logs
        .iter()
        .filter(|l| l.user_id == user_id)
        .cloned()
        .collect();

    let mut points: Vec<SeriesPoint> = aggregate_sessions(&user_logs)
        .into_iter()
        .filter(|m| m.exercise_id == exercise_id)
        .map(|m| SeriesPoint {
            date: m.performed_at,
            value: m.value(metric),
        })
        .collect();
    points.sort_by_key(|p| p.date);

    MetricSeries {
        user_id: user_id.to_string(),
        exercise_id: exercise_id.to_string(),
        metric,
        points,
    }
}

/// Every series for a user: one per exercise seen and metric, ordered by
/// exercise id then [`MetricName::ALL`] order.
pub fn build_series(logs: &[WorkoutLog], user_id: &str) -> Vec<MetricSeries> {
    let user_logs: Vec<WorkoutLog> = logs
        .iter()
        .filter(|l| l.user_id == user_id)
        .cloned()
        .collect();

    let mut by_exercise: BTreeMap<ExerciseId, Vec<SessionMetrics>> = BTreeMap::new();
    for m in aggregate_sessions(&user_logs) {
        by_exercise.entry(m.exercise_id.clone()).or_default().push(m);
    }

    let mut series = Vec::with_capacity(by_exercise.len() * MetricName::ALL.len());
    for (exercise_id, mut sessions) in by_exercise {
        sessions.sort_by_key(|m| m.performed_at);
        for metric in MetricName::ALL {
            series.push(MetricSeries {
                user_id: user_id.to_string(),
                exercise_id: exercise_id.clone(),
                metric,
                points: sessions
                    .iter()
                    .map(|m| SeriesPoint {
                        date: m.performed_at,
                        value: m.value(metric),
                    })
                    .collect(),
            });
        }
    }

    tracing::debug!(user_id, series = series.len(), "Built metric series");
    series
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
