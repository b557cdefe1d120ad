//! Workout data model: prescriptions, circuits, flat records and set logs.
//!
//! The tree types ([`Workout`], [`WorkoutItem`], [`Circuit`]) are what the
//! editing session manipulates. [`FlatRecord`] is the persisted and wire
//! shape, one row per leaf exercise. [`LogEntry`] is a single performed set
//! and never re-enters the tree.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::CompositionDefaults;
use crate::types::{DbId, ExerciseId, GroupId, Secs};

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// What an exercise is prescribed by: a rep count or a timed effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Reps,
    Time,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reps => "reps",
            Self::Time => "time",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Switch `target`, clearing whichever value field no longer applies.
pub(crate) fn retarget(
    target: &mut Target,
    reps: &mut Option<u32>,
    time: &mut Option<Secs>,
    next: Target,
) {
    *target = next;
    match next {
        Target::Reps => *time = None,
        Target::Time => *reps = None,
    }
}

// ---------------------------------------------------------------------------
// Tree types
// ---------------------------------------------------------------------------

/// A standalone exercise prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePrescription {
    pub exercise_id: ExerciseId,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub time: Option<Secs>,
    #[validate(range(min = 1))]
    pub sets: u32,
    pub rest: Secs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub order_index: u32,
}

impl ExercisePrescription {
    /// A rep-targeted prescription stamped with the configured defaults.
    pub fn new(exercise_id: impl Into<ExerciseId>, defaults: &CompositionDefaults) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            target: Target::Reps,
            reps: Some(defaults.reps),
            time: None,
            sets: defaults.sets,
            rest: defaults.rest,
            notes: None,
            order_index: 0,
        }
    }

    /// Drop the fields a circuit owns (sets, rest) to become a member.
    pub fn into_member(self) -> CircuitMember {
        CircuitMember {
            exercise_id: self.exercise_id,
            target: self.target,
            reps: self.reps,
            time: self.time,
            notes: self.notes,
            order_index: 0,
        }
    }
}

/// One exercise inside a circuit. Sets and rest are owned by the circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CircuitMember {
    pub exercise_id: ExerciseId,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub time: Option<Secs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub order_index: u32,
}

impl CircuitMember {
    /// Promote back to a standalone prescription.
    pub fn into_standalone(self, sets: u32, rest: Secs) -> ExercisePrescription {
        ExercisePrescription {
            exercise_id: self.exercise_id,
            target: self.target,
            reps: self.reps,
            time: self.time,
            sets,
            rest,
            notes: self.notes,
            order_index: 0,
        }
    }
}

/// An ordered group of exercises performed back-to-back for `rounds` rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Circuit {
    pub group_id: GroupId,
    #[validate(range(min = 1))]
    pub rounds: u32,
    pub rest: Secs,
    pub order_index: u32,
    #[validate(length(min = 2))]
    pub members: Vec<CircuitMember>,
}

impl Circuit {
    pub fn member(&self, exercise_id: &str) -> Option<&CircuitMember> {
        self.members.iter().find(|m| m.exercise_id == exercise_id)
    }

    /// Reassign member `order_index` values 1..=n in current order.
    pub(crate) fn renumber_members(&mut self) {
        for (i, member) in self.members.iter_mut().enumerate() {
            member.order_index = i as u32 + 1;
        }
    }
}

/// Address of a top-level item in a [`Workout`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum ItemId {
    Exercise(ExerciseId),
    Circuit(GroupId),
}

/// A top-level workout item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WorkoutItem {
    Exercise(ExercisePrescription),
    Circuit(Circuit),
}

impl WorkoutItem {
    pub fn id(&self) -> ItemId {
        match self {
            Self::Exercise(p) => ItemId::Exercise(p.exercise_id.clone()),
            Self::Circuit(c) => ItemId::Circuit(c.group_id.clone()),
        }
    }

    pub fn order_index(&self) -> u32 {
        match self {
            Self::Exercise(p) => p.order_index,
            Self::Circuit(c) => c.order_index,
        }
    }

    pub(crate) fn set_order_index(&mut self, index: u32) {
        match self {
            Self::Exercise(p) => p.order_index = index,
            Self::Circuit(c) => c.order_index = index,
        }
    }

    /// Whether this item is, or contains, the given exercise.
    pub fn contains_exercise(&self, exercise_id: &str) -> bool {
        match self {
            Self::Exercise(p) => p.exercise_id == exercise_id,
            Self::Circuit(c) => c.member(exercise_id).is_some(),
        }
    }

    /// Number of leaf exercises this item flattens to.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Exercise(_) => 1,
            Self::Circuit(c) => c.members.len(),
        }
    }
}

/// The composition tree: an ordered list of top-level items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub items: Vec<WorkoutItem>,
}

impl Workout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn circuit(&self, group_id: &GroupId) -> Option<&Circuit> {
        self.items.iter().find_map(|item| match item {
            WorkoutItem::Circuit(c) if c.group_id == *group_id => Some(c),
            _ => None,
        })
    }

    pub fn contains_exercise(&self, exercise_id: &str) -> bool {
        self.items.iter().any(|i| i.contains_exercise(exercise_id))
    }

    /// Total number of leaf exercises across all items.
    pub fn leaf_count(&self) -> usize {
        self.items.iter().map(WorkoutItem::leaf_count).sum()
    }

    /// Reassign top-level and member `order_index` values, contiguous from 1.
    pub(crate) fn renumber(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.set_order_index(i as u32 + 1);
            if let WorkoutItem::Circuit(c) = item {
                c.renumber_members();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Flat (persisted) shape
// ---------------------------------------------------------------------------

/// One persisted row per leaf exercise occurrence.
///
/// Circuit members carry the circuit's `groupId`, `rounds` and `rest` so each
/// row is self-describing. For members `sets` always equals `rounds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    /// Storage row id; absent for rows that have never been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    pub exercise_id: ExerciseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(alias = "orderInRoutine")]
    pub order_index: u32,
    #[validate(range(min = 1))]
    pub sets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub rounds: Option<u32>,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub time: Option<Secs>,
    pub rest: Secs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl FlatRecord {
    /// Structural identity used when reconciling against persisted rows.
    pub fn match_key(&self) -> (&str, Option<&GroupId>) {
        (self.exercise_id.as_str(), self.group_id.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Set logs
// ---------------------------------------------------------------------------

/// Unit a logged load was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Bodyweight,
    Pound,
    Kilogram,
}

/// One performed set. Immutable once saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub exercise_id: ExerciseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub set_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<f64>,
    pub unit: WeightUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
