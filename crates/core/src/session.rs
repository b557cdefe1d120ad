//! Single-document editing session.
//!
//! Front ends dispatch [`EditOp`]s; the session applies them one at a time
//! and swaps in each resulting tree. The records the session was opened from
//! are kept so a save can be reconciled against them.

use serde::{Deserialize, Serialize};

use crate::composition::{
    add_exercise, edit_field, group_into_circuit, remove_items, reorder, ungroup, FieldEdit,
};
use crate::config::CompositionDefaults;
use crate::error::CoreError;
use crate::flatten::{inflate, InflateWarning};
use crate::prescription::{FlatRecord, ItemId, Workout};
use crate::reconcile::{plan_save, ReconcilePlan};
use crate::types::{ExerciseId, GroupId};

/// A user-triggered edit, as sent by a front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOp {
    AddExercise {
        exercise_id: ExerciseId,
    },
    RemoveItems {
        item_ids: Vec<ItemId>,
    },
    Reorder {
        from_index: usize,
        to_index: usize,
    },
    GroupIntoCircuit {
        item_ids: Vec<ItemId>,
    },
    Ungroup {
        group_id: GroupId,
    },
    EditField {
        item_id: ItemId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        member_id: Option<ExerciseId>,
        edit: FieldEdit,
    },
}

/// What applying an [`EditOp`] produced beyond the new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The tree changed.
    Changed,
    /// A new circuit was created with this id.
    Grouped(GroupId),
    /// The operation was structurally invalid and left the tree as it was.
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    workout: Workout,
    persisted: Vec<FlatRecord>,
    defaults: CompositionDefaults,
}

impl EditSession {
    /// Start editing a new, never-persisted workout.
    pub fn new(defaults: CompositionDefaults) -> Self {
        Self {
            workout: Workout::new(),
            persisted: Vec::new(),
            defaults,
        }
    }

    /// Open previously persisted rows for editing.
    ///
    /// Returns the session and any data-quality warnings from inflating.
    pub fn open(
        records: Vec<FlatRecord>,
        defaults: CompositionDefaults,
    ) -> (Self, Vec<InflateWarning>) {
        let inflated = inflate(&records);
        let session = Self {
            workout: inflated.workout,
            persisted: records,
            defaults,
        };
        (session, inflated.warnings)
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn persisted(&self) -> &[FlatRecord] {
        &self.persisted
    }

    pub fn defaults(&self) -> &CompositionDefaults {
        &self.defaults
    }

    /// Apply one operation, replacing the current tree with its result.
    pub fn apply(&mut self, op: EditOp) -> Applied {
        let (next, grouped) = match op {
            EditOp::AddExercise { exercise_id } => {
                (add_exercise(&self.workout, &exercise_id, &self.defaults), None)
            }
            EditOp::RemoveItems { item_ids } => (remove_items(&self.workout, &item_ids), None),
            EditOp::Reorder {
                from_index,
                to_index,
            } => (reorder(&self.workout, from_index, to_index), None),
            EditOp::GroupIntoCircuit { item_ids } => {
                group_into_circuit(&self.workout, &item_ids, &self.defaults)
            }
            EditOp::Ungroup { group_id } => (ungroup(&self.workout, &group_id), None),
            EditOp::EditField {
                item_id,
                member_id,
                edit,
            } => (
                edit_field(&self.workout, &item_id, member_id.as_deref(), edit),
                None,
            ),
        };

        let changed = next != self.workout;
        self.workout = next;

        match grouped {
            Some(group_id) => Applied::Grouped(group_id),
            None if changed => Applied::Changed,
            None => Applied::Unchanged,
        }
    }

    /// Apply operations in order.
    pub fn apply_all(&mut self, ops: impl IntoIterator<Item = EditOp>) -> Vec<Applied> {
        ops.into_iter().map(|op| self.apply(op)).collect()
    }

    /// Validate the current tree and plan the writes against the rows this
    /// session was opened from.
    pub fn plan_save(&self) -> Result<ReconcilePlan, CoreError> {
        plan_save(&self.persisted, &self.workout)
    }

    /// Mark a plan as written: the given rows become the persisted baseline.
    pub fn mark_saved(&mut self, stored: Vec<FlatRecord>) {
        self.persisted = stored;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
