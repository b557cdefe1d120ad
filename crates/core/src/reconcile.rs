//! Create/update/delete reconciliation between persisted and edited records.
//!
//! Rows are matched on `(exercise_id, group_id)`. A row whose group changed
//! (grouped, ungrouped, or moved between circuits) is a delete of the old row
//! plus a create of the new one, never an update. Every previous row lands in
//! exactly one of `to_update`/`to_delete`; every current row in exactly one of
//! `to_update`/`to_create`.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::flatten::flatten;
use crate::prescription::{FlatRecord, Workout};
use crate::types::GroupId;
use crate::validation::validate_workout;

/// The writes needed to bring persisted rows in line with an edited tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePlan {
    /// New rows; `id` is always absent.
    pub to_create: Vec<FlatRecord>,
    /// Matched rows carrying the persisted `id` and the edited field values.
    pub to_update: Vec<FlatRecord>,
    /// Persisted rows with no counterpart in the edited set.
    pub to_delete: Vec<FlatRecord>,
    /// How many of `to_update` are identical to their persisted row.
    #[serde(default)]
    pub unchanged: usize,
}

impl ReconcilePlan {
    /// True when applying the plan would not change persisted state.
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty()
            && self.to_delete.is_empty()
            && self.unchanged == self.to_update.len()
    }

    /// Storage ids of rows to delete. Rows that were never persisted have none.
    pub fn delete_ids(&self) -> Vec<crate::types::DbId> {
        self.to_delete.iter().filter_map(|r| r.id).collect()
    }
}

type MatchKey<'a> = (&'a str, Option<&'a GroupId>);

/// Compute the create/update/delete split of `current` against `previous`.
///
/// When the same key occurs more than once on either side, occurrences are
/// paired in order.
pub fn reconcile(previous: &[FlatRecord], current: &[FlatRecord]) -> ReconcilePlan {
    let mut lookup: HashMap<MatchKey<'_>, VecDeque<usize>> = HashMap::new();
    for (i, record) in previous.iter().enumerate() {
        lookup.entry(record.match_key()).or_default().push_back(i);
    }

    let mut matched = vec![false; previous.len()];
    let mut plan = ReconcilePlan::default();

    for record in current {
        let hit = lookup
            .get_mut(&record.match_key())
            .and_then(VecDeque::pop_front);

        match hit {
            Some(i) => {
                matched[i] = true;
                let persisted = &previous[i];
                let updated = FlatRecord {
                    id: persisted.id,
                    ..record.clone()
                };
                if updated == *persisted {
                    plan.unchanged += 1;
                }
                plan.to_update.push(updated);
            }
            None => plan.to_create.push(FlatRecord {
                id: None,
                ..record.clone()
            }),
        }
    }

    plan.to_delete = previous
        .iter()
        .zip(&matched)
        .filter(|(_, was_matched)| !**was_matched)
        .map(|(record, _)| record.clone())
        .collect();

    tracing::debug!(
        previous = previous.len(),
        current = current.len(),
        create = plan.to_create.len(),
        update = plan.to_update.len(),
        unchanged = plan.unchanged,
        delete = plan.to_delete.len(),
        "Reconciled workout records",
    );

    plan
}

/// Validate an edited tree, flatten it, and reconcile it against the rows
/// it was loaded from. Nothing is planned when validation fails.
pub fn plan_save(previous: &[FlatRecord], tree: &Workout) -> Result<ReconcilePlan, CoreError> {
    validate_workout(tree)?;
    Ok(reconcile(previous, &flatten(tree)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
