//! Composition tree operations.
//!
//! Every operation is pure: it borrows the current [`Workout`] and returns a
//! new one. Structurally invalid requests (unknown ids, out-of-range indices,
//! grouping fewer than two standalone items) return an unchanged copy of the
//! input and are logged at debug level; they are never errors.
//!
//! After every successful operation `order_index` is renumbered contiguously
//! from 1, both at the top level and inside each circuit.

use serde::{Deserialize, Serialize};

use crate::config::CompositionDefaults;
use crate::prescription::{
    retarget, Circuit, ExercisePrescription, ItemId, Target, Workout, WorkoutItem,
};
use crate::types::{GroupId, Secs};

/// Minimum number of standalone items a new circuit must wrap.
pub const MIN_CIRCUIT_MEMBERS: usize = 2;

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

/// A single field assignment for [`edit_field`].
///
/// Which variants apply depends on the addressed node:
///
/// | Node               | Applicable fields                          |
/// |--------------------|--------------------------------------------|
/// | standalone item    | `sets`, `rest`, `target`, `reps`, `time`, `notes` |
/// | circuit            | `rounds`, `rest`                           |
/// | circuit member     | `target`, `reps`, `time`, `notes`          |
///
/// Any other combination is a no-op. `reps`/`time` only apply when they match
/// the current target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldEdit {
    Sets(u32),
    Rest(Secs),
    Rounds(u32),
    Target(Target),
    Reps(u32),
    Time(Secs),
    Notes(Option<String>),
}

impl FieldEdit {
    /// Wire name of the field being edited.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Sets(_) => "sets",
            Self::Rest(_) => "rest",
            Self::Rounds(_) => "rounds",
            Self::Target(_) => "target",
            Self::Reps(_) => "reps",
            Self::Time(_) => "time",
            Self::Notes(_) => "notes",
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Toggle an exercise: append it as a standalone item with default
/// parameters, or remove it if it is already present anywhere in the tree.
///
/// Removing the second-to-last member of a circuit dissolves the circuit:
/// the remaining member takes the circuit's place as a standalone item with
/// `sets` equal to the circuit's rounds.
pub fn add_exercise(tree: &Workout, exercise_id: &str, defaults: &CompositionDefaults) -> Workout {
    let mut next = tree.clone();

    if tree.contains_exercise(exercise_id) {
        tracing::debug!(exercise_id, "Exercise already present, toggling off");
        next.items = next
            .items
            .into_iter()
            .filter_map(|item| remove_exercise_from_item(item, exercise_id))
            .collect();
    } else {
        next.items.push(WorkoutItem::Exercise(ExercisePrescription::new(
            exercise_id,
            defaults,
        )));
    }

    next.renumber();
    next
}

/// Drop `exercise_id` from an item, returning what remains of it.
fn remove_exercise_from_item(item: WorkoutItem, exercise_id: &str) -> Option<WorkoutItem> {
    match item {
        WorkoutItem::Exercise(p) if p.exercise_id == exercise_id => None,
        WorkoutItem::Exercise(p) => Some(WorkoutItem::Exercise(p)),
        WorkoutItem::Circuit(mut c) => {
            c.members.retain(|m| m.exercise_id != exercise_id);
            match c.members.len() {
                0 => None,
                1 => {
                    let (rounds, rest) = (c.rounds, c.rest);
                    tracing::debug!(
                        group_id = %c.group_id,
                        "Circuit left with one member, dissolving",
                    );
                    c.members
                        .pop()
                        .map(|m| WorkoutItem::Exercise(m.into_standalone(rounds, rest)))
                }
                _ => Some(WorkoutItem::Circuit(c)),
            }
        }
    }
}

/// Remove whole top-level items. Circuits are removed with all members.
/// Unknown ids are ignored.
pub fn remove_items(tree: &Workout, item_ids: &[ItemId]) -> Workout {
    let mut next = tree.clone();
    next.items.retain(|item| !item_ids.contains(&item.id()));
    if next.items.len() == tree.items.len() {
        tracing::debug!(?item_ids, "No matching items to remove");
    }
    next.renumber();
    next
}

/// Move the top-level item at `from_index` to `to_index` (both 0-based).
///
/// Out-of-range indices leave the tree unchanged.
pub fn reorder(tree: &Workout, from_index: usize, to_index: usize) -> Workout {
    let len = tree.items.len();
    if from_index >= len || to_index >= len {
        tracing::debug!(from_index, to_index, len, "Reorder index out of range");
        return tree.clone();
    }
    if from_index == to_index {
        return tree.clone();
    }

    let mut next = tree.clone();
    let item = next.items.remove(from_index);
    next.items.insert(to_index, item);
    next.renumber();
    next
}

/// Wrap the selected standalone items in a new circuit with a freshly minted
/// group id, appended at the end of the list.
///
/// Returns the new tree and the new circuit's id, or the unchanged tree and
/// `None` when fewer than [`MIN_CIRCUIT_MEMBERS`] eligible items were
/// selected. Circuit ids in the selection are ignored since circuits do not
/// nest.
pub fn group_into_circuit(
    tree: &Workout,
    selected: &[ItemId],
    defaults: &CompositionDefaults,
) -> (Workout, Option<GroupId>) {
    group_into_circuit_with_id(tree, selected, GroupId::mint(), defaults)
}

/// [`group_into_circuit`] with a caller-supplied group id.
///
/// Members keep their relative top-level order regardless of selection order.
pub fn group_into_circuit_with_id(
    tree: &Workout,
    selected: &[ItemId],
    group_id: GroupId,
    defaults: &CompositionDefaults,
) -> (Workout, Option<GroupId>) {
    let is_selected = |item: &WorkoutItem| -> bool {
        matches!(item, WorkoutItem::Exercise(_)) && selected.contains(&item.id())
    };

    let eligible = tree.items.iter().filter(|&item| is_selected(item)).count();
    if eligible < MIN_CIRCUIT_MEMBERS {
        tracing::debug!(eligible, "Not enough standalone items selected to group");
        return (tree.clone(), None);
    }
    if tree.circuit(&group_id).is_some() {
        tracing::debug!(%group_id, "Group id already in use");
        return (tree.clone(), None);
    }

    let (chosen, rest): (Vec<_>, Vec<_>) =
        tree.items.iter().cloned().partition(|item| is_selected(item));

    let members = chosen
        .into_iter()
        .filter_map(|item| match item {
            WorkoutItem::Exercise(p) => Some(p.into_member()),
            WorkoutItem::Circuit(_) => None,
        })
        .collect();

    let mut next = Workout { items: rest };
    next.items.push(WorkoutItem::Circuit(Circuit {
        group_id: group_id.clone(),
        rounds: defaults.circuit_rounds,
        rest: defaults.circuit_rest,
        order_index: 0,
        members,
    }));
    next.renumber();
    (next, Some(group_id))
}

/// Dissolve a circuit, appending its members as standalone items whose
/// `sets` equal the circuit's rounds and whose rest is the circuit's rest.
pub fn ungroup(tree: &Workout, group_id: &GroupId) -> Workout {
    let Some(position) = tree.items.iter().position(
        |item| matches!(item, WorkoutItem::Circuit(c) if c.group_id == *group_id),
    ) else {
        tracing::debug!(%group_id, "No circuit to ungroup");
        return tree.clone();
    };

    let mut next = tree.clone();
    if let WorkoutItem::Circuit(circuit) = next.items.remove(position) {
        let (rounds, rest) = (circuit.rounds, circuit.rest);
        next.items.extend(
            circuit
                .members
                .into_iter()
                .map(|m| WorkoutItem::Exercise(m.into_standalone(rounds, rest))),
        );
    }
    next.renumber();
    next
}

/// Set one field on a standalone item, a circuit (`member` absent) or one
/// member of a circuit (`member` present).
pub fn edit_field(
    tree: &Workout,
    item_id: &ItemId,
    member: Option<&str>,
    edit: FieldEdit,
) -> Workout {
    let mut next = tree.clone();
    let applied = next
        .items
        .iter_mut()
        .find(|item| item.id() == *item_id)
        .map(|item| apply_edit(item, member, &edit))
        .unwrap_or(false);

    if !applied {
        tracing::debug!(
            ?item_id,
            member,
            field = edit.field_name(),
            "Field edit did not apply"
        );
        return tree.clone();
    }
    next
}

/// Apply `edit` in place. Returns whether anything was applicable.
fn apply_edit(item: &mut WorkoutItem, member: Option<&str>, edit: &FieldEdit) -> bool {
    match (item, member) {
        (WorkoutItem::Exercise(p), None) => match edit {
            FieldEdit::Sets(v) => {
                p.sets = *v;
                true
            }
            FieldEdit::Rest(v) => {
                p.rest = *v;
                true
            }
            FieldEdit::Rounds(_) => false,
            other => {
                apply_effort_edit(&mut p.target, &mut p.reps, &mut p.time, &mut p.notes, other)
            }
        },
        (WorkoutItem::Exercise(_), Some(_)) => false,
        (WorkoutItem::Circuit(c), None) => match edit {
            FieldEdit::Rounds(v) => {
                c.rounds = *v;
                true
            }
            FieldEdit::Rest(v) => {
                c.rest = *v;
                true
            }
            _ => false,
        },
        (WorkoutItem::Circuit(c), Some(member_id)) => {
            match c.members.iter_mut().find(|m| m.exercise_id == member_id) {
                Some(m) => match edit {
                    FieldEdit::Sets(_) | FieldEdit::Rest(_) | FieldEdit::Rounds(_) => false,
                    other => apply_effort_edit(
                        &mut m.target,
                        &mut m.reps,
                        &mut m.time,
                        &mut m.notes,
                        other,
                    ),
                },
                None => false,
            }
        }
    }
}

fn apply_effort_edit(
    target: &mut Target,
    reps: &mut Option<u32>,
    time: &mut Option<Secs>,
    notes: &mut Option<String>,
    edit: &FieldEdit,
) -> bool {
    match edit {
        FieldEdit::Target(next) => {
            retarget(target, reps, time, *next);
            true
        }
        FieldEdit::Reps(v) if *target == Target::Reps => {
            *reps = Some(*v);
            true
        }
        FieldEdit::Time(v) if *target == Target::Time => {
            *time = Some(*v);
            true
        }
        FieldEdit::Notes(v) => {
            *notes = v.clone().filter(|n| !n.trim().is_empty());
            true
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
