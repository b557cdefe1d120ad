//! Conversion between the composition tree and flat records.
//!
//! [`flatten`] assigns a global, contiguous, 1-based `order_index` across all
//! leaf exercises. [`inflate`] rebuilds the tree by grouping records on
//! `group_id`; circuits are positioned by their lowest member `order_index`.
//! For any tree built through the composition operations,
//! `inflate(&flatten(&t)).workout == t`.

use std::collections::HashMap;

use serde::Serialize;

use crate::prescription::{
    Circuit, CircuitMember, ExercisePrescription, FlatRecord, Workout, WorkoutItem,
};
use crate::types::{ExerciseId, GroupId, Secs};

// ---------------------------------------------------------------------------
// Flatten
// ---------------------------------------------------------------------------

/// Flatten a tree into persisted rows, one per leaf exercise.
///
/// Rows produced here carry no storage `id`; reconciliation attaches ids of
/// matched persisted rows.
pub fn flatten(tree: &Workout) -> Vec<FlatRecord> {
    let mut records = Vec::with_capacity(tree.leaf_count());
    let mut next_index = 1u32;

    for item in &tree.items {
        match item {
            WorkoutItem::Exercise(p) => {
                records.push(standalone_record(p, next_index));
                next_index += 1;
            }
            WorkoutItem::Circuit(c) => {
                for member in &c.members {
                    records.push(member_record(c, member, next_index));
                    next_index += 1;
                }
            }
        }
    }

    records
}

fn standalone_record(p: &ExercisePrescription, order_index: u32) -> FlatRecord {
    FlatRecord {
        id: None,
        exercise_id: p.exercise_id.clone(),
        group_id: None,
        order_index,
        sets: p.sets,
        rounds: None,
        target: p.target,
        reps: p.reps,
        time: p.time,
        rest: p.rest,
        notes: p.notes.clone(),
    }
}

fn member_record(c: &Circuit, m: &CircuitMember, order_index: u32) -> FlatRecord {
    FlatRecord {
        id: None,
        exercise_id: m.exercise_id.clone(),
        group_id: Some(c.group_id.clone()),
        order_index,
        sets: c.rounds,
        rounds: Some(c.rounds),
        target: m.target,
        reps: m.reps,
        time: m.time,
        rest: c.rest,
        notes: m.notes.clone(),
    }
}

// ---------------------------------------------------------------------------
// Inflate
// ---------------------------------------------------------------------------

/// Circuit-level field on which members of one group disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitField {
    Rounds,
    Rest,
}

impl CircuitField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rounds => "rounds",
            Self::Rest => "rest",
        }
    }
}

/// Data-quality issue found while inflating. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflateWarning {
    pub group_id: GroupId,
    pub exercise_id: ExerciseId,
    pub field: CircuitField,
    /// Value taken from the group's first member, which wins.
    pub kept: u32,
    /// Conflicting value carried by `exercise_id`'s row.
    pub found: u32,
}

/// Result of [`inflate`]: the rebuilt tree plus any circuit disagreements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inflated {
    pub workout: Workout,
    pub warnings: Vec<InflateWarning>,
}

/// Rebuild the tree from flat records.
///
/// Records without `group_id` become standalone items. Records sharing a
/// `group_id` become one circuit whose members are ordered by `order_index`;
/// the circuit's `rounds` and `rest` come from its first member (`rounds`
/// falls back to that row's `sets`). Members that disagree produce an
/// [`InflateWarning`] and a `warn` log event.
pub fn inflate(records: &[FlatRecord]) -> Inflated {
    let mut sorted: Vec<&FlatRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.order_index);

    let mut items: Vec<WorkoutItem> = Vec::new();
    let mut circuit_slots: HashMap<&GroupId, usize> = HashMap::new();
    let mut warnings = Vec::new();

    for record in sorted {
        let Some(group_id) = record.group_id.as_ref() else {
            items.push(WorkoutItem::Exercise(standalone_from(record)));
            continue;
        };

        match circuit_slots.get(group_id) {
            Some(&slot) => {
                if let WorkoutItem::Circuit(c) = &mut items[slot] {
                    check_agreement(c, record, &mut warnings);
                    c.members.push(member_from(record));
                }
            }
            None => {
                circuit_slots.insert(group_id, items.len());
                items.push(WorkoutItem::Circuit(Circuit {
                    group_id: group_id.clone(),
                    rounds: record.rounds.unwrap_or(record.sets),
                    rest: record.rest,
                    order_index: 0,
                    members: vec![member_from(record)],
                }));
            }
        }
    }

    let mut workout = Workout { items };
    workout.renumber();
    Inflated { workout, warnings }
}

fn standalone_from(record: &FlatRecord) -> ExercisePrescription {
    ExercisePrescription {
        exercise_id: record.exercise_id.clone(),
        target: record.target,
        reps: record.reps,
        time: record.time,
        sets: record.sets,
        rest: record.rest,
        notes: record.notes.clone(),
        order_index: 0,
    }
}

fn member_from(record: &FlatRecord) -> CircuitMember {
    CircuitMember {
        exercise_id: record.exercise_id.clone(),
        target: record.target,
        reps: record.reps,
        time: record.time,
        notes: record.notes.clone(),
        order_index: 0,
    }
}

fn check_agreement(circuit: &Circuit, record: &FlatRecord, warnings: &mut Vec<InflateWarning>) {
    let rounds = record.rounds.unwrap_or(record.sets);
    let checks: [(CircuitField, u32, Secs); 2] = [
        (CircuitField::Rounds, circuit.rounds, rounds),
        (CircuitField::Rest, circuit.rest, record.rest),
    ];

    for (field, kept, found) in checks {
        if kept != found {
            tracing::warn!(
                group_id = %circuit.group_id,
                exercise_id = %record.exercise_id,
                field = field.as_str(),
                kept,
                found,
                "Circuit members disagree, keeping first member's value",
            );
            warnings.push(InflateWarning {
                group_id: circuit.group_id.clone(),
                exercise_id: record.exercise_id.clone(),
                field,
                kept,
                found,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::composition::{add_exercise, edit_field, group_into_circuit_with_id, FieldEdit};
    use crate::config::CompositionDefaults;
    use crate::prescription::{ItemId, Target};

    fn record(exercise_id: &str, group: Option<&str>, order_index: u32) -> FlatRecord {
        FlatRecord {
            id: None,
            exercise_id: exercise_id.to_string(),
            group_id: group.map(GroupId::from),
            order_index,
            sets: 3,
            rounds: group.map(|_| 3),
            target: Target::Reps,
            reps: Some(10),
            time: None,
            rest: 60,
            notes: None,
        }
    }

    fn sample_tree() -> Workout {
        let d = CompositionDefaults::default();
        let t = ["a", "b", "c", "d"]
            .iter()
            .fold(Workout::new(), |t, id| add_exercise(&t, id, &d));
        let (t, _) = group_into_circuit_with_id(
            &t,
            &[ItemId::Exercise("b".into()), ItemId::Exercise("c".into())],
            GroupId::from("g1"),
            &d,
        );
        edit_field(&t, &ItemId::Circuit("g1".into()), None, FieldEdit::Rounds(4))
    }

    // -- flatten --

    #[test]
    fn flatten_assigns_global_contiguous_order() {
        let records = flatten(&sample_tree());
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.exercise_id.as_str(), r.order_index))
            .collect();
        assert_eq!(summary, vec![("a", 1), ("d", 2), ("b", 3), ("c", 4)]);
    }

    #[test]
    fn flatten_denormalizes_circuit_fields() {
        let records = flatten(&sample_tree());
        let b = &records[2];
        assert_eq!(b.group_id, Some(GroupId::from("g1")));
        assert_eq!(b.rounds, Some(4));
        assert_eq!(b.sets, 4);
        assert_eq!(b.rest, 60);

        let a = &records[0];
        assert_eq!(a.group_id, None);
        assert_eq!(a.rounds, None);
        assert_eq!(a.sets, 3);
    }

    #[test]
    fn flatten_empty_tree() {
        assert!(flatten(&Workout::new()).is_empty());
    }

    // -- inflate --

    #[test]
    fn round_trip_preserves_tree() {
        let tree = sample_tree();
        let inflated = inflate(&flatten(&tree));
        assert_eq!(inflated.workout, tree);
        assert!(inflated.warnings.is_empty());
    }

    #[test]
    fn inflate_orders_by_order_index_not_input_order() {
        let records = vec![
            record("c", Some("g1"), 4),
            record("a", None, 1),
            record("b", Some("g1"), 2),
            record("d", None, 3),
        ];
        let workout = inflate(&records).workout;
        assert_eq!(workout.len(), 3);
        assert_eq!(workout.items[0].id(), ItemId::Exercise("a".into()));
        assert_matches!(&workout.items[1], WorkoutItem::Circuit(c) => {
            assert_eq!(c.order_index, 2);
            let ids: Vec<_> = c.members.iter().map(|m| m.exercise_id.as_str()).collect();
            assert_eq!(ids, vec!["b", "c"]);
        });
        assert_eq!(workout.items[2].id(), ItemId::Exercise("d".into()));
    }

    #[test]
    fn inflate_keeps_single_member_group_as_circuit() {
        let workout = inflate(&[record("a", Some("g1"), 1)]).workout;
        assert_matches!(&workout.items[0], WorkoutItem::Circuit(c) => {
            assert_eq!(c.members.len(), 1);
        });
    }

    #[test]
    fn inflate_first_member_wins_and_warns() {
        let mut second = record("b", Some("g1"), 2);
        second.rounds = Some(5);
        second.sets = 5;
        second.rest = 90;
        let inflated = inflate(&[record("a", Some("g1"), 1), second]);

        let circuit = inflated.workout.circuit(&GroupId::from("g1")).unwrap();
        assert_eq!(circuit.rounds, 3);
        assert_eq!(circuit.rest, 60);

        assert_eq!(inflated.warnings.len(), 2);
        assert_eq!(inflated.warnings[0].field, CircuitField::Rounds);
        assert_eq!(inflated.warnings[0].kept, 3);
        assert_eq!(inflated.warnings[0].found, 5);
        assert_eq!(inflated.warnings[1].field, CircuitField::Rest);
        assert_eq!(inflated.warnings[1].exercise_id, "b");
    }

    #[test]
    fn inflate_falls_back_to_sets_when_rounds_missing() {
        let mut first = record("a", Some("g1"), 1);
        first.rounds = None;
        first.sets = 6;
        let mut second = record("b", Some("g1"), 2);
        second.rounds = None;
        second.sets = 6;
        let inflated = inflate(&[first, second]);
        assert_eq!(inflated.workout.circuit(&GroupId::from("g1")).unwrap().rounds, 6);
        assert!(inflated.warnings.is_empty());
    }
}
