//! Properties that must hold for any tree built through the composition
//! operations: lossless flatten/inflate, stable reorder, group/ungroup
//! inverse, and exhaustive reconciliation.
//!
//! Trees are generated from seeded random operation sequences so failures
//! are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use setlist_core::composition::{
    add_exercise, edit_field, group_into_circuit_with_id, remove_items, reorder, ungroup,
    FieldEdit,
};
use setlist_core::config::CompositionDefaults;
use setlist_core::flatten::{flatten, inflate};
use setlist_core::prescription::{FlatRecord, ItemId, Target, Workout, WorkoutItem};
use setlist_core::reconcile::reconcile;
use setlist_core::types::GroupId;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const EXERCISES: &[&str] = &["squat", "bench", "row", "press", "curl", "plank", "lunge", "dip"];
const SEEDS: u64 = 64;
const STEPS: usize = 40;

fn defaults() -> CompositionDefaults {
    CompositionDefaults::default()
}

fn random_edit(rng: &mut StdRng) -> FieldEdit {
    match rng.random_range(0..7) {
        0 => FieldEdit::Sets(rng.random_range(1..6)),
        1 => FieldEdit::Rest(rng.random_range(0..180)),
        2 => FieldEdit::Rounds(rng.random_range(1..6)),
        3 => FieldEdit::Target(if rng.random_bool(0.5) {
            Target::Reps
        } else {
            Target::Time
        }),
        4 => FieldEdit::Reps(rng.random_range(1..20)),
        5 => FieldEdit::Time(rng.random_range(10..120)),
        _ => FieldEdit::Notes(Some(format!("note {}", rng.random_range(0..100)))),
    }
}

/// Apply one random operation; `next_group` numbers deterministic group ids.
fn random_step(rng: &mut StdRng, tree: &Workout, next_group: &mut u32) -> Workout {
    let len = tree.len();
    match rng.random_range(0..6) {
        0 => {
            let id = EXERCISES[rng.random_range(0..EXERCISES.len())];
            add_exercise(tree, id, &defaults())
        }
        1 if len > 0 => {
            let id = tree.items[rng.random_range(0..len)].id();
            remove_items(tree, &[id])
        }
        2 if len > 0 => reorder(tree, rng.random_range(0..len), rng.random_range(0..len)),
        3 => {
            let selected: Vec<ItemId> = tree
                .items
                .iter()
                .filter(|_| rng.random_bool(0.5))
                .map(WorkoutItem::id)
                .collect();
            *next_group += 1;
            let gid = GroupId::from(format!("g{next_group}"));
            group_into_circuit_with_id(tree, &selected, gid, &defaults()).0
        }
        4 => {
            let circuits: Vec<GroupId> = tree
                .items
                .iter()
                .filter_map(|item| match item {
                    WorkoutItem::Circuit(c) => Some(c.group_id.clone()),
                    WorkoutItem::Exercise(_) => None,
                })
                .collect();
            if circuits.is_empty() {
                tree.clone()
            } else {
                ungroup(tree, &circuits[rng.random_range(0..circuits.len())])
            }
        }
        _ if len > 0 => {
            let item = &tree.items[rng.random_range(0..len)];
            let member = match item {
                WorkoutItem::Circuit(c) if rng.random_bool(0.7) => {
                    Some(c.members[rng.random_range(0..c.members.len())].exercise_id.clone())
                }
                _ => None,
            };
            edit_field(tree, &item.id(), member.as_deref(), random_edit(rng))
        }
        _ => tree.clone(),
    }
}

fn random_tree(seed: u64) -> Workout {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut next_group = 0;
    (0..STEPS).fold(Workout::new(), |tree, _| {
        random_step(&mut rng, &tree, &mut next_group)
    })
}

fn with_ids(records: Vec<FlatRecord>) -> Vec<FlatRecord> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| FlatRecord {
            id: Some(i as i64 + 1),
            ..r
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Structural invariants
// ---------------------------------------------------------------------------

#[test]
fn order_indices_are_contiguous_at_every_level() {
    for seed in 0..SEEDS {
        let tree = random_tree(seed);
        for (i, item) in tree.items.iter().enumerate() {
            assert_eq!(item.order_index(), i as u32 + 1, "seed {seed}");
            if let WorkoutItem::Circuit(c) = item {
                assert!(c.members.len() >= 2, "seed {seed}: undersized circuit");
                for (j, m) in c.members.iter().enumerate() {
                    assert_eq!(m.order_index, j as u32 + 1, "seed {seed}");
                }
            }
        }
    }
}

#[test]
fn exercise_ids_are_unique_across_tree() {
    for seed in 0..SEEDS {
        let mut ids: Vec<_> = flatten(&random_tree(seed))
            .into_iter()
            .map(|r| r.exercise_id)
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total, "seed {seed}");
    }
}

#[test]
fn reps_and_time_never_both_set() {
    for seed in 0..SEEDS {
        for record in flatten(&random_tree(seed)) {
            assert!(
                !(record.reps.is_some() && record.time.is_some()),
                "seed {seed}: {record:?}"
            );
            match record.target {
                Target::Reps => assert!(record.time.is_none()),
                Target::Time => assert!(record.reps.is_none()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn inflate_flatten_round_trip() {
    for seed in 0..SEEDS {
        let tree = random_tree(seed);
        let inflated = inflate(&flatten(&tree));
        assert_eq!(inflated.workout, tree, "seed {seed}");
        assert!(inflated.warnings.is_empty(), "seed {seed}");
    }
}

#[test]
fn round_trip_survives_json() {
    for seed in 0..8 {
        let tree = random_tree(seed);
        let json = serde_json::to_string(&flatten(&tree)).unwrap();
        let records: Vec<FlatRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(inflate(&records).workout, tree, "seed {seed}");
    }
}

// ---------------------------------------------------------------------------
// Reorder / group / ungroup
// ---------------------------------------------------------------------------

#[test]
fn reorder_to_same_index_is_identity() {
    for seed in 0..SEEDS {
        let tree = random_tree(seed);
        for i in 0..tree.len() {
            assert_eq!(reorder(&tree, i, i), tree, "seed {seed}");
        }
    }
}

#[test]
fn reorder_there_and_back_is_identity() {
    for seed in 0..SEEDS {
        let tree = random_tree(seed);
        let len = tree.len();
        if len < 2 {
            continue;
        }
        let moved = reorder(&tree, 0, len - 1);
        assert_eq!(reorder(&moved, len - 1, 0), tree, "seed {seed}");
    }
}

#[test]
fn ungroup_restores_grouped_items_with_rounds_as_sets() {
    let d = defaults();
    let tree = ["squat", "bench", "row", "press"]
        .iter()
        .fold(Workout::new(), |t, id| add_exercise(&t, id, &d));
    let tree = edit_field(
        &tree,
        &ItemId::Exercise("row".into()),
        None,
        FieldEdit::Notes(Some("tempo 3-1-1".into())),
    );

    let selected = [ItemId::Exercise("bench".into()), ItemId::Exercise("row".into())];
    let (grouped, gid) = group_into_circuit_with_id(&tree, &selected, GroupId::from("c1"), &d);
    let gid = gid.unwrap();
    let grouped = edit_field(&grouped, &ItemId::Circuit(gid.clone()), None, FieldEdit::Rounds(5));
    let restored = ungroup(&grouped, &gid);

    let ids: Vec<_> = restored.items.iter().map(WorkoutItem::id).collect();
    assert_eq!(
        ids,
        vec![
            ItemId::Exercise("squat".into()),
            ItemId::Exercise("press".into()),
            ItemId::Exercise("bench".into()),
            ItemId::Exercise("row".into()),
        ]
    );
    for item in &restored.items[2..] {
        match item {
            WorkoutItem::Exercise(p) => assert_eq!(p.sets, 5),
            WorkoutItem::Circuit(_) => panic!("circuit survived ungroup"),
        }
    }
    match &restored.items[3] {
        WorkoutItem::Exercise(p) => assert_eq!(p.notes.as_deref(), Some("tempo 3-1-1")),
        WorkoutItem::Circuit(_) => unreachable!(),
    }
}

#[test]
fn toggle_add_is_self_inverse_for_absent_exercise() {
    for seed in 0..SEEDS {
        let tree = random_tree(seed);
        let absent = "burpee";
        let toggled = add_exercise(&add_exercise(&tree, absent, &defaults()), absent, &defaults());
        assert_eq!(toggled, tree, "seed {seed}");
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[test]
fn reconcile_is_exhaustive_and_disjoint() {
    for seed in 0..SEEDS {
        let previous = with_ids(flatten(&random_tree(seed)));
        let current = flatten(&random_tree(seed + 1000));
        let plan = reconcile(&previous, &current);

        assert_eq!(plan.to_update.len() + plan.to_delete.len(), previous.len(), "seed {seed}");
        assert_eq!(plan.to_update.len() + plan.to_create.len(), current.len(), "seed {seed}");

        let mut seen_ids: Vec<_> = plan
            .to_update
            .iter()
            .chain(&plan.to_delete)
            .map(|r| r.id.unwrap())
            .collect();
        seen_ids.sort();
        let expected: Vec<_> = previous.iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(seen_ids, expected, "seed {seed}");
        assert!(plan.to_create.iter().all(|r| r.id.is_none()));
    }
}

#[test]
fn reconcile_after_edits_matches_by_group_identity() {
    for seed in 0..SEEDS {
        let before = random_tree(seed);
        let previous = with_ids(flatten(&before));

        let mut rng = StdRng::seed_from_u64(seed + 5000);
        let mut next_group = 100;
        let after = (0..10).fold(before.clone(), |t, _| random_step(&mut rng, &t, &mut next_group));
        let current = flatten(&after);
        let plan = reconcile(&previous, &current);

        for updated in &plan.to_update {
            let persisted = previous.iter().find(|r| r.id == updated.id).unwrap();
            assert_eq!(persisted.exercise_id, updated.exercise_id, "seed {seed}");
            assert_eq!(persisted.group_id, updated.group_id, "seed {seed}");
        }
    }
}

#[test]
fn reconcile_unchanged_tree_is_noop() {
    for seed in 0..SEEDS {
        let tree = random_tree(seed);
        let previous = with_ids(flatten(&tree));
        let plan = reconcile(&previous, &flatten(&tree));
        assert!(plan.is_noop(), "seed {seed}");
        assert_eq!(plan.to_update.len(), previous.len());
    }
}
