//! Pre-persistence validation of workouts and flat records.
//!
//! Range rules come from the `Validate` derives on the data model; the
//! conditional reps/time rule and workout-level rules are added here. Errors
//! are keyed by wire field name.

use std::borrow::Cow;
use std::collections::HashSet;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::prescription::{FlatRecord, Target, Workout, WorkoutItem};
use crate::types::Secs;

/// Build a field error with a human-readable message.
fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Derived range checks, or an empty error set.
fn derived_errors<T: Validate>(value: &T) -> ValidationErrors {
    value.validate().err().unwrap_or_else(ValidationErrors::new)
}

/// Exactly one of `reps`/`time` must be set, matching `target`.
pub fn check_target(
    target: Target,
    reps: Option<u32>,
    time: Option<Secs>,
    errors: &mut ValidationErrors,
) {
    match target {
        Target::Reps => {
            if reps.is_none() {
                errors.add(
                    "reps",
                    field_error("required", "reps is required when target is reps"),
                );
            }
            if time.is_some() {
                errors.add(
                    "time",
                    field_error("unexpected", "time must be empty when target is reps"),
                );
            }
        }
        Target::Time => {
            if time.is_none() {
                errors.add(
                    "time",
                    field_error("required", "time is required when target is time"),
                );
            }
            if reps.is_some() {
                errors.add(
                    "reps",
                    field_error("unexpected", "reps must be empty when target is time"),
                );
            }
        }
    }
}

fn empty_workout() -> CoreError {
    let mut errors = ValidationErrors::new();
    errors.add(
        "items",
        field_error("length", "workout must contain at least one exercise"),
    );
    CoreError::InvalidWorkout(errors)
}

/// Validate an edited tree before it is flattened and reconciled.
///
/// Rejects an empty workout, circuits with fewer than two members or zero
/// rounds, and prescriptions whose value field does not match the target.
/// The first failing node is reported; `order_index` in
/// [`CoreError::InvalidPrescription`] is the position the row would take once
/// flattened.
pub fn validate_workout(tree: &Workout) -> Result<(), CoreError> {
    if tree.is_empty() {
        return Err(empty_workout());
    }

    let mut position = 0u32;
    for item in &tree.items {
        match item {
            WorkoutItem::Exercise(p) => {
                position += 1;
                let mut errors = derived_errors(p);
                check_target(p.target, p.reps, p.time, &mut errors);
                if !errors.is_empty() {
                    return Err(CoreError::InvalidPrescription {
                        order_index: position,
                        exercise_id: p.exercise_id.clone(),
                        errors,
                    });
                }
            }
            WorkoutItem::Circuit(c) => {
                let errors = derived_errors(c);
                if !errors.is_empty() {
                    return Err(CoreError::InvalidCircuit {
                        group_id: c.group_id.clone(),
                        errors,
                    });
                }
                for member in &c.members {
                    position += 1;
                    let mut errors = derived_errors(member);
                    check_target(member.target, member.reps, member.time, &mut errors);
                    if !errors.is_empty() {
                        return Err(CoreError::InvalidPrescription {
                            order_index: position,
                            exercise_id: member.exercise_id.clone(),
                            errors,
                        });
                    }
                }
            }
        }
    }

    Ok(())
}

/// Validate a flat record list as received over the wire.
///
/// Applies the prescription rules to each row, requires `rounds` to be
/// present exactly when `groupId` is (with `sets` equal to it), and rejects
/// duplicate `orderIndex` values.
pub fn validate_records(records: &[FlatRecord]) -> Result<(), CoreError> {
    if records.is_empty() {
        return Err(empty_workout());
    }

    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.order_index) {
            let mut errors = ValidationErrors::new();
            errors.add(
                "orderIndex",
                field_error(
                    "unique",
                    format!("orderIndex {} appears more than once", record.order_index),
                ),
            );
            return Err(CoreError::InvalidWorkout(errors));
        }

        let mut errors = derived_errors(record);
        check_target(record.target, record.reps, record.time, &mut errors);
        match (&record.group_id, record.rounds) {
            (Some(_), None) => {
                errors.add(
                    "rounds",
                    field_error("required", "rounds is required for circuit rows"),
                );
            }
            (Some(_), Some(rounds)) if record.sets != rounds => {
                errors.add(
                    "sets",
                    field_error(
                        "mismatch",
                        format!("sets must equal rounds ({rounds}) on circuit rows"),
                    ),
                );
            }
            (None, Some(_)) => {
                errors.add(
                    "rounds",
                    field_error("unexpected", "rounds is only valid on circuit rows"),
                );
            }
            _ => {}
        }

        if !errors.is_empty() {
            return Err(CoreError::InvalidPrescription {
                order_index: record.order_index,
                exercise_id: record.exercise_id.clone(),
                errors,
            });
        }
    }

    Ok(())
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
    use crate::flatten::flatten;
    use crate::prescription::ItemId;
    use crate::types::GroupId;

    fn tree_of(ids: &[&str]) -> Workout {
        let d = CompositionDefaults::default();
        ids.iter().fold(Workout::new(), |t, id| add_exercise(&t, id, &d))
    }

    fn has_field(err: &CoreError, field: &str) -> bool {
        err.field_errors()
            .map(|e| e.errors().contains_key(field))
            .unwrap_or(false)
    }

    // -- validate_workout --

    #[test]
    fn valid_workout_passes() {
        assert!(validate_workout(&tree_of(&["a", "b"])).is_ok());
    }

    #[test]
    fn empty_workout_is_rejected() {
        let err = validate_workout(&Workout::new()).unwrap_err();
        assert_matches!(err, CoreError::InvalidWorkout(_));
        assert!(has_field(&err, "items"));
    }

    #[test]
    fn missing_time_after_retarget_is_keyed_by_field() {
        let t = tree_of(&["a", "plank"]);
        let t = edit_field(
            &t,
            &ItemId::Exercise("plank".into()),
            None,
            FieldEdit::Target(Target::Time),
        );
        let err = validate_workout(&t).unwrap_err();
        assert_matches!(
            &err,
            CoreError::InvalidPrescription { order_index: 2, exercise_id, .. } => {
                assert_eq!(exercise_id, "plank");
            }
        );
        assert!(has_field(&err, "time"));
        assert!(!has_field(&err, "reps"));
    }

    #[test]
    fn zero_sets_is_rejected() {
        let t = edit_field(
            &tree_of(&["a"]),
            &ItemId::Exercise("a".into()),
            None,
            FieldEdit::Sets(0),
        );
        let err = validate_workout(&t).unwrap_err();
        assert!(has_field(&err, "sets"));
    }

    #[test]
    fn circuit_member_errors_report_flattened_position() {
        let d = CompositionDefaults::default();
        let (t, _) = group_into_circuit_with_id(
            &tree_of(&["a", "b", "c"]),
            &[ItemId::Exercise("b".into()), ItemId::Exercise("c".into())],
            GroupId::from("g1"),
            &d,
        );
        let t = edit_field(
            &t,
            &ItemId::Circuit("g1".into()),
            Some("c"),
            FieldEdit::Target(Target::Time),
        );
        let err = validate_workout(&t).unwrap_err();
        assert_matches!(err, CoreError::InvalidPrescription { order_index: 3, .. });
    }

    #[test]
    fn circuit_with_zero_rounds_is_rejected() {
        let d = CompositionDefaults::default();
        let (t, _) = group_into_circuit_with_id(
            &tree_of(&["a", "b"]),
            &[ItemId::Exercise("a".into()), ItemId::Exercise("b".into())],
            GroupId::from("g1"),
            &d,
        );
        let t = edit_field(&t, &ItemId::Circuit("g1".into()), None, FieldEdit::Rounds(0));
        let err = validate_workout(&t).unwrap_err();
        assert_matches!(&err, CoreError::InvalidCircuit { .. });
        assert!(has_field(&err, "rounds"));
    }

    // -- validate_records --

    #[test]
    fn flattened_records_are_valid() {
        assert!(validate_records(&flatten(&tree_of(&["a", "b"]))).is_ok());
    }

    #[test]
    fn records_with_both_values_are_rejected() {
        let mut records = flatten(&tree_of(&["a"]));
        records[0].time = Some(30);
        let err = validate_records(&records).unwrap_err();
        assert!(has_field(&err, "time"));
    }

    #[test]
    fn circuit_row_without_rounds_is_rejected() {
        let mut records = flatten(&tree_of(&["a"]));
        records[0].group_id = Some(GroupId::from("g1"));
        let err = validate_records(&records).unwrap_err();
        assert!(has_field(&err, "rounds"));
    }

    #[test]
    fn circuit_row_sets_must_match_rounds() {
        let d = CompositionDefaults::default();
        let (tree, _) = group_into_circuit_with_id(
            &tree_of(&["a", "b"]),
            &[ItemId::Exercise("a".into()), ItemId::Exercise("b".into())],
            GroupId::from("g1"),
            &d,
        );
        let mut records = flatten(&tree);
        assert!(validate_records(&records).is_ok());

        records[0].sets = 9;
        let err = validate_records(&records).unwrap_err();
        assert_matches!(
            &err,
            CoreError::InvalidPrescription { exercise_id, .. } if exercise_id == "a"
        );
        assert!(has_field(&err, "sets"));
    }

    #[test]
    fn duplicate_order_index_is_rejected() {
        let mut records = flatten(&tree_of(&["a", "b"]));
        records[1].order_index = 1;
        let err = validate_records(&records).unwrap_err();
        assert!(has_field(&err, "orderIndex"));
    }

    #[test]
    fn empty_records_are_rejected() {
        assert_matches!(validate_records(&[]), Err(CoreError::InvalidWorkout(_)));
    }
}
