//! Per-set logging checklist expanded from flat records.
//!
//! Standalone rows yield `sets` consecutive slots. A circuit is performed
//! round by round, so its slots interleave: round 1 of every member in
//! member order, then round 2, and so on. Each slot is keyed by
//! `(exercise_id, group_id, set_number)`, matching the [`LogEntry`] it
//! produces once performed.

use serde::{Deserialize, Serialize};

use crate::prescription::{FlatRecord, LogEntry, Target, WeightUnit};
use crate::types::{ExerciseId, GroupId, Secs};

/// One set to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSlot {
    pub exercise_id: ExerciseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// 1-based within this exercise occurrence.
    pub set_number: u32,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Secs>,
    /// Rest to take after this slot; zero between members mid-round.
    pub rest: Secs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SetSlot {
    fn from_record(record: &FlatRecord, set_number: u32, rest: Secs) -> Self {
        Self {
            exercise_id: record.exercise_id.clone(),
            group_id: record.group_id.clone(),
            set_number,
            target: record.target,
            reps: record.reps,
            time: record.time,
            rest,
            notes: record.notes.clone(),
        }
    }

    /// Record the performed set.
    pub fn log(
        &self,
        actual_reps: Option<u32>,
        load: Option<f64>,
        unit: WeightUnit,
        notes: Option<String>,
    ) -> LogEntry {
        LogEntry {
            exercise_id: self.exercise_id.clone(),
            group_id: self.group_id.clone(),
            set_number: self.set_number,
            actual_reps,
            load,
            unit,
            notes,
        }
    }
}

/// Expand flat records into the ordered list of sets to perform.
///
/// Records are walked in `order_index` order. Consecutive rows sharing a
/// `group_id` form one circuit block.
pub fn expand_checklist(records: &[FlatRecord]) -> Vec<SetSlot> {
    let mut sorted: Vec<&FlatRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.order_index);

    let mut slots = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let record = sorted[i];
        match &record.group_id {
            None => {
                for set_number in 1..=record.sets {
                    slots.push(SetSlot::from_record(record, set_number, record.rest));
                }
                i += 1;
            }
            Some(group_id) => {
                let block_len = sorted[i..]
                    .iter()
                    .take_while(|r| r.group_id.as_ref() == Some(group_id))
                    .count();
                let block = &sorted[i..i + block_len];
                expand_circuit(block, &mut slots);
                i += block_len;
            }
        }
    }

    slots
}

fn expand_circuit(block: &[&FlatRecord], slots: &mut Vec<SetSlot>) {
    let Some(first) = block.first() else {
        return;
    };
    let rounds = first.rounds.unwrap_or(first.sets);
    let last = block.len() - 1;

    for round in 1..=rounds {
        for (position, record) in block.iter().enumerate() {
            let rest = if position == last { first.rest } else { 0 };
            slots.push(SetSlot::from_record(record, round, rest));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
