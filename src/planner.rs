//! Next-workout planning - day rotation and least-trained exercise selection

use std::collections::HashSet;

use crate::db::Exercise;
use crate::exercises::MuscleGroup;

/// Default number of exercises picked per muscle group
pub const DEFAULT_PER_GROUP: usize = 10;

/// Day that follows `current` in a routine of `days_per_week` days.
///
/// Days are 1-based, so the last day wraps to 1.
pub fn next_day(current: u32, days_per_week: u32) -> u32 {
    if days_per_week == 0 {
        return 1;
    }
    (current % days_per_week) + 1
}

/// Whether `day` is a valid day number for the routine
pub fn day_in_range(day: u32, days_per_week: u32) -> bool {
    (1..=days_per_week).contains(&day)
}

/// Pick up to `per_group` exercises for every muscle group, least trained first.
///
/// Only exercises flagged as in-routine are considered. Groups keep the order
/// they are given in; a group listed twice is planned once.
pub fn pick_least_trained<'a>(
    exercises: &'a [Exercise],
    muscle_groups: &[MuscleGroup],
    per_group: usize,
) -> Vec<&'a Exercise> {
    let mut seen = HashSet::new();
    let mut picked = Vec::new();

    for group in muscle_groups {
        if !seen.insert(*group) {
            continue;
        }

        let mut candidates: Vec<&Exercise> = exercises
            .iter()
            .filter(|e| e.muscle_group == *group && e.is_in_routine)
            .collect();

        // Ties go to the older exercise so plans are reproducible
        candidates.sort_by_key(|e| (e.times_performed, e.id));
        picked.extend(candidates.into_iter().take(per_group));
    }

    picked
}
