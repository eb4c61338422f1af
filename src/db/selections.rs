//! Next-workout selections and the generation flow

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, params, params_from_iter};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::exercises::{find_exercise, routine_exercise_ids, user_exercises};
use super::routines::{find_routine, muscle_groups_for_day};
use super::users::user_exists;
use super::{Database, placeholders, user_and_ids};
use crate::error::WorkoutError;
use crate::exercises::MuscleGroup;
use crate::planner::{day_in_range, pick_least_trained};

/// Exercise marked for the user's next workout
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Selection {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub is_selected: bool,
}

/// Body of the toggle request
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleSelection {
    pub user_id: i64,
    pub exercise_id: i64,
    pub is_selected: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeneratedWorkout {
    pub day_number: u32,
    pub muscle_groups: Vec<MuscleGroup>,
    pub exercises_selected: usize,
    pub exercise_ids: Vec<i64>,
}

/// Drop the user's selections for the given exercises
pub(crate) fn delete_selections(
    conn: &Connection,
    user_id: i64,
    exercise_ids: &[i64],
) -> rusqlite::Result<usize> {
    if exercise_ids.is_empty() {
        return Ok(0);
    }
    conn.execute(
        &format!(
            "DELETE FROM next_workout_selections WHERE user_id = ? AND exercise_id IN ({})",
            placeholders(exercise_ids.len())
        ),
        params_from_iter(user_and_ids(user_id, exercise_ids)),
    )
}

impl Database {
    pub fn list_selections(&self, user_id: i64) -> Result<Vec<Selection>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, exercise_id, is_selected FROM next_workout_selections
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let selections = stmt
            .query_map([user_id], |row| {
                Ok(Selection {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    exercise_id: row.get(2)?,
                    is_selected: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(selections)
    }

    /// Set the selected flag, creating the selection if needed.
    ///
    /// Returns `false` when the exercise does not belong to the user.
    pub fn toggle_selection(&self, user_id: i64, exercise_id: i64, is_selected: bool) -> Result<bool> {
        if find_exercise(&self.conn, user_id, exercise_id)?.is_none() {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT INTO next_workout_selections (user_id, exercise_id, is_selected, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, exercise_id) DO UPDATE SET is_selected = excluded.is_selected",
            params![user_id, exercise_id, is_selected, Utc::now()],
        )?;
        Ok(true)
    }

    /// Clear all selections, or only those for the muscle groups of `day_number`
    pub fn clear_selections(&self, user_id: i64, day_number: Option<u32>) -> Result<usize> {
        let Some(day) = day_number else {
            let removed = self
                .conn
                .execute("DELETE FROM next_workout_selections WHERE user_id = ?1", [user_id])?;
            return Ok(removed);
        };

        let groups = muscle_groups_for_day(&self.conn, user_id, day)?;
        let exercise_ids = routine_exercise_ids(&self.conn, user_id, &groups)?;
        Ok(delete_selections(&self.conn, user_id, &exercise_ids)?)
    }

    /// Plan the next workout: re-select the least trained exercises of each
    /// muscle group scheduled for the target day.
    ///
    /// The target day is `day_number` when given, otherwise the user's
    /// current routine day.
    pub fn generate_next_workout(
        &mut self,
        user_id: i64,
        day_number: Option<u32>,
        per_group: usize,
    ) -> Result<GeneratedWorkout, WorkoutError> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        if !user_exists(&tx, user_id)? {
            return Err(WorkoutError::UserNotFound);
        }

        let target_day = match day_number {
            Some(day) => {
                let days_per_week = find_routine(&tx, user_id)?.map(|r| r.days_per_week);
                if let Some(days_per_week) = days_per_week.filter(|dpw| !day_in_range(day, *dpw)) {
                    return Err(WorkoutError::DayOutOfRange { day, days_per_week });
                }
                day
            }
            None => tx
                .query_row(
                    "SELECT current_day_number FROM workout_states WHERE user_id = ?1",
                    [user_id],
                    |row| row.get::<_, u32>(0),
                )
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => WorkoutError::NoWorkoutState,
                    other => WorkoutError::Storage(other),
                })?,
        };

        let muscle_groups = muscle_groups_for_day(&tx, user_id, target_day)?;
        if muscle_groups.is_empty() {
            return Err(WorkoutError::NoMuscleGroups);
        }

        let stale = routine_exercise_ids(&tx, user_id, &muscle_groups)?;
        delete_selections(&tx, user_id, &stale)?;

        let exercises = user_exercises(&tx, user_id)?;
        let picked: Vec<i64> = pick_least_trained(&exercises, &muscle_groups, per_group)
            .into_iter()
            .map(|e| e.id)
            .collect();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO next_workout_selections (user_id, exercise_id, is_selected, created_at)
                 VALUES (?1, ?2, 1, ?3)",
            )?;
            for exercise_id in &picked {
                stmt.execute(params![user_id, exercise_id, now])?;
            }
        }

        tx.commit()?;
        info!(
            "Generated day {} for user {}: {} exercises across {} muscle groups",
            target_day,
            user_id,
            picked.len(),
            muscle_groups.len()
        );

        Ok(GeneratedWorkout {
            day_number: target_day,
            muscle_groups,
            exercises_selected: picked.len(),
            exercise_ids: picked,
        })
    }
}
