//! Workout state, sessions and logs - the workout completion flow

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Row, params, params_from_iter};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::exercises::find_exercise;
use super::routines::find_routine;
use super::selections::delete_selections;
use super::users::user_exists;
use super::{Database, placeholders, user_and_ids};
use crate::error::WorkoutError;
use crate::planner::{day_in_range, next_day};

/// Default number of logs returned by history queries
pub const DEFAULT_LOG_LIMIT: u32 = 30;
/// Default number of sessions returned by history queries
pub const DEFAULT_SESSION_LIMIT: u32 = 10;

/// Where the user is in their routine
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkoutState {
    pub user_id: i64,
    pub current_day_number: u32,
    pub last_workout_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub user_id: i64,
    pub routine_day_number: u32,
    pub workout_date: NaiveDate,
    pub session_order: u32,
    pub created_at: DateTime<Utc>,
}

/// One exercise performed in a session
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutLog {
    pub id: i64,
    pub user_id: i64,
    pub session_id: i64,
    pub exercise_id: i64,
    pub routine_day_number: u32,
    pub sets_completed: u32,
    pub reps_completed: u32,
    pub weight_used: Option<f64>,
    pub workout_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseResult {
    pub exercise_id: i64,
    pub sets_completed: u32,
    pub reps_completed: u32,
    #[serde(default)]
    pub weight_used: Option<f64>,
}

impl ExerciseResult {
    fn validate(&self) -> Result<(), WorkoutError> {
        if self.weight_used.is_some_and(|w| !(0.0..=300.0).contains(&w)) {
            return Err(WorkoutError::InvalidEntry(format!(
                "weight_used for exercise {} must be between 0 and 300",
                self.exercise_id
            )));
        }
        Ok(())
    }
}

/// Body of the workout completion request
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteWorkout {
    pub day_number: u32,
    #[serde(default)]
    pub exercises: Vec<ExerciseResult>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletedWorkout {
    pub session_id: i64,
    pub next_day: u32,
    pub exercises_logged: usize,
}

const LOG_COLUMNS: &str = "id, user_id, session_id, exercise_id, routine_day_number, \
    sets_completed, reps_completed, weight_used, workout_date";

fn log_from_row(row: &Row) -> rusqlite::Result<WorkoutLog> {
    Ok(WorkoutLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_id: row.get(2)?,
        exercise_id: row.get(3)?,
        routine_day_number: row.get(4)?,
        sets_completed: row.get(5)?,
        reps_completed: row.get(6)?,
        weight_used: row.get(7)?,
        workout_date: row.get(8)?,
    })
}

impl Database {
    /// Current routine position, created at day 1 on first access.
    ///
    /// The user must exist.
    pub fn workout_state(&self, user_id: i64) -> Result<WorkoutState> {
        self.conn.execute(
            "INSERT OR IGNORE INTO workout_states (user_id, current_day_number) VALUES (?1, 1)",
            [user_id],
        )?;
        let state = self.conn.query_row(
            "SELECT user_id, current_day_number, last_workout_date FROM workout_states WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(WorkoutState {
                    user_id: row.get(0)?,
                    current_day_number: row.get(1)?,
                    last_workout_date: row.get(2)?,
                })
            },
        )?;
        Ok(state)
    }

    /// Record a finished workout and move the user to the next routine day.
    ///
    /// Logs every exercise in a new session, bumps each exercise's
    /// performance count, remembers any positive weight as the new working
    /// weight, drops completed exercises from the next-workout selection and
    /// advances the day pointer. Nothing is written unless every step succeeds.
    pub fn complete_workout(
        &mut self,
        user_id: i64,
        workout: &CompleteWorkout,
        today: NaiveDate,
    ) -> Result<CompletedWorkout, WorkoutError> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        if !user_exists(&tx, user_id)? {
            return Err(WorkoutError::UserNotFound);
        }
        let routine = find_routine(&tx, user_id)?.ok_or(WorkoutError::NoRoutine)?;
        if !day_in_range(workout.day_number, routine.days_per_week) {
            return Err(WorkoutError::DayOutOfRange {
                day: workout.day_number,
                days_per_week: routine.days_per_week,
            });
        }
        for entry in &workout.exercises {
            entry.validate()?;
            if find_exercise(&tx, user_id, entry.exercise_id)?.is_none() {
                return Err(WorkoutError::ExerciseNotFound(entry.exercise_id));
            }
        }

        let session_order: u32 = tx.query_row(
            "SELECT COALESCE(MAX(session_order), 0) + 1 FROM workout_sessions WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO workout_sessions (user_id, routine_day_number, workout_date, session_order, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, workout.day_number, today, session_order, now],
        )?;
        let session_id = tx.last_insert_rowid();

        {
            let mut insert_log = tx.prepare(
                "INSERT INTO workout_logs
                    (user_id, session_id, exercise_id, routine_day_number,
                     sets_completed, reps_completed, weight_used, workout_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let mut bump_exercise = tx.prepare(
                "UPDATE exercises SET
                    times_performed = times_performed + 1,
                    current_weight = COALESCE(?1, current_weight),
                    updated_at = ?2
                 WHERE id = ?3",
            )?;

            for entry in &workout.exercises {
                insert_log.execute(params![
                    user_id,
                    session_id,
                    entry.exercise_id,
                    workout.day_number,
                    entry.sets_completed,
                    entry.reps_completed,
                    entry.weight_used,
                    today,
                ])?;
                let new_weight = entry.weight_used.filter(|w| *w > 0.0);
                bump_exercise.execute(params![new_weight, now, entry.exercise_id])?;
            }
        }

        let completed: Vec<i64> = workout.exercises.iter().map(|e| e.exercise_id).collect();
        delete_selections(&tx, user_id, &completed)?;

        let next = next_day(workout.day_number, routine.days_per_week);
        tx.execute(
            "INSERT INTO workout_states (user_id, current_day_number, last_workout_date)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                current_day_number = excluded.current_day_number,
                last_workout_date = excluded.last_workout_date",
            params![user_id, next, today],
        )?;

        tx.commit()?;
        info!(
            "User {} completed day {} (session {}, {} exercises), next day {}",
            user_id,
            workout.day_number,
            session_id,
            workout.exercises.len(),
            next
        );

        Ok(CompletedWorkout { session_id, next_day: next, exercises_logged: workout.exercises.len() })
    }

    /// Most recent logs first
    pub fn recent_logs(&self, user_id: i64, limit: u32) -> Result<Vec<WorkoutLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workout_logs WHERE user_id = ?1 ORDER BY workout_date DESC, id DESC LIMIT ?2",
            LOG_COLUMNS
        ))?;
        let logs = stmt
            .query_map(params![user_id, limit], log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Last `limit` sessions, oldest first
    pub fn recent_sessions(&self, user_id: i64, limit: u32) -> Result<Vec<WorkoutSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, routine_day_number, workout_date, session_order, created_at
             FROM workout_sessions WHERE user_id = ?1 ORDER BY session_order DESC LIMIT ?2",
        )?;
        let mut sessions = stmt
            .query_map(params![user_id, limit], |row| {
                Ok(WorkoutSession {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    routine_day_number: row.get(2)?,
                    workout_date: row.get(3)?,
                    session_order: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        sessions.reverse();
        Ok(sessions)
    }

    /// Logs of the given sessions; sessions of other users are ignored
    pub fn logs_for_sessions(&self, user_id: i64, session_ids: &[i64]) -> Result<Vec<WorkoutLog>> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workout_logs WHERE user_id = ? AND session_id IN ({}) ORDER BY session_id, id",
            LOG_COLUMNS,
            placeholders(session_ids.len())
        ))?;
        let logs = stmt
            .query_map(params_from_iter(user_and_ids(user_id, session_ids)), log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Exercise, RoutineDay, RoutineSetup};
    use crate::exercises::MuscleGroup;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    /// User with a 3-day routine: chest, back, legs
    fn create_db_with_routine() -> (Database, i64) {
        let mut db = Database::open_in_memory().unwrap();
        let user_id = db.create_user("ann@example.com", "hash").unwrap().id;
        let setup = RoutineSetup {
            days_per_week: 3,
            routine_days: vec![
                RoutineDay { day_number: 1, muscle_groups: vec![MuscleGroup::Chest] },
                RoutineDay { day_number: 2, muscle_groups: vec![MuscleGroup::Back] },
                RoutineDay { day_number: 3, muscle_groups: vec![MuscleGroup::Legs] },
            ],
        };
        db.save_routine(user_id, &setup).unwrap();
        (db, user_id)
    }

    fn first_of(db: &Database, user_id: i64, group: MuscleGroup) -> Exercise {
        db.list_exercises(user_id)
            .unwrap()
            .into_iter()
            .find(|e| e.muscle_group == group)
            .unwrap()
    }

    fn result(exercise_id: i64, weight_used: Option<f64>) -> ExerciseResult {
        ExerciseResult { exercise_id, sets_completed: 3, reps_completed: 10, weight_used }
    }

    #[test]
    fn test_workout_state_created_at_day_one() {
        let (db, user_id) = create_db_with_routine();
        let state = db.workout_state(user_id).unwrap();
        assert_eq!(state.current_day_number, 1);
        assert!(state.last_workout_date.is_none());
        // Second read returns the same row
        assert_eq!(db.workout_state(user_id).unwrap(), state);
    }

    #[test]
    fn test_complete_workout_logs_and_advances() {
        let (mut db, user_id) = create_db_with_routine();
        let bench = first_of(&db, user_id, MuscleGroup::Chest);

        let workout = CompleteWorkout { day_number: 1, exercises: vec![result(bench.id, Some(80.0))] };
        let completed = db.complete_workout(user_id, &workout, today()).unwrap();
        assert_eq!(completed.next_day, 2);
        assert_eq!(completed.exercises_logged, 1);

        let bench = db.get_exercise(user_id, bench.id).unwrap().unwrap();
        assert_eq!(bench.times_performed, 1);
        assert_eq!(bench.current_weight, Some(80.0));

        let state = db.workout_state(user_id).unwrap();
        assert_eq!(state.current_day_number, 2);
        assert_eq!(state.last_workout_date, Some(today()));

        let logs = db.recent_logs(user_id, DEFAULT_LOG_LIMIT).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].session_id, completed.session_id);
        assert_eq!(logs[0].sets_completed, 3);
        assert_eq!(logs[0].workout_date, today());
    }

    #[test]
    fn test_complete_last_day_wraps() {
        let (mut db, user_id) = create_db_with_routine();
        let workout = CompleteWorkout { day_number: 3, exercises: vec![] };
        let completed = db.complete_workout(user_id, &workout, today()).unwrap();
        assert_eq!(completed.next_day, 1);
        assert_eq!(db.workout_state(user_id).unwrap().current_day_number, 1);
    }

    #[test]
    fn test_zero_weight_keeps_previous_weight() {
        let (mut db, user_id) = create_db_with_routine();
        let bench = first_of(&db, user_id, MuscleGroup::Chest);

        let heavy = CompleteWorkout { day_number: 1, exercises: vec![result(bench.id, Some(80.0))] };
        db.complete_workout(user_id, &heavy, today()).unwrap();
        let bodyweight = CompleteWorkout { day_number: 1, exercises: vec![result(bench.id, Some(0.0))] };
        db.complete_workout(user_id, &bodyweight, today()).unwrap();
        let unknown = CompleteWorkout { day_number: 1, exercises: vec![result(bench.id, None)] };
        db.complete_workout(user_id, &unknown, today()).unwrap();

        let bench = db.get_exercise(user_id, bench.id).unwrap().unwrap();
        assert_eq!(bench.current_weight, Some(80.0));
        assert_eq!(bench.times_performed, 3);
    }

    #[test]
    fn test_session_order_increments() {
        let (mut db, user_id) = create_db_with_routine();
        for day in 1..=3 {
            let workout = CompleteWorkout { day_number: day, exercises: vec![] };
            db.complete_workout(user_id, &workout, today()).unwrap();
        }
        let sessions = db.recent_sessions(user_id, DEFAULT_SESSION_LIMIT).unwrap();
        let orders: Vec<_> = sessions.iter().map(|s| s.session_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);

        let last_two = db.recent_sessions(user_id, 2).unwrap();
        let orders: Vec<_> = last_two.iter().map(|s| s.session_order).collect();
        assert_eq!(orders, vec![2, 3]);
    }

    #[test]
    fn test_complete_without_routine() {
        let mut db = Database::open_in_memory().unwrap();
        let user_id = db.create_user("bob@example.com", "hash").unwrap().id;
        let workout = CompleteWorkout { day_number: 1, exercises: vec![] };
        assert!(matches!(
            db.complete_workout(user_id, &workout, today()),
            Err(WorkoutError::NoRoutine)
        ));
    }

    #[test]
    fn test_complete_unknown_user() {
        let (mut db, _user_id) = create_db_with_routine();
        let workout = CompleteWorkout { day_number: 1, exercises: vec![] };
        assert!(matches!(
            db.complete_workout(999, &workout, today()),
            Err(WorkoutError::UserNotFound)
        ));
    }

    #[test]
    fn test_complete_day_out_of_range() {
        let (mut db, user_id) = create_db_with_routine();
        for day in [0, 4] {
            let workout = CompleteWorkout { day_number: day, exercises: vec![] };
            assert!(matches!(
                db.complete_workout(user_id, &workout, today()),
                Err(WorkoutError::DayOutOfRange { days_per_week: 3, .. })
            ));
        }
    }

    #[test]
    fn test_foreign_exercise_rolls_back() {
        let (mut db, ann) = create_db_with_routine();
        let bob = db.create_user("bob@example.com", "hash").unwrap().id;
        let anns_bench = first_of(&db, ann, MuscleGroup::Chest);
        let bobs_bench = first_of(&db, bob, MuscleGroup::Chest);

        let workout = CompleteWorkout {
            day_number: 1,
            exercises: vec![result(anns_bench.id, Some(50.0)), result(bobs_bench.id, None)],
        };
        assert!(matches!(
            db.complete_workout(ann, &workout, today()),
            Err(WorkoutError::ExerciseNotFound(id)) if id == bobs_bench.id
        ));

        assert!(db.recent_sessions(ann, DEFAULT_SESSION_LIMIT).unwrap().is_empty());
        assert_eq!(db.get_exercise(ann, anns_bench.id).unwrap().unwrap().times_performed, 0);
        assert_eq!(db.workout_state(ann).unwrap().current_day_number, 1);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let (mut db, user_id) = create_db_with_routine();
        let bench = first_of(&db, user_id, MuscleGroup::Chest);
        let workout = CompleteWorkout { day_number: 1, exercises: vec![result(bench.id, Some(301.0))] };
        assert!(matches!(
            db.complete_workout(user_id, &workout, today()),
            Err(WorkoutError::InvalidEntry(_))
        ));
    }

    #[test]
    fn test_logs_for_sessions() {
        let (mut db, user_id) = create_db_with_routine();
        let bench = first_of(&db, user_id, MuscleGroup::Chest);
        let row = first_of(&db, user_id, MuscleGroup::Back);

        let day_one = CompleteWorkout { day_number: 1, exercises: vec![result(bench.id, None)] };
        let first = db.complete_workout(user_id, &day_one, today()).unwrap();
        let day_two = CompleteWorkout { day_number: 2, exercises: vec![result(row.id, None)] };
        let second = db.complete_workout(user_id, &day_two, today()).unwrap();

        let logs = db.logs_for_sessions(user_id, &[second.session_id]).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].exercise_id, row.id);

        let logs = db.logs_for_sessions(user_id, &[first.session_id, second.session_id]).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(db.logs_for_sessions(user_id, &[]).unwrap().is_empty());
        assert!(db.logs_for_sessions(999, &[first.session_id]).unwrap().is_empty());
    }

    #[test]
    fn test_recent_logs_limit() {
        let (mut db, user_id) = create_db_with_routine();
        let bench = first_of(&db, user_id, MuscleGroup::Chest);
        let workout = CompleteWorkout {
            day_number: 1,
            exercises: vec![result(bench.id, None), result(bench.id, None), result(bench.id, None)],
        };
        db.complete_workout(user_id, &workout, today()).unwrap();
        assert_eq!(db.recent_logs(user_id, 2).unwrap().len(), 2);
        assert_eq!(db.get_exercise(user_id, bench.id).unwrap().unwrap().times_performed, 3);
    }
}
