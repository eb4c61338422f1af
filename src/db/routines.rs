//! Weekly routines - days per week and muscle groups per day

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Database;
use crate::exercises::MuscleGroup;
use crate::planner::day_in_range;

/// Longest supported routine
pub const MAX_DAYS_PER_WEEK: u32 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct Routine {
    pub id: i64,
    pub user_id: i64,
    pub days_per_week: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Muscle groups trained on one routine day
#[derive(Debug, Clone, Deserialize)]
pub struct RoutineDay {
    pub day_number: u32,
    pub muscle_groups: Vec<MuscleGroup>,
}

/// Full replacement of a user's routine
#[derive(Debug, Clone, Deserialize)]
pub struct RoutineSetup {
    pub days_per_week: u32,
    #[serde(default)]
    pub routine_days: Vec<RoutineDay>,
}

impl RoutineSetup {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_DAYS_PER_WEEK).contains(&self.days_per_week) {
            return Err(format!("days_per_week must be between 1 and {}", MAX_DAYS_PER_WEEK));
        }
        Ok(())
    }
}

/// Routine as reported to clients; `days_per_week` is 0 when none is set up
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RoutineOverview {
    pub days_per_week: u32,
    pub routine_days: BTreeMap<u32, Vec<MuscleGroup>>,
}

fn routine_from_row(row: &Row) -> rusqlite::Result<Routine> {
    Ok(Routine {
        id: row.get(0)?,
        user_id: row.get(1)?,
        days_per_week: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub(crate) fn find_routine(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<Routine>> {
    conn.query_row(
        "SELECT id, user_id, days_per_week, created_at, updated_at FROM routines WHERE user_id = ?1",
        [user_id],
        routine_from_row,
    )
    .optional()
}

/// Muscle groups assigned to a day, in the order they were saved
pub(crate) fn muscle_groups_for_day(
    conn: &Connection,
    user_id: i64,
    day_number: u32,
) -> rusqlite::Result<Vec<MuscleGroup>> {
    let mut stmt = conn.prepare(
        "SELECT muscle_group FROM routine_muscles WHERE user_id = ?1 AND day_number = ?2 ORDER BY id",
    )?;
    let groups = stmt
        .query_map(params![user_id, day_number], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(groups)
}

impl Database {
    pub fn get_routine(&self, user_id: i64) -> Result<Option<Routine>> {
        Ok(find_routine(&self.conn, user_id)?)
    }

    /// Routine rows of a user (at most one)
    pub fn list_routines(&self, user_id: i64) -> Result<Vec<Routine>> {
        Ok(self.get_routine(user_id)?.into_iter().collect())
    }

    pub fn routine_overview(&self, user_id: i64) -> Result<RoutineOverview> {
        let Some(routine) = self.get_routine(user_id)? else {
            return Ok(RoutineOverview::default());
        };

        let mut stmt = self.conn.prepare(
            "SELECT day_number, muscle_group FROM routine_muscles WHERE user_id = ?1 ORDER BY day_number, id",
        )?;
        let rows = stmt
            .query_map([user_id], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, MuscleGroup>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut routine_days: BTreeMap<u32, Vec<MuscleGroup>> = BTreeMap::new();
        for (day, group) in rows {
            routine_days.entry(day).or_default().push(group);
        }

        Ok(RoutineOverview { days_per_week: routine.days_per_week, routine_days })
    }

    pub fn muscle_groups_for_day(&self, user_id: i64, day_number: u32) -> Result<Vec<MuscleGroup>> {
        Ok(muscle_groups_for_day(&self.conn, user_id, day_number)?)
    }

    /// Replace the user's routine, returning the number of day assignments stored.
    ///
    /// `setup` must be validated. Days outside the routine are skipped and a
    /// muscle group is stored once per day. A workout pointer beyond the new
    /// routine length restarts at day 1.
    pub fn save_routine(&mut self, user_id: i64, setup: &RoutineSetup) -> Result<usize> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM routine_muscles WHERE user_id = ?1", [user_id])?;
        tx.execute("DELETE FROM routines WHERE user_id = ?1", [user_id])?;
        tx.execute(
            "INSERT INTO routines (user_id, days_per_week, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![user_id, setup.days_per_week, now],
        )?;

        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO routine_muscles (user_id, day_number, muscle_group, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for day in &setup.routine_days {
                if !day_in_range(day.day_number, setup.days_per_week) {
                    debug!("Skipping day {} for user {}: outside routine", day.day_number, user_id);
                    continue;
                }
                for group in &day.muscle_groups {
                    stored += stmt.execute(params![user_id, day.day_number, group, now])?;
                }
            }
        }

        tx.execute(
            "UPDATE workout_states SET current_day_number = 1 WHERE user_id = ?1 AND current_day_number > ?2",
            params![user_id, setup.days_per_week],
        )?;

        tx.commit()?;
        info!("Saved {}-day routine for user {} ({} assignments)", setup.days_per_week, user_id, stored);
        Ok(stored)
    }

    /// Remove the routine and its day assignments
    pub fn delete_routine(&mut self, user_id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM routine_muscles WHERE user_id = ?1", [user_id])?;
        let removed = tx.execute("DELETE FROM routines WHERE user_id = ?1", [user_id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_db_with_user() -> (Database, i64) {
        let mut db = Database::open_in_memory().unwrap();
        let user = db.create_user("ann@example.com", "hash").unwrap();
        (db, user.id)
    }

    fn day(day_number: u32, groups: &[MuscleGroup]) -> RoutineDay {
        RoutineDay { day_number, muscle_groups: groups.to_vec() }
    }

    #[test]
    fn test_empty_overview() {
        let (db, user_id) = create_db_with_user();
        let overview = db.routine_overview(user_id).unwrap();
        assert_eq!(overview.days_per_week, 0);
        assert!(overview.routine_days.is_empty());
        assert!(db.list_routines(user_id).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_read_routine() {
        let (mut db, user_id) = create_db_with_user();
        let setup = RoutineSetup {
            days_per_week: 3,
            routine_days: vec![
                day(1, &[MuscleGroup::Chest, MuscleGroup::Triceps]),
                day(2, &[MuscleGroup::Back, MuscleGroup::Biceps]),
                day(3, &[MuscleGroup::Legs]),
            ],
        };
        assert_eq!(db.save_routine(user_id, &setup).unwrap(), 5);

        let overview = db.routine_overview(user_id).unwrap();
        assert_eq!(overview.days_per_week, 3);
        assert_eq!(overview.routine_days[&1], vec![MuscleGroup::Chest, MuscleGroup::Triceps]);
        assert_eq!(overview.routine_days[&3], vec![MuscleGroup::Legs]);
        assert_eq!(db.list_routines(user_id).unwrap().len(), 1);
    }

    #[test]
    fn test_save_skips_days_outside_routine() {
        let (mut db, user_id) = create_db_with_user();
        let setup = RoutineSetup {
            days_per_week: 2,
            routine_days: vec![
                day(0, &[MuscleGroup::Abs]),
                day(2, &[MuscleGroup::Legs]),
                day(5, &[MuscleGroup::Chest]),
            ],
        };
        assert_eq!(db.save_routine(user_id, &setup).unwrap(), 1);
        let overview = db.routine_overview(user_id).unwrap();
        assert_eq!(overview.routine_days.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_save_collapses_duplicate_groups() {
        let (mut db, user_id) = create_db_with_user();
        let setup = RoutineSetup {
            days_per_week: 1,
            routine_days: vec![day(1, &[MuscleGroup::Abs, MuscleGroup::Abs]), day(1, &[MuscleGroup::Abs])],
        };
        assert_eq!(db.save_routine(user_id, &setup).unwrap(), 1);
        assert_eq!(db.muscle_groups_for_day(user_id, 1).unwrap(), vec![MuscleGroup::Abs]);
    }

    #[test]
    fn test_save_replaces_previous_routine() {
        let (mut db, user_id) = create_db_with_user();
        let first = RoutineSetup { days_per_week: 2, routine_days: vec![day(2, &[MuscleGroup::Legs])] };
        db.save_routine(user_id, &first).unwrap();
        let second = RoutineSetup { days_per_week: 1, routine_days: vec![day(1, &[MuscleGroup::Chest])] };
        db.save_routine(user_id, &second).unwrap();

        let overview = db.routine_overview(user_id).unwrap();
        assert_eq!(overview.days_per_week, 1);
        assert_eq!(overview.routine_days.len(), 1);
        assert!(db.muscle_groups_for_day(user_id, 2).unwrap().is_empty());
    }

    #[test]
    fn test_shrinking_routine_resets_pointer() {
        let (mut db, user_id) = create_db_with_user();
        let setup = RoutineSetup { days_per_week: 5, routine_days: vec![] };
        db.save_routine(user_id, &setup).unwrap();
        db.workout_state(user_id).unwrap();
        db.conn
            .execute("UPDATE workout_states SET current_day_number = 4 WHERE user_id = ?1", [user_id])
            .unwrap();

        let setup = RoutineSetup { days_per_week: 3, routine_days: vec![] };
        db.save_routine(user_id, &setup).unwrap();
        assert_eq!(db.workout_state(user_id).unwrap().current_day_number, 1);
    }

    #[test]
    fn test_delete_routine() {
        let (mut db, user_id) = create_db_with_user();
        let setup = RoutineSetup { days_per_week: 1, routine_days: vec![day(1, &[MuscleGroup::Abs])] };
        db.save_routine(user_id, &setup).unwrap();
        assert!(db.delete_routine(user_id).unwrap());
        assert!(!db.delete_routine(user_id).unwrap());
        assert_eq!(db.routine_overview(user_id).unwrap(), RoutineOverview::default());
    }

    #[test]
    fn test_setup_validation() {
        assert!(RoutineSetup { days_per_week: 0, routine_days: vec![] }.validate().is_err());
        assert!(RoutineSetup { days_per_week: 8, routine_days: vec![] }.validate().is_err());
        assert!(RoutineSetup { days_per_week: 7, routine_days: vec![] }.validate().is_ok());
    }
}
