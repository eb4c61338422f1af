//! Default catalog and per-user exercises

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use super::Database;
use crate::exercises::{DEFAULT_EXERCISES, MuscleGroup};

/// Catalog template row
#[derive(Debug, Clone, Serialize)]
pub struct DefaultExercise {
    pub id: i64,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub link: Option<String>,
}

/// Exercise owned by one user
#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub current_weight: Option<f64>,
    pub is_in_routine: bool,
    pub times_performed: u32,
    pub link: Option<String>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of exercise create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseInput {
    pub name: String,
    pub muscle_group: MuscleGroup,
    #[serde(default)]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    /// Left unchanged on update when absent; new exercises default to in-routine
    #[serde(default)]
    pub is_in_routine: Option<bool>,
}

impl ExerciseInput {
    pub fn new(name: &str, muscle_group: MuscleGroup) -> Self {
        Self {
            name: name.to_string(),
            muscle_group,
            current_weight: None,
            link: None,
            comments: None,
            is_in_routine: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 || name_len > 50 {
            return Err("name must be between 1 and 50 characters".to_string());
        }
        if self.current_weight.is_some_and(|w| !(0.0..=300.0).contains(&w)) {
            return Err("current_weight must be between 0 and 300".to_string());
        }
        if self.link.as_ref().is_some_and(|l| l.chars().count() > 500) {
            return Err("link must be at most 500 characters".to_string());
        }
        if self.comments.as_ref().is_some_and(|c| c.chars().count() > 300) {
            return Err("comments must be at most 300 characters".to_string());
        }
        Ok(())
    }
}

const EXERCISE_COLUMNS: &str = "id, user_id, name, muscle_group, current_weight, is_in_routine, \
    times_performed, link, comments, created_at, updated_at";

fn exercise_from_row(row: &Row) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        muscle_group: row.get(3)?,
        current_weight: row.get(4)?,
        is_in_routine: row.get(5)?,
        times_performed: row.get(6)?,
        link: row.get(7)?,
        comments: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Copy every catalog template into the user's own exercises
pub(crate) fn clone_default_exercises(
    conn: &Connection,
    user_id: i64,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO exercises (user_id, name, muscle_group, link, created_at, updated_at)
         SELECT ?1, name, muscle_group, link, ?2, ?2 FROM default_exercises ORDER BY id",
        params![user_id, now],
    )
}

/// All exercises owned by a user, in creation order
pub(crate) fn user_exercises(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Exercise>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM exercises WHERE user_id = ?1 ORDER BY id",
        EXERCISE_COLUMNS
    ))?;
    let exercises = stmt
        .query_map([user_id], exercise_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(exercises)
}

pub(crate) fn find_exercise(
    conn: &Connection,
    user_id: i64,
    exercise_id: i64,
) -> rusqlite::Result<Option<Exercise>> {
    conn.query_row(
        &format!("SELECT {} FROM exercises WHERE id = ?1 AND user_id = ?2", EXERCISE_COLUMNS),
        [exercise_id, user_id],
        exercise_from_row,
    )
    .optional()
}

/// Ids of the user's in-routine exercises that train one of `groups`
pub(crate) fn routine_exercise_ids(
    conn: &Connection,
    user_id: i64,
    groups: &[MuscleGroup],
) -> rusqlite::Result<Vec<i64>> {
    Ok(user_exercises(conn, user_id)?
        .into_iter()
        .filter(|e| e.is_in_routine && groups.contains(&e.muscle_group))
        .map(|e| e.id)
        .collect())
}

impl Database {
    /// Get the catalog templates
    pub fn list_default_exercises(&self) -> Result<Vec<DefaultExercise>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, muscle_group, link FROM default_exercises ORDER BY id")?;

        let defaults = stmt
            .query_map([], |row| {
                Ok(DefaultExercise {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    muscle_group: row.get(2)?,
                    link: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(defaults)
    }

    /// Fill the catalog from the built-in list.
    ///
    /// Without `force` an already populated catalog is left alone. Existing
    /// user exercises are never touched.
    pub fn seed_default_exercises(&mut self, force: bool) -> Result<usize> {
        let tx = self.conn.transaction()?;

        let existing: i64 =
            tx.query_row("SELECT COUNT(*) FROM default_exercises", [], |row| row.get(0))?;
        if existing > 0 && !force {
            return Ok(0);
        }

        tx.execute("DELETE FROM default_exercises", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO default_exercises (name, muscle_group, link) VALUES (?1, ?2, ?3)",
            )?;
            for exercise in DEFAULT_EXERCISES {
                stmt.execute(params![exercise.name, exercise.muscle_group, exercise.link])?;
            }
        }

        tx.commit()?;
        Ok(DEFAULT_EXERCISES.len())
    }

    pub fn list_exercises(&self, user_id: i64) -> Result<Vec<Exercise>> {
        Ok(user_exercises(&self.conn, user_id)?)
    }

    pub fn get_exercise(&self, user_id: i64, exercise_id: i64) -> Result<Option<Exercise>> {
        Ok(find_exercise(&self.conn, user_id, exercise_id)?)
    }

    pub fn create_exercise(&self, user_id: i64, input: &ExerciseInput) -> Result<Exercise> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO exercises
                (user_id, name, muscle_group, current_weight, is_in_routine, link, comments, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                user_id,
                input.name.trim(),
                input.muscle_group,
                input.current_weight,
                input.is_in_routine.unwrap_or(true),
                input.link,
                input.comments,
                now,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        find_exercise(&self.conn, user_id, id)?
            .ok_or_else(|| anyhow::anyhow!("exercise {} vanished after insert", id))
    }

    /// Replace an exercise's editable fields; `None` if the user has no such exercise
    pub fn update_exercise(
        &self,
        user_id: i64,
        exercise_id: i64,
        input: &ExerciseInput,
    ) -> Result<Option<Exercise>> {
        let changed = self.conn.execute(
            "UPDATE exercises SET
                name = ?1,
                muscle_group = ?2,
                current_weight = ?3,
                link = ?4,
                comments = ?5,
                is_in_routine = COALESCE(?6, is_in_routine),
                updated_at = ?7
             WHERE id = ?8 AND user_id = ?9",
            params![
                input.name.trim(),
                input.muscle_group,
                input.current_weight,
                input.link,
                input.comments,
                input.is_in_routine,
                Utc::now(),
                exercise_id,
                user_id,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_exercise(user_id, exercise_id)
    }

    pub fn delete_exercise(&self, user_id: i64, exercise_id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM exercises WHERE id = ?1 AND user_id = ?2",
            [exercise_id, user_id],
        )?;
        Ok(changed > 0)
    }
}
