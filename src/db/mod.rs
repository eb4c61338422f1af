//! Database module - SQLite storage for accounts, routines and workouts

pub mod exercises;
pub mod routines;
pub mod schema;
pub mod selections;
pub mod users;
pub mod workouts;

use anyhow::Result;
use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::info;

pub use exercises::{DefaultExercise, Exercise, ExerciseInput};
pub use routines::{Routine, RoutineDay, RoutineOverview, RoutineSetup};
pub use selections::{GeneratedWorkout, Selection, ToggleSelection};
pub use users::{ProfileUpdate, Sex, UnitPreference, User};
pub use workouts::{
    CompleteWorkout, CompletedWorkout, ExerciseResult, WorkoutLog, WorkoutSession, WorkoutState,
};

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database (for tests)
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let mut db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema and seed the default catalog on first run
    fn init_schema(&mut self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(schema::SCHEMA)?;

        let catalog_size: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM default_exercises", [], |row| row.get(0))?;
        if catalog_size == 0 {
            let seeded = self.seed_default_exercises(false)?;
            info!("Seeded {} default exercises", seeded);
        }

        Ok(())
    }
}

/// `?, ?, ?` for an `IN (...)` clause with `n` values
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Bind values for a query filtered by user and a list of ids
fn user_and_ids(user_id: i64, ids: &[i64]) -> Vec<Value> {
    std::iter::once(Value::Integer(user_id))
        .chain(ids.iter().map(|id| Value::Integer(*id)))
        .collect()
}
