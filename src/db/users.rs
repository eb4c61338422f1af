//! User accounts and profiles

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Database;
use super::exercises::clone_default_exercises;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    M,
    F,
    NB,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
            Sex::NB => "NB",
        }
    }
}

/// Preferred unit system for weights and heights
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl UnitPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitPreference::Metric => "metric",
            UnitPreference::Imperial => "imperial",
        }
    }
}

impl ToSql for Sex {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Sex {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "M" => Ok(Sex::M),
            "F" => Ok(Sex::F),
            "NB" => Ok(Sex::NB),
            other => Err(FromSqlError::Other(format!("unknown sex: {}", other).into())),
        }
    }
}

impl ToSql for UnitPreference {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for UnitPreference {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "metric" => Ok(UnitPreference::Metric),
            "imperial" => Ok(UnitPreference::Imperial),
            other => Err(FromSqlError::Other(format!("unknown unit preference: {}", other).into())),
        }
    }
}

/// Account record
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<u32>,
    pub unit_preference: UnitPreference,
    pub weight: Option<f64>,
    pub height: Option<u32>,
    pub subscription: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update, absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<u32>,
    pub unit_preference: Option<UnitPreference>,
    pub weight: Option<f64>,
    pub height: Option<u32>,
}

impl ProfileUpdate {
    /// Check field bounds before touching the database
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.as_ref().is_some_and(|v| v.chars().count() > 50) {
                return Err(format!("{} must be at most 50 characters", field));
            }
        }
        if self.age.is_some_and(|age| age > 100) {
            return Err("age must be between 0 and 100".to_string());
        }
        if self.weight.is_some_and(|w| !(w > 0.0 && w <= 300.0)) {
            return Err("weight must be greater than 0 and at most 300".to_string());
        }
        if self.height.is_some_and(|h| h == 0 || h > 300) {
            return Err("height must be between 1 and 300".to_string());
        }
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, sex, age, \
    unit_preference, weight, height, subscription, is_active, created_at, updated_at";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        sex: row.get(5)?,
        age: row.get(6)?,
        unit_preference: row.get(7)?,
        weight: row.get(8)?,
        height: row.get(9)?,
        subscription: row.get(10)?,
        is_active: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

pub(crate) fn find_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        [user_id],
        user_from_row,
    )
    .optional()
}

pub(crate) fn user_exists(conn: &Connection, user_id: i64) -> rusqlite::Result<bool> {
    conn.query_row("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)", [user_id], |row| {
        row.get(0)
    })
}

impl Database {
    /// Create an account and give it a copy of the default exercise catalog.
    ///
    /// `email` must already be normalized; uniqueness is checked by the caller.
    pub fn create_user(&mut self, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO users (email, password_hash, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![email, password_hash, now],
        )?;
        let user_id = tx.last_insert_rowid();
        let copied = clone_default_exercises(&tx, user_id, now)?;
        let user = find_user(&tx, user_id)?
            .ok_or_else(|| anyhow::anyhow!("user {} vanished after insert", user_id))?;

        tx.commit()?;
        info!("Registered user {} with {} exercises", user_id, copied);
        Ok(user)
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(find_user(&self.conn, user_id)?)
    }

    pub fn user_exists(&self, user_id: i64) -> Result<bool> {
        Ok(user_exists(&self.conn, user_id)?)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                [email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Apply a profile update, returning the new profile or `None` for an unknown user
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<Option<User>> {
        let changed = self.conn.execute(
            "UPDATE users SET
                first_name = COALESCE(?1, first_name),
                last_name = COALESCE(?2, last_name),
                sex = COALESCE(?3, sex),
                age = COALESCE(?4, age),
                unit_preference = COALESCE(?5, unit_preference),
                weight = COALESCE(?6, weight),
                height = COALESCE(?7, height),
                updated_at = ?8
             WHERE id = ?9",
            params![
                update.first_name,
                update.last_name,
                update.sex,
                update.age,
                update.unit_preference,
                update.weight,
                update.height,
                Utc::now(),
                user_id,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_user(user_id)
    }

    /// Activate or deactivate an account
    pub fn set_user_active(&self, user_id: i64, active: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![active, Utc::now(), user_id],
        )?;
        Ok(changed > 0)
    }

    /// Delete an account and everything it owns
    pub fn delete_user(&self, user_id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_db_with_user() -> (Database, User) {
        let mut db = Database::open_in_memory().unwrap();
        let user = db.create_user("ann@example.com", "hash").unwrap();
        (db, user)
    }

    #[test]
    fn test_create_user_defaults() {
        let (_db, user) = create_db_with_user();
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.unit_preference, UnitPreference::Metric);
        assert!(user.is_active);
        assert_eq!(user.subscription, 0);
        assert!(user.first_name.is_none());
    }

    #[test]
    fn test_create_user_copies_catalog() {
        let (db, user) = create_db_with_user();
        let exercises = db.list_exercises(user.id).unwrap();
        assert_eq!(exercises.len(), crate::exercises::DEFAULT_EXERCISES.len());
        assert!(exercises.iter().all(|e| e.user_id == user.id && e.times_performed == 0));
    }

    #[test]
    fn test_duplicate_email_rejected_by_schema() {
        let (mut db, _user) = create_db_with_user();
        assert!(db.create_user("ann@example.com", "other").is_err());
    }

    #[test]
    fn test_find_user_by_email() {
        let (db, user) = create_db_with_user();
        assert_eq!(db.find_user_by_email("ann@example.com").unwrap().unwrap().id, user.id);
        assert!(db.find_user_by_email("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn test_update_profile_partial() {
        let (db, user) = create_db_with_user();
        let update = ProfileUpdate {
            first_name: Some("Ann".to_string()),
            age: Some(31),
            sex: Some(Sex::F),
            ..Default::default()
        };
        let updated = db.update_profile(user.id, &update).unwrap().unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Ann"));
        assert_eq!(updated.age, Some(31));
        assert_eq!(updated.sex, Some(Sex::F));

        let update = ProfileUpdate { weight: Some(62.5), ..Default::default() };
        let updated = db.update_profile(user.id, &update).unwrap().unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Ann"));
        assert_eq!(updated.weight, Some(62.5));
    }

    #[test]
    fn test_update_profile_unknown_user() {
        let (db, _user) = create_db_with_user();
        assert!(db.update_profile(999, &ProfileUpdate::default()).unwrap().is_none());
    }

    #[test]
    fn test_profile_validation() {
        assert!(ProfileUpdate::default().validate().is_ok());
        assert!(ProfileUpdate { age: Some(101), ..Default::default() }.validate().is_err());
        assert!(ProfileUpdate { weight: Some(0.0), ..Default::default() }.validate().is_err());
        assert!(ProfileUpdate { weight: Some(300.0), ..Default::default() }.validate().is_ok());
        assert!(ProfileUpdate { height: Some(0), ..Default::default() }.validate().is_err());
        assert!(ProfileUpdate { first_name: Some("x".repeat(51)), ..Default::default() }
            .validate()
            .is_err());
    }

    #[test]
    fn test_set_user_active() {
        let (db, user) = create_db_with_user();
        assert!(db.set_user_active(user.id, false).unwrap());
        assert!(!db.get_user(user.id).unwrap().unwrap().is_active);
        assert!(!db.set_user_active(999, false).unwrap());
    }

    #[test]
    fn test_delete_user_cascades() {
        let (db, user) = create_db_with_user();
        assert!(db.delete_user(user.id).unwrap());
        assert!(db.list_exercises(user.id).unwrap().is_empty());
        assert!(!db.user_exists(user.id).unwrap());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let (_db, user) = create_db_with_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["unit_preference"], "metric");
    }
}
