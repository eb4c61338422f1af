//! Exercise catalog - muscle groups and the default exercise templates

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Muscle groups used to bucket exercises and plan routine days
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String")]
pub enum MuscleGroup {
    Biceps,
    Back,
    Triceps,
    Shoulders,
    Legs,
    Glutes,
    Chest,
    Calves,
    Abs,
}

impl MuscleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Back => "Back",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Glutes => "Glutes",
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Calves => "Calves",
            MuscleGroup::Abs => "Abs",
        }
    }

    /// All muscle groups for iteration
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Biceps,
            MuscleGroup::Back,
            MuscleGroup::Triceps,
            MuscleGroup::Shoulders,
            MuscleGroup::Legs,
            MuscleGroup::Glutes,
            MuscleGroup::Chest,
            MuscleGroup::Calves,
            MuscleGroup::Abs,
        ]
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MuscleGroup::all()
            .iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown muscle group: {}", s))
    }
}

impl TryFrom<String> for MuscleGroup {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl ToSql for MuscleGroup {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MuscleGroup {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Catalog template copied into every new account
#[derive(Debug, Clone)]
pub struct CatalogExercise {
    pub name: &'static str,
    pub muscle_group: MuscleGroup,
    pub link: Option<&'static str>,
}

const fn ex(name: &'static str, muscle_group: MuscleGroup) -> CatalogExercise {
    CatalogExercise { name, muscle_group, link: None }
}

/// Built-in default catalog, used to seed an empty `default_exercises` table
pub const DEFAULT_EXERCISES: &[CatalogExercise] = &[
    // Biceps
    ex("Barbell Curl", MuscleGroup::Biceps),
    ex("Dumbbell Curl", MuscleGroup::Biceps),
    ex("Hammer Curl", MuscleGroup::Biceps),
    ex("Preacher Curl", MuscleGroup::Biceps),
    ex("Cable Curl", MuscleGroup::Biceps),
    // Back
    ex("Pull-Up", MuscleGroup::Back),
    ex("Lat Pulldown", MuscleGroup::Back),
    ex("Barbell Row", MuscleGroup::Back),
    ex("Seated Cable Row", MuscleGroup::Back),
    ex("Single-Arm Dumbbell Row", MuscleGroup::Back),
    // Triceps
    ex("Triceps Pushdown", MuscleGroup::Triceps),
    ex("Skull Crusher", MuscleGroup::Triceps),
    ex("Overhead Triceps Extension", MuscleGroup::Triceps),
    ex("Close-Grip Bench Press", MuscleGroup::Triceps),
    ex("Dips", MuscleGroup::Triceps),
    // Shoulders
    ex("Overhead Press", MuscleGroup::Shoulders),
    ex("Dumbbell Shoulder Press", MuscleGroup::Shoulders),
    ex("Lateral Raise", MuscleGroup::Shoulders),
    ex("Rear Delt Fly", MuscleGroup::Shoulders),
    ex("Face Pull", MuscleGroup::Shoulders),
    // Legs
    ex("Back Squat", MuscleGroup::Legs),
    ex("Leg Press", MuscleGroup::Legs),
    ex("Romanian Deadlift", MuscleGroup::Legs),
    ex("Walking Lunge", MuscleGroup::Legs),
    ex("Leg Extension", MuscleGroup::Legs),
    ex("Leg Curl", MuscleGroup::Legs),
    // Glutes
    ex("Hip Thrust", MuscleGroup::Glutes),
    ex("Glute Bridge", MuscleGroup::Glutes),
    ex("Cable Kickback", MuscleGroup::Glutes),
    ex("Bulgarian Split Squat", MuscleGroup::Glutes),
    // Chest
    ex("Bench Press", MuscleGroup::Chest),
    ex("Incline Dumbbell Press", MuscleGroup::Chest),
    ex("Cable Fly", MuscleGroup::Chest),
    ex("Push-Up", MuscleGroup::Chest),
    ex("Chest Press Machine", MuscleGroup::Chest),
    // Calves
    ex("Standing Calf Raise", MuscleGroup::Calves),
    ex("Seated Calf Raise", MuscleGroup::Calves),
    ex("Donkey Calf Raise", MuscleGroup::Calves),
    // Abs
    ex("Plank", MuscleGroup::Abs),
    ex("Hanging Leg Raise", MuscleGroup::Abs),
    ex("Cable Crunch", MuscleGroup::Abs),
    ex("Ab Wheel Rollout", MuscleGroup::Abs),
];

/// Catalog entries for one muscle group
pub fn catalog_for(group: MuscleGroup) -> impl Iterator<Item = &'static CatalogExercise> {
    DEFAULT_EXERCISES.iter().filter(move |e| e.muscle_group == group)
}
