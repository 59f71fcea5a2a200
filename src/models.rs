use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, ordered list of exercises used to seed a workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<TemplateExercise>,
}

impl WorkoutTemplate {
    /// Template that only knows its exercise names.
    pub fn from_names<I, S>(id: &str, name: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            exercises: names.into_iter().map(TemplateExercise::named).collect(),
        }
    }

    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|e| e.name.as_str())
    }
}

/// One exercise of a template. Unset targets are filled in from the
/// session defaults when the session is loaded.
///
/// Deserializes from either a bare exercise name or a table of targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExerciseEntry")]
pub struct TemplateExercise {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
}

impl TemplateExercise {
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            sets: None,
            reps: None,
            weight: None,
            rest_seconds: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExerciseEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        sets: Option<u32>,
        #[serde(default)]
        reps: Option<u32>,
        #[serde(default)]
        weight: Option<f32>,
        #[serde(default)]
        rest_seconds: Option<u32>,
    },
}

impl From<ExerciseEntry> for TemplateExercise {
    fn from(entry: ExerciseEntry) -> Self {
        match entry {
            ExerciseEntry::Name(name) => Self::named(name),
            ExerciseEntry::Detailed {
                name,
                sets,
                reps,
                weight,
                rest_seconds,
            } => Self {
                name,
                sets,
                reps,
                weight,
                rest_seconds,
            },
        }
    }
}

/// Result of one set. Every field stays unset until the set is completed
/// or skipped; a skip is logged as a zero-result completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSet {
    pub set_index: u32,
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LoggedSet {
    pub fn empty(set_index: u32) -> Self {
        Self {
            set_index,
            reps: None,
            weight: None,
            completed_at: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// An exercise being performed during a session.
/// `logged_sets` always holds exactly `sets` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveExercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f32,
    pub rest_time_seconds: u32,
    pub logged_sets: Vec<LoggedSet>,
}

impl ActiveExercise {
    pub fn completed_sets(&self) -> usize {
        self.logged_sets.iter().filter(|s| s.is_done()).count()
    }

    /// Sum of reps x weight over the logged sets.
    pub fn volume(&self) -> f32 {
        self.logged_sets
            .iter()
            .filter_map(|s| Some(s.reps? as f32 * s.weight?))
            .sum()
    }
}

/// Workout status. Only `InProgress` and `Completed` are produced by the
/// session engine; the other variants are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };

        write!(f, "{}", s)
    }
}

/// A running rest period. Duration and end time only exist together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestPeriod {
    pub duration_seconds: u32,
    pub ends_at: DateTime<Utc>,
}

/// Target reps/weight shown to the user for the current set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetTargets {
    pub reps: u32,
    pub weight: f32,
}

impl From<&ActiveExercise> for SetTargets {
    fn from(ex: &ActiveExercise) -> Self {
        Self {
            reps: ex.reps,
            weight: ex.weight,
        }
    }
}
