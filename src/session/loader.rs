use chrono::{DateTime, Utc};
use log::{debug, info};
use uuid::Uuid;

use crate::{
    error::LoadError,
    models::{ActiveExercise, LoggedSet, TemplateExercise},
    session::ActiveWorkoutSession,
    templates::TemplateRepository,
};

/// Targets used for template exercises that don't specify their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionDefaults {
    pub sets: u32,
    pub reps: u32,
    pub weight: f32,
    pub rest_seconds: u32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            sets: 3,
            reps: 10,
            weight: 50.0,
            rest_seconds: 60,
        }
    }
}

/// Build a fresh session from the template `template_id`.
pub fn load<R>(
    repo: &R,
    template_id: Option<&str>,
    defaults: &SessionDefaults,
    now: DateTime<Utc>,
) -> Result<ActiveWorkoutSession, LoadError>
where
    R: TemplateRepository + ?Sized,
{
    assert!(defaults.sets > 0, "default set count must be positive");

    let template_id = template_id.ok_or(LoadError::NoTemplateSpecified)?;
    let template = repo
        .lookup(template_id)
        .ok_or_else(|| LoadError::TemplateNotFound(template_id.to_string()))?;

    if template.exercises.is_empty() {
        return Err(LoadError::EmptyTemplate(template_id.to_string()));
    }

    let exercises: Vec<ActiveExercise> = template
        .exercises
        .iter()
        .enumerate()
        .map(|(i, e)| materialize(template_id, i, e, defaults))
        .collect();

    debug!(
        "materialized {} exercise(s) from template `{}`",
        exercises.len(),
        template_id
    );

    let session = ActiveWorkoutSession::new(
        Uuid::new_v4().to_string(),
        Some(template_id.to_string()),
        template.name.clone(),
        exercises,
        now,
    );
    info!("started session {} ({})", session.session_id(), template.name);

    Ok(session)
}

fn materialize(
    template_id: &str,
    index: usize,
    exercise: &TemplateExercise,
    defaults: &SessionDefaults,
) -> ActiveExercise {
    let sets = exercise.sets.filter(|&s| s > 0).unwrap_or(defaults.sets);

    ActiveExercise {
        id: format!("{template_id}-ex{index}-{}", Uuid::new_v4()),
        name: exercise.name.clone(),
        sets,
        reps: exercise.reps.unwrap_or(defaults.reps),
        weight: exercise.weight.unwrap_or(defaults.weight),
        rest_time_seconds: exercise.rest_seconds.unwrap_or(defaults.rest_seconds),
        logged_sets: (0..sets).map(LoggedSet::empty).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{SessionStatus, WorkoutTemplate},
        templates::{TemplateCatalog, TemplateCategory},
    };

    fn catalog() -> TemplateCatalog {
        let mut detailed = WorkoutTemplate::from_names("heavy", "Heavy", ["Squat", "Bench"]);
        detailed.exercises[0].sets = Some(5);
        detailed.exercises[0].weight = Some(140.0);
        detailed.exercises[1].sets = Some(0);
        detailed.exercises[1].rest_seconds = Some(0);

        TemplateCatalog {
            categories: vec![TemplateCategory {
                name: "test".into(),
                templates: vec![detailed, WorkoutTemplate::from_names("empty", "Empty", Vec::<String>::new())],
            }],
        }
    }

    #[test]
    fn builds_placeholder_targets_from_names() {
        let repo = TemplateCatalog::builtin();
        let s = load(&repo, Some("b1"), &SessionDefaults::default(), Utc::now()).unwrap();

        assert_eq!(s.workout_name(), "Day 1");
        assert_eq!(s.template_id(), Some("b1"));
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert_eq!(s.exercises().len(), 3);
        for ex in s.exercises() {
            assert_eq!((ex.sets, ex.reps, ex.weight, ex.rest_time_seconds), (3, 10, 50.0, 60));
            assert_eq!(ex.logged_sets.len(), 3);
            assert!(ex.logged_sets.iter().all(|l| !l.is_done()));
            assert!(ex.id.starts_with("b1-ex"));
        }
        assert_eq!((s.current_exercise_index(), s.current_set_index()), (0, 0));
        assert!(!s.is_resting());
    }

    #[test]
    fn template_targets_override_defaults() {
        let s = load(&catalog(), Some("heavy"), &SessionDefaults::default(), Utc::now()).unwrap();
        let squat = &s.exercises()[0];
        assert_eq!((squat.sets, squat.weight, squat.reps), (5, 140.0, 10));
        assert_eq!(squat.logged_sets.len(), 5);

        let bench = &s.exercises()[1];
        assert_eq!(bench.sets, 3);
        assert_eq!(bench.rest_time_seconds, 0);
    }

    #[test]
    fn reports_each_load_failure() {
        let repo = catalog();
        let defaults = SessionDefaults::default();
        let now = Utc::now();

        assert_eq!(load(&repo, None, &defaults, now), Err(LoadError::NoTemplateSpecified));
        assert_eq!(
            load(&repo, Some("nonexistent-id"), &defaults, now),
            Err(LoadError::TemplateNotFound("nonexistent-id".into()))
        );
        assert_eq!(
            load(&repo, Some("empty"), &defaults, now),
            Err(LoadError::EmptyTemplate("empty".into()))
        );
    }

    #[test]
    fn session_ids_are_unique() {
        let repo = TemplateCatalog::builtin();
        let d = SessionDefaults::default();
        let a = load(&repo, Some("bwA"), &d, Utc::now()).unwrap();
        let b = load(&repo, Some("bwA"), &d, Utc::now()).unwrap();
        assert_ne!(a.session_id(), b.session_id());
    }
}
