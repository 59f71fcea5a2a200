use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::{
    error::TransitionError,
    models::{ActiveExercise, LoggedSet, RestPeriod, SessionStatus, SetTargets},
};

/// One workout attempt. Fields are only changed through the transitions
/// below, so the cursor and rest invariants hold for every observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkoutSession {
    session_id: String,
    template_id: Option<String>,
    workout_name: String,
    exercises: Vec<ActiveExercise>,
    current_exercise_index: usize,
    current_set_index: usize,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    status: SessionStatus,
    rest: Option<RestPeriod>,
}

/// Where the cursor went after a set was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Next set of the same exercise.
    NextSet,
    /// First set of the next exercise.
    NextExercise,
    /// That was the last set of the workout.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestPolicy {
    Start,
    Suppress,
}

impl ActiveWorkoutSession {
    pub(crate) fn new(
        session_id: String,
        template_id: Option<String>,
        workout_name: String,
        exercises: Vec<ActiveExercise>,
        now: DateTime<Utc>,
    ) -> Self {
        assert!(!exercises.is_empty(), "a session needs at least one exercise");
        assert!(
            exercises
                .iter()
                .all(|e| e.sets > 0 && e.logged_sets.len() == e.sets as usize),
            "every exercise needs one logged-set slot per target set"
        );

        Self {
            session_id,
            template_id,
            workout_name,
            exercises,
            current_exercise_index: 0,
            current_set_index: 0,
            start_time: now,
            end_time: None,
            status: SessionStatus::InProgress,
            rest: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn workout_name(&self) -> &str {
        &self.workout_name
    }

    pub fn exercises(&self) -> &[ActiveExercise] {
        &self.exercises
    }

    pub fn current_exercise_index(&self) -> usize {
        self.current_exercise_index
    }

    pub fn current_set_index(&self) -> usize {
        self.current_set_index
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    pub fn rest(&self) -> Option<&RestPeriod> {
        self.rest.as_ref()
    }

    pub fn is_resting(&self) -> bool {
        self.rest.is_some()
    }

    /// The exercise awaiting input, or `None` once the workout is over.
    pub fn current_exercise(&self) -> Option<&ActiveExercise> {
        if !self.is_in_progress() {
            return None;
        }
        self.exercises.get(self.current_exercise_index)
    }

    /// Targets to display for the current set.
    pub fn targets(&self) -> Option<SetTargets> {
        self.current_exercise().map(SetTargets::from)
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets as usize).sum()
    }

    pub fn completed_sets(&self) -> usize {
        self.exercises.iter().map(ActiveExercise::completed_sets).sum()
    }

    /// Share of logged sets, in percent. Skipped sets count as done.
    pub fn progress_percent(&self) -> f64 {
        let total = self.total_sets();
        if total == 0 {
            return 0.0;
        }
        (self.completed_sets() as f64 / total as f64 * 100.0).min(100.0)
    }

    pub fn total_volume(&self) -> f32 {
        self.exercises.iter().map(ActiveExercise::volume).sum()
    }

    /// Log the current set with the given result and move on. Starts a rest
    /// period if the exercise just worked on has one configured.
    pub fn complete_set(
        &mut self,
        reps: u32,
        weight: f32,
        now: DateTime<Utc>,
    ) -> Result<Advance, TransitionError> {
        assert!(
            weight.is_finite() && weight >= 0.0,
            "weight must be a non-negative number, got {weight}"
        );
        self.log_and_advance(reps, weight, now, RestPolicy::Start)
    }

    /// Log the current set as a zero-result completion and move on without
    /// resting.
    pub fn skip_set(&mut self, now: DateTime<Utc>) -> Result<Advance, TransitionError> {
        self.log_and_advance(0, 0.0, now, RestPolicy::Suppress)
    }

    /// End the rest period now. Returns `false` if there was nothing to clear.
    pub fn skip_rest(&mut self) -> bool {
        self.clear_rest()
    }

    /// Clear the rest period if it has run out by `now`. Acts at most once
    /// per rest period, whatever cleared it first.
    pub fn expire_rest(&mut self, now: DateTime<Utc>) -> bool {
        match self.rest {
            Some(rest) if now >= rest.ends_at => self.clear_rest(),
            _ => false,
        }
    }

    /// Stop the workout where it is. Sets logged so far are kept; the set
    /// in flight is dropped.
    pub fn finish_early(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if !self.is_in_progress() {
            return Err(TransitionError::NotInProgress);
        }

        info!(
            "finishing session {} early ({}/{} sets)",
            self.session_id,
            self.completed_sets(),
            self.total_sets()
        );
        self.complete(now);
        Ok(())
    }

    fn log_and_advance(
        &mut self,
        reps: u32,
        weight: f32,
        now: DateTime<Utc>,
        policy: RestPolicy,
    ) -> Result<Advance, TransitionError> {
        if !self.is_in_progress() {
            return Err(TransitionError::NotInProgress);
        }
        if self.is_resting() {
            return Err(TransitionError::Resting);
        }

        let ex_idx = self.current_exercise_index;
        let set_idx = self.current_set_index;
        let exercise = &mut self.exercises[ex_idx];

        exercise.logged_sets[set_idx] = LoggedSet {
            set_index: set_idx as u32,
            reps: Some(reps),
            weight: Some(weight),
            completed_at: Some(now),
        };
        debug!(
            "logged {} set {}: {} x {}",
            exercise.name,
            set_idx + 1,
            weight,
            reps
        );

        let rest_seconds = exercise.rest_time_seconds;
        let last_set = set_idx + 1 == exercise.sets as usize;
        let last_exercise = ex_idx + 1 == self.exercises.len();

        let advance = match (last_set, last_exercise) {
            (true, true) => {
                self.complete(now);
                return Ok(Advance::Completed);
            }
            (true, false) => {
                self.current_exercise_index += 1;
                self.current_set_index = 0;
                Advance::NextExercise
            }
            (false, _) => {
                self.current_set_index += 1;
                Advance::NextSet
            }
        };

        match policy {
            RestPolicy::Start if rest_seconds > 0 => self.start_rest(rest_seconds, now),
            _ => {
                self.clear_rest();
            }
        }

        Ok(advance)
    }

    fn start_rest(&mut self, seconds: u32, now: DateTime<Utc>) {
        debug!("resting for {seconds}s");
        self.rest = Some(RestPeriod {
            duration_seconds: seconds,
            ends_at: now + Duration::seconds(i64::from(seconds)),
        });
    }

    /// The only path that ends a rest period.
    fn clear_rest(&mut self) -> bool {
        let cleared = self.rest.take().is_some();
        if cleared {
            debug!("rest cleared");
        }
        cleared
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Completed;
        self.end_time = Some(now);
        self.clear_rest();
        info!("session {} completed", self.session_id);
    }
}
