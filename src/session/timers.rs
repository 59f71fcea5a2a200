use chrono::{DateTime, Utc};

use super::ActiveWorkoutSession;

/// Wall-clock source for timestamps and timer math.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whole seconds from `start` to `now`, rounded down. Never negative.
pub fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_seconds().max(0) as u64
}

/// Seconds left until `ends_at`, rounded up. Zero once it has passed.
pub fn rest_remaining_seconds(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let ms = (ends_at - now).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms as u64).div_ceil(1000)
    }
}

impl ActiveWorkoutSession {
    /// Workout duration as of `now`; frozen at the end time once completed.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        elapsed_seconds(self.start_time(), self.end_time().unwrap_or(now))
    }
}

/// Result of sampling the rest countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTick {
    /// Not resting.
    Idle,
    /// Resting, with whole seconds left.
    Remaining(u64),
    /// This tick ended the rest period.
    Expired,
}

/// Sample the rest countdown and clear the rest period once it hits zero.
/// Clearing goes through the session's single rest-clearing path, so a tick
/// racing a manual skip reports `Idle` instead of clearing twice.
pub fn tick_rest(session: &mut ActiveWorkoutSession, now: DateTime<Utc>) -> RestTick {
    let Some(ends_at) = session.rest().map(|r| r.ends_at) else {
        return RestTick::Idle;
    };

    match rest_remaining_seconds(ends_at, now) {
        0 if session.expire_rest(now) => RestTick::Expired,
        0 => RestTick::Idle,
        left => RestTick::Remaining(left),
    }
}

/// Share of the rest period already spent, in percent.
pub fn rest_progress_percent(duration_seconds: u32, remaining: u64) -> f64 {
    if duration_seconds == 0 {
        return 0.0;
    }
    let spent = u64::from(duration_seconds).saturating_sub(remaining);
    spent as f64 / f64::from(duration_seconds) * 100.0
}
