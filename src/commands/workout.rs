use std::{io::Write, time::Duration};

use anyhow::{Result, anyhow};
use colored::Colorize;
use log::debug;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{self, MissedTickBehavior},
};

use crate::{
    error::LoadError,
    models::SetTargets,
    session::{ActiveWorkoutSession, Advance, Clock, RestTick, SessionDefaults, SystemClock, load, tick_rest},
    templates::{TemplateCatalog, suggest_template},
    types::{OutputFmt, emit},
    utils::{format_elapsed, format_weight, progress_bar, terminal_width},
};

/// One line of user input during a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Finish the current set; unset values fall back to the displayed targets.
    Complete { reps: Option<u32>, weight: Option<f32> },
    Skip,
    SkipRest,
    Finish,
    Help,
}

pub fn parse_input(line: &str) -> Result<Input> {
    let mut words = line.split_whitespace().peekable();

    let first = match words.peek() {
        None => return Ok(Input::Complete { reps: None, weight: None }),
        Some(w) => w.to_ascii_lowercase(),
    };

    match first.as_str() {
        "s" | "skip" => return single(words, Input::Skip),
        "r" | "rest" => return single(words, Input::SkipRest),
        "f" | "finish" => return single(words, Input::Finish),
        "?" | "h" | "help" => return single(words, Input::Help),
        "d" | "done" => {
            words.next();
        }
        _ => {}
    }

    let reps = words.next().map(parse_reps).transpose()?;
    let weight = words.next().map(parse_weight).transpose()?;
    if let Some(extra) = words.next() {
        return Err(anyhow!("unexpected `{extra}`"));
    }

    Ok(Input::Complete { reps, weight })
}

fn single<'a>(mut words: impl Iterator<Item = &'a str>, input: Input) -> Result<Input> {
    words.next();
    match words.next() {
        Some(extra) => Err(anyhow!("unexpected `{extra}`")),
        None => Ok(input),
    }
}

fn parse_reps(raw: &str) -> Result<u32> {
    let n: i64 = raw
        .parse()
        .map_err(|_| anyhow!("reps must be a whole number, got `{raw}`"))?;
    u32::try_from(n).map_err(|_| anyhow!("reps must be zero or more, got `{raw}`"))
}

fn parse_weight(raw: &str) -> Result<f32> {
    let raw_num = raw.trim_end_matches("kg");
    let w: f32 = raw_num
        .parse()
        .map_err(|_| anyhow!("weight must be a number, got `{raw}`"))?;
    if !w.is_finite() || w < 0.0 {
        return Err(anyhow!("weight must be zero or more, got `{raw}`"));
    }
    Ok(w)
}

/// What happened in response to an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feedback {
    Logged { reps: u32, weight: f32, advance: Advance },
    Skipped(Advance),
    RestSkipped,
    NotResting,
    /// Set actions are disabled while resting.
    StillResting,
    Finished,
    Help,
}

/// Drives one session from user input and timer ticks. Owns the session
/// and the targets currently on display.
pub struct Runner<C: Clock> {
    session: ActiveWorkoutSession,
    clock: C,
    targets: Option<SetTargets>,
    elapsed: u64,
    rest_left: u64,
}

impl<C: Clock> Runner<C> {
    pub fn new(session: ActiveWorkoutSession, clock: C) -> Self {
        let targets = session.targets();
        Self {
            session,
            clock,
            targets,
            elapsed: 0,
            rest_left: 0,
        }
    }

    pub fn session(&self) -> &ActiveWorkoutSession {
        &self.session
    }

    pub fn into_session(self) -> ActiveWorkoutSession {
        self.session
    }

    pub fn targets(&self) -> Option<SetTargets> {
        self.targets
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn rest_left(&self) -> u64 {
        self.rest_left
    }

    pub fn apply(&mut self, input: Input) -> Feedback {
        let now = self.clock.now();

        match input {
            Input::Help => Feedback::Help,

            Input::Complete { .. } | Input::Skip if self.session.is_resting() => {
                Feedback::StillResting
            }

            Input::Complete { reps, weight } => {
                let Some(targets) = self.targets else {
                    return Feedback::Finished;
                };
                let reps = reps.unwrap_or(targets.reps);
                let weight = weight.unwrap_or(targets.weight);

                match self.session.complete_set(reps, weight, now) {
                    Ok(advance) => {
                        self.after_advance();
                        Feedback::Logged { reps, weight, advance }
                    }
                    Err(e) => {
                        debug!("complete_set rejected: {e}");
                        Feedback::Finished
                    }
                }
            }

            Input::Skip => match self.session.skip_set(now) {
                Ok(advance) => {
                    self.after_advance();
                    Feedback::Skipped(advance)
                }
                Err(e) => {
                    debug!("skip_set rejected: {e}");
                    Feedback::Finished
                }
            },

            Input::SkipRest => {
                if self.session.skip_rest() {
                    self.rest_left = 0;
                    self.reseed();
                    Feedback::RestSkipped
                } else {
                    Feedback::NotResting
                }
            }

            Input::Finish => {
                if let Err(e) = self.session.finish_early(now) {
                    debug!("finish_early rejected: {e}");
                }
                self.rest_left = 0;
                self.targets = None;
                Feedback::Finished
            }
        }
    }

    /// Re-sample the workout clock.
    pub fn tick_elapsed(&mut self) -> u64 {
        self.elapsed = self.session.elapsed_seconds(self.clock.now());
        self.elapsed
    }

    /// Re-sample the rest countdown, ending the rest period at zero.
    pub fn tick_rest(&mut self) -> RestTick {
        let tick = tick_rest(&mut self.session, self.clock.now());
        match tick {
            RestTick::Remaining(left) => self.rest_left = left,
            RestTick::Expired => {
                self.rest_left = 0;
                self.reseed();
            }
            RestTick::Idle => self.rest_left = 0,
        }
        tick
    }

    fn after_advance(&mut self) {
        match self.session.rest() {
            Some(rest) => self.rest_left = u64::from(rest.duration_seconds),
            None => self.rest_left = 0,
        }
        self.reseed();
    }

    fn reseed(&mut self) {
        self.targets = self.session.targets();
    }
}

pub async fn handle(
    template: Option<String>,
    rest: Option<u32>,
    catalog: &TemplateCatalog,
    mut defaults: SessionDefaults,
    fmt: OutputFmt,
) -> Result<()> {
    if let Some(rest) = rest {
        defaults.rest_seconds = rest;
    }

    let clock = SystemClock;
    let session = match load(catalog, template.as_deref(), &defaults, clock.now()) {
        Ok(s) => s,
        Err(e) => {
            println!("{} {}", "error:".red().bold(), e);
            match &e {
                LoadError::NoTemplateSpecified => println!(
                    "  {} blank workouts are not supported; pick one from `speedrun template list`",
                    "hint:".blue().bold()
                ),
                LoadError::TemplateNotFound(id) => {
                    if let Some(s) = suggest_template(catalog, id) {
                        println!("  {} did you mean `{}`?", "hint:".blue().bold(), s);
                    }
                }
                LoadError::EmptyTemplate(_) => {}
            }
            return Ok(());
        }
    };

    let mut runner = Runner::new(session, clock);
    print_header(&runner);
    print_prompt(&runner);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut elapsed_tick = time::interval(Duration::from_secs(1));
    elapsed_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rest_tick = time::interval(Duration::from_millis(500));
    rest_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while runner.session().is_in_progress() {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!();
                    runner.apply(Input::Finish);
                    break;
                };

                match parse_input(&line) {
                    Ok(input) => {
                        let feedback = runner.apply(input);
                        report(&runner, feedback);
                    }
                    Err(e) => println!("{} {}", "error:".red().bold(), e),
                }
                if runner.session().is_in_progress() {
                    print_prompt(&runner);
                }
            }

            _ = elapsed_tick.tick() => {
                runner.tick_elapsed();
            }

            _ = rest_tick.tick(), if runner.session().is_resting() => {
                match runner.tick_rest() {
                    RestTick::Remaining(left) => print_countdown(&runner, left),
                    RestTick::Expired => {
                        println!("\n{} rest over", "ok:".green().bold());
                        print_prompt(&runner);
                    }
                    RestTick::Idle => {}
                }
            }
        }
    }

    runner.tick_elapsed();
    let session = runner.into_session();
    emit(fmt, &session, || print_summary(&session))
}

fn print_header<C: Clock>(runner: &Runner<C>) {
    let session = runner.session();
    println!(
        "{} {} ({} exercises, {} sets)",
        "Workout:".cyan().bold(),
        session.workout_name().bold(),
        session.exercises().len(),
        session.total_sets()
    );
    println!(
        "{}",
        "enter = done with targets, <reps> [weight] = done with values, s = skip set, r = skip rest, f = finish, ? = help"
            .dimmed()
    );
}

fn print_prompt<C: Clock>(runner: &Runner<C>) {
    let session = runner.session();
    let (Some(ex), Some(targets)) = (session.current_exercise(), runner.targets()) else {
        return;
    };

    let bar_w = (terminal_width() / 4).clamp(10, 40);
    println!(
        "\n{} {}  {}",
        format_elapsed(runner.elapsed()).dimmed(),
        progress_bar(session.progress_percent(), bar_w),
        format!("{}/{} sets", session.completed_sets(), session.total_sets()).dimmed()
    );

    if session.is_resting() {
        return;
    }

    print!(
        "{} — set {}/{} — target {} × {}kg > ",
        ex.name.bold(),
        session.current_set_index() + 1,
        ex.sets,
        targets.reps,
        format_weight(targets.weight)
    );
    let _ = std::io::stdout().flush();
}

fn print_countdown<C: Clock>(runner: &Runner<C>, left: u64) {
    let Some(rest) = runner.session().rest() else {
        return;
    };

    let pct = crate::session::timers::rest_progress_percent(rest.duration_seconds, left);
    print!(
        "\r{} {} {}   ",
        "Rest".cyan().bold(),
        format_elapsed(left).bold(),
        progress_bar(pct, 22)
    );
    let _ = std::io::stdout().flush();
}

fn report<C: Clock>(runner: &Runner<C>, feedback: Feedback) {
    match feedback {
        Feedback::Logged { reps, weight, advance } => {
            println!("{} {} × {}kg", "ok:".green().bold(), reps, format_weight(weight));
            report_advance(runner, advance);
        }
        Feedback::Skipped(advance) => {
            println!("{} set skipped", "info:".blue().bold());
            report_advance(runner, advance);
        }
        Feedback::RestSkipped => println!("{} rest skipped", "info:".blue().bold()),
        Feedback::NotResting => println!("{} not resting", "warning:".yellow().bold()),
        Feedback::StillResting => println!(
            "{} resting, press `r` to skip the rest",
            "warning:".yellow().bold()
        ),
        Feedback::Finished => println!("{} workout finished", "ok:".green().bold()),
        Feedback::Help => {
            println!("  {:<18} complete the set with the shown targets", "enter / d");
            println!("  {:<18} complete the set with your numbers", "<reps> [weight]");
            println!("  {:<18} skip the set (logged as 0 × 0)", "s");
            println!("  {:<18} skip the rest period", "r");
            println!("  {:<18} finish the workout now", "f");
        }
    }
}

fn report_advance<C: Clock>(runner: &Runner<C>, advance: Advance) {
    let session = runner.session();
    match advance {
        Advance::NextExercise => {
            if let Some(ex) = session.current_exercise() {
                println!("{} {}", "Next:".cyan().bold(), ex.name.bold());
            }
        }
        Advance::NextSet => {}
        Advance::Completed => println!("{} all sets done", "ok:".green().bold()),
    }

    if let Some(rest) = session.rest() {
        println!("{} {}s", "Rest:".cyan().bold(), rest.duration_seconds);
    }
}

fn print_summary(session: &ActiveWorkoutSession) {
    println!("\n{} {}", "Session:".cyan().bold(), session.workout_name().bold());

    for (i, ex) in session.exercises().iter().enumerate() {
        println!("{} • {}", format!("{}", i + 1).yellow(), ex.name.bold());
        for set in &ex.logged_sets {
            let line = match (set.completed_at, set.reps, set.weight) {
                (Some(_), Some(0), Some(w)) if w == 0.0 => "skipped".dimmed().to_string(),
                (Some(_), Some(r), Some(w)) => format!("{}kg × {}", format_weight(w), r),
                _ => "—".dimmed().to_string(),
            };
            println!("    Set {}: {}", set.set_index + 1, line);
        }
    }

    let duration = session
        .end_time()
        .map(|end| format_elapsed(session.elapsed_seconds(end)))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "\n{} {}/{} sets, {}kg volume, {}",
        "Done:".green().bold(),
        session.completed_sets(),
        session.total_sets(),
        format_weight(session.total_volume()),
        duration
    );
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::{models::WorkoutTemplate, templates::TemplateCategory};

    struct ManualClock(Cell<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, secs: i64) {
            self.0.set(self.0.get() + Duration::seconds(secs));
        }
    }

    impl Clock for &ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn session(rest: u32) -> ActiveWorkoutSession {
        let catalog = TemplateCatalog {
            categories: vec![TemplateCategory {
                name: "t".into(),
                templates: vec![WorkoutTemplate::from_names("x", "X", ["Squat", "Bench"])],
            }],
        };
        let defaults = SessionDefaults {
            sets: 2,
            rest_seconds: rest,
            ..SessionDefaults::default()
        };
        load(&catalog, Some("x"), &defaults, start()).unwrap()
    }

    #[test]
    fn parses_inputs() {
        assert_eq!(parse_input("").unwrap(), Input::Complete { reps: None, weight: None });
        assert_eq!(parse_input(" d ").unwrap(), Input::Complete { reps: None, weight: None });
        assert_eq!(
            parse_input("8 62.5").unwrap(),
            Input::Complete { reps: Some(8), weight: Some(62.5) }
        );
        assert_eq!(
            parse_input("done 5 100kg").unwrap(),
            Input::Complete { reps: Some(5), weight: Some(100.0) }
        );
        assert_eq!(parse_input("12").unwrap(), Input::Complete { reps: Some(12), weight: None });
        assert_eq!(parse_input("S").unwrap(), Input::Skip);
        assert_eq!(parse_input("rest").unwrap(), Input::SkipRest);
        assert_eq!(parse_input("f").unwrap(), Input::Finish);
        assert_eq!(parse_input("?").unwrap(), Input::Help);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(parse_input("-1 50").is_err());
        assert!(parse_input("5 -2.5").is_err());
        assert!(parse_input("five").is_err());
        assert!(parse_input("5 50 extra").is_err());
        assert!(parse_input("s now").is_err());
        assert!(parse_input("5 NaN").is_err());
    }

    #[test]
    fn complete_uses_targets_and_rests() {
        let clock = ManualClock(Cell::new(start()));
        let mut runner = Runner::new(session(30), &clock);

        let fb = runner.apply(Input::Complete { reps: None, weight: Some(55.0) });
        assert_eq!(fb, Feedback::Logged { reps: 10, weight: 55.0, advance: Advance::NextSet });
        assert!(runner.session().is_resting());
        assert_eq!(runner.rest_left(), 30);

        assert_eq!(runner.apply(Input::Complete { reps: None, weight: None }), Feedback::StillResting);
        assert_eq!(runner.apply(Input::Skip), Feedback::StillResting);
        assert_eq!(runner.session().completed_sets(), 1);

        clock.advance(10);
        assert_eq!(runner.tick_rest(), RestTick::Remaining(20));
        clock.advance(20);
        assert_eq!(runner.tick_rest(), RestTick::Expired);
        assert_eq!(runner.tick_rest(), RestTick::Idle);
        assert_eq!(runner.targets(), Some(SetTargets { reps: 10, weight: 50.0 }));
    }

    #[test]
    fn skip_rest_then_expiry_is_noop() {
        let clock = ManualClock(Cell::new(start()));
        let mut runner = Runner::new(session(30), &clock);

        runner.apply(Input::Complete { reps: Some(8), weight: None });
        assert_eq!(runner.apply(Input::SkipRest), Feedback::RestSkipped);
        assert_eq!(runner.apply(Input::SkipRest), Feedback::NotResting);

        clock.advance(60);
        assert_eq!(runner.tick_rest(), RestTick::Idle);
        assert_eq!(runner.session().current_set_index(), 1);
    }

    #[test]
    fn elapsed_tracks_clock_and_stops_at_finish() {
        let clock = ManualClock(Cell::new(start()));
        let mut runner = Runner::new(session(0), &clock);

        clock.advance(75);
        assert_eq!(runner.tick_elapsed(), 75);
        assert_eq!(runner.apply(Input::Finish), Feedback::Finished);
        clock.advance(100);
        assert_eq!(runner.tick_elapsed(), 75);
        assert!(runner.targets().is_none());
        assert_eq!(runner.apply(Input::Skip), Feedback::Finished);
    }

    #[test]
    fn runs_whole_workout() {
        let clock = ManualClock(Cell::new(start()));
        let mut runner = Runner::new(session(0), &clock);

        runner.apply(Input::Complete { reps: None, weight: None });
        runner.apply(Input::Skip);
        runner.apply(Input::Complete { reps: Some(6), weight: Some(80.0) });
        let fb = runner.apply(Input::Complete { reps: None, weight: None });

        assert_eq!(fb, Feedback::Logged { reps: 10, weight: 50.0, advance: Advance::Completed });
        let s = runner.into_session();
        assert!(s.is_completed());
        assert_eq!(s.total_volume(), 500.0 + 480.0 + 500.0);
    }
}
