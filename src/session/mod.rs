//! The workout session engine: loading a session from a template, the
//! set/rest state machine, and the clocks that drive it.

pub mod loader;
pub mod machine;
pub mod timers;

pub use loader::{SessionDefaults, load};
pub use machine::{ActiveWorkoutSession, Advance};
pub use timers::{Clock, RestTick, SystemClock, elapsed_seconds, rest_remaining_seconds, tick_rest};
