use chrono::{DateTime, Local};

/// Represents an entity responsible for providing timestamps across the
/// application. This allows tests to pin the `tracker_updated` metadata to a
/// known value.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
