//! Source of "today".

use crate::date::Date;

/// Supplies the current UTC day to the service layer.
pub trait Clock {
    fn today(&self) -> Date;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        Date::today()
    }
}

/// Always returns the same day. Useful for tests and for replaying a
/// request as of a given date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
