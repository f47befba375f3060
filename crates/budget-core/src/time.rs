use chrono::NaiveDate;

/// Clock abstracts access to the current local date so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns today's date in the local calendar.
    fn today(&self) -> NaiveDate;
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
