use chrono::{Local, NaiveDate};

use budget_core::Clock;

/// Real clock backed by the local calendar of the machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
