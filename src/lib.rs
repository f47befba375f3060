#![doc(test(attr(deny(warnings))))]

//! Home Budget ties the budget services to persistent storage and an
//! interactive terminal shell.

pub mod cli;
pub mod core;
pub mod utils;

pub use crate::core::{errors::BudgetError, session::BudgetSession};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Home Budget tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
