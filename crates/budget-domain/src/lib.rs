//! budget-domain
//!
//! Pure domain models (Budget, Category, Transaction, RecurringTemplate, YearMonth).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod budget;
pub mod category;
pub mod common;
pub mod period;
pub mod recurring;
pub mod transaction;

pub use budget::*;
pub use category::*;
pub use common::*;
pub use period::*;
pub use recurring::*;
pub use transaction::*;
