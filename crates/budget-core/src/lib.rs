//! budget-core
//!
//! Business logic and derivation services for the home budget.
//! Depends on budget-domain. No CLI, no terminal I/O, no direct filesystem access.

pub mod account_service;
pub mod category_service;
pub mod error;
pub mod format;
pub mod period_service;
pub mod recurring_service;
pub mod sorting;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod transaction_service;
pub mod transfer_service;

pub use account_service::*;
pub use category_service::*;
pub use error::CoreError;
pub use format::*;
pub use period_service::*;
pub use recurring_service::*;
pub use sorting::*;
pub use storage::*;
pub use summary_service::*;
pub use time::*;
pub use transaction_service::*;
pub use transfer_service::*;

pub type CoreResult<T> = Result<T, CoreError>;
