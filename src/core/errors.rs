use std::result::Result as StdResult;

use budget_config::ConfigError as CliConfigError;
use budget_core::CoreError as ServiceCoreError;
use thiserror::Error;

/// Unified error type for service, storage and configuration failures.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
    #[error("Recurring payment failed: {0}")]
    RecurringError(String),
    #[error("Import failed: {0}")]
    ImportError(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, BudgetError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<ServiceCoreError> for BudgetError {
    fn from(err: ServiceCoreError) -> Self {
        match err {
            ServiceCoreError::AccountNotFound(name) => BudgetError::AccountNotFound(name),
            ServiceCoreError::CategoryNotFound(name) => BudgetError::CategoryNotFound(name),
            ServiceCoreError::TransactionNotFound(id) => {
                BudgetError::TransactionError(format!("transaction {} not found", id))
            }
            ServiceCoreError::TemplateNotFound(id) => {
                BudgetError::RecurringError(format!("template {} not found", id))
            }
            ServiceCoreError::Validation(message) => BudgetError::InvalidInput(message),
            ServiceCoreError::Import(message) => BudgetError::ImportError(message),
            ServiceCoreError::Storage(message) | ServiceCoreError::Serde(message) => {
                BudgetError::StorageError(message)
            }
            ServiceCoreError::Io(err) => BudgetError::StorageError(err.to_string()),
        }
    }
}

impl From<CliConfigError> for BudgetError {
    fn from(err: CliConfigError) -> Self {
        match err {
            CliConfigError::Io(io) => BudgetError::StorageError(io.to_string()),
            other => BudgetError::ConfigError(other.to_string()),
        }
    }
}

impl From<CliConfigError> for CliError {
    fn from(err: CliConfigError) -> Self {
        CliError::from(BudgetError::from(err))
    }
}
