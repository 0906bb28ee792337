use thiserror::Error;

use crate::domain::{ExpenseId, IncomeId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    #[error("Income record not found: {0}")]
    IncomeNotFound(IncomeId),

    #[error("Budget not found for category: {0}")]
    BudgetNotFound(String),

    #[error("Budget already exists for category: {0}")]
    BudgetAlreadyExists(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
