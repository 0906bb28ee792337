use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

pub type ExpenseId = i64;

/// Maximum length of `expenses.category` and `budgets.category`.
pub const CATEGORY_MAX_LEN: usize = 50;

/// Maximum length of `expenses.payment_method`.
pub const PAYMENT_METHOD_MAX_LEN: usize = 50;

/// A single expense row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub date: NaiveDate,
    pub amount_cents: Cents,
    pub category: String,
    pub payment_method: String,
}

/// An expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount_cents: Cents,
    pub category: String,
    pub payment_method: String,
}

impl NewExpense {
    pub fn new(
        date: NaiveDate,
        amount_cents: Cents,
        category: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount_cents,
            category: category.into(),
            payment_method: payment_method.into(),
        }
    }

    pub fn with_id(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            date: self.date,
            amount_cents: self.amount_cents,
            category: self.category,
            payment_method: self.payment_method,
        }
    }
}
