use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

pub type IncomeId = i64;

/// Maximum length of `income.source`.
pub const SOURCE_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub id: IncomeId,
    pub date: NaiveDate,
    pub amount_cents: Cents,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncome {
    pub date: NaiveDate,
    pub amount_cents: Cents,
    pub source: String,
}

impl NewIncome {
    pub fn new(date: NaiveDate, amount_cents: Cents, source: impl Into<String>) -> Self {
        Self {
            date,
            amount_cents,
            source: source.into(),
        }
    }

    pub fn with_id(self, id: IncomeId) -> Income {
        Income {
            id,
            date: self.date,
            amount_cents: self.amount_cents,
            source: self.source,
        }
    }
}
