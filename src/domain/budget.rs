use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use super::Cents;

pub type BudgetId = i64;

/// Spending ceilings for one category. At most one budget exists per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub category: String,
    pub monthly_budget_cents: Cents,
    pub annual_budget_cents: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBudget {
    pub category: String,
    pub monthly_budget_cents: Cents,
    pub annual_budget_cents: Cents,
}

impl NewBudget {
    pub fn new(
        category: impl Into<String>,
        monthly_budget_cents: Cents,
        annual_budget_cents: Cents,
    ) -> Self {
        Self {
            category: category.into(),
            monthly_budget_cents,
            annual_budget_cents,
        }
    }

    pub fn with_id(self, id: BudgetId) -> Budget {
        Budget {
            id,
            category: self.category,
            monthly_budget_cents: self.monthly_budget_cents,
            annual_budget_cents: self.annual_budget_cents,
        }
    }
}

/// How a category's spending compares to its monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetAlert {
    Within,
    Nearing,
    Exceeded,
}

impl BudgetAlert {
    /// Exceeded once spending passes the limit, nearing once less than a fifth
    /// of the limit remains.
    pub fn classify(limit: Cents, spent: Cents) -> Self {
        let remaining = limit - spent;
        if remaining < 0 {
            BudgetAlert::Exceeded
        } else if remaining * 5 < limit {
            BudgetAlert::Nearing
        } else {
            BudgetAlert::Within
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetAlert::Within => "within",
            BudgetAlert::Nearing => "nearing",
            BudgetAlert::Exceeded => "exceeded",
        }
    }
}

impl fmt::Display for BudgetAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A calendar month, the period budgets are tracked over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    /// Years representable as four-digit `YYYY` text.
    pub const YEARS: RangeInclusive<i32> = 1..=9999;

    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !Self::YEARS.contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The current month in local time.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn next(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Half-open date range `[first day, first day of next month)`.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.first_day, self.next().first_day)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError(String);

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month '{}', expected YYYY-MM", self.0)
    }
}

impl std::error::Error for ParseMonthError {}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

impl TryFrom<String> for Month {
    type Error = ParseMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
