use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Month};
use crate::storage::CategoryAggregate;

/// Headline figures across all expenses, budgets and income.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub total_expenses: Cents,
    pub average_expense: Cents,
    pub max_expense: Cents,
    pub min_expense: Cents,
    pub transaction_count: i64,
    pub total_monthly_budget: Cents,
    pub total_income: Cents,
    /// Total income minus total expenses.
    pub savings: Cents,
    pub most_spent_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    /// Inclusive. `None` for an all-time report.
    pub from_date: Option<NaiveDate>,
    /// Exclusive. `None` for an all-time report.
    pub to_date: Option<NaiveDate>,
    pub categories: Vec<CategorySummary>,
    pub total: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: i64,
    pub average: Cents,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingTrend {
    pub months: Vec<MonthlyTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: Month,
    pub total: Cents,
}

impl CategoryReport {
    pub fn from_aggregates(
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
        aggregates: Vec<CategoryAggregate>,
    ) -> Self {
        let total: Cents = aggregates.iter().map(|a| a.total).sum();

        let categories = aggregates
            .into_iter()
            .map(|a| {
                let average = if a.count > 0 {
                    (a.total as f64 / a.count as f64).round() as Cents
                } else {
                    0
                };
                let percentage = if total != 0 {
                    a.total as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                CategorySummary {
                    category: a.category,
                    total: a.total,
                    count: a.count,
                    average,
                    percentage,
                }
            })
            .collect();

        Self {
            from_date,
            to_date,
            categories,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(category: &str, count: i64, total: Cents) -> CategoryAggregate {
        CategoryAggregate {
            category: category.to_string(),
            count,
            total,
        }
    }

    #[test]
    fn test_category_report_percentages() {
        let report = CategoryReport::from_aggregates(
            None,
            None,
            vec![aggregate("Food", 2, 35000), aggregate("Transport", 2, 12500)],
        );

        assert_eq!(report.total, 47500);
        assert_eq!(report.categories[0].average, 17500);
        assert!((report.categories[0].percentage - 73.68).abs() < 0.1);
        assert!((report.categories[1].percentage - 26.32).abs() < 0.1);
    }

    #[test]
    fn test_category_report_empty() {
        let report = CategoryReport::from_aggregates(None, None, Vec::new());
        assert_eq!(report.total, 0);
        assert!(report.categories.is_empty());
    }

    #[test]
    fn test_average_rounds() {
        let report = CategoryReport::from_aggregates(None, None, vec![aggregate("Food", 3, 1000)]);
        assert_eq!(report.categories[0].average, 333);
        assert!((report.categories[0].percentage - 100.0).abs() < f64::EPSILON);
    }
}
