// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use fintrack::application::FinanceService;
use fintrack::domain::{NewBudget, NewExpense, NewIncome};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(FinanceService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = FinanceService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// SQLite URL for a fresh database file inside `temp_dir`
pub fn database_url(temp_dir: &TempDir) -> String {
    format!(
        "sqlite:{}?mode=rwc",
        temp_dir.path().join("test.db").to_str().unwrap()
    )
}

/// Helper to parse a YYYY-MM-DD string
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Test fixture: a small but realistic month of data
pub struct SampleData;

impl SampleData {
    /// Budgets for Food and Transport
    pub async fn create_budgets(service: &FinanceService) -> Result<()> {
        service
            .set_budget(NewBudget::new("Food", 40000, 480000))
            .await?;
        service
            .set_budget(NewBudget::new("Transport", 10000, 120000))
            .await?;
        Ok(())
    }

    /// January and February 2024 expenses
    pub async fn create_expenses(service: &FinanceService) -> Result<()> {
        let expenses = [
            ("2024-01-05", 15000, "Food", "Credit Card"),
            ("2024-01-12", 20000, "Food", "Debit Card"),
            ("2024-01-10", 5000, "Transport", "Cash"),
            ("2024-01-20", 7500, "Entertainment", "Credit Card"),
            ("2024-02-03", 9000, "Food", "Online Transfer"),
        ];
        for (day, amount, category, method) in expenses {
            service
                .add_expense(NewExpense::new(date(day), amount, category, method))
                .await?;
        }
        Ok(())
    }

    /// Salary and a side income
    pub async fn create_income(service: &FinanceService) -> Result<()> {
        service
            .add_income(NewIncome::new(date("2024-01-01"), 300000, "Salary"))
            .await?;
        service
            .add_income(NewIncome::new(date("2024-01-15"), 25050, "Freelance"))
            .await?;
        Ok(())
    }

    pub async fn create_all(service: &FinanceService) -> Result<()> {
        Self::create_budgets(service).await?;
        Self::create_expenses(service).await?;
        Self::create_income(service).await?;
        Ok(())
    }
}
