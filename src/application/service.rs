use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::error::ErrorKind;
use tracing::{info, warn};

use crate::domain::{
    Budget, BudgetAlert, CATEGORY_MAX_LEN, Cents, Expense, ExpenseId, Income, IncomeId,
    MAX_AMOUNT_CENTS, Month, NewBudget, NewExpense, NewIncome, PAYMENT_METHOD_MAX_LEN,
    SOURCE_MAX_LEN, fits_amount_column, format_cents,
};
use crate::storage::{Repository, constraint_violation};

use super::{AppError, CategoryReport, Insights, MonthlyTotal, SpendingTrend};

/// Application service providing high-level operations over expenses, budgets and income.
/// This is the primary interface for any client (CLI, exporter, tests).
pub struct FinanceService {
    repo: Repository,
}

/// Filter for querying expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub from_date: Option<NaiveDate>,
    /// Exclusive upper bound.
    pub to_date: Option<NaiveDate>,
    pub limit: Option<usize>,
}

/// Budget status information for one month
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub month: Month,
    pub spent: Cents,
    pub remaining: Cents,
    pub alert: BudgetAlert,
}

impl FinanceService {
    /// Create a new finance service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating the file and schema if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Expense operations
    // ========================

    /// Record a new expense.
    pub async fn add_expense(&self, expense: NewExpense) -> Result<Expense, AppError> {
        let expense = validate_expense(expense)?;
        let expense = self.repo.insert_expense(&expense).await?;
        info!(
            id = expense.id,
            category = %expense.category,
            amount = %format_cents(expense.amount_cents),
            "recorded expense"
        );
        Ok(expense)
    }

    /// Get an expense by ID.
    pub async fn get_expense(&self, id: ExpenseId) -> Result<Expense, AppError> {
        self.repo
            .get_expense(id)
            .await?
            .ok_or(AppError::ExpenseNotFound(id))
    }

    /// List all expenses, most recent first.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, AppError> {
        Ok(self.repo.list_expenses().await?)
    }

    /// List expenses with filters.
    pub async fn list_expenses_filtered(
        &self,
        filter: ExpenseFilter,
    ) -> Result<Vec<Expense>, AppError> {
        Ok(self
            .repo
            .list_expenses_filtered(
                filter.category.as_deref(),
                filter.from_date,
                filter.to_date,
                filter.limit,
            )
            .await?)
    }

    /// Replace every field of an existing expense.
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        expense: NewExpense,
    ) -> Result<Expense, AppError> {
        let expense = validate_expense(expense)?.with_id(id);
        if !self.repo.update_expense(&expense).await? {
            return Err(AppError::ExpenseNotFound(id));
        }
        info!(id, "updated expense");
        Ok(expense)
    }

    /// Delete an expense, returning what was removed.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<Expense, AppError> {
        let expense = self.get_expense(id).await?;
        if !self.repo.delete_expense(id).await? {
            return Err(AppError::ExpenseNotFound(id));
        }
        info!(id, "deleted expense");
        Ok(expense)
    }

    // ========================
    // Budget operations
    // ========================

    /// Set the budget for a category, replacing the limits if one already exists.
    pub async fn set_budget(&self, budget: NewBudget) -> Result<Budget, AppError> {
        let budget = validate_budget(budget)?;
        let budget = self.repo.upsert_budget(&budget).await?;
        info!(category = %budget.category, "set budget");
        Ok(budget)
    }

    /// Create a budget. Fails if the category already has one.
    pub async fn create_budget(&self, budget: NewBudget) -> Result<Budget, AppError> {
        let budget = validate_budget(budget)?;
        match self.repo.insert_budget(&budget).await {
            Ok(budget) => {
                info!(category = %budget.category, "created budget");
                Ok(budget)
            }
            Err(err) if matches!(constraint_violation(&err), Some(ErrorKind::UniqueViolation)) => {
                warn!(category = %budget.category, "budget already exists");
                Err(AppError::BudgetAlreadyExists(budget.category))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Get the budget for a category.
    pub async fn get_budget(&self, category: &str) -> Result<Budget, AppError> {
        self.repo
            .get_budget(category)
            .await?
            .ok_or_else(|| AppError::BudgetNotFound(category.to_string()))
    }

    /// List all budgets.
    pub async fn list_budgets(&self) -> Result<Vec<Budget>, AppError> {
        Ok(self.repo.list_budgets().await?)
    }

    /// Delete a budget.
    pub async fn delete_budget(&self, category: &str) -> Result<Budget, AppError> {
        let budget = self.get_budget(category).await?;
        if !self.repo.delete_budget(category).await? {
            return Err(AppError::BudgetNotFound(category.to_string()));
        }
        info!(category, "deleted budget");
        Ok(budget)
    }

    /// Get budget status (spending vs monthly limit) for one category and month.
    pub async fn get_budget_status(
        &self,
        category: &str,
        month: Month,
    ) -> Result<BudgetStatus, AppError> {
        let budget = self.get_budget(category).await?;
        self.status_for(budget, month).await
    }

    /// Get status for all budgets in a month.
    pub async fn get_all_budget_statuses(
        &self,
        month: Month,
    ) -> Result<Vec<BudgetStatus>, AppError> {
        let budgets = self.list_budgets().await?;
        let mut statuses = Vec::with_capacity(budgets.len());

        for budget in budgets {
            statuses.push(self.status_for(budget, month).await?);
        }

        Ok(statuses)
    }

    async fn status_for(&self, budget: Budget, month: Month) -> Result<BudgetStatus, AppError> {
        let (from_date, to_date) = month.date_range();
        let spent = self
            .repo
            .sum_expenses_for_category(&budget.category, from_date, to_date)
            .await?;
        let remaining = budget.monthly_budget_cents - spent;
        let alert = BudgetAlert::classify(budget.monthly_budget_cents, spent);

        Ok(BudgetStatus {
            budget,
            month,
            spent,
            remaining,
            alert,
        })
    }

    // ========================
    // Income operations
    // ========================

    /// Record income.
    pub async fn add_income(&self, income: NewIncome) -> Result<Income, AppError> {
        let income = validate_income(income)?;
        let income = self.repo.insert_income(&income).await?;
        info!(
            id = income.id,
            source = %income.source,
            amount = %format_cents(income.amount_cents),
            "recorded income"
        );
        Ok(income)
    }

    pub async fn get_income(&self, id: IncomeId) -> Result<Income, AppError> {
        self.repo
            .get_income(id)
            .await?
            .ok_or(AppError::IncomeNotFound(id))
    }

    /// List all income records, most recent first.
    pub async fn list_income(&self) -> Result<Vec<Income>, AppError> {
        Ok(self.repo.list_income().await?)
    }

    pub async fn delete_income(&self, id: IncomeId) -> Result<Income, AppError> {
        let income = self.get_income(id).await?;
        if !self.repo.delete_income(id).await? {
            return Err(AppError::IncomeNotFound(id));
        }
        info!(id, "deleted income");
        Ok(income)
    }

    pub async fn total_income(&self) -> Result<Cents, AppError> {
        Ok(self.repo.total_income().await?)
    }

    // ========================
    // Reports
    // ========================

    /// Headline figures over all data.
    pub async fn get_insights(&self) -> Result<Insights, AppError> {
        let stats = self.repo.expense_stats().await?;
        let total_monthly_budget = self.repo.total_monthly_budget().await?;
        let total_income = self.repo.total_income().await?;
        let most_spent_category = self.repo.most_spent_category().await?;

        Ok(Insights {
            total_expenses: stats.total,
            average_expense: stats.average,
            max_expense: stats.max,
            min_expense: stats.min,
            transaction_count: stats.count,
            total_monthly_budget,
            total_income,
            savings: total_income - stats.total,
            most_spent_category,
        })
    }

    /// Spending per category within one month.
    pub async fn get_monthly_spending(&self, month: Month) -> Result<CategoryReport, AppError> {
        let (from_date, to_date) = month.date_range();
        let aggregates = self.repo.spending_by_category(from_date, to_date).await?;
        Ok(CategoryReport::from_aggregates(
            Some(from_date),
            Some(to_date),
            aggregates,
        ))
    }

    /// Spending per category over all expenses.
    pub async fn get_category_breakdown(&self) -> Result<CategoryReport, AppError> {
        let aggregates = self.repo.spending_by_category_all_time().await?;
        Ok(CategoryReport::from_aggregates(None, None, aggregates))
    }

    /// Spending per calendar month, oldest first.
    pub async fn get_spending_trend(&self) -> Result<SpendingTrend, AppError> {
        let months = self
            .repo
            .monthly_spending_trend()
            .await?
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect();
        Ok(SpendingTrend { months })
    }
}

fn validate_amount(field: &'static str, amount_cents: Cents) -> Result<(), AppError> {
    if amount_cents < 0 {
        return Err(AppError::InvalidAmount(format!("{} must not be negative", field)));
    }
    if !fits_amount_column(amount_cents) {
        return Err(AppError::InvalidAmount(format!(
            "{} must not exceed {}",
            field,
            format_cents(MAX_AMOUNT_CENTS)
        )));
    }
    Ok(())
}

fn validate_text(field: &'static str, value: String, max_len: usize) -> Result<String, AppError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.chars().count() > max_len {
        return Err(AppError::InvalidField {
            field,
            reason: format!("must be at most {} characters", max_len),
        });
    }
    Ok(value)
}

fn validate_date(date: NaiveDate) -> Result<NaiveDate, AppError> {
    if !Month::YEARS.contains(&date.year()) {
        return Err(AppError::InvalidField {
            field: "date",
            reason: format!(
                "year must be between {} and {}",
                Month::YEARS.start(),
                Month::YEARS.end()
            ),
        });
    }
    Ok(date)
}

fn validate_expense(expense: NewExpense) -> Result<NewExpense, AppError> {
    validate_amount("amount", expense.amount_cents)?;
    Ok(NewExpense {
        date: validate_date(expense.date)?,
        amount_cents: expense.amount_cents,
        category: validate_text("category", expense.category, CATEGORY_MAX_LEN)?,
        payment_method: validate_text(
            "payment method",
            expense.payment_method,
            PAYMENT_METHOD_MAX_LEN,
        )?,
    })
}

fn validate_budget(budget: NewBudget) -> Result<NewBudget, AppError> {
    validate_amount("monthly budget", budget.monthly_budget_cents)?;
    validate_amount("annual budget", budget.annual_budget_cents)?;
    Ok(NewBudget {
        category: validate_text("category", budget.category, CATEGORY_MAX_LEN)?,
        monthly_budget_cents: budget.monthly_budget_cents,
        annual_budget_cents: budget.annual_budget_cents,
    })
}

fn validate_income(income: NewIncome) -> Result<NewIncome, AppError> {
    validate_amount("amount", income.amount_cents)?;
    Ok(NewIncome {
        date: validate_date(income.date)?,
        amount_cents: income.amount_cents,
        source: validate_text("source", income.source, SOURCE_MAX_LEN)?,
    })
}
