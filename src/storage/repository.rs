use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::domain::{
    Budget, Cents, Expense, ExpenseId, Income, IncomeId, Month, NewBudget, NewExpense, NewIncome,
};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-category expense totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAggregate {
    pub category: String,
    pub count: i64,
    pub total: Cents,
}

/// Aggregates over the whole `expenses` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseStats {
    pub total: Cents,
    pub average: Cents,
    pub max: Cents,
    pub min: Cents,
    pub count: i64,
}

/// Returns the kind of engine constraint that rejected a repository call, if any.
pub fn constraint_violation(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .and_then(|sqlx_err| sqlx_err.as_database_error())
        .map(|db_err| db_err.kind())
        .filter(|kind| !matches!(kind, ErrorKind::Other))
}

/// Repository for persisting and querying expenses, budgets and income.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        debug!(database_url, "connecting to database");
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the schema. Safe to run any number of times.
    pub async fn migrate(&self) -> Result<()> {
        debug!("running migration 001");
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// The underlying pool, for statements the repository does not wrap.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================
    // Expense operations
    // ========================

    pub async fn insert_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let result = sqlx::query(
            r#"
            INSERT INTO expenses (date, amount, category, payment_method)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(format_date(expense.date))
        .bind(expense.amount_cents)
        .bind(&expense.category)
        .bind(&expense.payment_method)
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;

        let id = result.last_insert_rowid();
        debug!(id, "inserted expense");
        Ok(expense.clone().with_id(id))
    }

    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, amount, category, payment_method
            FROM expenses
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch expense")?;

        row.as_ref().map(Self::row_to_expense).transpose()
    }

    /// List all expenses, most recent first.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.list_expenses_filtered(None, None, None, None).await
    }

    /// List expenses with optional filters, most recent first.
    /// `to_date` is exclusive.
    pub async fn list_expenses_filtered(
        &self,
        category: Option<&str>,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Result<Vec<Expense>> {
        let mut query = String::from(
            "SELECT id, date, amount, category, payment_method FROM expenses WHERE 1=1",
        );

        let from_date_str = from_date.map(format_date);
        let to_date_str = to_date.map(format_date);

        if category.is_some() {
            query.push_str(" AND category = ?");
        }
        if from_date.is_some() {
            query.push_str(" AND date >= ?");
        }
        if to_date.is_some() {
            query.push_str(" AND date < ?");
        }

        query.push_str(" ORDER BY date DESC, id DESC");

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut sql_query = sqlx::query(&query);

        if let Some(cat) = category {
            sql_query = sql_query.bind(cat);
        }
        if let Some(ref fd_str) = from_date_str {
            sql_query = sql_query.bind(fd_str);
        }
        if let Some(ref td_str) = to_date_str {
            sql_query = sql_query.bind(td_str);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    /// Overwrite every field of an existing expense. Returns false if no row has that id.
    pub async fn update_expense(&self, expense: &Expense) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET date = ?, amount = ?, category = ?, payment_method = ?
            WHERE id = ?
            "#,
        )
        .bind(format_date(expense.date))
        .bind(expense.amount_cents)
        .bind(&expense.category)
        .bind(&expense.payment_method)
        .bind(expense.id)
        .execute(&self.pool)
        .await
        .context("Failed to update expense")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_expense(row: &SqliteRow) -> Result<Expense> {
        let date_str: String = row.get("date");

        Ok(Expense {
            id: row.get("id"),
            date: parse_date(&date_str)?,
            amount_cents: row.get("amount"),
            category: row.get("category"),
            payment_method: row.get("payment_method"),
        })
    }

    // ========================
    // Budget operations
    // ========================

    /// Insert a budget. Fails with a unique violation if the category already has one.
    pub async fn insert_budget(&self, budget: &NewBudget) -> Result<Budget> {
        let result = sqlx::query(
            r#"
            INSERT INTO budgets (category, monthly_budget, annual_budget)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&budget.category)
        .bind(budget.monthly_budget_cents)
        .bind(budget.annual_budget_cents)
        .execute(&self.pool)
        .await
        .context("Failed to save budget")?;

        Ok(budget.clone().with_id(result.last_insert_rowid()))
    }

    /// Insert a budget, or replace the limits of the existing budget for the category.
    pub async fn upsert_budget(&self, budget: &NewBudget) -> Result<Budget> {
        let row = sqlx::query(
            r#"
            INSERT INTO budgets (category, monthly_budget, annual_budget)
            VALUES (?, ?, ?)
            ON CONFLICT (category) DO UPDATE SET
                monthly_budget = excluded.monthly_budget,
                annual_budget = excluded.annual_budget
            RETURNING id
            "#,
        )
        .bind(&budget.category)
        .bind(budget.monthly_budget_cents)
        .bind(budget.annual_budget_cents)
        .fetch_one(&self.pool)
        .await
        .context("Failed to set budget")?;

        Ok(budget.clone().with_id(row.get("id")))
    }

    pub async fn get_budget(&self, category: &str) -> Result<Option<Budget>> {
        let row = sqlx::query(
            r#"
            SELECT id, category, monthly_budget, annual_budget
            FROM budgets
            WHERE category = ?
            "#,
        )
        .bind(category)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch budget")?;

        Ok(row.as_ref().map(Self::row_to_budget))
    }

    /// List all budgets, ordered by category.
    pub async fn list_budgets(&self) -> Result<Vec<Budget>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, monthly_budget, annual_budget
            FROM budgets
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list budgets")?;

        Ok(rows.iter().map(Self::row_to_budget).collect())
    }

    pub async fn delete_budget(&self, category: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE category = ?")
            .bind(category)
            .execute(&self.pool)
            .await
            .context("Failed to delete budget")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_budget(row: &SqliteRow) -> Budget {
        Budget {
            id: row.get("id"),
            category: row.get("category"),
            monthly_budget_cents: row.get("monthly_budget"),
            annual_budget_cents: row.get("annual_budget"),
        }
    }

    // ========================
    // Income operations
    // ========================

    pub async fn insert_income(&self, income: &NewIncome) -> Result<Income> {
        let result = sqlx::query(
            r#"
            INSERT INTO income (date, amount, source)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(format_date(income.date))
        .bind(income.amount_cents)
        .bind(&income.source)
        .execute(&self.pool)
        .await
        .context("Failed to save income")?;

        Ok(income.clone().with_id(result.last_insert_rowid()))
    }

    pub async fn get_income(&self, id: IncomeId) -> Result<Option<Income>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, amount, source
            FROM income
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch income")?;

        row.as_ref().map(Self::row_to_income).transpose()
    }

    /// List all income records, most recent first.
    pub async fn list_income(&self) -> Result<Vec<Income>> {
        let rows = sqlx::query(
            r#"
            SELECT id, date, amount, source
            FROM income
            ORDER BY date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list income")?;

        rows.iter().map(Self::row_to_income).collect()
    }

    pub async fn delete_income(&self, id: IncomeId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM income WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete income")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_income(row: &SqliteRow) -> Result<Income> {
        let date_str: String = row.get("date");

        Ok(Income {
            id: row.get("id"),
            date: parse_date(&date_str)?,
            amount_cents: row.get("amount"),
            source: row.get("source"),
        })
    }

    // ========================
    // Aggregates
    // ========================

    /// Expense totals per category within `[from_date, to_date)`, largest first.
    pub async fn spending_by_category(
        &self,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Vec<CategoryAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) as count, SUM(amount) as total
            FROM expenses
            WHERE date >= ? AND date < ?
            GROUP BY category
            ORDER BY total DESC, category
            "#,
        )
        .bind(format_date(from_date))
        .bind(format_date(to_date))
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum expenses by category")?;

        Ok(rows.iter().map(Self::row_to_aggregate).collect())
    }

    /// Expense totals per category over the whole table, largest first.
    pub async fn spending_by_category_all_time(&self) -> Result<Vec<CategoryAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) as count, SUM(amount) as total
            FROM expenses
            GROUP BY category
            ORDER BY total DESC, category
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum expenses by category")?;

        Ok(rows.iter().map(Self::row_to_aggregate).collect())
    }

    fn row_to_aggregate(row: &SqliteRow) -> CategoryAggregate {
        CategoryAggregate {
            category: row.get("category"),
            count: row.get("count"),
            total: row.get("total"),
        }
    }

    /// Sum of expenses for one category within `[from_date, to_date)`.
    pub async fn sum_expenses_for_category(
        &self,
        category: &str,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) as total
            FROM expenses
            WHERE category = ? AND date >= ? AND date < ?
            "#,
        )
        .bind(category)
        .bind(format_date(from_date))
        .bind(format_date(to_date))
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum expenses for category")?;

        Ok(row.get("total"))
    }

    /// Total, average, max, min and count over all expenses. Zero when empty.
    pub async fn expense_stats(&self) -> Result<ExpenseStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(amount), 0) as total,
                COALESCE(CAST(ROUND(AVG(amount)) AS INTEGER), 0) as average,
                COALESCE(MAX(amount), 0) as max,
                COALESCE(MIN(amount), 0) as min,
                COUNT(*) as count
            FROM expenses
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute expense statistics")?;

        Ok(ExpenseStats {
            total: row.get("total"),
            average: row.get("average"),
            max: row.get("max"),
            min: row.get("min"),
            count: row.get("count"),
        })
    }

    pub async fn total_monthly_budget(&self) -> Result<Cents> {
        let row = sqlx::query("SELECT COALESCE(SUM(monthly_budget), 0) as total FROM budgets")
            .fetch_one(&self.pool)
            .await
            .context("Failed to sum monthly budgets")?;
        Ok(row.get("total"))
    }

    pub async fn total_income(&self) -> Result<Cents> {
        let row = sqlx::query("SELECT COALESCE(SUM(amount), 0) as total FROM income")
            .fetch_one(&self.pool)
            .await
            .context("Failed to sum income")?;
        Ok(row.get("total"))
    }

    /// The category with the largest expense total. Ties go to the alphabetically first.
    pub async fn most_spent_category(&self) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT category
            FROM expenses
            GROUP BY category
            ORDER BY SUM(amount) DESC, category
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find most spent category")?;

        Ok(row.map(|row| row.get("category")))
    }

    /// Expense totals per calendar month, oldest first.
    pub async fn monthly_spending_trend(&self) -> Result<Vec<(Month, Cents)>> {
        let rows = sqlx::query(
            r#"
            SELECT substr(date, 1, 7) as month, SUM(amount) as total
            FROM expenses
            GROUP BY month
            ORDER BY month
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute monthly spending")?;

        rows.iter()
            .map(|row| {
                let month_str: String = row.get("month");
                let month: Month = month_str
                    .parse()
                    .with_context(|| format!("Invalid month in expenses: {}", month_str))?;
                Ok((month, row.get("total")))
            })
            .collect()
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .with_context(|| format!("Invalid date in database: {}", date_str))
}
