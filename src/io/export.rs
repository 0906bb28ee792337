use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{CategoryReport, FinanceService, Insights, SpendingTrend};
use crate::domain::{Budget, Expense, Income, format_cents};

/// Database snapshot for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
    pub income: Vec<Income>,
}

/// Exporter for converting stored records to CSV or JSON.
pub struct Exporter<'a> {
    service: &'a FinanceService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a FinanceService) -> Self {
        Self { service }
    }

    /// Export expenses to CSV format
    pub async fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let expenses = self.service.list_expenses().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "date", "amount", "category", "payment_method"])?;

        for expense in &expenses {
            csv_writer.write_record([
                expense.id.to_string(),
                expense.date.to_string(),
                format_cents(expense.amount_cents),
                expense.category.clone(),
                expense.payment_method.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(expenses.len())
    }

    /// Export budgets to CSV format
    pub async fn export_budgets_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let budgets = self.service.list_budgets().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "category", "monthly_budget", "annual_budget"])?;

        for budget in &budgets {
            csv_writer.write_record([
                budget.id.to_string(),
                budget.category.clone(),
                format_cents(budget.monthly_budget_cents),
                format_cents(budget.annual_budget_cents),
            ])?;
        }

        csv_writer.flush()?;
        Ok(budgets.len())
    }

    /// Export income records to CSV format
    pub async fn export_income_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let income = self.service.list_income().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "date", "amount", "source"])?;

        for record in &income {
            csv_writer.write_record([
                record.id.to_string(),
                record.date.to_string(),
                format_cents(record.amount_cents),
                record.source.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(income.len())
    }

    /// Export the whole database as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<DatabaseSnapshot> {
        let snapshot = DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            expenses: self.service.list_expenses().await?,
            budgets: self.service.list_budgets().await?,
            income: self.service.list_income().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// Write business insights as `metric,value` rows.
pub fn write_insights_csv<W: Write>(insights: &Insights, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["metric", "value"])?;
    let rows = [
        ("total_expenses", format_cents(insights.total_expenses)),
        ("average_expense", format_cents(insights.average_expense)),
        ("max_expense", format_cents(insights.max_expense)),
        ("min_expense", format_cents(insights.min_expense)),
        ("transaction_count", insights.transaction_count.to_string()),
        ("total_monthly_budget", format_cents(insights.total_monthly_budget)),
        ("total_income", format_cents(insights.total_income)),
        ("savings", format_cents(insights.savings)),
        (
            "most_spent_category",
            insights
                .most_spent_category
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
        ),
    ];
    for (metric, value) in rows {
        csv_writer.write_record([metric.to_string(), value])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write a per-category spending report, one row per category.
pub fn write_category_report_csv<W: Write>(report: &CategoryReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["category", "total", "count", "average", "percentage"])?;

    for cat in &report.categories {
        csv_writer.write_record([
            cat.category.clone(),
            format_cents(cat.total),
            cat.count.to_string(),
            format_cents(cat.average),
            format!("{:.2}", cat.percentage),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write monthly spending totals in month order.
pub fn write_trend_csv<W: Write>(trend: &SpendingTrend, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["month", "total"])?;

    for entry in &trend.months {
        csv_writer.write_record([entry.month.to_string(), format_cents(entry.total)])?;
    }

    csv_writer.flush()?;
    Ok(())
}
