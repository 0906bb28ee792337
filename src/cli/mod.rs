use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::application::{BudgetStatus, CategoryReport, ExpenseFilter, FinanceService};
use crate::domain::{
    BudgetAlert, Cents, ExpenseId, IncomeId, Month, NewBudget, NewExpense, NewIncome,
    format_cents, parse_cents,
};
use crate::io::{Exporter, write_category_report_csv, write_insights_csv, write_trend_csv};

/// fintrack - Personal expense, budget and income tracker
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "A local-first tracker for expenses, budgets and income")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "FINTRACK_DATABASE", default_value = "fintrack.db")]
    pub database: String,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database (safe to run again)
    Init,

    /// Expense management commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Income management commands
    #[command(subcommand)]
    Income(IncomeCommands),

    /// Generate reports and insights
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data to CSV or JSON
    Export {
        /// What to export: expenses, budgets, income, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        /// Amount spent (e.g., "42.50" or "42")
        amount: String,

        /// Category (e.g., "Food", "Transport")
        #[arg(short, long)]
        category: String,

        /// Payment method (e.g., "Credit Card", "Cash")
        #[arg(short, long)]
        payment_method: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List expenses, most recent first
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Only expenses in this month (YYYY-MM)
        #[arg(long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Filter from date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date, exclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of expenses to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a single expense
    Show {
        /// Expense ID
        id: ExpenseId,
    },

    /// Update an expense (omitted fields keep their current value)
    Update {
        /// Expense ID
        id: ExpenseId,

        /// New amount
        #[arg(short, long)]
        amount: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New payment method
        #[arg(short, long)]
        payment_method: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: ExpenseId,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the budget for a category (replaces an existing one)
    Set {
        /// Category to track
        category: String,

        /// Monthly limit (e.g., "400" or "400.00")
        #[arg(short, long)]
        monthly: String,

        /// Annual limit
        #[arg(short, long)]
        annual: String,
    },

    /// List all budgets
    List,

    /// Show budget status (spending vs monthly limit) with alerts
    Status {
        /// Month to check (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Delete a budget
    Delete {
        /// Category
        category: String,
    },
}

#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Record income
    Add {
        /// Amount received
        amount: String,

        /// Where the income came from (e.g., "Salary")
        #[arg(short, long)]
        source: String,

        /// Date received (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List income records, most recent first
    List,

    /// Delete an income record
    Delete {
        /// Income ID
        id: IncomeId,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Totals, averages, savings and the most spent category
    Insights {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Spending per category for one month
    Spending {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Spending per category over all expenses
    Breakdown {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Spending per month over time
    Trend {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                FinanceService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Expense(expense_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_expense_command(&service, expense_cmd).await?;
            }

            Commands::Budget(budget_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_budget_command(&service, budget_cmd).await?;
            }

            Commands::Income(income_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_income_command(&service, income_cmd).await?;
            }

            Commands::Report(report_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_report_command(&service, report_cmd).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = FinanceService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn run_expense_command(service: &FinanceService, cmd: ExpenseCommands) -> Result<()> {
    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            payment_method,
            date,
        } => {
            let amount_cents = parse_amount(&amount)?;
            let date = parse_date_or_today(date.as_deref())?;

            let expense = service
                .add_expense(NewExpense::new(date, amount_cents, category, payment_method))
                .await?;
            println!(
                "Recorded expense #{}: {} {} ({}, {})",
                expense.id,
                expense.date,
                format_cents(expense.amount_cents),
                expense.category,
                expense.payment_method
            );
        }

        ExpenseCommands::List {
            category,
            month,
            from,
            to,
            limit,
        } => {
            let (from_date, to_date) = match month {
                Some(month) => {
                    let (from_date, to_date) = parse_month(&month)?.date_range();
                    (Some(from_date), Some(to_date))
                }
                None => (
                    from.as_deref().map(parse_date).transpose()?,
                    to.as_deref().map(parse_date).transpose()?,
                ),
            };

            let expenses = service
                .list_expenses_filtered(ExpenseFilter {
                    category,
                    from_date,
                    to_date,
                    limit,
                })
                .await?;

            if expenses.is_empty() {
                println!("No expenses recorded yet.");
            } else {
                println!(
                    "{:>6} {:<10} {:>12} {:<20} {:<20}",
                    "ID", "DATE", "AMOUNT", "CATEGORY", "PAYMENT METHOD"
                );
                println!("{}", "-".repeat(72));
                for expense in expenses {
                    println!(
                        "{:>6} {:<10} {:>12} {:<20} {:<20}",
                        expense.id,
                        expense.date.to_string(),
                        format_cents(expense.amount_cents),
                        truncate(&expense.category, 20),
                        truncate(&expense.payment_method, 20)
                    );
                }
            }
        }

        ExpenseCommands::Show { id } => {
            let expense = service.get_expense(id).await?;
            println!("Expense #{}", expense.id);
            println!("  Date:           {}", expense.date);
            println!("  Amount:         {}", format_cents(expense.amount_cents));
            println!("  Category:       {}", expense.category);
            println!("  Payment method: {}", expense.payment_method);
        }

        ExpenseCommands::Update {
            id,
            amount,
            category,
            payment_method,
            date,
        } => {
            let current = service.get_expense(id).await?;
            let updated = NewExpense::new(
                match date {
                    Some(date) => parse_date(&date)?,
                    None => current.date,
                },
                match amount {
                    Some(amount) => parse_amount(&amount)?,
                    None => current.amount_cents,
                },
                category.unwrap_or(current.category),
                payment_method.unwrap_or(current.payment_method),
            );

            let expense = service.update_expense(id, updated).await?;
            println!(
                "Updated expense #{}: {} {} ({}, {})",
                expense.id,
                expense.date,
                format_cents(expense.amount_cents),
                expense.category,
                expense.payment_method
            );
        }

        ExpenseCommands::Delete { id } => {
            let expense = service.delete_expense(id).await?;
            println!(
                "Deleted expense #{}: {} {}",
                expense.id,
                expense.date,
                format_cents(expense.amount_cents)
            );
        }
    }

    Ok(())
}

async fn run_budget_command(service: &FinanceService, cmd: BudgetCommands) -> Result<()> {
    match cmd {
        BudgetCommands::Set {
            category,
            monthly,
            annual,
        } => {
            let monthly_cents = parse_amount(&monthly)?;
            let annual_cents = parse_amount(&annual)?;

            let budget = service
                .set_budget(NewBudget::new(category, monthly_cents, annual_cents))
                .await?;
            println!(
                "Budget for {} set: {} per month, {} per year",
                budget.category,
                format_cents(budget.monthly_budget_cents),
                format_cents(budget.annual_budget_cents)
            );
        }

        BudgetCommands::List => {
            let budgets = service.list_budgets().await?;
            if budgets.is_empty() {
                println!("No budgets found.");
            } else {
                println!("{:<20} {:>12} {:>12}", "CATEGORY", "MONTHLY", "ANNUAL");
                println!("{}", "-".repeat(46));
                for budget in budgets {
                    println!(
                        "{:<20} {:>12} {:>12}",
                        truncate(&budget.category, 20),
                        format_cents(budget.monthly_budget_cents),
                        format_cents(budget.annual_budget_cents)
                    );
                }
            }
        }

        BudgetCommands::Status { month } => {
            let month = match month {
                Some(month) => parse_month(&month)?,
                None => Month::current(),
            };
            let statuses = service.get_all_budget_statuses(month).await?;
            if statuses.is_empty() {
                println!("No budgets found. Set one with `fintrack budget set`.");
            } else {
                println!("Budget status for {}", month);
                println!();
                println!(
                    "{:<20} {:>12} {:>12} {:>12}  {:<8}",
                    "CATEGORY", "LIMIT", "SPENT", "REMAINING", "STATUS"
                );
                println!("{}", "-".repeat(70));
                for status in &statuses {
                    println!(
                        "{:<20} {:>12} {:>12} {:>12}  {:<8}",
                        truncate(&status.budget.category, 20),
                        format_cents(status.budget.monthly_budget_cents),
                        format_cents(status.spent),
                        format_cents(status.remaining),
                        status.alert.as_str()
                    );
                }

                let alerts: Vec<String> = statuses.iter().filter_map(alert_message).collect();
                if !alerts.is_empty() {
                    println!();
                    for alert in alerts {
                        println!("{}", alert);
                    }
                }
            }
        }

        BudgetCommands::Delete { category } => {
            service.delete_budget(&category).await?;
            println!("Deleted budget: {}", category);
        }
    }

    Ok(())
}

fn alert_message(status: &BudgetStatus) -> Option<String> {
    match status.alert {
        BudgetAlert::Exceeded => Some(format!(
            "Alert: {} budget exceeded by {}",
            status.budget.category,
            format_cents(-status.remaining)
        )),
        BudgetAlert::Nearing => Some(format!(
            "Alert: nearing {} budget, only {} remaining",
            status.budget.category,
            format_cents(status.remaining)
        )),
        BudgetAlert::Within => None,
    }
}

async fn run_income_command(service: &FinanceService, cmd: IncomeCommands) -> Result<()> {
    match cmd {
        IncomeCommands::Add {
            amount,
            source,
            date,
        } => {
            let amount_cents = parse_amount(&amount)?;
            let date = parse_date_or_today(date.as_deref())?;

            let income = service
                .add_income(NewIncome::new(date, amount_cents, source))
                .await?;
            println!(
                "Recorded income #{}: {} {} ({})",
                income.id,
                income.date,
                format_cents(income.amount_cents),
                income.source
            );
        }

        IncomeCommands::List => {
            let income = service.list_income().await?;
            if income.is_empty() {
                println!("No income recorded yet.");
            } else {
                println!("{:>6} {:<10} {:>12} {:<30}", "ID", "DATE", "AMOUNT", "SOURCE");
                println!("{}", "-".repeat(61));
                for record in &income {
                    println!(
                        "{:>6} {:<10} {:>12} {:<30}",
                        record.id,
                        record.date.to_string(),
                        format_cents(record.amount_cents),
                        truncate(&record.source, 30)
                    );
                }
                println!("{}", "-".repeat(61));
                let total: Cents = income.iter().map(|r| r.amount_cents).sum();
                println!("{:<17} {:>12}", "TOTAL", format_cents(total));
            }
        }

        IncomeCommands::Delete { id } => {
            let income = service.delete_income(id).await?;
            println!(
                "Deleted income #{}: {} {}",
                income.id,
                income.date,
                format_cents(income.amount_cents)
            );
        }
    }

    Ok(())
}

async fn run_report_command(service: &FinanceService, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Insights { format } => {
            let insights = service.get_insights().await?;
            let most_spent = insights
                .most_spent_category
                .clone()
                .unwrap_or_else(|| "N/A".to_string());

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&insights)?);
                }
                "csv" => {
                    write_insights_csv(&insights, std::io::stdout())?;
                }
                _ => {
                    println!("Financial Insights");
                    println!();
                    println!("Total Expenses:       {:>15}", format_cents(insights.total_expenses));
                    println!(
                        "Average Expense:      {:>15}",
                        format_cents(insights.average_expense)
                    );
                    println!("Max Expense:          {:>15}", format_cents(insights.max_expense));
                    println!("Min Expense:          {:>15}", format_cents(insights.min_expense));
                    println!("Transactions:         {:>15}", insights.transaction_count);
                    println!("Most Spent Category:  {:>15}", most_spent);
                    println!(
                        "Total Monthly Budget: {:>15}",
                        format_cents(insights.total_monthly_budget)
                    );
                    println!("Total Income:         {:>15}", format_cents(insights.total_income));
                    println!("{}", "-".repeat(37));
                    println!("Savings:              {:>15}", format_cents(insights.savings));
                }
            }
        }

        ReportCommands::Spending { month, format } => {
            let month = match month {
                Some(month) => parse_month(&month)?,
                None => Month::current(),
            };
            let report = service.get_monthly_spending(month).await?;
            print_category_report(&report, &format!("Spending for {}", month), &format)?;
        }

        ReportCommands::Breakdown { format } => {
            let report = service.get_category_breakdown().await?;
            print_category_report(&report, "Category-wise Expense Breakdown", &format)?;
        }

        ReportCommands::Trend { format } => {
            let trend = service.get_spending_trend().await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&trend)?);
                }
                "csv" => {
                    write_trend_csv(&trend, std::io::stdout())?;
                }
                _ => {
                    println!("Spending Trend");
                    println!();
                    println!("{:<10} {:>15}", "MONTH", "TOTAL");
                    println!("{}", "-".repeat(26));
                    for entry in &trend.months {
                        println!(
                            "{:<10} {:>15}",
                            entry.month.to_string(),
                            format_cents(entry.total)
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_category_report(report: &CategoryReport, title: &str, format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        "csv" => {
            write_category_report_csv(report, std::io::stdout())?;
        }
        _ => {
            println!("{}", title);
            println!();
            println!(
                "{:<20} {:>12} {:>8} {:>12} {:>8}",
                "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "PERCENT"
            );
            println!("{}", "-".repeat(65));

            for cat in &report.categories {
                println!(
                    "{:<20} {:>12} {:>8} {:>12} {:>7.1}%",
                    truncate(&cat.category, 20),
                    format_cents(cat.total),
                    cat.count,
                    format_cents(cat.average),
                    cat.percentage
                );
            }

            println!("{}", "-".repeat(65));
            println!("{:<20} {:>12}", "TOTAL", format_cents(report.total));
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &FinanceService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "expenses" => {
            let count = exporter.export_expenses_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} expenses", count);
            }
        }
        "budgets" => {
            let count = exporter.export_budgets_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} budgets", count);
            }
        }
        "income" => {
            let count = exporter.export_income_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} income records", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} expenses, {} budgets, {} income records",
                    snapshot.expenses.len(),
                    snapshot.budgets.len(),
                    snapshot.income.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: expenses, budgets, income, full",
                export_type
            );
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

fn parse_amount(amount: &str) -> Result<Cents> {
    parse_cents(amount)
        .with_context(|| format!("Invalid amount '{}'. Use '42.50' or '42'", amount))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}

fn parse_date_or_today(date_str: Option<&str>) -> Result<NaiveDate> {
    match date_str {
        Some(date_str) => parse_date(date_str),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_month(month_str: &str) -> Result<Month> {
    month_str
        .parse()
        .with_context(|| format!("Invalid month '{}'. Use YYYY-MM", month_str))
}
