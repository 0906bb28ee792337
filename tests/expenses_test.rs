mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::{SampleData, date, test_service};
use fintrack::application::{AppError, ExpenseFilter};
use fintrack::domain::NewExpense;

#[tokio::test]
async fn test_expense_add_and_list_most_recent_first() -> Result<()> {
    let (service, _temp) = test_service().await?;

    SampleData::create_expenses(&service).await?;

    let expenses = service.list_expenses().await?;
    assert_eq!(expenses.len(), 5);

    let dates: Vec<String> = expenses.iter().map(|e| e.date.to_string()).collect();
    assert_eq!(
        dates,
        vec![
            "2024-02-03",
            "2024-01-20",
            "2024-01-12",
            "2024-01-10",
            "2024-01-05"
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_expense_update() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let expense = service
        .add_expense(NewExpense::new(date("2024-01-15"), 4250, "Food", "Cash"))
        .await?;

    let updated = service
        .update_expense(
            expense.id,
            NewExpense::new(date("2024-01-16"), 5000, "Transport", "Debit Card"),
        )
        .await?;
    assert_eq!(updated.id, expense.id);

    let stored = service.get_expense(expense.id).await?;
    assert_eq!(stored, updated);
    assert_eq!(stored.amount_cents, 5000);
    assert_eq!(stored.category, "Transport");
    assert_eq!(stored.payment_method, "Debit Card");
    assert_eq!(stored.date, date("2024-01-16"));

    Ok(())
}

#[tokio::test]
async fn test_expense_update_missing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .update_expense(42, NewExpense::new(date("2024-01-16"), 5000, "Food", "Cash"))
        .await;
    assert!(matches!(result, Err(AppError::ExpenseNotFound(42))));

    Ok(())
}

#[tokio::test]
async fn test_expense_delete() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let keep = service
        .add_expense(NewExpense::new(date("2024-01-15"), 4250, "Food", "Cash"))
        .await?;
    let remove = service
        .add_expense(NewExpense::new(date("2024-01-16"), 1000, "Food", "Cash"))
        .await?;

    let deleted = service.delete_expense(remove.id).await?;
    assert_eq!(deleted, remove);

    let remaining = service.list_expenses().await?;
    assert_eq!(remaining, vec![keep]);

    assert!(matches!(
        service.delete_expense(remove.id).await,
        Err(AppError::ExpenseNotFound(_))
    ));
    assert!(matches!(
        service.get_expense(remove.id).await,
        Err(AppError::ExpenseNotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_expense_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let negative = service
        .add_expense(NewExpense::new(date("2024-01-15"), -100, "Food", "Cash"))
        .await;
    assert!(matches!(negative, Err(AppError::InvalidAmount(_))));

    let too_large = service
        .add_expense(NewExpense::new(date("2024-01-15"), 10_000_000_000, "Food", "Cash"))
        .await;
    assert!(matches!(too_large, Err(AppError::InvalidAmount(_))));

    let long_category = service
        .add_expense(NewExpense::new(date("2024-01-15"), 100, "x".repeat(51), "Cash"))
        .await;
    assert!(matches!(
        long_category,
        Err(AppError::InvalidField {
            field: "category",
            ..
        })
    ));

    let empty_method = service
        .add_expense(NewExpense::new(date("2024-01-15"), 100, "Food", "   "))
        .await;
    assert!(matches!(
        empty_method,
        Err(AppError::InvalidField {
            field: "payment method",
            ..
        })
    ));

    // Nothing was stored
    assert!(service.list_expenses().await?.is_empty());

    // Limits are inclusive, and zero is a valid amount
    service
        .add_expense(NewExpense::new(date("2024-01-15"), 0, "x".repeat(50), "y".repeat(50)))
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_expense_text_is_trimmed() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let expense = service
        .add_expense(NewExpense::new(date("2024-01-15"), 100, "  Food ", " Cash"))
        .await?;
    assert_eq!(expense.category, "Food");
    assert_eq!(expense.payment_method, "Cash");
    assert_eq!(service.get_expense(expense.id).await?.category, "Food");

    Ok(())
}

#[tokio::test]
async fn test_expense_filtering() -> Result<()> {
    let (service, _temp) = test_service().await?;

    SampleData::create_expenses(&service).await?;

    let food = service
        .list_expenses_filtered(ExpenseFilter {
            category: Some("Food".into()),
            ..Default::default()
        })
        .await?;
    assert_eq!(food.len(), 3);
    assert!(food.iter().all(|e| e.category == "Food"));

    // to_date is exclusive
    let january = service
        .list_expenses_filtered(ExpenseFilter {
            from_date: Some(date("2024-01-01")),
            to_date: Some(date("2024-02-01")),
            ..Default::default()
        })
        .await?;
    assert_eq!(january.len(), 4);

    let mid_january = service
        .list_expenses_filtered(ExpenseFilter {
            from_date: Some(date("2024-01-10")),
            to_date: Some(date("2024-01-20")),
            ..Default::default()
        })
        .await?;
    assert_eq!(mid_january.len(), 2);

    let latest = service
        .list_expenses_filtered(ExpenseFilter {
            limit: Some(2),
            ..Default::default()
        })
        .await?;
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].date, date("2024-02-03"));

    let january_food = service
        .list_expenses_filtered(ExpenseFilter {
            category: Some("Food".into()),
            from_date: Some(date("2024-01-01")),
            to_date: Some(date("2024-02-01")),
            limit: None,
        })
        .await?;
    assert_eq!(january_food.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_expense_date_outside_four_digit_years() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let year_zero = service
        .add_expense(NewExpense::new(date("0000-06-01"), 100, "Food", "Cash"))
        .await;
    assert!(matches!(
        year_zero,
        Err(AppError::InvalidField { field: "date", .. })
    ));

    let far_future = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
    let far_future = service
        .add_expense(NewExpense::new(far_future, 100, "Food", "Cash"))
        .await;
    assert!(matches!(
        far_future,
        Err(AppError::InvalidField { field: "date", .. })
    ));

    let expense = service
        .add_expense(NewExpense::new(date("0001-01-01"), 100, "Food", "Cash"))
        .await?;
    let update = service
        .update_expense(
            expense.id,
            NewExpense::new(date("0000-12-31"), 100, "Food", "Cash"),
        )
        .await;
    assert!(matches!(
        update,
        Err(AppError::InvalidField { field: "date", .. })
    ));
    assert_eq!(service.get_expense(expense.id).await?.date, date("0001-01-01"));

    Ok(())
}
