mod common;

use anyhow::Result;
use common::{SampleData, date, test_service};
use fintrack::application::AppError;
use fintrack::domain::{BudgetAlert, Month, NewBudget, NewExpense};

#[tokio::test]
async fn test_budget_set_and_list() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .set_budget(NewBudget::new("Transport", 10000, 120000))
        .await?;
    service
        .set_budget(NewBudget::new("Food", 40000, 480000))
        .await?;

    let budgets = service.list_budgets().await?;
    assert_eq!(budgets.len(), 2);

    // Ordered by category
    assert_eq!(budgets[0].category, "Food");
    assert_eq!(budgets[0].monthly_budget_cents, 40000);
    assert_eq!(budgets[0].annual_budget_cents, 480000);
    assert_eq!(budgets[1].category, "Transport");

    Ok(())
}

#[tokio::test]
async fn test_budget_set_replaces_existing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let first = service
        .set_budget(NewBudget::new("Food", 40000, 480000))
        .await?;
    let second = service
        .set_budget(NewBudget::new("Food", 45000, 540000))
        .await?;

    assert_eq!(first.id, second.id);

    let budgets = service.list_budgets().await?;
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].monthly_budget_cents, 45000);
    assert_eq!(budgets[0].annual_budget_cents, 540000);

    Ok(())
}

#[tokio::test]
async fn test_budget_create_rejects_duplicate_category() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .create_budget(NewBudget::new("Food", 40000, 480000))
        .await?;

    let result = service
        .create_budget(NewBudget::new("Food", 100, 1200))
        .await;
    match result {
        Err(AppError::BudgetAlreadyExists(category)) => assert_eq!(category, "Food"),
        other => panic!("expected BudgetAlreadyExists, got {:?}", other),
    }

    // The original limits survive
    let budget = service.get_budget("Food").await?;
    assert_eq!(budget.monthly_budget_cents, 40000);

    Ok(())
}

#[tokio::test]
async fn test_budget_get_and_delete() -> Result<()> {
    let (service, _temp) = test_service().await?;

    SampleData::create_budgets(&service).await?;

    let deleted = service.delete_budget("Transport").await?;
    assert_eq!(deleted.category, "Transport");

    assert!(matches!(
        service.get_budget("Transport").await,
        Err(AppError::BudgetNotFound(_))
    ));
    assert!(matches!(
        service.delete_budget("Transport").await,
        Err(AppError::BudgetNotFound(_))
    ));
    assert_eq!(service.list_budgets().await?.len(), 1);

    // The storage layer reports whether a row was removed
    assert!(!service.repository().delete_budget("Transport").await?);
    assert!(service.repository().delete_budget("Food").await?);
    assert!(service.list_budgets().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_budget_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert!(matches!(
        service.set_budget(NewBudget::new("Food", -1, 1200)).await,
        Err(AppError::InvalidAmount(_))
    ));
    assert!(matches!(
        service.set_budget(NewBudget::new("Food", 100, -1)).await,
        Err(AppError::InvalidAmount(_))
    ));
    assert!(matches!(
        service.set_budget(NewBudget::new("", 100, 1200)).await,
        Err(AppError::InvalidField { .. })
    ));
    assert!(service.list_budgets().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_budget_status_for_month() -> Result<()> {
    let (service, _temp) = test_service().await?;

    SampleData::create_budgets(&service).await?;
    SampleData::create_expenses(&service).await?;

    let january = Month::new(2024, 1).unwrap();
    let status = service.get_budget_status("Food", january).await?;

    // 150.00 + 200.00; the February expense is not counted
    assert_eq!(status.spent, 35000);
    assert_eq!(status.remaining, 5000);
    assert_eq!(status.alert, BudgetAlert::Nearing);
    assert_eq!(status.month, january);

    let february = Month::new(2024, 2).unwrap();
    let status = service.get_budget_status("Food", february).await?;
    assert_eq!(status.spent, 9000);
    assert_eq!(status.alert, BudgetAlert::Within);

    Ok(())
}

#[tokio::test]
async fn test_budget_status_alerts() -> Result<()> {
    let (service, _temp) = test_service().await?;

    SampleData::create_budgets(&service).await?;
    service
        .set_budget(NewBudget::new("Rent", 100000, 1200000))
        .await?;
    SampleData::create_expenses(&service).await?;
    service
        .add_expense(NewExpense::new(date("2024-01-25"), 6000, "Transport", "Cash"))
        .await?;

    let statuses = service
        .get_all_budget_statuses(Month::new(2024, 1).unwrap())
        .await?;
    assert_eq!(statuses.len(), 3);

    let food = statuses.iter().find(|s| s.budget.category == "Food").unwrap();
    assert_eq!(food.alert, BudgetAlert::Nearing);

    // 50.00 + 60.00 against a 100.00 limit
    let transport = statuses
        .iter()
        .find(|s| s.budget.category == "Transport")
        .unwrap();
    assert_eq!(transport.spent, 11000);
    assert_eq!(transport.remaining, -1000);
    assert_eq!(transport.alert, BudgetAlert::Exceeded);

    let rent = statuses.iter().find(|s| s.budget.category == "Rent").unwrap();
    assert_eq!(rent.spent, 0);
    assert_eq!(rent.alert, BudgetAlert::Within);

    // Entertainment has spending but no budget, so it has no status
    assert!(statuses.iter().all(|s| s.budget.category != "Entertainment"));

    Ok(())
}

#[tokio::test]
async fn test_budget_status_missing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .get_budget_status("Food", Month::new(2024, 1).unwrap())
        .await;
    assert!(matches!(result, Err(AppError::BudgetNotFound(_))));

    Ok(())
}
