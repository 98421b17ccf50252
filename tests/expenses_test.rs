mod common;

use anyhow::Result;
use common::{CampingTrip, parse_date, test_service};
use tripkit::application::AppError;

#[tokio::test]
async fn test_add_and_list_expenses() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;

    let record = service
        .add_expense(
            "Groceries".into(),
            75.5,
            "Ana",
            &["Ana".into(), "Bruno".into()],
            parse_date("2026-02-10"),
        )
        .await?;
    assert_eq!(record.payer_name, "Ana");
    assert_eq!(record.participant_names, vec!["Ana", "Bruno"]);

    let expenses = service.list_expenses().await?;
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 75.5);
    assert_eq!(expenses[0].shared_by.len(), 2);
    assert_eq!(
        expenses[0].spent_at.date_naive().to_string(),
        "2026-02-10"
    );
    Ok(())
}

#[tokio::test]
async fn test_expenses_listed_oldest_first() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;

    service
        .add_expense("Second".into(), 10.0, "Ana", &[], parse_date("2026-02-12"))
        .await?;
    service
        .add_expense("First".into(), 10.0, "Ana", &[], parse_date("2026-02-10"))
        .await?;

    let expenses = service.list_expenses().await?;
    assert_eq!(expenses[0].description, "First");
    assert_eq!(expenses[1].description, "Second");
    Ok(())
}

#[tokio::test]
async fn test_expense_requires_known_payer() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;

    let result = service
        .add_expense("Ice".into(), 5.0, "Zoe", &[], parse_date("2026-02-10"))
        .await;
    assert!(matches!(result, Err(AppError::PersonNotFound(name)) if name == "Zoe"));
    Ok(())
}

#[tokio::test]
async fn test_expense_requires_known_participants() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;

    let result = service
        .add_expense(
            "Ice".into(),
            5.0,
            "Ana",
            &["Bruno".into(), "Zoe".into()],
            parse_date("2026-02-10"),
        )
        .await;
    assert!(matches!(result, Err(AppError::PersonNotFound(_))));
    assert!(service.list_expenses().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_expense_rejects_bad_amounts() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;

    for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let result = service
            .add_expense("Bad".into(), amount, "Ana", &[], parse_date("2026-02-10"))
            .await;
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }
    Ok(())
}

#[tokio::test]
async fn test_remove_expense() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Groceries", 90.0, "Ana").await?;

    let expenses = service.list_expenses().await?;
    let removed = service.remove_expense(expenses[0].id).await?;
    assert_eq!(removed.expense.description, "Groceries");
    assert_eq!(removed.payer_name.as_deref(), Some("Ana"));
    assert!(service.list_expenses().await?.is_empty());

    // Balances recompute from the now-empty list.
    let ana = service.person_balance("Ana").await?;
    assert_eq!(ana.balance, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_remove_expense_after_payer_left() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Groceries", 90.0, "Ana").await?;
    service.remove_person("Ana").await?;

    let expenses = service.list_expenses().await?;
    let removed = service.remove_expense(expenses[0].id).await?;
    assert_eq!(removed.expense.description, "Groceries");
    assert!(removed.payer_name.is_none());
    Ok(())
}

#[tokio::test]
async fn test_remove_missing_expense_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let result = service.remove_expense(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::ExpenseNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_person_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.add_person("Ana".into()).await?;

    let result = service.add_person("Ana".into()).await;
    assert!(matches!(result, Err(AppError::PersonAlreadyExists(_))));
    Ok(())
}

#[tokio::test]
async fn test_expense_summary_totals_and_top_payer() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Campsite", 120.0, "Ana").await?;
    CampingTrip::group_expense(&service, "Groceries", 80.0, "Bruno").await?;
    CampingTrip::group_expense(&service, "More groceries", 50.0, "Bruno").await?;

    let summary = service.expense_summary().await?;
    assert_eq!(summary.expense_count, 3);
    assert_eq!(summary.total_spent, 250.0);

    let top = summary.top_payer.expect("someone paid");
    assert_eq!(top.person.name, "Bruno");
    assert_eq!(top.paid, 130.0);

    // Everyone appears in paid totals, payers first.
    assert_eq!(summary.paid_totals.len(), 3);
    assert_eq!(summary.paid_totals[0].person.name, "Bruno");
    assert_eq!(summary.paid_totals[1].person.name, "Ana");
    assert_eq!(summary.paid_totals[2].paid, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_empty_summary() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let summary = service.expense_summary().await?;
    assert_eq!(summary.expense_count, 0);
    assert_eq!(summary.total_spent, 0.0);
    assert!(summary.top_payer.is_none());
    Ok(())
}
