mod common;

use anyhow::Result;
use common::{CampingTrip, test_service};
use std::collections::HashMap;
use tripkit::domain::PersonId;

#[tokio::test]
async fn test_no_expenses_means_no_settlements() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;

    let plan = service.settlement_plan().await?;
    assert!(plan.settlements.is_empty());
    assert_eq!(plan.balances.len(), 3);
    assert!(plan.balances.iter().all(|entry| entry.balance == 0.0));
    Ok(())
}

#[tokio::test]
async fn test_group_expense_settles_toward_payer() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Groceries", 90.0, "Ana").await?;

    let plan = service.settlement_plan().await?;
    let ana = service.get_person("Ana").await?;

    assert_eq!(plan.settlements.len(), 2);
    for settlement in &plan.settlements {
        assert_eq!(settlement.to, ana.id);
        assert_eq!(settlement.amount, 30.0);
        assert_ne!(settlement.from, settlement.to);
    }
    Ok(())
}

#[tokio::test]
async fn test_crossing_debts_collapse_to_one_transfer() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.add_person("Ana".into()).await?;
    service.add_person("Bruno".into()).await?;
    CampingTrip::split_expense(&service, "Dinner", 100.0, "Ana", &["Bruno"]).await?;
    CampingTrip::split_expense(&service, "Fuel", 40.0, "Bruno", &["Ana"]).await?;

    let ana = service.get_person("Ana").await?;
    let bruno = service.get_person("Bruno").await?;

    let plan = service.settlement_plan().await?;
    assert_eq!(plan.settlements.len(), 1);
    assert_eq!(plan.settlements[0].from, bruno.id);
    assert_eq!(plan.settlements[0].to, ana.id);
    assert_eq!(plan.settlements[0].amount, 60.0);
    Ok(())
}

#[tokio::test]
async fn test_settlements_discharge_all_balances() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    service.add_person("Diego".into()).await?;

    CampingTrip::group_expense(&service, "Campsite", 200.0, "Ana").await?;
    CampingTrip::split_expense(&service, "Meat", 85.5, "Bruno", &["Ana", "Bruno", "Carla"]).await?;
    CampingTrip::split_expense(&service, "Ice", 7.77, "Diego", &["Carla"]).await?;

    let plan = service.settlement_plan().await?;

    let mut balances: HashMap<PersonId, f64> = plan
        .balances
        .iter()
        .map(|entry| (entry.person.id, entry.balance))
        .collect();
    for settlement in &plan.settlements {
        *balances.get_mut(&settlement.from).unwrap() += settlement.amount;
        *balances.get_mut(&settlement.to).unwrap() -= settlement.amount;
    }

    for (id, balance) in balances {
        assert!(
            balance.abs() < 0.011,
            "person {id} left with residual {balance}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_settle_is_idempotent() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Drinks", 100.0, "Bruno").await?;
    CampingTrip::split_expense(&service, "Firewood", 33.33, "Carla", &["Ana", "Bruno"]).await?;

    let first = service.settlement_plan().await?;
    let second = service.settlement_plan().await?;
    assert_eq!(first.settlements, second.settlements);
    Ok(())
}

#[tokio::test]
async fn test_removing_a_person_reflows_group_expenses() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Groceries", 90.0, "Ana").await?;

    // Shared by everyone = 3 people: Ana is owed 60.
    let before = service.person_balance("Ana").await?;
    assert!((before.balance - 60.0).abs() < 1e-9);

    // Carla leaves. The group expense now splits between Ana and Bruno.
    service.remove_person("Carla").await?;
    let after = service.person_balance("Ana").await?;
    assert!((after.balance - 45.0).abs() < 1e-9);

    let plan = service.settlement_plan().await?;
    assert_eq!(plan.settlements.len(), 1);
    assert_eq!(plan.settlements[0].amount, 45.0);
    Ok(())
}

#[tokio::test]
async fn test_removed_subset_member_share_evaporates() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::split_expense(
        &service,
        "Kayak rental",
        90.0,
        "Ana",
        &["Ana", "Bruno", "Carla"],
    )
    .await?;

    // Carla leaves, but the expense still names her: the split stays /3 and
    // her third is simply dropped from the books.
    service.remove_person("Carla").await?;

    let ana = service.person_balance("Ana").await?;
    let bruno = service.person_balance("Bruno").await?;
    assert!((ana.balance - 60.0).abs() < 1e-9);
    assert!((bruno.balance + 30.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_rounding_three_way_split() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Boat trip", 100.0, "Ana").await?;

    let plan = service.settlement_plan().await?;
    assert_eq!(plan.settlements.len(), 2);
    for settlement in &plan.settlements {
        assert_eq!(settlement.amount, 33.33);
    }
    Ok(())
}

#[tokio::test]
async fn test_person_balance_matches_plan_entry() -> Result<()> {
    let (service, _temp) = test_service().await?;
    CampingTrip::create_crew(&service).await?;
    CampingTrip::group_expense(&service, "Groceries", 123.45, "Bruno").await?;
    CampingTrip::split_expense(&service, "Snacks", 10.0, "Carla", &["Ana"]).await?;

    let plan = service.settlement_plan().await?;
    for entry in &plan.balances {
        let single = service.person_balance(&entry.person.name).await?;
        assert!(
            (single.balance - entry.balance).abs() < 1e-9,
            "balance accessor disagrees for {}",
            entry.person.name
        );
    }
    Ok(())
}
