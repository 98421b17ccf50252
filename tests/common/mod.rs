// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;
use tripkit::application::TripService;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(TripService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = TripService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Test fixture: a standard camping trip
pub struct CampingTrip;

impl CampingTrip {
    /// Add the standard crew: Ana, Bruno, Carla
    pub async fn create_crew(service: &TripService) -> Result<()> {
        service.add_person("Ana".into()).await?;
        service.add_person("Bruno".into()).await?;
        service.add_person("Carla".into()).await?;
        Ok(())
    }

    /// Record an expense shared by everyone
    pub async fn group_expense(
        service: &TripService,
        description: &str,
        amount: f64,
        paid_by: &str,
    ) -> Result<()> {
        service
            .add_expense(description.into(), amount, paid_by, &[], Utc::now())
            .await?;
        Ok(())
    }

    /// Record an expense shared by a named subset
    pub async fn split_expense(
        service: &TripService,
        description: &str,
        amount: f64,
        paid_by: &str,
        shared_with: &[&str],
    ) -> Result<()> {
        let participants: Vec<String> = shared_with.iter().map(|s| s.to_string()).collect();
        service
            .add_expense(description.into(), amount, paid_by, &participants, Utc::now())
            .await?;
        Ok(())
    }
}
