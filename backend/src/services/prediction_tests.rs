use chrono::{Duration, NaiveDate, TimeZone, Utc};

use crate::db::models::{BloodType, StockFilter, UsageRecord};
use crate::db::repositories::LocalRepository;
use crate::db::repository::InventoryRepository;
use crate::models::RiskLevel;
use crate::services::prediction::{filter_by_risk, predict_shortages};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
}

async fn seed(repo: &LocalRepository) {
    let at = Utc.with_ymd_and_hms(2024, 2, 15, 8, 0, 0).unwrap();
    repo.upsert_inventory("H001", BloodType::OPositive, 15, at)
        .await
        .unwrap();
    repo.upsert_inventory("H001", BloodType::ANegative, 8, at)
        .await
        .unwrap();
    repo.upsert_inventory("H002", BloodType::OPositive, 12, at)
        .await
        .unwrap();

    // H001 O+: 3 units/day over the last 10 days
    for d in 1..=10 {
        repo.add_usage(UsageRecord {
            hospital_id: "H001".into(),
            blood_type: BloodType::OPositive,
            date_of_usage: today() - Duration::days(d),
            units_used: 3,
        });
    }
    // H001 A-: 4 units/day, plus an old spike outside the window
    for d in 1..=5 {
        repo.add_usage(UsageRecord {
            hospital_id: "H001".into(),
            blood_type: BloodType::ANegative,
            date_of_usage: today() - Duration::days(d),
            units_used: 4,
        });
    }
    repo.add_usage(UsageRecord {
        hospital_id: "H001".into(),
        blood_type: BloodType::ANegative,
        date_of_usage: today() - Duration::days(45),
        units_used: 100,
    });
}

#[tokio::test]
async fn test_predictions_follow_usage_history() {
    let repo = LocalRepository::new();
    seed(&repo).await;

    let predictions = predict_shortages(&repo, &StockFilter::default(), today())
        .await
        .unwrap();
    assert_eq!(predictions.len(), 3);

    let o_pos = predictions
        .iter()
        .find(|p| p.hospital_id == "H001" && p.blood_type == BloodType::OPositive)
        .unwrap();
    assert_eq!(o_pos.avg_daily_usage, 3.0);
    assert_eq!(o_pos.risk_level, RiskLevel::High);
    assert_eq!(o_pos.risk_score, 0.75);
    assert_eq!(o_pos.days_to_shortage, Some(5));
    assert_eq!(o_pos.expected_shortage_date, NaiveDate::from_ymd_opt(2024, 2, 20));

    let a_neg = predictions
        .iter()
        .find(|p| p.blood_type == BloodType::ANegative)
        .unwrap();
    assert_eq!(a_neg.avg_daily_usage, 4.0);
    assert_eq!(a_neg.risk_level, RiskLevel::Critical);
    assert_eq!(a_neg.risk_score, 0.93);
}

#[tokio::test]
async fn test_line_without_usage_assumes_one_unit_per_day() {
    let repo = LocalRepository::new();
    seed(&repo).await;

    let predictions = predict_shortages(
        &repo,
        &StockFilter::new(Some("H002".into()), None),
        today(),
    )
    .await
    .unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].avg_daily_usage, 1.0);
    assert_eq!(predictions[0].days_to_shortage, Some(12));
    assert_eq!(predictions[0].risk_level, RiskLevel::Medium);
}

#[tokio::test]
async fn test_filter_by_risk_level() {
    let repo = LocalRepository::new();
    seed(&repo).await;

    let predictions = predict_shortages(&repo, &StockFilter::default(), today())
        .await
        .unwrap();
    let critical = filter_by_risk(predictions.clone(), Some(RiskLevel::Critical));
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].blood_type, BloodType::ANegative);

    assert_eq!(filter_by_risk(predictions, None).len(), 3);
}

#[tokio::test]
async fn test_empty_inventory_yields_no_predictions() {
    let repo = LocalRepository::new();
    let predictions = predict_shortages(&repo, &StockFilter::default(), today())
        .await
        .unwrap();
    assert!(predictions.is_empty());
}
