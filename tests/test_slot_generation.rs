mod helpers;

use chrono::NaiveTime;
use fieldbook::application::services::{SchedulingService, SlotQuery};
use fieldbook::domain::entities::{JobStatus, Slot};
use fieldbook::domain::errors::DomainError;
use fieldbook::domain::ports::job_repository::JobRepository;
use fieldbook::domain::ports::worker_repository::WorkerRepository;
use fieldbook::domain::services::DEFAULT_BUSINESS_HOURS;
use fieldbook::infrastructure::persistence::Database;
use helpers::*;
use serde_json::json;
use std::sync::Arc;

fn scheduling_service(db: &Database) -> SchedulingService {
    SchedulingService::new(
        Arc::new(db.clone()) as Arc<dyn WorkerRepository>,
        Arc::new(db.clone()) as Arc<dyn JobRepository>,
        DEFAULT_BUSINESS_HOURS,
        30,
    )
}

// 2024-03-04 is a Monday
fn query(duration_minutes: u32) -> SlotQuery {
    SlotQuery {
        date: date(2024, 3, 4),
        duration_minutes,
        worker_id: None,
        service_id: None,
    }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn count_at(slots: &[Slot], time: NaiveTime) -> Option<usize> {
    slots
        .iter()
        .find(|s| s.start_time == time)
        .map(|s| s.available_worker_count)
}

#[tokio::test]
async fn test_slots_reflect_stored_availability_and_bookings() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let customer_id = create_test_customer(db, "Avery").await;

    let alice = create_test_worker(db, "Alice", None, &[]).await;
    create_test_worker(
        db,
        "Bob",
        Some(json!({"weeklySchedule": {"monday": {"enabled": true, "start": "12:00", "end": "17:00"}}})),
        &[],
    )
    .await;
    book_job(db, &customer_id, Some(&alice), "2024-03-04 09:00", 120).await;

    let slots = scheduling_service(db)
        .available_slots(&query(60))
        .await
        .unwrap();

    // Alice is booked until 11:00 and Bob starts at noon
    assert_eq!(count_at(&slots, t(9, 0)), None);
    assert_eq!(count_at(&slots, t(10, 30)), None);
    assert_eq!(count_at(&slots, t(11, 0)), Some(1));
    assert_eq!(count_at(&slots, t(12, 0)), Some(2));
    assert_eq!(count_at(&slots, t(16, 0)), Some(2));
    assert!(slots.windows(2).all(|w| w[0].start_time < w[1].start_time));
}

#[tokio::test]
async fn test_bookings_on_other_days_and_cancelled_jobs_do_not_block() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let customer_id = create_test_customer(db, "Avery").await;
    let alice = create_test_worker(db, "Alice", None, &[]).await;

    book_job(db, &customer_id, Some(&alice), "2024-03-05 09:00", 480).await;
    let cancelled = book_job(db, &customer_id, Some(&alice), "2024-03-04 09:00", 480).await;
    db.update_job_status(&cancelled.id, JobStatus::Cancelled)
        .await
        .unwrap();
    book_job(db, &customer_id, None, "2024-03-04 09:00", 480).await;

    let slots = scheduling_service(db)
        .available_slots(&query(60))
        .await
        .unwrap();

    assert_eq!(slots.len(), 15);
    assert!(slots.iter().all(|s| s.available_worker_count == 1));
}

#[tokio::test]
async fn test_service_and_worker_filters() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let customer_id = create_test_customer(db, "Avery").await;

    let alice = create_test_worker(db, "Alice", None, &["lawn-care"]).await;
    let bob = create_test_worker(db, "Bob", None, &["lawn-care", "pest-control"]).await;
    book_job(db, &customer_id, Some(&bob), "2024-03-04 09:00", 60).await;

    let service = scheduling_service(db);

    let mut pest = query(60);
    pest.service_id = Some("pest-control".to_string());
    let slots = service.available_slots(&pest).await.unwrap();
    assert_eq!(count_at(&slots, t(9, 0)), None);
    assert_eq!(count_at(&slots, t(10, 0)), Some(1));

    let mut only_alice = query(60);
    only_alice.worker_id = Some(alice.clone());
    let slots = service.available_slots(&only_alice).await.unwrap();
    assert_eq!(count_at(&slots, t(9, 0)), Some(1));

    let mut unknown = query(60);
    unknown.worker_id = Some("missing-worker".to_string());
    assert!(service.available_slots(&unknown).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inactive_workers_are_not_offered() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let alice = create_test_worker(db, "Alice", None, &[]).await;
    db.deactivate_worker(&alice).await.unwrap();

    let slots = scheduling_service(db)
        .available_slots(&query(60))
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_closed_date_override_removes_worker() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    create_test_worker(
        db,
        "Alice",
        Some(json!({
            "monday": {"available": true, "hours": "9:00 AM - 5:00 PM"},
            "dateOverrides": [{"date": "2024-03-04", "available": false}]
        })),
        &[],
    )
    .await;
    create_test_worker(db, "Bob", Some(json!("not an availability document")), &[]).await;

    let slots = scheduling_service(db)
        .available_slots(&query(30))
        .await
        .unwrap();

    // Bob's unusable configuration fails open
    assert_eq!(slots.len(), 16);
    assert!(slots.iter().all(|s| s.available_worker_count == 1));
}

#[tokio::test]
async fn test_rejects_invalid_durations() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let service = scheduling_service(db);

    assert!(matches!(
        service.available_slots(&query(0)).await,
        Err(DomainError::ValidationError(_))
    ));
    assert!(matches!(
        service.available_slots(&query(24 * 60 + 1)).await,
        Err(DomainError::ValidationError(_))
    ));
}

#[tokio::test]
async fn test_overnight_booking_blocks_the_next_morning() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let customer_id = create_test_customer(db, "Avery").await;
    let alice = create_test_worker(db, "Alice", None, &[]).await;

    // Sunday 22:00 for twelve hours, running until Monday 10:00
    book_job(db, &customer_id, Some(&alice), "2024-03-03 22:00", 720).await;

    let slots = scheduling_service(db)
        .available_slots(&query(60))
        .await
        .unwrap();

    assert_eq!(count_at(&slots, t(9, 0)), None);
    assert_eq!(count_at(&slots, t(9, 30)), None);
    assert_eq!(count_at(&slots, t(10, 0)), Some(1));
}
