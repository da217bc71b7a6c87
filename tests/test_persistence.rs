mod helpers;

use fieldbook::domain::entities::{
    CustomerContact, Job, JobStatus, OccurrenceUpdate, WorkerAvailability, WorkerFilter,
};
use fieldbook::domain::errors::DomainError;
use fieldbook::domain::ports::customer_repository::CustomerRepository;
use fieldbook::domain::ports::job_repository::JobRepository;
use fieldbook::domain::ports::worker_repository::WorkerRepository;
use helpers::*;

#[tokio::test]
async fn test_null_columns_read_back_as_none() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let customer_id = create_test_customer(db, "Avery").await;

    let job = book_job(db, &customer_id, None, "2024-03-04 09:00", 60).await;

    let stored = db.get_job(&job.id).await.unwrap().unwrap();
    assert!(stored.worker_id.is_none());
    assert!(stored.address.is_none());
    assert!(stored.notes.is_none());
    assert!(stored.parent_job_id.is_none());
    assert!(stored.recurrence_descriptor.is_none());
    assert!(stored.recurring_end_date.is_none());
    assert!(stored.next_billing_date.is_none());
    assert!(stored.last_regenerated_on.is_none());
    assert_eq!(stored.scheduled_date_time, date_time("2024-03-04 09:00"));

    let appointments = db.find_appointments_for_date(date(2024, 3, 4)).await.unwrap();
    assert_eq!(appointments.len(), 1);
    assert!(appointments[0].worker_id.is_none());
}

#[tokio::test]
async fn test_worker_without_email_or_availability_is_listed() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    create_test_worker(db, "Alice", None, &[]).await;

    let workers = db
        .list_active_workers(&WorkerFilter { service_id: None })
        .await
        .unwrap();

    assert_eq!(workers.len(), 1);
    assert!(workers[0].email.is_none());
    assert_eq!(workers[0].availability, WorkerAvailability::Unrestricted);
}

#[tokio::test]
async fn test_customer_without_contact_details() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    db.create_customer(&CustomerContact {
        customer_id: "cust-quiet".to_string(),
        name: "Quinn".to_string(),
        email: None,
        phone: None,
    })
    .await
    .unwrap();

    let contact = db.get_customer_contact("cust-quiet").await.unwrap().unwrap();
    assert_eq!(contact.name, "Quinn");
    assert!(contact.email.is_none());
    assert!(contact.phone.is_none());
}

#[tokio::test]
async fn test_due_series_with_unassigned_worker_is_found() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let customer_id = create_test_customer(db, "Avery").await;

    let series =
        create_recurring_series(db, &customer_id, "weekly", "2024-03-01 09:00", None).await;

    let due = db.find_due_recurring_jobs(date(2024, 3, 1)).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, series.id);
    assert!(due[0].worker_id.is_none());
}

#[tokio::test]
async fn test_record_occurrence_rolls_back_when_source_is_missing() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let customer_id = create_test_customer(db, "Avery").await;
    let series =
        create_recurring_series(db, &customer_id, "weekly", "2024-03-01 09:00", None).await;

    let occurrence = Job::occurrence_of(&series, date_time("2024-03-08 09:00"));
    let update = OccurrenceUpdate {
        next_billing_date: Some(date(2024, 3, 8)),
        last_regenerated_on: Some(date(2024, 3, 1)),
        ..Default::default()
    };

    let result = db
        .record_occurrence("no-such-series", &occurrence, &update)
        .await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
    assert!(db.get_job(&occurrence.id).await.unwrap().is_none());

    db.record_occurrence(&series.id, &occurrence, &update)
        .await
        .unwrap();
    let stored = db.get_job(&occurrence.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Pending);
    let source = db.get_job(&series.id).await.unwrap().unwrap();
    assert_eq!(source.next_billing_date, Some(date(2024, 3, 8)));
    assert_eq!(source.last_regenerated_on, Some(date(2024, 3, 1)));
}
