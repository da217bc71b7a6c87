pub mod customer_repository;
pub mod distributed_lock;
pub mod job_repository;
pub mod notification_sender;
pub mod task_spawner;
pub mod time_service;
pub mod worker_repository;
