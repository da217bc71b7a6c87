use crate::application::services::SchedulingService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub scheduling_service: SchedulingService,
}
