use futures::future::BoxFuture;

/// Spawns long-running background tasks (workers) on the host runtime
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, future: BoxFuture<'static, ()>);
}
