//! Browser timer and task-spawning adapters.

use std::time::Duration;

use file_session::{IntervalHandle, IntervalScheduler, LocalTask, TaskSpawner};

use crate::interop;

#[derive(Debug, Clone, Copy, Default)]
/// Browser interval scheduler backed by `setInterval`.
pub struct WebIntervalScheduler;

impl IntervalScheduler for WebIntervalScheduler {
    fn schedule(
        &self,
        interval: Duration,
        tick: Box<dyn FnMut()>,
    ) -> Result<Box<dyn IntervalHandle>, String> {
        let handle = interop::schedule_interval(interval, tick)?;
        Ok(Box::new(WebIntervalHandle { raw: handle }))
    }
}

/// Cancellation handle for a scheduled browser interval.
pub struct WebIntervalHandle {
    raw: interop::PlatformIntervalHandle,
}

impl IntervalHandle for WebIntervalHandle {
    fn cancel(&mut self) {
        self.raw.cancel();
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser task spawner backed by the wasm single-threaded executor.
pub struct WebTaskSpawner;

impl TaskSpawner for WebTaskSpawner {
    fn spawn(&self, task: LocalTask) {
        interop::spawn_task(task);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_targets_report_unsupported_intervals() {
        let err = WebIntervalScheduler
            .schedule(Duration::from_secs(5), Box::new(|| {}))
            .err()
            .expect("schedule should fail");
        assert!(err.contains("wasm32"));
    }

    #[test]
    fn native_spawner_drops_tasks_without_running_them() {
        WebTaskSpawner.spawn(Box::pin(async { panic!("should not run") }));
    }
}
