//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a pipeline run progresses
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Run started for a location
    Started { location: String },

    /// A workflow phase started
    PhaseStarted { phase: String },

    /// A workflow phase finished
    PhaseComplete { phase: String, duration: Duration },

    /// Rules were extracted from a file
    FileAnalyzed {
        path: String,
        rules: usize,
        index: usize,
        total: usize,
    },

    /// A file could not be read and was left out
    FileSkipped { path: String, reason: String },

    /// Rule extraction failed for a file
    FileFailed { path: String, error: String },

    /// Memory recall finished for a file; `count` may be zero
    MemoryRecalled { path: String, count: usize },

    /// Run completed and the report was produced
    Completed {
        files: usize,
        rules: usize,
        total_time: Duration,
    },

    /// Run aborted
    Failed { error: String },
}

/// Trait for observing pipeline progress
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        NoOpHandler.on_progress(&ProgressEvent::Started {
            location: "/legacy".to_string(),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Started {
            location: "/legacy".to_string(),
        });
        handler.on_progress(&ProgressEvent::MemoryRecalled {
            path: "billing.py".to_string(),
            count: 0,
        });
        handler.on_progress(&ProgressEvent::Completed {
            files: 1,
            rules: 3,
            total_time: Duration::from_secs(5),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::MemoryRecalled {
            path: "billing.py".to_string(),
            count: 2,
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("MemoryRecalled"));
        assert!(debug_str.contains("count: 2"));
    }
}
