//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { location } => {
                info!(location = %location, "Starting analysis");
            }
            ProgressEvent::PhaseStarted { phase } => {
                info!(phase = %phase, "Starting phase");
            }
            ProgressEvent::PhaseComplete { phase, duration } => {
                info!(
                    phase = %phase,
                    duration_ms = duration.as_millis(),
                    "Phase complete"
                );
            }
            ProgressEvent::FileAnalyzed {
                path,
                rules,
                index,
                total,
            } => {
                info!(
                    file = %path,
                    rules,
                    progress = format!("{}/{}", index, total),
                    "File analyzed"
                );
            }
            ProgressEvent::FileSkipped { path, reason } => {
                debug!(file = %path, reason = %reason, "File skipped");
            }
            ProgressEvent::FileFailed { path, error } => {
                warn!(file = %path, error = %error, "Rule extraction failed");
            }
            ProgressEvent::MemoryRecalled { path, count } => {
                if *count > 0 {
                    info!(file = %path, count, "Recalled business rules from memory bank");
                } else {
                    debug!(file = %path, "No related rules in memory bank");
                }
            }
            ProgressEvent::Completed {
                files,
                rules,
                total_time,
            } => {
                info!(
                    files,
                    rules,
                    total_time_ms = total_time.as_millis(),
                    "Analysis complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Analysis failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::Started {
                location: "/legacy".to_string(),
            },
            ProgressEvent::PhaseStarted {
                phase: "DiscoverPhase".to_string(),
            },
            ProgressEvent::PhaseComplete {
                phase: "DiscoverPhase".to_string(),
                duration: Duration::from_millis(12),
            },
            ProgressEvent::FileAnalyzed {
                path: "billing.py".to_string(),
                rules: 2,
                index: 1,
                total: 3,
            },
            ProgressEvent::FileSkipped {
                path: "gone.py".to_string(),
                reason: "not found".to_string(),
            },
            ProgressEvent::FileFailed {
                path: "tax.py".to_string(),
                error: "timeout".to_string(),
            },
            ProgressEvent::MemoryRecalled {
                path: "billing.py".to_string(),
                count: 0,
            },
            ProgressEvent::MemoryRecalled {
                path: "billing.py".to_string(),
                count: 3,
            },
            ProgressEvent::Completed {
                files: 3,
                rules: 2,
                total_time: Duration::from_secs(5),
            },
            ProgressEvent::Failed {
                error: "Test error".to_string(),
            },
        ];

        for event in events {
            handler.on_progress(&event);
        }
    }
}
