//! Shared helpers for integration tests

#![allow(dead_code)]

use logicmapper::progress::{ProgressEvent, ProgressHandler};
use std::path::Path;
use std::sync::Mutex;

/// Writes `files` (relative path, content) under `root`
pub fn write_repo(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }
}

/// Captures every progress event for later assertions
#[derive(Default)]
pub struct CapturingHandler {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CapturingHandler {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn recall_counts(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::MemoryRecalled { count, .. } => Some(count),
                _ => None,
            })
            .collect()
    }
}

impl ProgressHandler for CapturingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
