//! View that remembers what it was asked to show.

use std::sync::Mutex;

use crate::desk::{DeskState, DeskView};

/// [`DeskView`] that records renders and failure notices.
#[derive(Debug, Default)]
pub struct RecordingView {
    renders: Mutex<Vec<DeskState>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    /// State passed to the most recent render.
    pub fn last_rendered(&self) -> Option<DeskState> {
        self.renders.lock().unwrap().last().cloned()
    }

    /// Failure notices, oldest first.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.renders.lock().unwrap().clear();
        self.failures.lock().unwrap().clear();
    }
}

impl DeskView for RecordingView {
    fn render(&self, state: &DeskState) {
        self.renders.lock().unwrap().push(state.clone());
    }

    fn notify_failure(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}
