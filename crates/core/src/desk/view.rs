//! Rendering seam.

use tracing::warn;

use super::DeskState;

/// Whatever draws the board. Rendering itself is out of scope for the desk;
/// it only needs to know when to redraw and where to send failure notices.
pub trait DeskView: Send + Sync {
    /// Redraw from the current state.
    fn render(&self, state: &DeskState);

    /// Show a failure notice. `message` is passed through as received.
    fn notify_failure(&self, message: &str);
}

/// A view that draws nothing and logs notices.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl DeskView for NullView {
    fn render(&self, _state: &DeskState) {}

    fn notify_failure(&self, message: &str) {
        warn!(message, "Desk failure notice");
    }
}
