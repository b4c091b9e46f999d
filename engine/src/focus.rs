//! Which result pane is visible.

use playground_types::Action;

/// Last-trigger-wins pointer at one action kind.
///
/// Every trigger takes focus, even when it reuses an outstanding call. Only a
/// format that rewrote the buffer clears it, and only while format still holds
/// it; other settles never move it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusController {
    current: Option<Action>,
}

impl FocusController {
    #[must_use]
    pub fn current(&self) -> Option<Action> {
        self.current
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.current.is_some()
    }

    pub fn on_trigger(&mut self, action: Action) {
        self.current = Some(action);
    }

    /// A format result replaced the buffer; there is no pane left to show.
    pub fn on_format_applied(&mut self) {
        if self.current == Some(Action::Format) {
            self.current = None;
        }
    }

    /// Explicit navigation by the user.
    pub fn set(&mut self, focus: Option<Action>) {
        self.current = focus;
    }
}
