//! Notifications sent from the engine to the surrounding UI.

use crate::map::ToolMode;
use crate::query::SelectedFeature;

/// Receiver of engine events.
///
/// The engine does not own an event loop or a rendering surface. The embedding
/// application implements this trait to be told when the surface must be redrawn and
/// when state it presents elsewhere (selection panel, toolbar) has changed.
pub trait Messenger: Send + Sync {
    /// The rendering surface should be redrawn.
    fn request_redraw(&self);

    /// The selected feature changed. `None` means the selection was cleared.
    fn feature_selected(&self, feature: Option<&SelectedFeature>);

    /// The active tool mode changed.
    fn tool_mode_changed(&self, mode: ToolMode);

    /// The map service answered with a non-data response; the deployment is
    /// misconfigured and the user should be warned.
    fn configuration_error(&self, message: &str);
}

/// Messenger that ignores all events.
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}

    fn feature_selected(&self, _feature: Option<&SelectedFeature>) {}

    fn tool_mode_changed(&self, _mode: ToolMode) {}

    fn configuration_error(&self, _message: &str) {}
}
