use crate::app::App;
use crate::controller::AppEvent;

/// Applies a background completion and keeps focus valid for the new state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    app.controller.handle_event(event);
    app.sync_focus();
}
