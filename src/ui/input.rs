//! Keyboard dispatch.
//!
//! Keys go through the keybinding registry for the focused pane first. In the
//! URL field, whatever is left over edits the text.

use crate::app::{App, Focus};
use crate::controller::AppEvent;
use crate::keybindings::Action as KbAction;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let action = match app.keybindings.action_for_key(code, modifiers, app.context()) {
        Some(kb_action) => dispatch(app, kb_action, event_tx),
        None => {
            if app.focus == Focus::Input {
                edit_input(app, code, modifiers);
            }
            Action::Continue
        }
    };
    app.sync_focus();
    action
}

fn dispatch(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::Submit => {
            app.controller.submit(event_tx);
        }
        KbAction::Clear => {
            app.controller.clear();
            app.focus_input();
        }
        KbAction::FocusInput => app.focus_input(),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::NavDown => app.controller.select_next(),
        KbAction::NavUp => app.controller.select_prev(),
        KbAction::CopyLink => app.controller.copy_selected(event_tx),
        KbAction::OpenLink => app.controller.open_selected(),
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.controller.set_status(format!("Theme: {}", name));
        }
    }
    Action::Continue
}

fn edit_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.controller.clear_input();
        }
        KeyCode::Char(c)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.controller.push_char(c);
        }
        KeyCode::Backspace => app.controller.pop_char(),
        _ => {}
    }
}
