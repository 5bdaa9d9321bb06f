use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

const INPUT_HINTS: &[Action] = &[
    Action::Submit,
    Action::Clear,
    Action::CycleFocus,
    Action::CycleTheme,
    Action::Quit,
];

const RESULTS_HINTS: &[Action] = &[
    Action::NavDown,
    Action::NavUp,
    Action::CopyLink,
    Action::OpenLink,
    Action::FocusInput,
    Action::Clear,
    Action::Quit,
];

/// Render the status bar: the toast if one is showing, otherwise key hints
/// for the focused pane.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, style): (Cow<'_, str>, _) = match app.controller.status() {
        Some(msg) => (Cow::Borrowed(msg), app.palette.toast),
        None => {
            let context = app.context();
            let actions = match context {
                Context::Results => RESULTS_HINTS,
                _ => INPUT_HINTS,
            };
            (
                Cow::Owned(app.keybindings.hints(context, actions)),
                app.palette.status_bar,
            )
        }
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}
