use crate::controller::{SearchController, UiState};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::theme::{ColorPalette, ThemeVariant};

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Results,
}

/// Terminal client state: the search controller plus the view concerns that
/// sit on top of it.
pub struct App {
    pub controller: SearchController,
    pub focus: Focus,
    pub theme_variant: ThemeVariant,
    pub palette: ColorPalette,
    pub keybindings: KeybindingRegistry,
    /// Set whenever state changes; the loop only draws when true.
    pub needs_redraw: bool,
}

impl App {
    pub fn new(
        controller: SearchController,
        keybindings: KeybindingRegistry,
        theme_variant: ThemeVariant,
    ) -> Self {
        Self {
            controller,
            focus: Focus::Input,
            theme_variant,
            palette: theme_variant.palette(),
            keybindings,
            needs_redraw: true,
        }
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.palette = variant.palette();
        self.needs_redraw = true;
    }

    /// Dark → Light → Dark. Returns the new theme's name.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    /// Keybinding context for the focused pane.
    pub fn context(&self) -> Context {
        match self.focus {
            Focus::Input => Context::Input,
            Focus::Results => Context::Results,
        }
    }

    fn has_results(&self) -> bool {
        matches!(self.controller.state(), UiState::Success(feeds) if !feeds.is_empty())
    }

    pub fn focus_input(&mut self) {
        self.focus = Focus::Input;
    }

    /// Input ↔ Results. Stays on the input while there is nothing to select.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.has_results() => Focus::Results,
            _ => Focus::Input,
        };
    }

    /// Pulls focus back to the input once the result list goes away.
    pub fn sync_focus(&mut self) {
        if self.focus == Focus::Results && !self.has_results() {
            self.focus = Focus::Input;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::clipboard::SystemClipboard;
    use crate::controller::{AppEvent, ControllerSettings};
    use crate::feed::FeedCandidate;
    use std::sync::Arc;

    fn test_app() -> App {
        let api = ApiClient::new("http://127.0.0.1:9", None).unwrap();
        let controller =
            SearchController::new(api, Arc::new(SystemClipboard), ControllerSettings::default());
        App::new(controller, KeybindingRegistry::new(), ThemeVariant::Dark)
    }

    fn with_results(app: &mut App, feeds: Vec<FeedCandidate>) {
        let generation = app.controller.generation();
        app.controller.handle_event(AppEvent::SearchCompleted {
            generation,
            url: "https://example.com".to_owned(),
            result: Ok(feeds),
        });
    }

    #[test]
    fn test_starts_on_input() {
        let app = test_app();
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.context(), Context::Input);
        assert!(app.needs_redraw);
    }

    #[test]
    fn test_cycle_theme() {
        let mut app = test_app();
        app.needs_redraw = false;
        assert_eq!(app.cycle_theme(), "Light");
        assert_eq!(app.theme_variant, ThemeVariant::Light);
        assert!(app.needs_redraw);
        assert_eq!(app.cycle_theme(), "Dark");
    }

    #[test]
    fn test_cycle_focus_needs_results() {
        let mut app = test_app();
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Input);

        with_results(&mut app, vec![]);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Input);

        with_results(
            &mut app,
            vec![FeedCandidate::new("Blog", "https://example.com/feed.xml")],
        );
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Results);
        assert_eq!(app.context(), Context::Results);

        app.cycle_focus();
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn test_sync_focus_after_clear() {
        let mut app = test_app();
        with_results(
            &mut app,
            vec![FeedCandidate::new("Blog", "https://example.com/feed.xml")],
        );
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Results);

        app.controller.clear();
        app.sync_focus();
        assert_eq!(app.focus, Focus::Input);
    }
}
