//! Dark and light palettes for the terminal UI.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

/// Style per UI role.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // URL field
    pub input_text: Style,
    pub input_placeholder: Style,
    pub input_border: Style,
    pub input_border_focused: Style,

    // Results area
    pub results_border: Style,
    pub results_border_focused: Style,
    pub results_heading: Style,
    pub feed_title: Style,
    pub feed_link: Style,
    pub feed_selected: Style,
    pub loading: Style,
    pub empty: Style,
    pub error: Style,

    // Chrome
    pub status_bar: Style,
    pub toast: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            input_text: Style::default().fg(Color::White),
            input_placeholder: Style::default().fg(Color::DarkGray),
            input_border: Style::default(),
            input_border_focused: Style::default().fg(Color::Cyan),

            results_border: Style::default(),
            results_border_focused: Style::default().fg(Color::Cyan),
            results_heading: Style::default().add_modifier(Modifier::BOLD),
            feed_title: Style::default().add_modifier(Modifier::BOLD),
            feed_link: Style::default().fg(Color::Gray),
            feed_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            loading: Style::default().fg(Color::Yellow),
            empty: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            toast: Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            input_text: Style::default().fg(Color::Black),
            input_placeholder: Style::default().fg(Color::DarkGray),
            input_border: Style::default().fg(Color::DarkGray),
            input_border_focused: Style::default().fg(Color::Blue),

            results_border: Style::default().fg(Color::DarkGray),
            results_border_focused: Style::default().fg(Color::Blue),
            results_heading: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            feed_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            feed_link: Style::default().fg(Color::DarkGray),
            feed_selected: Style::default().bg(Color::Blue).fg(Color::White),
            loading: Style::default().fg(Color::Magenta),
            empty: Style::default().fg(Color::Magenta),
            error: Style::default().fg(Color::Red),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            toast: Style::default()
                .bg(Color::Green)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        }
    }
}
