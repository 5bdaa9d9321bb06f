//! Top-level layout: URL field, results area, status bar.

use crate::app::{App, Focus};
use crate::util::display_width;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::{results, status};

const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 8;

const PLACEHOLDER: &str = "Enter a website URL (e.g., example.com)";

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_input(f, app, chunks[0]);
    results::render(f, app, chunks[1]);
    status::render(f, app, chunks[2]);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Input;
    let palette = &app.palette;
    let input = app.controller.input();

    let border_style = if focused {
        palette.input_border_focused
    } else {
        palette.input_border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Website URL ");
    let inner = block.inner(area);

    // One column is kept free for the cursor.
    let visible = visible_tail(input, usize::from(inner.width.saturating_sub(1)));
    let line = if input.is_empty() {
        Line::from(Span::styled(PLACEHOLDER, palette.input_placeholder))
    } else {
        Line::from(Span::styled(visible, palette.input_text))
    };
    f.render_widget(Paragraph::new(line).block(block), area);

    if focused && inner.width > 0 && inner.height > 0 {
        let offset = u16::try_from(display_width(visible)).unwrap_or(u16::MAX);
        f.set_cursor_position(Position::new(
            inner.x + offset.min(inner.width.saturating_sub(1)),
            inner.y,
        ));
    }
}

/// The longest suffix of `s` that fits in `max_width` columns, so the end of
/// a long URL stays in view while typing.
fn visible_tail(s: &str, max_width: usize) -> &str {
    if display_width(s) <= max_width {
        return s;
    }
    let mut used = 0;
    let mut start = s.len();
    for (idx, c) in s.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        used += w;
        start = idx;
    }
    &s[start..]
}
