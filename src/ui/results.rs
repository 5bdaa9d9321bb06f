use crate::app::{App, Focus};
use crate::controller::UiState;
use crate::feed::FeedCandidate;
use crate::theme::ColorPalette;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const NO_FEEDS_MESSAGE: &str = "No RSS feeds found for this URL.";
const UNTITLED_FEED: &str = "Untitled Feed";
const IDLE_HINT: &str = "Type a website URL above to find its feeds.";

/// Render the results area for the current `UiState`.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let palette = &app.palette;
    let border_style = if app.focus == Focus::Results {
        palette.results_border_focused
    } else {
        palette.results_border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Feeds ");

    let message = match app.controller.state() {
        UiState::Success(feeds) if !feeds.is_empty() => {
            render_list(f, app, feeds, block, area);
            return;
        }
        UiState::Success(_) => Span::styled(NO_FEEDS_MESSAGE, palette.empty),
        UiState::Idle => Span::styled(IDLE_HINT, palette.input_placeholder),
        UiState::Loading { url } => Span::styled(format!("Searching {}...", url), palette.loading),
        UiState::Error(error) => Span::styled(format!("Error: {}", error), palette.error),
    };

    let paragraph = Paragraph::new(Line::from(message))
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(paragraph, area);
}

fn render_list(f: &mut Frame, app: &App, feeds: &[FeedCandidate], block: Block, area: Rect) {
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    f.render_widget(
        Paragraph::new(heading(feeds.len())).style(app.palette.results_heading),
        chunks[0],
    );

    let width = usize::from(chunks[1].width.saturating_sub(2));
    let items: Vec<ListItem> = feeds
        .iter()
        .map(|feed| feed_item(feed, width, &app.palette))
        .collect();

    let list = List::new(items)
        .highlight_style(app.palette.feed_selected)
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.controller.selected()));
    f.render_stateful_widget(list, chunks[1], &mut state);
}

fn feed_item<'a>(feed: &'a FeedCandidate, width: usize, palette: &ColorPalette) -> ListItem<'a> {
    let title = display_title(feed);
    ListItem::new(vec![
        Line::from(Span::styled(
            truncate_to_width(title, width),
            palette.feed_title,
        )),
        Line::from(Span::styled(
            truncate_to_width(&feed.link, width),
            palette.feed_link,
        )),
    ])
}

/// `"Found 1 RSS feed"`, `"Found 3 RSS feeds"`.
fn heading(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Found {} RSS feed{}", count, plural)
}

/// The feed's title, or the placeholder when it has none.
fn display_title(feed: &FeedCandidate) -> &str {
    if feed.title.trim().is_empty() {
        UNTITLED_FEED
    } else {
        &feed.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::clipboard::SystemClipboard;
    use crate::controller::{AppEvent, ControllerSettings, SearchController};
    use crate::keybindings::KeybindingRegistry;
    use crate::theme::ThemeVariant;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn test_app() -> App {
        let api = ApiClient::new("http://127.0.0.1:9", None).unwrap();
        let controller =
            SearchController::new(api, Arc::new(SystemClipboard), ControllerSettings::default());
        App::new(controller, KeybindingRegistry::new(), ThemeVariant::Dark)
    }

    fn complete(app: &mut App, result: Result<Vec<FeedCandidate>, String>) {
        let generation = app.controller.generation();
        app.controller.handle_event(AppEvent::SearchCompleted {
            generation,
            url: "https://example.com".to_owned(),
            result,
        });
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| render(f, app, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_heading_pluralizes() {
        assert_eq!(heading(1), "Found 1 RSS feed");
        assert_eq!(heading(2), "Found 2 RSS feeds");
    }

    #[test]
    fn test_display_title_fallback() {
        let feed = FeedCandidate::new("  ", "https://example.com/feed");
        assert_eq!(display_title(&feed), UNTITLED_FEED);
        let feed = FeedCandidate::new("Blog", "https://example.com/feed");
        assert_eq!(display_title(&feed), "Blog");
    }

    #[test]
    fn test_renders_feed_list() {
        let mut app = test_app();
        complete(
            &mut app,
            Ok(vec![
                FeedCandidate::new("Blog", "https://example.com/feed.xml"),
                FeedCandidate::new("", "https://example.com/atom.xml"),
            ]),
        );

        let screen = draw(&app);
        assert!(screen.contains("Found 2 RSS feeds"));
        assert!(screen.contains("Blog"));
        assert!(screen.contains("https://example.com/feed.xml"));
        assert!(screen.contains(UNTITLED_FEED));
    }

    #[test]
    fn test_renders_empty_result() {
        let mut app = test_app();
        complete(&mut app, Ok(vec![]));
        assert!(draw(&app).contains(NO_FEEDS_MESSAGE));
    }

    #[test]
    fn test_renders_error() {
        let mut app = test_app();
        complete(&mut app, Err("Invalid URL format".to_owned()));
        assert!(draw(&app).contains("Error: Invalid URL format"));
    }
}
