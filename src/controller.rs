//! Client-side search workflow.
//!
//! [`SearchController`] owns the URL input, the debounce deadline, the
//! generation counter and the [`UiState`]. It never blocks: searches and
//! clipboard writes run as spawned tasks that report back through the
//! `AppEvent` channel, and the UI loop feeds those events to
//! [`SearchController::handle_event`].

use std::borrow::Cow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::client::{ApiClient, GENERIC_FAILURE};
use crate::clipboard::ClipboardPort;
use crate::feed::{dedup_feeds, DedupKey, FeedCandidate};
use crate::util::{normalize, validate_url_for_open, MAX_URL_INPUT_LENGTH};

/// Delay between the last keystroke and an automatic search.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);
/// How long a toast stays in the status bar.
pub const STATUS_TTL: Duration = Duration::from_secs(2);

pub const COPIED_MESSAGE: &str = "Copied to clipboard!";

/// Completion events from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// A search finished. `result` carries the user-facing message on failure.
    SearchCompleted {
        generation: u64,
        url: String,
        result: Result<Vec<FeedCandidate>, String>,
    },
    LinkCopied { link: String },
    CopyFailed { error: String },
}

/// What the results area shows. Exactly one holds at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Loading { url: String },
    /// Deduplicated results; may be empty.
    Success(Vec<FeedCandidate>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub debounce: Duration,
    pub dedup: DedupKey,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            dedup: DedupKey::default(),
        }
    }
}

pub struct SearchController {
    input: String,
    state: UiState,
    selected: usize,
    settings: ControllerSettings,
    /// When the pending auto-search fires, and the URL it will search.
    debounce: Option<(Instant, String)>,
    /// Bumped on every dispatch and on clear; completions from older
    /// generations are dropped.
    generation: u64,
    status: Option<(Cow<'static, str>, Instant)>,
    api: ApiClient,
    clipboard: Arc<dyn ClipboardPort>,
}

impl SearchController {
    pub fn new(
        api: ApiClient,
        clipboard: Arc<dyn ClipboardPort>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            input: String::new(),
            state: UiState::Idle,
            selected: 0,
            settings,
            debounce: None,
            generation: 0,
            status: None,
            api,
            clipboard,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The feed under the cursor, if results are showing.
    pub fn selected_feed(&self) -> Option<&FeedCandidate> {
        match &self.state {
            UiState::Success(feeds) => feeds.get(self.selected),
            _ => None,
        }
    }

    /// Submitting is disabled while the input is blank.
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, UiState::Loading { .. })
    }

    pub fn has_pending_search(&self) -> bool {
        self.debounce.is_some()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_ref())
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status = Some((msg.into(), Instant::now()));
    }

    /// Drops the toast once it is older than [`STATUS_TTL`]. Returns true if
    /// one was dropped.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status {
            Some((_, shown)) if shown.elapsed() >= STATUS_TTL => {
                self.status = None;
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Input editing
    // ------------------------------------------------------------------

    pub fn set_input(&mut self, value: &str) {
        self.input = truncate_input(value).to_owned();
        self.on_input_changed();
    }

    pub fn push_char(&mut self, c: char) {
        if self.input.len() + c.len_utf8() > MAX_URL_INPUT_LENGTH {
            return;
        }
        self.input.push(c);
        self.on_input_changed();
    }

    pub fn pop_char(&mut self) {
        if self.input.pop().is_some() {
            self.on_input_changed();
        }
    }

    pub fn clear_input(&mut self) {
        if !self.input.is_empty() {
            self.input.clear();
            self.on_input_changed();
        }
    }

    /// Replaces any pending auto-search. A new one is scheduled only when
    /// the input already normalizes.
    fn on_input_changed(&mut self) {
        self.debounce = normalize(&self.input)
            .ok()
            .map(|url| (Instant::now() + self.settings.debounce, url));
    }

    // ------------------------------------------------------------------
    // Searching
    // ------------------------------------------------------------------

    /// Manual submit (Enter). Returns false when the input is blank.
    ///
    /// Input that fails to normalize goes straight to `Error` without a
    /// request.
    pub fn submit(&mut self, tx: &mpsc::Sender<AppEvent>) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.debounce = None;
        match normalize(&self.input) {
            Ok(url) => self.perform_search(url, tx),
            Err(e) => {
                tracing::debug!(input = %self.input, error = %e, "Rejected input");
                self.state = UiState::Error(e.to_string());
            }
        }
        true
    }

    /// Fires the pending auto-search once its deadline has passed.
    ///
    /// Returns true if a search was dispatched.
    pub fn tick(&mut self, tx: &mpsc::Sender<AppEvent>) -> bool {
        let due = matches!(&self.debounce, Some((deadline, _)) if Instant::now() >= *deadline);
        if !due {
            return false;
        }
        match self.debounce.take() {
            Some((_, url)) => {
                self.perform_search(url, tx);
                true
            }
            None => false,
        }
    }

    /// Dispatches a search for an already-normalized URL.
    ///
    /// Earlier in-flight searches keep running; their results are ignored.
    pub fn perform_search(&mut self, url: String, tx: &mpsc::Sender<AppEvent>) {
        self.debounce = None;
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.state = UiState::Loading { url: url.clone() };
        self.selected = 0;

        tracing::debug!(url = %url, generation, "Dispatching search");

        let api = self.api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(api.find_feeds(&url)).catch_unwind().await;
            let result = match outcome {
                Ok(Ok(feeds)) => Ok(feeds),
                Ok(Err(e)) => {
                    tracing::warn!(url = %url, error = %e, "Search failed");
                    Err(e.user_message())
                }
                Err(_) => {
                    tracing::error!(url = %url, "Search task panicked");
                    Err(GENERIC_FAILURE.to_owned())
                }
            };
            let event = AppEvent::SearchCompleted {
                generation,
                url,
                result,
            };
            if let Err(e) = tx.send(event).await {
                tracing::warn!(error = %e, "Failed to send search result (receiver dropped)");
            }
        });
    }

    /// Escape: back to `Idle`. Pending and in-flight searches are abandoned.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.debounce = None;
        self.state = UiState::Idle;
        self.selected = 0;
    }

    // ------------------------------------------------------------------
    // Background events
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchCompleted {
                generation,
                url,
                result,
            } => self.handle_search_completed(generation, url, result),
            AppEvent::LinkCopied { link } => {
                tracing::debug!(link = %link, "Link copied");
                self.set_status(COPIED_MESSAGE);
            }
            AppEvent::CopyFailed { error } => {
                tracing::warn!(error = %error, "Failed to copy link");
            }
        }
    }

    fn handle_search_completed(
        &mut self,
        generation: u64,
        url: String,
        result: Result<Vec<FeedCandidate>, String>,
    ) {
        if generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = generation,
                url = %url,
                "Ignoring stale search result"
            );
            return;
        }

        self.selected = 0;
        self.state = match result {
            Ok(feeds) => {
                let feeds = dedup_feeds(feeds, self.settings.dedup);
                tracing::info!(url = %url, count = feeds.len(), "Search completed");
                UiState::Success(feeds)
            }
            Err(message) => UiState::Error(message),
        };
    }

    // ------------------------------------------------------------------
    // Result list
    // ------------------------------------------------------------------

    pub fn select_next(&mut self) {
        if let UiState::Success(feeds) = &self.state {
            if self.selected + 1 < feeds.len() {
                self.selected += 1;
            }
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Copies the selected link on a blocking task; the outcome arrives as
    /// `LinkCopied` or `CopyFailed`.
    pub fn copy_selected(&self, tx: &mpsc::Sender<AppEvent>) {
        let Some(feed) = self.selected_feed() else {
            return;
        };
        let link = feed.link.clone();
        let clipboard = Arc::clone(&self.clipboard);
        let tx = tx.clone();

        tokio::spawn(async move {
            let copy_link = link.clone();
            let outcome = tokio::task::spawn_blocking(move || clipboard.set_text(&copy_link)).await;
            let event = match outcome {
                Ok(Ok(())) => AppEvent::LinkCopied { link },
                Ok(Err(e)) => AppEvent::CopyFailed {
                    error: e.to_string(),
                },
                Err(e) => AppEvent::CopyFailed {
                    error: format!("clipboard task failed: {e}"),
                },
            };
            if let Err(e) = tx.send(event).await {
                tracing::warn!(error = %e, "Failed to send copy result (receiver dropped)");
            }
        });
    }

    /// Opens the selected link in the default browser.
    pub fn open_selected(&mut self) {
        let Some(link) = self.selected_feed().map(|f| f.link.clone()) else {
            return;
        };
        match validate_url_for_open(&link) {
            Err(msg) => {
                tracing::warn!(link = %link, "Refusing to open link");
                self.set_status(msg);
            }
            Ok(url) => {
                if let Err(e) = open::that(url.as_str()) {
                    tracing::warn!(link = %link, error = %e, "Failed to open link");
                    self.set_status(format!("Failed to open link: {e}"));
                }
            }
        }
    }
}

/// Cuts `value` to at most [`MAX_URL_INPUT_LENGTH`] bytes on a char boundary.
fn truncate_input(value: &str) -> &str {
    if value.len() <= MAX_URL_INPUT_LENGTH {
        return value;
    }
    let mut end = MAX_URL_INPUT_LENGTH;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
