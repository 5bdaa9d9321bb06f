//! Terminal client.
//!
//! - `loop_runner` - event loop and terminal setup/teardown
//! - `input` - key dispatch per focused pane
//! - `events` - completions from background tasks
//! - `render` - layout and the URL field
//! - `results` - the results area for each `UiState`
//! - `status` - hints and toasts

mod events;
mod input;
mod loop_runner;
mod render;
mod results;
mod status;

pub use loop_runner::{run, Action};
