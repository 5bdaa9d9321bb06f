//! Find the RSS, Atom and JSON feeds a website publishes.
//!
//! The crate has two halves that share [`feed`] and [`util`]:
//!
//! - [`server`]: the `POST /api/find-feeds` endpoint backed by
//!   [`feed::HttpFeedFinder`]
//! - the terminal client: [`controller::SearchController`] drives searches
//!   against that endpoint through [`client::ApiClient`], and [`ui`] draws it

pub mod app;
pub mod client;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod feed;
pub mod keybindings;
pub mod server;
pub mod theme;
pub mod ui;
pub mod util;
