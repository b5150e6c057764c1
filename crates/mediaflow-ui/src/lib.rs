//! `MediaFlow` UI - Leptos-based user interface.
//!
//! Thin browser binding over `mediaflow-core`: the flow controllers live in
//! signals, and browser side effects go through [`browser::BrowserDelivery`].

// Component files tend to be large by nature - they contain view logic
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod browser;
pub mod components;
pub mod theme;

pub use app::App;
