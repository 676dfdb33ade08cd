//! Terminal filter form for the filter draft store.
//!
//! The widget layer: renders the form with ratatui and turns key presses into
//! `update_filter` / `save_filters` / `clear_draft` calls. It never reaches
//! into the filter state directly.
//!
//! # Modules
//!
//! - [`app`]: focus, modes and key handling
//! - [`feed`]: store subscription feeding the status line
//! - [`form`]: widget definitions and gesture-to-value translation
//! - [`input`]: single-line text editing
//! - [`tui`]: terminal setup and the event loop
//! - [`view`]: frame rendering

pub mod app;
pub mod feed;
pub mod form;
pub mod input;
pub mod tui;
pub mod view;
