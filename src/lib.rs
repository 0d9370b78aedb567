//! Nested comment threads: API client, tree controller and renderers.
//!
//! The `ctree` binary layers a terminal UI on top of this library.

pub mod api;
pub mod config;
pub mod controller;
pub mod headless;
pub mod tree;
pub mod view;
