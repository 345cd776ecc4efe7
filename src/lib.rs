//! oembed - Resolve URLs into embeddable HTML
//!
//! This library crate exposes the CLI's configuration layer for integration
//! testing. Resolution itself lives in `oembed-core`.

pub mod config;

pub use oembed_core;
