//! Typed RSS feed model with lossless extension round-tripping.
//!
//! - [`rss`]: `Feed`/`Item` model, reader, and ordered XML marshaler
//! - [`extensions`]: generic extension tree plus Dublin Core and iTunes projections
//! - [`config`]: output settings for the command-line tool

pub mod config;
pub mod extensions;
pub mod rss;
