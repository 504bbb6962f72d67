//! Folio Generator Library
//!
//! Static site generation engine for Folio.
//!
//! # Modules
//!
//! - [`collector`] - Content collection
//! - [`html`] - HTML page generation from parsed content
//! - [`build`] - Build orchestration, including the search index

pub mod build;
pub mod collector;
pub mod html;

pub use build::{BuildError, BuildStats, Builder};
pub use collector::{CollectorError, ContentCollector, SiteContent};
pub use html::HtmlGenerator;
