//! Library side of the amurmedia.ru scraper.
//!
//! - [`config`]: run parameters and their validation
//! - [`fetch`]: rate-limited HTTP fetching
//! - [`scrapers`]: link discovery, article parsing and date normalization
//! - [`models`]: the parsed [`models::Article`]
//! - [`outputs`]: raw text and metadata files
//! - [`pipeline`]: the discover, parse and save loop
//! - [`utils`]: assets directory preparation and log helpers

pub mod config;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod utils;
