//! Shared types, error model, and configuration for jobfeed.
//!
//! This crate is the foundation depended on by all other jobfeed crates.
//! It provides:
//! - [`JobFeedError`]: the unified error type
//! - Domain types ([`JobListing`], [`SearchResponse`]) and [`first_present`]
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BoardSource, BoardsConfig, CONFIG_FILE_NAME, Credentials, DatePosted, FilterConfig,
    OutputConfig, OutputMode, QueryConfig, RenderConfig, SearchConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{JobFeedError, Result};
pub use types::{ApplyOption, JobListing, SearchResponse, first_present};
