//! Listing sources for jobfeed.
//!
//! This crate provides:
//! - [`JobSearchClient`]: the keyed search API client (one GET per run)
//! - [`BoardFetcher`]: sequential fetcher for public JSON job boards

pub mod boards;
mod client;

pub use boards::{BoardFetcher, BoardReport, BoardsResult, dedupe_listings, parse_board_payload};
pub use client::JobSearchClient;
