//! Pipeline orchestration and domain logic for jobfeed.
//!
//! This crate ties together query building, listing sources, title
//! filtering, table rendering and output writing into the `update` workflow.

pub mod filter;
pub mod pipeline;
pub mod query;
pub mod template;
