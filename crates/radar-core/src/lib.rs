//! Core types and trait definitions for the radar talent-scoring pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod adapter;
pub mod candidate;
pub mod collection;
pub mod config;
pub mod error;
pub mod event;
pub mod fit;
pub mod ingest;
pub mod insight;
pub mod momentum;
pub mod pipeline;
pub mod score;
pub mod scoring;
pub mod store;

pub use error::{Error, Result};
