//! Timeline snapshot library.
//!
//! A batch job that fetches recent posts for a list of tracked accounts from
//! the syndication timeline endpoint, normalizes them, merges them with the
//! previous run's output and writes a capped, sorted JSON snapshot.

pub mod accounts;
pub mod aggregate;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod snapshot;
pub mod syndication;
pub mod throttle;
