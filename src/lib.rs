//! Client core for a remote credit card statement extraction service.
//!
//! The crate submits statement PDFs over HTTP, normalizes the service's
//! single-file and batch response shapes into one record collection, and
//! keeps summary statistics current as records are added or removed. The
//! binary in `main.rs` is one presentation surface over this core; any
//! other frontend can drive the same [`intake::IntakeController`] and
//! [`store::ResultStore`] API.

pub mod cli;
pub mod client;
pub mod config;
pub mod intake;
pub mod models;
pub mod report;
pub mod stats;
pub mod store;
