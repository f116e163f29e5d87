//! docsync engine - the sync pipeline
//!
//! This crate wires the stages together:
//! - Read every model from the catalog
//! - Filter models down to those with inherited column descriptions
//! - Fetch, merge and write each matching warehouse table
//! - Report progress and a run summary

pub mod sync;

pub use sync::{Synchronizer, SyncOptions, SyncError, SyncEvent, SyncSummary, ModelOutcome, TableUpdate};
