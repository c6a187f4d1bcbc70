//! Merge logic for the QA merger.
//!
//! Reads manually curated Q&A rows, reconciles them with an existing
//! collection, and writes the merged collection (see [`pipeline::run_merge`]).

pub mod collection;
pub mod merge;
pub mod pipeline;
pub mod summary;
pub mod tabular;
pub mod template;
