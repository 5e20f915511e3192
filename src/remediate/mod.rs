//! Remediation pipeline for assets without an FQDN
//!
//! - `fetch` - Detail record retrieval per orphaned asset
//! - `patch` - Textual rewrite of the empty hostname to `<name>.<domain>`
//! - `write` - Full-record replace of the patched payload
//! - `pipeline` - Orchestration of query, classification, fetch and write
//! - `report` - Per-asset outcomes and console report

pub mod fetch;
pub mod patch;
pub mod pipeline;
pub mod report;
pub mod write;

pub use fetch::{fetch_detail, FetchedAsset, RawRecord};
pub use patch::{try_patch, PatchOutcome, PatchResult};
pub use pipeline::{run, FailurePolicy, PipelineOptions};
pub use report::{AssetOutcome, OutcomeStatus, RunMode, RunReport};
pub use write::{write_back, WriteAck};
