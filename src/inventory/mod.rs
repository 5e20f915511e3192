//! Asset inventory: the fixed graph query, decoded summaries, and the
//! FQDN-orphan classifier.

pub mod classify;
pub mod models;
pub mod query;

pub use classify::{is_orphaned, partition};
pub use models::{AssetPage, AssetSummary, HostnameBinding, NetworkInterface};
pub use query::{asset_query, list_assets};
