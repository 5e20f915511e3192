//! Textual hostname patch
//!
//! The record is never parsed and re-serialized: every byte outside the
//! rewritten hostname values must reach the service unchanged. The rewrite is
//! a literal substring replacement, so it depends on the service emitting the
//! hostname association with exactly this key order and no whitespace.

use super::fetch::{FetchedAsset, RawRecord};
use crate::inventory::AssetSummary;

/// Present when the first binding of a hostname association has an empty
/// name and is followed by further fields.
pub const EMPTY_HOSTNAME_MARKER: &str = r#"NetworkInterfaceHasHostname":[{"name":"","#;

/// Prefix rewritten in place; everything after the empty name is kept.
pub const EMPTY_HOSTNAME_PREFIX: &str = r#""NetworkInterfaceHasHostname":[{"name":"""#;

/// Outcome of a patch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched(RawRecord),
    /// The record has no empty first hostname to fill in.
    NoOp,
}

/// An orphaned asset, its fetched record, and the rewritten record if any.
#[derive(Debug, Clone)]
pub struct PatchResult {
    pub asset: AssetSummary,
    pub original: RawRecord,
    pub patched: Option<RawRecord>,
}

/// `<asset name>.<domain>`
pub fn synthesize_fqdn(asset: &AssetSummary, domain: &str) -> String {
    format!("{}.{}", asset.name, domain)
}

/// Fill every empty first-hostname slot in `record` with the asset's FQDN.
///
/// Every occurrence is rewritten, including ones belonging to other
/// interfaces of the same asset; they all receive the same name.
pub fn try_patch(asset: &AssetSummary, record: &RawRecord, domain: &str) -> PatchOutcome {
    let text = record.as_str();
    if !text.contains(EMPTY_HOSTNAME_MARKER) {
        return PatchOutcome::NoOp;
    }

    let fqdn = synthesize_fqdn(asset, domain);
    let replacement = format!(
        r#""NetworkInterfaceHasHostname":[{{"name":{}"#,
        json_string(&fqdn)
    );

    PatchOutcome::Patched(RawRecord::new(
        text.replace(EMPTY_HOSTNAME_PREFIX, &replacement),
    ))
}

/// Apply [`try_patch`] to a fetched asset.
pub fn patch_fetched(fetched: FetchedAsset, domain: &str) -> PatchResult {
    let patched = match try_patch(&fetched.asset, &fetched.record, domain) {
        PatchOutcome::Patched(record) => Some(record),
        PatchOutcome::NoOp => None,
    };

    PatchResult {
        asset: fetched.asset,
        original: fetched.record,
        patched,
    }
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
