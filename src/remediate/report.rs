//! Run report and its console rendering

use super::write::WriteAck;
use crate::inventory::AssetSummary;
use std::io::{self, Write};

const RULE: &str = "==========================================";

/// Whether the run only detects orphaned assets or also writes FQDNs back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    DetectOnly,
    Remediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Updated,
    /// The detail record had no empty first hostname to fill in.
    Skipped,
    FetchFailed(String),
    WriteFailed(String),
}

/// Final state of one orphaned asset in remediate mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOutcome {
    pub asset_id: String,
    pub name: String,
    pub status: OutcomeStatus,
}

impl AssetOutcome {
    pub fn new(asset: &AssetSummary, status: OutcomeStatus) -> Self {
        Self {
            asset_id: asset.id.clone(),
            name: asset.name.clone(),
            status,
        }
    }

    pub fn updated(ack: WriteAck) -> Self {
        Self {
            asset_id: ack.asset_id,
            name: ack.name,
            status: OutcomeStatus::Updated,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::FetchFailed(_) | OutcomeStatus::WriteFailed(_)
        )
    }
}

/// Everything one pass observed, in asset-query order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    pub scanned: usize,
    pub query_error: Option<String>,
    pub orphaned: Vec<AssetSummary>,
    pub outcomes: Vec<AssetOutcome>,
}

impl RunReport {
    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// True when the query succeeded and no asset failed.
    pub fn is_success(&self) -> bool {
        self.query_error.is_none() && self.failed() == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n{RULE}")?;
        if let Some(error) = &self.query_error {
            writeln!(out, "Asset query failed: {error}")?;
        }
        writeln!(out, "Assets without FQDN:")?;
        writeln!(out, "{RULE}")?;
        for asset in &self.orphaned {
            writeln!(out, "Asset is missing FQDN ------>  {}", asset.name)?;
        }
        writeln!(
            out,
            "\nTOTAL ASSETS WITHOUT FQDN = {} (of {} scanned)",
            self.orphaned.len(),
            self.scanned
        )?;
        writeln!(out, "{RULE}")?;

        if self.mode == RunMode::DetectOnly {
            return Ok(());
        }

        writeln!(out, "\nUpdated assets with missing FQDN:")?;
        writeln!(out, "{RULE}")?;
        for outcome in &self.outcomes {
            match &outcome.status {
                OutcomeStatus::Updated => writeln!(out, "Successfully updated {}", outcome.name)?,
                OutcomeStatus::Skipped => writeln!(
                    out,
                    "Skipped {}: detail record has no empty hostname to fill",
                    outcome.name
                )?,
                OutcomeStatus::FetchFailed(e) => {
                    writeln!(out, "Failed to fetch {}: {}", outcome.name, e)?
                }
                OutcomeStatus::WriteFailed(e) => {
                    writeln!(out, "Failed to update {}: {}", outcome.name, e)?
                }
            }
        }
        writeln!(out, "{RULE}")?;
        writeln!(
            out,
            "Updated {}, skipped {}, failed {}",
            self.updated(),
            self.skipped(),
            self.failed()
        )
    }
}
