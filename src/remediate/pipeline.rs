//! Detect → fetch → patch → write orchestration
//!
//! One pass, no retries. Fetch and write tasks each own a single asset and
//! report back through a `JoinSet`; the orchestrator keeps at most
//! `max_concurrency` of them in flight and decides the run's outcome only
//! after every dispatched task has settled.

use super::fetch::{fetch_detail, FetchedAsset, RawRecord};
use super::patch::patch_fetched;
use super::report::{AssetOutcome, OutcomeStatus, RunMode, RunReport};
use super::write::write_back;
use crate::error::{Error, Result};
use crate::inventory::{list_assets, partition, AssetSummary};
use crate::session::Session;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// What happens when one asset's fetch or write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure against the asset and let siblings finish.
    #[default]
    Isolate,
    /// Abort every in-flight task and end the run with the first failure.
    AbortAll,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub mode: RunMode,
    pub domain: String,
    pub max_concurrency: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::DetectOnly,
            domain: String::new(),
            max_concurrency: 16,
            failure_policy: FailurePolicy::Isolate,
        }
    }
}

/// Run one detect (and optionally remediate) pass.
///
/// Returns `Err` only for failures that end the run: rejected credentials in
/// any phase, or any per-asset failure under [`FailurePolicy::AbortAll`].
/// A failed asset query is reported in the returned report instead.
pub async fn run(session: Arc<dyn Session>, options: &PipelineOptions) -> Result<RunReport> {
    let (assets, query_error) = match list_assets(session.as_ref()).await {
        Ok(page) => (page.results, None),
        Err(e) if e.is_fatal() => {
            error!("Asset query rejected: {}", e);
            return Err(e);
        }
        Err(e) => {
            warn!("Asset query failed, continuing with no assets: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    let scanned = assets.len();
    let (orphaned, clean) = partition(assets);
    info!(
        "{} of {} assets have no FQDN ({} already named)",
        orphaned.len(),
        scanned,
        clean.len()
    );

    let mut report = RunReport {
        mode: options.mode,
        scanned,
        query_error,
        orphaned,
        outcomes: Vec::new(),
    };

    if options.mode == RunMode::DetectOnly || report.orphaned.is_empty() {
        return Ok(report);
    }

    report.outcomes = remediate(session, &report.orphaned, options).await?;
    info!(
        "Remediation finished: {} updated, {} skipped, {} failed",
        report.updated(),
        report.skipped(),
        report.failed()
    );

    Ok(report)
}

/// Fetch, patch and write back every orphaned asset.
///
/// Outcomes come back in the same order as `orphaned`.
async fn remediate(
    session: Arc<dyn Session>,
    orphaned: &[AssetSummary],
    options: &PipelineOptions,
) -> Result<Vec<AssetOutcome>> {
    let limit = options.max_concurrency.max(1);
    let mut outcomes: Vec<Option<AssetOutcome>> = vec![None; orphaned.len()];

    let fetch_session = session.clone();
    let fetched = fan_out(
        "Fetching records",
        orphaned.iter().cloned().enumerate().collect(),
        limit,
        options.failure_policy,
        move |asset: AssetSummary| {
            let session = fetch_session.clone();
            async move { fetch_detail(session.as_ref(), asset).await }
        },
    )
    .await?;

    let mut writes: Vec<(usize, (AssetSummary, RawRecord))> = Vec::new();
    for (index, result) in fetched {
        match result {
            Ok(fetched) => match classify_fetched(fetched, &options.domain) {
                Ok(write) => writes.push((index, write)),
                Err(outcome) => outcomes[index] = Some(outcome),
            },
            Err(e) => {
                outcomes[index] = Some(AssetOutcome::new(
                    &orphaned[index],
                    OutcomeStatus::FetchFailed(e.to_string()),
                ))
            }
        }
    }

    let write_session = session.clone();
    let written = fan_out(
        "Writing records",
        writes,
        limit,
        options.failure_policy,
        move |(asset, patched): (AssetSummary, RawRecord)| {
            let session = write_session.clone();
            async move { write_back(session.as_ref(), &asset, &patched).await }
        },
    )
    .await?;

    for (index, result) in written {
        outcomes[index] = Some(match result {
            Ok(ack) => AssetOutcome::updated(ack),
            Err(e) => AssetOutcome::new(&orphaned[index], OutcomeStatus::WriteFailed(e.to_string())),
        });
    }

    outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            outcome.ok_or_else(|| {
                Error::Task(format!("no result collected for {}", orphaned[index].name))
            })
        })
        .collect()
}

/// Patch a fetched record, or explain why there is nothing to write.
fn classify_fetched(
    fetched: FetchedAsset,
    domain: &str,
) -> std::result::Result<(AssetSummary, RawRecord), AssetOutcome> {
    let result = patch_fetched(fetched, domain);
    match result.patched {
        Some(patched) => {
            info!("Asset is missing FQDN: {}", result.asset.name);
            debug!(
                "Patched {} ({} -> {} bytes)",
                result.asset.name,
                result.original.as_str().len(),
                patched.as_str().len()
            );
            Ok((result.asset, patched))
        }
        None => {
            debug!(
                "No empty hostname marker in detail record for {}",
                result.asset.name
            );
            Err(AssetOutcome::new(&result.asset, OutcomeStatus::Skipped))
        }
    }
}

/// Run `task` over `items` with at most `limit` tasks in flight.
///
/// Each item carries its position so results can be matched back after
/// completing out of order. Exactly one result per item is returned unless the
/// run is aborted.
async fn fan_out<T, R, F, Fut>(
    phase: &'static str,
    items: Vec<(usize, T)>,
    limit: usize,
    policy: FailurePolicy,
    task: F,
) -> Result<Vec<(usize, Result<R>)>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    debug!("{}: {} tasks, at most {} in flight", phase, total, limit);

    let progress = create_progress_bar(total as u64);
    progress.set_message(phase);

    let mut pending = items.into_iter();
    let mut running = JoinSet::new();
    let mut settled = Vec::with_capacity(total);

    loop {
        while running.len() < limit {
            let Some((index, item)) = pending.next() else {
                break;
            };
            let fut = task(item);
            running.spawn(async move { (index, fut.await) });
        }

        let Some(joined) = running.join_next().await else {
            break;
        };
        let (index, result) = joined.map_err(|e| Error::Task(e.to_string()))?;
        progress.inc(1);

        match result {
            Err(e) if e.is_fatal() || policy == FailurePolicy::AbortAll => {
                running.abort_all();
                progress.abandon_with_message(format!("{phase}: aborted"));
                error!("{} aborted: {}", phase, e);
                return Err(e);
            }
            Err(e) => {
                warn!("{} failed for item {}: {}", phase, index, e);
                settled.push((index, Err(e)));
            }
            Ok(value) => settled.push((index, Ok(value))),
        }
    }

    progress.finish_and_clear();
    debug_assert_eq!(settled.len(), total);
    Ok(settled)
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}
