use crate::probe;
use crate::types::{ScanResults, Site, SiteResult, SiteStatus};
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use ::time::{format_description::well_known, OffsetDateTime};

/// Live counters for a scan in flight, shared with the UI server so it can
/// report progress while probes are still running.
#[derive(Clone, Debug)]
pub struct SharedProgress {
    pub checked: Arc<AtomicU64>,
    pub up_count: Arc<AtomicU64>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self {
            checked: Arc::new(AtomicU64::new(0)),
            up_count: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for SharedProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Probe every site concurrently and collect the outcomes in registry order.
///
/// - Launches one task per site; `concurrency` optionally caps how many
///   probes run at once (`None` = all at once, fine for tens of sites).
/// - Each probe is bounded by `timeout`; the whole scan finishes once every
///   probe resolved, so its wall clock is roughly one timeout, not the sum.
/// - The i-th result always corresponds to the i-th input site, regardless
///   of which probe physically finished first. Duplicates are probed and
///   reported independently. Empty input yields empty output.
pub async fn scan_sites(
    sites: &[Site],
    concurrency: Option<usize>,
    timeout: Duration,
) -> Result<ScanResults> {
    scan_sites_internal(sites, concurrency, timeout, None).await
}

/// Variant that publishes progress counters into a `SharedProgress`.
pub async fn scan_sites_with_progress(
    sites: &[Site],
    concurrency: Option<usize>,
    timeout: Duration,
    progress: SharedProgress,
) -> Result<ScanResults> {
    scan_sites_internal(sites, concurrency, timeout, Some(progress)).await
}

async fn scan_sites_internal(
    sites: &[Site],
    concurrency: Option<usize>,
    timeout: Duration,
    progress_opt: Option<SharedProgress>,
) -> Result<ScanResults> {
    let started = Instant::now();
    let started_at = now_rfc3339();
    let total = sites.len() as u64;

    let (checked, up_count) = if let Some(p) = &progress_opt {
        (p.checked.clone(), p.up_count.clone())
    } else {
        (Arc::new(AtomicU64::new(0)), Arc::new(AtomicU64::new(0)))
    };

    let client = probe::build_client(timeout)?;
    let sem = concurrency.map(|n| Arc::new(Semaphore::new(n.clamp(1, 5_000))));

    // One slot per site so the output order matches the registry order no
    // matter which probe completes first. Each task exclusively owns its
    // index, so there is nothing to lock.
    let mut slots: Vec<Option<SiteResult>> = vec![None; sites.len()];
    let mut set: JoinSet<(usize, SiteResult)> = JoinSet::new();

    for (idx, site) in sites.iter().cloned().enumerate() {
        let client = client.clone();
        let sem = sem.clone();
        let checked = checked.clone();
        let up_count = up_count.clone();

        set.spawn(async move {
            let _permit = match sem {
                Some(s) => Some(s.acquire_owned().await.expect("semaphore in scope")),
                None => None,
            };

            let result = probe::check_site(&client, &site).await;

            if result.status == SiteStatus::Up {
                up_count.fetch_add(1, Ordering::Relaxed);
            }
            checked.fetch_add(1, Ordering::Relaxed);
            (idx, result)
        });
    }

    // All-or-nothing join: a task failure here means a panic or runtime-level
    // resource exhaustion, which is fatal for the whole scan.
    while let Some(joined) = set.join_next().await {
        let (idx, result) = joined?;
        slots[idx] = Some(result);
    }

    let sites_out: Vec<SiteResult> = slots.into_iter().flatten().collect();

    Ok(ScanResults {
        total,
        checked: checked.load(Ordering::Relaxed),
        up_count: up_count.load(Ordering::Relaxed),
        started_at,
        elapsed_ms: started.elapsed().as_millis() as u64,
        sites: sites_out,
    })
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
