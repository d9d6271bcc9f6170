// Refresh pipeline: throttle check + full closed-status pass
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::inventory::{PackageInventory, UpdateStatusSource};
use crate::models::{ClosedSet, PackageId, StatusRecord};
use crate::resolver::ClosedStatusResolver;
use crate::status::StatusCache;
use crate::Result;

pub const DEFAULT_REFRESH_INTERVAL_HOURS: i64 = 12;
pub const DEFAULT_CONCURRENCY: usize = 8;

/// What a full pass did, mostly for logs and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Plugins we asked the registry about
    pub probed: usize,
    /// Plugins excluded up front (live or self-managed)
    pub skipped: usize,
    /// Plugins that came back closed
    pub closed: usize,
}

/// Keeps the closed-status record fresh
///
/// There is no background worker. Callers poke `maybe_refresh` on page loads
/// and `refresh` when the host finishes its own update check; either one runs
/// the whole pass inline.
pub struct RefreshScheduler {
    resolver: ClosedStatusResolver,
    inventory: Arc<dyn PackageInventory>,
    updates: Arc<dyn UpdateStatusSource>,
    status: StatusCache,
    interval: Duration,
    concurrency: usize,
}

impl RefreshScheduler {
    pub fn new(
        resolver: ClosedStatusResolver,
        inventory: Arc<dyn PackageInventory>,
        updates: Arc<dyn UpdateStatusSource>,
        status: StatusCache,
    ) -> Self {
        Self {
            resolver,
            inventory,
            updates,
            status,
            interval: Duration::hours(DEFAULT_REFRESH_INTERVAL_HOURS),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Max registry requests in flight during a pass (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn status(&self) -> &StatusCache {
        &self.status
    }

    /// True if the record is missing a timestamp or is older than the interval
    pub fn is_due(&self, record: &StatusRecord, now: DateTime<Utc>) -> bool {
        match record.last_checked {
            Some(last_checked) => now - last_checked >= self.interval,
            None => true,
        }
    }

    /// Cheap entry point for page loads. `None` means we were throttled.
    pub async fn maybe_refresh(&self) -> Result<Option<RefreshReport>> {
        self.maybe_refresh_at(Utc::now()).await
    }

    pub async fn maybe_refresh_at(&self, now: DateTime<Utc>) -> Result<Option<RefreshReport>> {
        let record = self.status.read()?;

        if !self.is_due(&record, now) {
            debug!("Closed status checked recently, skipping refresh");
            return Ok(None);
        }

        self.refresh_at(now).await.map(Some)
    }

    /// Full pass, ignoring the throttle
    pub async fn refresh(&self) -> Result<RefreshReport> {
        self.refresh_at(Utc::now()).await
    }

    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Result<RefreshReport> {
        let installed = self.inventory.list_installed()?;
        let live = self.updates.update_status()?.live_set();

        let candidates: Vec<PackageId> = installed
            .iter()
            .filter(|(id, meta)| !live.contains(*id) && !meta.is_self_managed())
            .map(|(id, _)| id.clone())
            .collect();

        let skipped = installed.len() - candidates.len();
        info!(
            "Checking {} plugins for closures ({} skipped)",
            candidates.len(),
            skipped
        );

        // Completion order is arbitrary, the BTreeMap gives us a stable merge
        let probed = candidates.len();
        let closed: ClosedSet = stream::iter(candidates)
            .map(|id| async move {
                let notice = self.resolver.resolve(&id).await;
                (id, notice)
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|(id, notice)| async move { notice.map(|notice| (id, notice)) })
            .collect()
            .await;

        let report = RefreshReport {
            probed,
            skipped,
            closed: closed.len(),
        };

        self.status.write(&StatusRecord::new(closed, now))?;
        info!("Closed status refreshed: {} closed plugins", report.closed);

        Ok(report)
    }
}
