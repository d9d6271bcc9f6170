// Host-facing entry point: one instance per process, shared by Arc
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use closewatch_api::RegistryClient;
use closewatch_cache::CacheManager;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::inventory::{JsonInventory, JsonUpdateStatus};
use crate::models::StatusRecord;
use crate::presentation::{menu_badge, RowAnnotator};
use crate::resolver::ClosedStatusResolver;
use crate::scheduler::{RefreshReport, RefreshScheduler};
use crate::status::StatusCache;
use crate::Result;

/// Moments in the host's admin lifecycle we react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    AdminInit,
    PluginsPageLoad,
    UpdatePageLoad,
    UpdateCorePageLoad,
    /// The host just refreshed its own update cache
    UpdateCheckCompleted,
}

impl HostEvent {
    /// Forced events skip the 12h throttle so both caches stay in step
    pub fn is_forced(self) -> bool {
        matches!(self, HostEvent::UpdateCheckCompleted)
    }
}

/// Owns the refresh pipeline and answers the presentation layer
pub struct ClosureNotifier {
    scheduler: RefreshScheduler,
    initialised: AtomicBool,
}

impl ClosureNotifier {
    pub fn new(scheduler: RefreshScheduler) -> Self {
        Self {
            scheduler,
            initialised: AtomicBool::new(false),
        }
    }

    /// Wire up the real registry, SQLite cache and JSON inventory files
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = RegistryClient::with_options(
            config.registry.base_url.clone(),
            &config.registry.user_agent,
            Duration::from_secs(config.registry.timeout_secs),
        );

        let db_path = config.cache.resolved_db_path()?;
        debug!("Using cache database {}", db_path.display());
        let cache = Arc::new(CacheManager::open(&db_path)?);

        let interval = i64::try_from(config.refresh.interval_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX);
        let scheduler = RefreshScheduler::new(
            ClosedStatusResolver::new(Arc::new(registry)),
            Arc::new(JsonInventory::new(&config.inventory.installed_path)),
            Arc::new(JsonUpdateStatus::new(&config.inventory.update_status_path)),
            StatusCache::new(cache, &config.cache.app_prefix),
        )
        .with_interval(interval)
        .with_concurrency(config.refresh.concurrency);

        Ok(Self::new(scheduler))
    }

    /// Start reacting to host events. Only the first call does anything.
    pub fn init(&self) -> bool {
        if self.initialised.swap(true, Ordering::SeqCst) {
            return false;
        }

        info!("Closure notifier initialised");
        true
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised.load(Ordering::SeqCst)
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Run whatever refresh the event calls for
    ///
    /// Errors are logged and swallowed; the worst outcome is a stale record.
    pub async fn handle(&self, event: HostEvent) -> Option<RefreshReport> {
        if !self.is_initialised() {
            debug!("Ignoring {:?}, notifier not initialised", event);
            return None;
        }

        let result = if event.is_forced() {
            self.scheduler.refresh().await.map(Some)
        } else {
            self.scheduler.maybe_refresh().await
        };

        match result {
            Ok(report) => report,
            Err(e) => {
                warn!("Closed status refresh on {:?} failed: {}", event, e);
                None
            }
        }
    }

    /// Current record, empty if the cache can't be read
    pub fn status(&self) -> StatusRecord {
        self.scheduler.status().read().unwrap_or_else(|e| {
            warn!("Could not read closed status: {}", e);
            StatusRecord::default()
        })
    }

    pub fn row_annotator(&self) -> RowAnnotator {
        RowAnnotator::from_record(&self.status())
    }

    pub fn menu_badge(&self) -> Option<String> {
        menu_badge(&self.status())
    }
}
