// Closed-status resolution for a single plugin
use std::sync::Arc;

use tracing::debug;

use crate::models::PackageId;
use crate::notice::extract_notices;
use crate::source::PageSource;

/// Decides whether one plugin has been closed on the registry
///
/// One page fetch per call. A failed fetch is treated as "not closed": no
/// evidence of a closure is not evidence of one.
#[derive(Clone)]
pub struct ClosedStatusResolver {
    source: Arc<dyn PageSource>,
}

impl ClosedStatusResolver {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self { source }
    }

    /// Closure notice for `id`, or `None` if the plugin looks fine
    pub async fn resolve(&self, id: &PackageId) -> Option<String> {
        let slug = id.slug();

        let body = match self.source.fetch(&slug).await {
            Ok(body) => body,
            Err(e) => {
                debug!("Skipping {} ({}): {}", id, slug, e);
                return None;
            }
        };

        let notice = extract_notices(&body).concat();
        if notice.is_empty() {
            None
        } else {
            debug!("{} is closed on the registry", id);
            Some(notice)
        }
    }
}
