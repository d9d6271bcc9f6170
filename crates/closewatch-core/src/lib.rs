// Closed-plugin detection pipeline - the brain of the operation
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod notice;
pub mod notifier;
pub mod presentation;
pub mod resolver;
pub mod scheduler;
pub mod source;
pub mod status;

pub use config::Config;
pub use error::Error;
pub use inventory::{JsonInventory, JsonUpdateStatus, PackageInventory, UpdateStatusSource};
pub use models::{ClosedSet, PackageId, PackageMetadata, StatusRecord, UpdateStatus};
pub use notice::extract_notices;
pub use notifier::{ClosureNotifier, HostEvent};
pub use presentation::{menu_badge, RowAnnotator, RowContext, STYLE_FIXES};
pub use resolver::ClosedStatusResolver;
pub use scheduler::{RefreshReport, RefreshScheduler};
pub use source::PageSource;
pub use status::StatusCache;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
