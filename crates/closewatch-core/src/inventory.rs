// Installed plugins and the host's own update-check results
use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::models::{PackageId, PackageMetadata, UpdateStatus};
use crate::{Error, Result};

/// Read-only view of the installed plugins
pub trait PackageInventory: Send + Sync {
    fn list_installed(&self) -> Result<BTreeMap<PackageId, PackageMetadata>>;
}

/// Where the results of the ordinary update check live
pub trait UpdateStatusSource: Send + Sync {
    fn update_status(&self) -> Result<UpdateStatus>;
}

/// Fixed in-memory inventory, mostly for tests and embedding
impl PackageInventory for BTreeMap<PackageId, PackageMetadata> {
    fn list_installed(&self) -> Result<BTreeMap<PackageId, PackageMetadata>> {
        Ok(self.clone())
    }
}

impl UpdateStatusSource for UpdateStatus {
    fn update_status(&self) -> Result<UpdateStatus> {
        Ok(self.clone())
    }
}

/// Inventory stored as a JSON object of identifier -> metadata
///
/// ```json
/// { "akismet/akismet.php": { "name": "Akismet", "update_uri": null } }
/// ```
pub struct JsonInventory {
    path: PathBuf,
}

impl JsonInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PackageInventory for JsonInventory {
    fn list_installed(&self) -> Result<BTreeMap<PackageId, PackageMetadata>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::InventoryError(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let installed: BTreeMap<PackageId, PackageMetadata> = serde_json::from_str(&contents)?;
        debug!("Loaded {} installed plugins", installed.len());
        Ok(installed)
    }
}

/// Update-check results stored as JSON
///
/// No file yet just means the host hasn't run an update check, which is an
/// empty live set rather than an error.
pub struct JsonUpdateStatus {
    path: PathBuf,
}

impl JsonUpdateStatus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UpdateStatusSource for JsonUpdateStatus {
    fn update_status(&self) -> Result<UpdateStatus> {
        if !self.path.exists() {
            warn!(
                "No update status at {}, probing every plugin",
                self.path.display()
            );
            return Ok(UpdateStatus::default());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
