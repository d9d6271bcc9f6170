// HTTP client for the plugin registry
pub mod registry;

// Re-export common types
pub use registry::{FetchError, RegistryClient, DEFAULT_REGISTRY_URL};
