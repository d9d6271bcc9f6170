use async_trait::async_trait;
use closewatch_api::{FetchError, RegistryClient};

/// Anything that can hand us the raw HTML of a plugin page
///
/// The registry client is the real thing; tests plug in mocks so nobody has
/// to hit wordpress.org from CI.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, slug: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl PageSource for RegistryClient {
    async fn fetch(&self, slug: &str) -> Result<String, FetchError> {
        RegistryClient::fetch(self, slug).await
    }
}
