use crate::domain::{ListOrder, NewPage, PagePath, PageRecord, PageUpdate};
use crate::error::ProxyError;
use async_trait::async_trait;

pub mod graphql;
pub mod wikijs;

pub use wikijs::WikiJsClient;

// one method per upstream call; implementations hold no per-request state, so
// a single instance is shared across handlers.
// the real implementation is in "wikijs.rs", tests plug in an in-memory fake.
#[async_trait]
pub trait WikiBackend: Send + Sync {
    /// `Ok(None)` when nothing lives at `path` in `locale`.
    async fn page_by_path(
        &self,
        path: &PagePath,
        locale: &str,
    ) -> Result<Option<PageRecord>, ProxyError>;
    async fn list_pages(&self, order: ListOrder) -> Result<Vec<PageRecord>, ProxyError>;

    // write operations
    async fn create_page(&self, page: &NewPage, locale: &str) -> Result<PageRecord, ProxyError>;
    async fn update_page(&self, update: &PageUpdate) -> Result<PageRecord, ProxyError>;
}
