use crate::config::ProxyConfig;
use crate::domain::{ListOrder, NewPage, PageChanges, PagePath, PageRecord, PageUpdate};
use crate::error::ProxyError;
use crate::upstream::WikiBackend;
use std::sync::Arc;

/// The five tool operations. Holds no state besides the backend handle and
/// defaults, so it is shared as-is between concurrent requests.
pub struct PageService {
    backend: Arc<dyn WikiBackend>,
    default_locale: String,
    default_order: ListOrder,
}

impl PageService {
    pub fn new(backend: Arc<dyn WikiBackend>, config: &ProxyConfig) -> Self {
        Self {
            backend,
            default_locale: config.default_locale.clone(),
            default_order: config.list_order,
        }
    }

    pub async fn get_page(
        &self,
        path: &PagePath,
        locale: Option<&str>,
    ) -> Result<PageRecord, ProxyError> {
        let locale = locale.unwrap_or(&self.default_locale);
        match self.backend.page_by_path(path, locale).await? {
            Some(page) => {
                tracing::info!(%page, locale, "get_page");
                Ok(page)
            }
            None => {
                tracing::info!(%path, locale, "get_page: not found");
                Err(ProxyError::NotFound(format!("Page not found: {}", path.as_str())))
            }
        }
    }

    /// Pages in whatever order the wiki returns for `order`.
    pub async fn list_pages(&self, order: Option<ListOrder>) -> Result<Vec<PageRecord>, ProxyError> {
        let order = order.unwrap_or(self.default_order);
        let pages = self.backend.list_pages(order).await?;
        tracing::info!(%order, count = pages.len(), "list_pages");
        Ok(pages)
    }

    pub async fn create_page(&self, page: NewPage) -> Result<PageRecord, ProxyError> {
        let locale = page
            .locale
            .clone()
            .unwrap_or_else(|| self.default_locale.clone());
        let created = self.backend.create_page(&page, &locale).await?;
        tracing::info!(page = %created, locale, "create_page");
        Ok(created)
    }

    pub async fn update_page(&self, update: PageUpdate) -> Result<PageRecord, ProxyError> {
        let updated = self.backend.update_page(&update).await?;
        tracing::info!(
            page = %updated,
            content = update.changes.content.is_some(),
            title = update.changes.title.is_some(),
            description = update.changes.description.is_some(),
            "update_page"
        );
        Ok(updated)
    }

    /// Looks the page up by path, then updates it by id. A missing page
    /// surfaces as `NotFound` from the lookup before anything is written.
    pub async fn update_page_by_path(
        &self,
        path: &PagePath,
        locale: Option<&str>,
        changes: PageChanges,
    ) -> Result<PageRecord, ProxyError> {
        let existing = self.get_page(path, locale).await?;
        let update = PageUpdate::new(existing.id, changes)?;
        self.update_page(update).await
    }
}
