use crate::config::ProxyConfig;
use crate::domain::{ListOrder, NewPage, PagePath, PageRecord, PageUpdate};
use crate::error::ProxyError;
use crate::upstream::WikiBackend;
use crate::upstream::graphql::{
    CREATE_PAGE_MUTATION, CreateResult, GET_PAGE_BY_ID_QUERY, GET_PAGE_QUERY, GraphQlReply,
    LIST_PAGES_QUERY, PageList, PagesData, SingleById, SingleByPath, UPDATE_PAGE_MUTATION,
    UpdateResult, UpstreamPage, classify_errors, mutation_page,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;

// upstream bodies quoted in error messages are cut to this many chars
const ERROR_BODY_LIMIT: usize = 300;

/// Talks to `{WIKIJS_URL}/graphql` with the configured bearer key. One
/// instance is shared by all handlers; `reqwest::Client` pools connections.
pub struct WikiJsClient {
    client: Client,
    graphql_url: String,
    api_key: String,
    timeout: Duration,
}

impl fmt::Debug for WikiJsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiJsClient")
            .field("graphql_url", &self.graphql_url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl WikiJsClient {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("wikijs-proxy/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for Wiki.js")?;

        Ok(Self {
            client,
            graphql_url: config.graphql_url(),
            api_key: config.api_key.clone(),
            timeout: config.request_timeout,
        })
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    // one POST per call, no retries
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<GraphQlReply<T>, ProxyError> {
        tracing::debug!(operation, url = %self.graphql_url, "calling Wiki.js");

        let response = self
            .client
            .post(&self.graphql_url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProxyError::UpstreamUnavailable(format!(
                "{operation}: Wiki.js returned HTTP {}: {}",
                status.as_u16(),
                truncate(&body)
            )));
        }

        response
            .json::<GraphQlReply<T>>()
            .await
            .map_err(|e| self.transport_error(operation, e))
    }

    // `pages.update` overwrites every field it is given and blanks or
    // unpublishes the ones it is not, so updates start from the stored page
    async fn page_by_id(&self, id: i64) -> Result<UpstreamPage, ProxyError> {
        let reply: GraphQlReply<PagesData<SingleById>> = self
            .execute("page_by_id", GET_PAGE_BY_ID_QUERY, json!({ "id": id }))
            .await?;

        if !reply.errors.is_empty() {
            return Err(match classify_errors(&reply.errors) {
                ProxyError::NotFound(_) => not_found(id),
                other => other,
            });
        }

        reply
            .data
            .and_then(|d| d.pages)
            .and_then(|p| p.single)
            .ok_or_else(|| not_found(id))
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> ProxyError {
        if err.is_timeout() {
            ProxyError::UpstreamTimeout(format!(
                "{operation}: no reply within {}s",
                self.timeout.as_secs_f32()
            ))
        } else if err.is_decode() {
            ProxyError::UpstreamUnavailable(format!("{operation}: unreadable reply: {err}"))
        } else {
            ProxyError::UpstreamUnavailable(format!("{operation}: {err}"))
        }
    }
}

#[async_trait]
impl WikiBackend for WikiJsClient {
    async fn page_by_path(
        &self,
        path: &PagePath,
        locale: &str,
    ) -> Result<Option<PageRecord>, ProxyError> {
        let reply: GraphQlReply<PagesData<SingleByPath>> = self
            .execute(
                "get_page",
                GET_PAGE_QUERY,
                json!({ "path": path.upstream(), "locale": locale }),
            )
            .await?;

        if !reply.errors.is_empty() {
            return match classify_errors(&reply.errors) {
                ProxyError::NotFound(_) => Ok(None),
                other => Err(other),
            };
        }

        Ok(reply
            .data
            .and_then(|d| d.pages)
            .and_then(|p| p.single_by_path)
            .map(PageRecord::from))
    }

    async fn list_pages(&self, order: ListOrder) -> Result<Vec<PageRecord>, ProxyError> {
        let reply: GraphQlReply<PagesData<PageList>> = self
            .execute(
                "list_pages",
                LIST_PAGES_QUERY,
                json!({ "orderBy": order.to_string() }),
            )
            .await?;

        if !reply.errors.is_empty() {
            return Err(classify_errors(&reply.errors));
        }

        // an empty wiki may answer with a null list
        Ok(reply
            .data
            .and_then(|d| d.pages)
            .and_then(|p| p.list)
            .unwrap_or_default()
            .into_iter()
            .map(PageRecord::from)
            .collect())
    }

    async fn create_page(&self, page: &NewPage, locale: &str) -> Result<PageRecord, ProxyError> {
        let variables = json!({
            "path": page.path.upstream(),
            "title": page.title,
            "content": page.content,
            "description": page.description_or_title(),
            "locale": locale,
            "isPublished": page.is_published,
            "tags": page.tags,
        });
        let reply: GraphQlReply<PagesData<CreateResult>> = self
            .execute("create_page", CREATE_PAGE_MUTATION, variables)
            .await?;

        if !reply.errors.is_empty() {
            return Err(classify_errors(&reply.errors));
        }

        mutation_page(
            reply.data.and_then(|d| d.pages).and_then(|p| p.create),
            "Create failed",
        )
    }

    async fn update_page(&self, update: &PageUpdate) -> Result<PageRecord, ProxyError> {
        let current = PageRecord::from(self.page_by_id(update.id).await?);
        let changes = &update.changes;
        let variables = json!({
            "id": update.id,
            "content": changes.content.as_ref().or(current.content.as_ref()),
            "title": changes.title.as_ref().unwrap_or(&current.title),
            "description": changes
                .description
                .as_ref()
                .or(current.description.as_ref())
                .map_or("", String::as_str),
            "isPublished": current.is_published.unwrap_or(true),
            "tags": current.tags,
        });
        let reply: GraphQlReply<PagesData<UpdateResult>> = self
            .execute("update_page", UPDATE_PAGE_MUTATION, variables)
            .await?;

        if !reply.errors.is_empty() {
            return Err(classify_errors(&reply.errors));
        }

        mutation_page(
            reply.data.and_then(|d| d.pages).and_then(|p| p.update),
            "Update failed",
        )
    }
}

fn not_found(id: i64) -> ProxyError {
    ProxyError::NotFound(format!("Page not found: #{id}"))
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let cut: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    format!("{cut}...")
}
