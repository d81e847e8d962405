//! Wiki.js GraphQL documents and reply shapes.
//!
//! Decoding is kept free of I/O so the mapping from wiki replies to
//! [`ProxyError`] kinds can be exercised without a server.

use crate::domain::{PagePath, PageRecord};
use crate::error::ProxyError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Wiki.js `PageNotFound`.
pub const CODE_PAGE_NOT_FOUND: i64 = 6003;
/// Wiki.js `PageDuplicateCreate`.
pub const CODE_PAGE_DUPLICATE: i64 = 6002;

// `PageNotFound` message, and the plain `Error` that `pages.update` throws
// for an id it cannot load
const PAGE_NOT_FOUND_MESSAGE: &str = "this page does not exist";
const INVALID_PAGE_ID_MESSAGE: &str = "invalid page id";

pub const GET_PAGE_QUERY: &str = r#"
query GetPage($path: String!, $locale: String!) {
  pages {
    singleByPath(path: $path, locale: $locale) {
      id
      path
      title
      content
      description
      locale
      isPublished
      createdAt
      updatedAt
      tags { tag }
    }
  }
}
"#;

pub const GET_PAGE_BY_ID_QUERY: &str = r#"
query GetPageById($id: Int!) {
  pages {
    single(id: $id) {
      id
      path
      title
      content
      description
      locale
      isPublished
      createdAt
      updatedAt
      tags { tag }
    }
  }
}
"#;

pub const LIST_PAGES_QUERY: &str = r#"
query ListPages($orderBy: PageOrderBy) {
  pages {
    list(orderBy: $orderBy) {
      id
      path
      title
      description
      locale
      isPublished
      createdAt
      updatedAt
      tags
    }
  }
}
"#;

pub const CREATE_PAGE_MUTATION: &str = r#"
mutation CreatePage(
  $path: String!,
  $title: String!,
  $content: String!,
  $description: String!,
  $locale: String!,
  $isPublished: Boolean!,
  $tags: [String]!
) {
  pages {
    create(
      path: $path,
      title: $title,
      content: $content,
      description: $description,
      editor: "markdown",
      locale: $locale,
      isPublished: $isPublished,
      isPrivate: false,
      tags: $tags
    ) {
      responseResult { succeeded errorCode slug message }
      page {
        id
        path
        title
        content
        description
        locale
        isPublished
        createdAt
        updatedAt
        tags { tag }
      }
    }
  }
}
"#;

pub const UPDATE_PAGE_MUTATION: &str = r#"
mutation UpdatePage(
  $id: Int!,
  $content: String,
  $title: String,
  $description: String,
  $isPublished: Boolean,
  $tags: [String]
) {
  pages {
    update(
      id: $id,
      content: $content,
      title: $title,
      description: $description,
      isPublished: $isPublished,
      tags: $tags
    ) {
      responseResult { succeeded errorCode slug message }
      page {
        id
        path
        title
        content
        description
        locale
        isPublished
        createdAt
        updatedAt
        tags { tag }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
pub struct GraphQlReply<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQlError {
    /// Wiki.js error code, if the reply carries one.
    pub fn code(&self) -> Option<i64> {
        let ext = self.extensions.as_ref()?;
        ext.pointer("/exception/code")
            .or_else(|| ext.get("code"))
            .and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        let ext = self.extensions.as_ref()?;
        ext.pointer("/exception/name")
            .or_else(|| ext.pointer("/exception/slug"))
            .and_then(Value::as_str)
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(CODE_PAGE_NOT_FOUND)
            || self.name() == Some("PageNotFound")
            || names_missing_page(&self.message)
    }
}

#[derive(Debug, Deserialize)]
pub struct PagesData<T> {
    pub pages: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleByPath {
    pub single_by_path: Option<UpstreamPage>,
}

#[derive(Debug, Deserialize)]
pub struct SingleById {
    pub single: Option<UpstreamPage>,
}

#[derive(Debug, Deserialize)]
pub struct PageList {
    #[serde(default)]
    pub list: Option<Vec<UpstreamPage>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResult {
    pub create: Option<MutationResult>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResult {
    pub update: Option<MutationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    pub response_result: ResponseResult,
    #[serde(default)]
    pub page: Option<UpstreamPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseResult {
    pub succeeded: bool,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `Page` from `singleByPath` and mutations, or `PageListItem` from `list`.
/// The two differ only in how tags are spelled.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamPage {
    pub id: i64,
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Option<Vec<Option<UpstreamTag>>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UpstreamTag {
    Name(String),
    Object { tag: String },
}

impl From<UpstreamPage> for PageRecord {
    fn from(page: UpstreamPage) -> Self {
        let tags = page
            .tags
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|t| match t {
                UpstreamTag::Name(tag) | UpstreamTag::Object { tag } => tag,
            })
            .collect();

        PageRecord {
            id: page.id,
            path: PagePath::from_upstream(&page.path),
            title: page.title.unwrap_or_default(),
            content: page.content,
            description: page.description,
            locale: page.locale,
            tags,
            is_published: page.is_published,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

/// Maps top-level GraphQL errors. Anything not recognisably "not found" or
/// "duplicate" is treated as the wiki being unusable for this call.
pub fn classify_errors(errors: &[GraphQlError]) -> ProxyError {
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    if errors.iter().any(GraphQlError::is_not_found) {
        return ProxyError::NotFound(message);
    }
    if errors
        .iter()
        .any(|e| e.code() == Some(CODE_PAGE_DUPLICATE) || e.name() == Some("PageDuplicateCreate"))
    {
        return ProxyError::Conflict(message);
    }
    ProxyError::UpstreamUnavailable(message)
}

/// Maps a `responseResult` with `succeeded: false`. Unlike top-level errors,
/// an unrecognised rejection here is the wiki refusing the input.
pub fn classify_rejection(result: &ResponseResult, fallback: &str) -> ProxyError {
    let message = result
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .or_else(|| result.slug.clone())
        .unwrap_or_else(|| fallback.to_string());

    match (result.slug.as_deref(), result.error_code) {
        (Some("PageDuplicateCreate" | "PagePathCollision"), _) | (_, Some(CODE_PAGE_DUPLICATE)) => {
            ProxyError::Conflict(message)
        }
        (Some("PageNotFound"), _) | (_, Some(CODE_PAGE_NOT_FOUND)) => ProxyError::NotFound(message),
        (Some("Error"), _) if names_missing_page(&message) => ProxyError::NotFound(message),
        (Some(slug), _) if slug.ends_with("Forbidden") || slug.starts_with("Auth") => {
            ProxyError::UpstreamUnavailable(format!("Wiki.js refused the API key: {message}"))
        }
        _ => ProxyError::Validation(message),
    }
}

fn names_missing_page(message: &str) -> bool {
    let message = message.trim().trim_end_matches('.').to_ascii_lowercase();
    message == PAGE_NOT_FOUND_MESSAGE || message == INVALID_PAGE_ID_MESSAGE
}

/// Unwraps a mutation reply into the page it produced.
pub fn mutation_page(
    result: Option<MutationResult>,
    fallback: &str,
) -> Result<PageRecord, ProxyError> {
    let result = result.ok_or_else(|| {
        ProxyError::UpstreamUnavailable(format!("{fallback}: reply carried no result"))
    })?;
    if !result.response_result.succeeded {
        return Err(classify_rejection(&result.response_result, fallback));
    }
    result.page.map(PageRecord::from).ok_or_else(|| {
        ProxyError::UpstreamUnavailable(format!("{fallback}: reply carried no page"))
    })
}
