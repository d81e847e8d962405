use crate::error::ProxyError;
use chrono::{DateTime, Utc};
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A page as the wiki reports it. `id` is assigned upstream and is the only
/// handle `update_page` accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{} (#{})", path, id)]
pub struct PageRecord {
    pub id: i64,
    pub path: String,
    pub title: String,
    pub content: Option<String>,
    pub description: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client-facing page path: non-empty, begins with a single `/`, names
/// something other than the root, and has no empty segments. Those forms are
/// the ones Wiki.js would hand back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{}", _0)]
pub struct PagePath(String);

impl PagePath {
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        if raw.trim().is_empty() {
            return Err(ProxyError::Validation("path must not be empty".into()));
        }
        if !raw.starts_with('/') {
            return Err(ProxyError::Validation(format!(
                "path must begin with '/': {raw}"
            )));
        }
        if raw.trim_start_matches('/').trim().is_empty() {
            return Err(ProxyError::Validation(format!(
                "path must name a page: {raw}"
            )));
        }
        // "//a", "/a//b" and "/a/" come back from the wiki as "/a", "/a/b", "/a"
        if raw[1..].split('/').any(|segment| segment.trim().is_empty()) {
            return Err(ProxyError::Validation(format!(
                "path must not contain empty segments or end with '/': {raw}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The form Wiki.js stores: no leading slash.
    pub fn upstream(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    /// Inverse of [`PagePath::upstream`] for paths coming back from the wiki.
    pub fn from_upstream(raw: &str) -> String {
        format!("/{}", raw.trim_start_matches('/'))
    }
}

/// Everything `create_page` submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub path: PagePath,
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub locale: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
}

impl NewPage {
    pub fn new(path: &str, title: String, content: String) -> Result<Self, ProxyError> {
        let path = PagePath::parse(path)?;
        if title.trim().is_empty() {
            return Err(ProxyError::Validation("title must not be empty".into()));
        }
        if content.trim().is_empty() {
            return Err(ProxyError::Validation("content must not be empty".into()));
        }
        Ok(Self {
            path,
            title,
            content,
            description: None,
            locale: None,
            tags: Vec::new(),
            is_published: true,
        })
    }

    /// Wiki.js requires a description on create; fall back to the title.
    pub fn description_or_title(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.title)
    }
}

/// The subset of fields an update replaces. Blank strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageChanges {
    pub content: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PageChanges {
    pub fn new(
        content: Option<String>,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Self, ProxyError> {
        let changes = Self {
            content: non_blank(content),
            title: non_blank(title),
            description: non_blank(description),
        };
        if changes.is_empty() {
            return Err(ProxyError::Validation(
                "At least one of content, title, or description must be provided.".into(),
            ));
        }
        Ok(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.title.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate {
    pub id: i64,
    pub changes: PageChanges,
}

impl PageUpdate {
    pub fn new(id: i64, changes: PageChanges) -> Result<Self, ProxyError> {
        if id <= 0 {
            return Err(ProxyError::Validation(format!(
                "id must be a positive page id, got {id}"
            )));
        }
        Ok(Self { id, changes })
    }
}

/// Orderings `pages.list` understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ListOrder {
    #[default]
    #[display("TITLE")]
    Title,
    #[display("PATH")]
    Path,
    #[display("CREATED")]
    Created,
    #[display("UPDATED")]
    Updated,
    #[display("ID")]
    Id,
}

impl FromStr for ListOrder {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TITLE" => Ok(Self::Title),
            "PATH" => Ok(Self::Path),
            "CREATED" => Ok(Self::Created),
            "UPDATED" => Ok(Self::Updated),
            "ID" => Ok(Self::Id),
            other => Err(ProxyError::Validation(format!(
                "order_by must be one of TITLE, PATH, CREATED, UPDATED, ID; got {other}"
            ))),
        }
    }
}

/// Blank locales fall through to the configured default.
pub fn normalize_locale(locale: Option<String>) -> Option<String> {
    non_blank(locale).map(|l| l.trim().to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
