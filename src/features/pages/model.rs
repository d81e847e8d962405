use crate::domain::page::normalize_locale;
use crate::domain::{ListOrder, NewPage, PageChanges, PagePath, PageUpdate};
use crate::error::ProxyError;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct GetPageRequest {
    pub path: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListPagesRequest {
    #[serde(default)]
    pub order_by: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreatePageRequest {
    pub path: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct UpdatePageRequest {
    // older tool definitions send "page_id"
    #[serde(alias = "page_id")]
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdatePageByPathRequest {
    pub path: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ListPagesRequest {
    pub fn order(&self) -> Result<Option<ListOrder>, ProxyError> {
        self.order_by
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .map(str::parse::<ListOrder>)
            .transpose()
    }
}

impl TryFrom<CreatePageRequest> for NewPage {
    type Error = ProxyError;

    fn try_from(req: CreatePageRequest) -> Result<Self, Self::Error> {
        let mut page = NewPage::new(&req.path, req.title, req.content)?;
        page.description = req.description.filter(|d| !d.trim().is_empty());
        page.locale = normalize_locale(req.locale);
        page.tags = req
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        page.is_published = req.is_published.unwrap_or(true);
        Ok(page)
    }
}

impl TryFrom<UpdatePageRequest> for PageUpdate {
    type Error = ProxyError;

    fn try_from(req: UpdatePageRequest) -> Result<Self, Self::Error> {
        let changes = PageChanges::new(req.content, req.title, req.description)?;
        PageUpdate::new(req.id, changes)
    }
}

/// Validated parts of an update-by-path call.
pub struct PathUpdate {
    pub path: PagePath,
    pub locale: Option<String>,
    pub changes: PageChanges,
}

impl TryFrom<UpdatePageByPathRequest> for PathUpdate {
    type Error = ProxyError;

    fn try_from(req: UpdatePageByPathRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            path: PagePath::parse(&req.path)?,
            locale: normalize_locale(req.locale),
            changes: PageChanges::new(req.content, req.title, req.description)?,
        })
    }
}
