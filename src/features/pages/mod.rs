pub mod model;

use crate::AppState;
use crate::domain::page::normalize_locale;
use crate::domain::{NewPage, PagePath, PageRecord, PageUpdate};
use crate::error::ProxyError;
use crate::features::extract::{ToolJson, parse_optional_body};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use model::{
    CreatePageRequest, GetPageRequest, ListPagesRequest, PathUpdate, UpdatePageByPathRequest,
    UpdatePageRequest,
};

// every tool is a POST so the tool-calling client can send one JSON body
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/get_page", post(get_page_handler))
        .route("/list_pages", post(list_pages_handler))
        .route("/create_page", post(create_page_handler))
        .route("/update_page", post(update_page_handler))
        .route("/update_page_by_path", post(update_page_by_path_handler))
}

async fn get_page_handler(
    State(state): State<AppState>,
    ToolJson(req): ToolJson<GetPageRequest>,
) -> Result<Json<PageRecord>, ProxyError> {
    let path = PagePath::parse(&req.path)?;
    let locale = normalize_locale(req.locale);
    let page = state.service.get_page(&path, locale.as_deref()).await?;
    Ok(Json(page))
}

async fn list_pages_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<PageRecord>>, ProxyError> {
    let req: ListPagesRequest = parse_optional_body(&body)?;
    let pages = state.service.list_pages(req.order()?).await?;
    Ok(Json(pages))
}

async fn create_page_handler(
    State(state): State<AppState>,
    ToolJson(req): ToolJson<CreatePageRequest>,
) -> Result<(StatusCode, Json<PageRecord>), ProxyError> {
    let page = NewPage::try_from(req)?;
    let created = state.service.create_page(page).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_page_handler(
    State(state): State<AppState>,
    ToolJson(req): ToolJson<UpdatePageRequest>,
) -> Result<Json<PageRecord>, ProxyError> {
    let update = PageUpdate::try_from(req)?;
    let updated = state.service.update_page(update).await?;
    Ok(Json(updated))
}

async fn update_page_by_path_handler(
    State(state): State<AppState>,
    ToolJson(req): ToolJson<UpdatePageByPathRequest>,
) -> Result<Json<PageRecord>, ProxyError> {
    let PathUpdate {
        path,
        locale,
        changes,
    } = PathUpdate::try_from(req)?;
    let updated = state
        .service
        .update_page_by_path(&path, locale.as_deref(), changes)
        .await?;
    Ok(Json(updated))
}
