//! Static OpenAPI document for tool discovery.
//!
//! Tool-calling frontends register this server by URL, fetch
//! `/openapi.json`, and expose every `operationId` as a callable tool.

use serde_json::{Value, json};

pub const API_TITLE: &str = "Wiki.js Proxy API";

fn page_record_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "path", "title"],
        "properties": {
            "id": { "type": "integer", "description": "Wiki.js page ID, needed by update_page" },
            "path": { "type": "string", "example": "/HW/Workstation-01" },
            "title": { "type": "string" },
            "content": { "type": ["string", "null"], "description": "Markdown source; omitted by list_pages" },
            "description": { "type": ["string", "null"] },
            "locale": { "type": ["string", "null"] },
            "tags": { "type": "array", "items": { "type": "string" } },
            "is_published": { "type": ["boolean", "null"] },
            "created_at": { "type": ["string", "null"], "format": "date-time" },
            "updated_at": { "type": ["string", "null"], "format": "date-time" }
        }
    })
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "required": ["error", "message"],
        "properties": {
            "error": {
                "type": "string",
                "enum": ["validation_error", "not_found", "conflict", "upstream_unavailable", "upstream_timeout"]
            },
            "message": { "type": "string" }
        }
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    })
}

fn page_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/PageRecord" } } }
    })
}

fn json_body(schema: Value, required: bool) -> Value {
    json!({
        "required": required,
        "content": { "application/json": { "schema": schema } }
    })
}

fn locale_field(default_locale: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("Locale code, e.g. en or de. Defaults to {default_locale}.")
    })
}

// every tool can also fail on input or on the wiki itself
fn with_common_errors(mut responses: Value) -> Value {
    responses["400"] = error_response("Invalid input");
    responses["502"] = error_response("Wiki.js API error");
    responses["504"] = error_response("Wiki.js did not answer in time");
    responses
}

fn operation(
    operation_id: &str,
    summary: &str,
    description: &str,
    request_body: Value,
    responses: Value,
) -> Value {
    json!({
        "post": {
            "operationId": operation_id,
            "summary": summary,
            "description": description,
            "tags": ["wikijs"],
            "requestBody": request_body,
            "responses": with_common_errors(responses)
        }
    })
}

/// The document served at `/openapi.json`. `default_locale` is only used in
/// field descriptions.
pub fn openapi_document(default_locale: &str) -> Value {
    let mut paths = serde_json::Map::new();
    paths.insert(
        "/get_page".to_string(),
        operation(
            "get_page",
            "Get a wiki page by path",
            "Fetch a single Wiki.js page by its path (e.g. /HW/Workstation-01). Returns id, path, title, content, description.",
            json_body(
                json!({
                    "type": "object",
                    "required": ["path"],
                    "properties": {
                        "path": { "type": "string", "description": "Wiki page path, e.g. /HW/Workstation-01 or /DOC/Build-Prozess" },
                        "locale": locale_field(default_locale)
                    }
                }),
                true,
            ),
            json!({
                "200": page_response("The page"),
                "404": error_response("No page at this path")
            }),
        ),
    );
    paths.insert(
        "/list_pages".to_string(),
        operation(
            "list_pages",
            "List all wiki pages",
            "Return all pages (id, path, title, description). Useful to discover existing pages before get_page or update_page.",
            json_body(
                json!({
                    "type": "object",
                    "properties": {
                        "order_by": {
                            "type": "string",
                            "enum": ["TITLE", "PATH", "CREATED", "UPDATED", "ID"]
                        }
                    }
                }),
                false,
            ),
            json!({
                "200": {
                    "description": "Pages in the order Wiki.js returned them",
                    "content": { "application/json": { "schema": {
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/PageRecord" }
                    }}}
                }
            }),
        ),
    );
    paths.insert(
        "/create_page".to_string(),
        operation(
            "create_page",
            "Create a new wiki page",
            "Create a new page in Wiki.js. Provide path (e.g. /DOC/MyPage), title, and content. Optional: description, locale, tags.",
            json_body(
                json!({
                    "type": "object",
                    "required": ["path", "title", "content"],
                    "properties": {
                        "path": { "type": "string", "description": "Page path, e.g. /HW/Workstation-01" },
                        "title": { "type": "string" },
                        "content": { "type": "string", "description": "Page content (Markdown supported)" },
                        "description": { "type": "string", "description": "Short description; defaults to the title" },
                        "locale": locale_field(default_locale),
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "is_published": { "type": "boolean", "default": true }
                    }
                }),
                true,
            ),
            json!({
                "201": page_response("The created page, including its ID"),
                "409": error_response("A page already exists at this path")
            }),
        ),
    );
    paths.insert(
        "/update_page".to_string(),
        operation(
            "update_page",
            "Update an existing wiki page",
            "Update a page by its ID (from get_page or list_pages). Provide at least one of content, title, or description.",
            json_body(
                json!({
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": { "type": "integer", "description": "Wiki.js page ID (from get_page or list_pages)" },
                        "content": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" }
                    }
                }),
                true,
            ),
            json!({
                "200": page_response("The updated page"),
                "404": error_response("No page with this ID")
            }),
        ),
    );
    paths.insert(
        "/update_page_by_path".to_string(),
        operation(
            "update_page_by_path",
            "Update a wiki page addressed by path",
            "Look the page up by path, then update it by its ID. Fails with 404 if the lookup finds nothing. Provide at least one of content, title, or description.",
            json_body(
                json!({
                    "type": "object",
                    "required": ["path"],
                    "properties": {
                        "path": { "type": "string" },
                        "locale": locale_field(default_locale),
                        "content": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" }
                    }
                }),
                true,
            ),
            json!({
                "200": page_response("The updated page"),
                "404": error_response("No page at this path, or it vanished before the update")
            }),
        ),
    );

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "version": env!("CARGO_PKG_VERSION"),
            "description": "OpenAPI proxy for Wiki.js: get, list, create, and update wiki pages."
        },
        "paths": paths,
        "components": {
            "schemas": {
                "PageRecord": page_record_schema(),
                "Error": error_schema()
            }
        }
    })
}
