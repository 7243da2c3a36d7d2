//! Page action handlers
//!
//! Every request that is not a fixed route lands in [`dispatch_page`], which
//! validates the raw path before anything else runs. Paths outside
//! `/(view|edit|save)/<title>` never reach storage.

use crate::api::rest::form::form_field;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::render::RenderMode;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use wiki_types::{Action, Page, PagePath, Title};

/// Name of the form field carrying page content
const BODY_FIELD: &str = "body";

/// Validate the request path and run the matching action
pub async fn dispatch_page(State(state): State<AppState>, request: Request) -> ApiResult<Response> {
    let PagePath { action, title } = PagePath::parse(request.uri().path())?;
    let method = request.method().clone();

    match (action, method) {
        (Action::View, Method::GET | Method::HEAD) => view_page(&state, title).await,
        (Action::Edit, Method::GET | Method::HEAD) => edit_page(&state, title).await,
        (Action::Save, Method::POST) => {
            let body = read_save_body(request).await?;
            save_page(&state, title, body).await
        }
        (action, method) => Err(ApiError::MethodNotAllowed(format!("{method} /{action}/"))),
    }
}

/// Render a stored page, or send the client to create it
pub async fn view_page(state: &AppState, title: Title) -> ApiResult<Response> {
    match state.storage.load_page(&title).await? {
        Some(page) => render(state, RenderMode::View, &page),
        None => {
            tracing::debug!(title = %title, "Page missing, redirecting to editor");
            Ok(redirect(Action::Edit, &title))
        }
    }
}

/// Render the edit form, blank for a page that does not exist yet
pub async fn edit_page(state: &AppState, title: Title) -> ApiResult<Response> {
    let page = match state.storage.load_page(&title).await? {
        Some(page) => {
            tracing::debug!(title = %title, page_id = ?page.id, "Editing stored page");
            page
        }
        None => {
            tracing::debug!(title = %title, "Editing new page");
            Page::blank(title)
        }
    };
    render(state, RenderMode::Edit, &page)
}

/// Store the submitted content under `title`
pub async fn save_page(state: &AppState, title: Title, body: Vec<u8>) -> ApiResult<Response> {
    let page = Page::new(title, body);
    let saved = state.storage.save_page(page).await?;

    tracing::info!(
        title = %saved.title,
        page_id = ?saved.id,
        bytes = saved.body.len(),
        "Saved page"
    );

    Ok(redirect(Action::View, &saved.title))
}

/// Extract the `body` field from a save request
///
/// Url-encoded and multipart forms are read; any other content type, or
/// none at all, saves empty content. A missing field is empty content too.
async fn read_save_body(request: Request) -> ApiResult<Vec<u8>> {
    let media_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
        .unwrap_or_default();

    match media_type.as_str() {
        "application/x-www-form-urlencoded" => {
            let raw = Bytes::from_request(request, &()).await?;
            Ok(form_field(&raw, BODY_FIELD).unwrap_or_default())
        }
        "multipart/form-data" => {
            let mut multipart = Multipart::from_request(request, &()).await?;
            while let Some(field) = multipart.next_field().await? {
                if field.name() == Some(BODY_FIELD) {
                    return Ok(field.bytes().await?.to_vec());
                }
            }
            Ok(Vec::new())
        }
        other => {
            tracing::debug!(content_type = other, "No form to read, saving empty content");
            Ok(Vec::new())
        }
    }
}

fn render(state: &AppState, mode: RenderMode, page: &Page) -> ApiResult<Response> {
    let bytes = state.renderer.render(mode, page)?;
    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        bytes,
    )
        .into_response())
}

fn redirect(action: Action, title: &Title) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, action.path_for(title))]).into_response()
}
