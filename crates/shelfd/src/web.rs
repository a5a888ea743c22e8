//! Web endpoints for shelfd.
//!
//! Thin HTTP surface over the content store: list, create (multipart
//! upload), delete, and download, plus an embedded front-end page. All
//! invariants live in shelf-store; handlers only translate between HTTP
//! and store calls.

use crate::staging;
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use shelf_store::{ContentStore, NewContent, StagedFile, StoreError};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// Shared state for web handlers
#[derive(Clone)]
pub struct WebState {
    pub store: Arc<ContentStore>,
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/api/contents", get(list_contents).post(create_content))
        .route("/api/contents/{id}", delete(delete_content))
        .route("/api/download/{id}", get(download_content))
        .route("/health", get(health))
        .route("/", get(serve_index))
        .with_state(state)
}

/// Map a store error onto an HTTP response with a JSON error body.
fn store_error_response(err: &StoreError) -> Response {
    let status = match err {
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) | StoreError::FileMissing { .. } => StatusCode::NOT_FOUND,
        StoreError::Read(_) | StoreError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("store unavailable: {err}");
    }

    (
        status,
        Json(serde_json::json!({"error": err.to_string()})),
    )
        .into_response()
}

/// Liveness endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Query parameters for listing contents
#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// List content records, optionally filtered by exact type
#[tracing::instrument(name = "http.contents.list", skip(state))]
async fn list_contents(
    State(state): State<WebState>,
    Query(query): Query<ListQuery>,
) -> Response {
    // An empty ?type= value means no filter at all
    let kind = query.kind.as_deref().filter(|k| !k.is_empty());
    match state.store.list(kind) {
        Ok(records) => Json(records).into_response(),
        Err(e) => store_error_response(&e),
    }
}

/// Create a content record from a multipart form.
///
/// Expects fields `type`, `title`, `description`, optional `content`, and
/// a single `file` part. The file is staged into the uploads directory
/// first; if the store then rejects the create, the staged file is
/// discarded so validation failures leave no orphaned uploads.
#[tracing::instrument(name = "http.contents.create", skip(state, multipart))]
async fn create_content(State(state): State<WebState>, mut multipart: Multipart) -> Response {
    let mut kind = String::new();
    let mut title = String::new();
    let mut description = String::new();
    let mut content = String::new();
    let mut staged: Option<StagedFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                discard_staged(&staged);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": format!("malformed upload: {e}")})),
                )
                    .into_response();
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let original = field.file_name().unwrap_or("upload").to_string();
            let mimetype = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = match field.bytes().await {
                Ok(data) => data,
                Err(e) => {
                    discard_staged(&staged);
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({"error": format!("malformed upload: {e}")})),
                    )
                        .into_response();
                }
            };

            match staging::stage_upload(
                &state.store.config().uploads_dir(),
                &original,
                &mimetype,
                &data,
            ) {
                Ok(file) => {
                    // A later file part replaces an earlier one; drop the
                    // earlier staged file so it can't be orphaned
                    discard_staged(&staged);
                    staged = Some(file);
                }
                Err(e) => {
                    tracing::error!("failed to stage upload: {e:#}");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({"error": "failed to store upload"})),
                    )
                        .into_response();
                }
            }
        } else {
            let value = match field.text().await {
                Ok(value) => value,
                Err(e) => {
                    discard_staged(&staged);
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({"error": format!("malformed upload: {e}")})),
                    )
                        .into_response();
                }
            };
            match name.as_str() {
                "type" => kind = value,
                "title" => title = value,
                "description" => description = value,
                "content" => content = value,
                _ => {}
            }
        }
    }

    let mut new = NewContent::new(kind, title, description).with_content(content);
    if let Some(file) = staged.clone() {
        new = new.with_file(file);
    }

    match state.store.create(new) {
        Ok(record) => Json(serde_json::json!({
            "message": "content uploaded",
            "content": record,
        }))
        .into_response(),
        Err(e) => {
            // The store admitted nothing, so the staged upload is an orphan
            discard_staged(&staged);
            store_error_response(&e)
        }
    }
}

/// Remove a staged upload the store did not admit.
fn discard_staged(staged: &Option<StagedFile>) {
    if let Some(file) = staged {
        if let Err(e) = std::fs::remove_file(&file.path) {
            tracing::warn!(path = %file.path.display(), "failed to discard staged upload: {e}");
        }
    }
}

/// Delete a content record and its backing file
#[tracing::instrument(name = "http.contents.delete", skip(state))]
async fn delete_content(State(state): State<WebState>, Path(id): Path<u64>) -> Response {
    match state.store.delete(id) {
        Ok(()) => Json(serde_json::json!({"message": "content deleted"})).into_response(),
        Err(e) => store_error_response(&e),
    }
}

/// Stream a record's backing file under its original display name
#[tracing::instrument(name = "http.contents.download", skip(state))]
async fn download_content(State(state): State<WebState>, Path(id): Path<u64>) -> Response {
    let download = match state.store.fetch_for_download(id) {
        Ok(d) => d,
        Err(e) => return store_error_response(&e),
    };

    let file = match tokio::fs::File::open(&download.path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(path = %download.path.display(), "failed to open backing file: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    // Keep the header value well-formed whatever the original name was
    let display_name = download.file_name.replace(['"', '\r', '\n'], "_");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.mimetype)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{display_name}\""),
        )
        .body(body)
        .map_err(|e| {
            tracing::error!("failed to build response: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })
        .unwrap_or_else(|status| status.into_response())
}

/// Serve the front-end page
async fn serve_index() -> impl IntoResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(INDEX_HTML.to_string())
        .unwrap()
}

/// HTML template for the content browser UI
const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Shelf</title>
  <style>
    :root { --bg: #1a1a2e; --card: #16213e; --accent: #e94560; --text: #eee; --muted: #888; }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); padding: 1rem; min-height: 100vh; max-width: 900px; margin: 0 auto; }
    h1 { font-size: 1.5rem; margin-bottom: 1rem; }
    form { background: var(--card); padding: 1rem; border-radius: 8px; margin-bottom: 1rem; display: grid; gap: 0.5rem; }
    input, textarea, select { padding: 0.5rem; border: 1px solid #333; border-radius: 4px; background: var(--bg); color: var(--text); font-size: 0.9rem; }
    button { background: var(--accent); border: none; color: white; padding: 0.5rem 1rem; border-radius: 4px; cursor: pointer; }
    button:hover { opacity: 0.9; }
    .filters { display: flex; gap: 0.5rem; margin-bottom: 1rem; }
    .card { background: var(--card); padding: 1rem; border-radius: 8px; margin-bottom: 0.75rem; }
    .card-type { font-size: 0.7rem; color: var(--accent); text-transform: uppercase; letter-spacing: 0.05em; }
    .card-title { font-weight: 600; margin: 0.25rem 0; }
    .card-meta { font-size: 0.8rem; color: var(--muted); margin-bottom: 0.5rem; }
    .card a { color: var(--accent); text-decoration: none; font-size: 0.85rem; margin-right: 0.75rem; }
    .card a:hover { text-decoration: underline; }
    .empty { text-align: center; padding: 2rem; color: var(--muted); }
  </style>
</head>
<body>
  <h1>Shelf</h1>

  <form id="uploadForm">
    <input name="type" placeholder="Type (e.g. poem)" required>
    <input name="title" placeholder="Title" required>
    <input name="description" placeholder="Description" required>
    <textarea name="content" placeholder="Content (optional)" rows="3"></textarea>
    <input name="file" type="file" required>
    <button type="submit">Upload</button>
  </form>

  <div class="filters">
    <input id="typeFilter" placeholder="Filter by type">
    <button id="applyFilter">Filter</button>
  </div>

  <div id="contentList"><div class="empty">Loading...</div></div>

  <script>
    async function loadContents() {
      const type = document.getElementById('typeFilter').value;
      const url = type ? `/api/contents?type=${encodeURIComponent(type)}` : '/api/contents';
      const res = await fetch(url);
      const contents = await res.json();

      const list = document.getElementById('contentList');
      if (!contents.length) {
        list.innerHTML = '<div class="empty">No contents yet</div>';
        return;
      }

      list.innerHTML = contents.map(c => `
        <div class="card">
          <div class="card-type">${c.type}</div>
          <div class="card-title">${c.title}</div>
          <div class="card-meta">${c.description} &middot; ${c.date}</div>
          <a href="/api/download/${c.id}">Download ${c.file.name}</a>
          <a href="#" onclick="removeContent(${c.id}); return false;">Delete</a>
        </div>
      `).join('');
    }

    async function removeContent(id) {
      await fetch(`/api/contents/${id}`, { method: 'DELETE' });
      loadContents();
    }

    document.getElementById('uploadForm').onsubmit = async (e) => {
      e.preventDefault();
      const res = await fetch('/api/contents', { method: 'POST', body: new FormData(e.target) });
      if (!res.ok) {
        const body = await res.json();
        alert(body.error || 'upload failed');
        return;
      }
      e.target.reset();
      loadContents();
    };

    document.getElementById('applyFilter').onclick = loadContents;
    loadContents();
  </script>
</body>
</html>
"##;
