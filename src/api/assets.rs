use axum::{
    Json,
    body::Body,
    http::{StatusCode, Uri, header},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

use super::ErrorBody;

#[derive(RustEmbed)]
#[folder = "ui/dist"]
struct Asset;

/// Serves the embedded SPA bundle. Unmatched paths fall back to the entry
/// document so client-side routing keeps working.
pub async fn serve_asset(uri: Uri) -> impl IntoResponse {
    let mut path = uri.path().trim_start_matches('/').to_string();

    if path.is_empty() {
        path = "index.html".to_string();
    }

    match Asset::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                Body::from(content.data),
            )
                .into_response()
        }
        None => {
            if let Some(content) = Asset::get("index.html") {
                let mime = mime_guess::from_path("index.html").first_or_octet_stream();
                (
                    [(header::CONTENT_TYPE, mime.as_ref())],
                    Body::from(content.data),
                )
                    .into_response()
            } else {
                tracing::warn!("Requested path not found: {}", uri.path());
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorBody::new("Resource not found")),
                )
                    .into_response()
            }
        }
    }
}
