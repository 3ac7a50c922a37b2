use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Serve a stored asset by its folder and public identifier.
///
/// This is what makes filesystem-backed asset URLs resolvable.
#[instrument(skip(state))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path((folder, public_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let reader = state.media.get_stream(&folder, &public_id).await?;
    let mime = mime_guess::from_path(&public_id).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(e.to_string()))
}
