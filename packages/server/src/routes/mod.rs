mod v1;

use axum::Router;
use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;

use crate::handlers;
use crate::state::AppState;

/// Mount point of the versioned JSON API.
pub const API_BASE: &str = "/api";

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes())
}

/// Asset URLs produced by the filesystem media store resolve here.
pub fn media_routes() -> Router<AppState> {
    Router::new().route(
        "/media/{folder}/{public_id}",
        get(handlers::media::serve_media),
    )
}
