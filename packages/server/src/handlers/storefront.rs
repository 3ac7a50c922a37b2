use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::product::{StorefrontProduct, StorefrontResponse};
use crate::products::ProductService;
use crate::state::AppState;
use crate::views::{HOME_VIEW, Lookup, PRODUCTS_VIEW};

/// Number of products featured on the home view.
pub const HOME_FEATURED_LIMIT: u64 = 6;

/// Response header reporting whether a view came from the cache.
pub const VIEW_CACHE_HEADER: &str = "x-view-cache";

#[utoipa::path(
    get,
    path = "/",
    tag = "Storefront",
    operation_id = "storefrontHome",
    summary = "Storefront home view",
    description = "Newest products that are available for purchase. Cached until a product \
        mutation revalidates it.",
    responses(
        (status = 200, description = "Home view", body = StorefrontResponse),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Response, AppError> {
    cached_view(&state, HOME_VIEW, |products| async move {
        products.newest_available(HOME_FEATURED_LIMIT).await
    })
    .await
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "Storefront",
    operation_id = "storefrontProducts",
    summary = "Storefront product listing view",
    description = "Every product available for purchase, by name. Cached until a product \
        mutation revalidates it.",
    responses(
        (status = 200, description = "Product listing view", body = StorefrontResponse),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Response, AppError> {
    cached_view(&state, PRODUCTS_VIEW, |products| async move {
        products.list_available().await
    })
    .await
}

/// Serve `path` from the view cache, rendering it with `load` on a miss.
async fn cached_view<'a, F, Fut>(
    state: &'a AppState,
    path: &str,
    load: F,
) -> Result<Response, AppError>
where
    F: FnOnce(ProductService<'a>) -> Fut,
    Fut: Future<Output = Result<Vec<crate::entity::product::Model>, AppError>>,
{
    let (body, status) = match state.views.lookup(path) {
        Lookup::Hit(body) => (body, "hit"),
        Lookup::Miss { generation } => {
            let products = load(state.products()).await?;
            let view = StorefrontResponse {
                products: products.into_iter().map(StorefrontProduct::from).collect(),
            };
            let rendered = serde_json::to_vec(&view)
                .map_err(|e| AppError::Internal(format!("Failed to render view: {e}")))?;
            (state.views.store(path, generation, rendered), "miss")
        }
    };

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            (
                header::HeaderName::from_static(VIEW_CACHE_HEADER),
                HeaderValue::from_static(status),
            ),
        ],
        Arc::unwrap_or_clone(body),
    )
        .into_response())
}
