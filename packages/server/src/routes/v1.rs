use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/admin/products", admin_product_routes())
        .nest("/admin/assets", admin_asset_routes())
        .nest("/storefront", storefront_routes())
}

fn admin_product_routes() -> OpenApiRouter<AppState> {
    use handlers::product::*;

    OpenApiRouter::new()
        .routes(routes!(create_product, list_products))
        .routes(routes!(get_product, update_product, delete_product))
        .routes(routes!(set_product_availability))
        .routes(routes!(download_product_file))
        .layer(product_form_body_limit())
}

fn admin_asset_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::assets::list_pending))
        .routes(routes!(handlers::assets::sweep))
}

fn storefront_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::storefront::home))
        .routes(routes!(handlers::storefront::products))
}
