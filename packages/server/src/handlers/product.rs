use axum::Json;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use common::storage::{FILES_FOLDER, extract_filename_from_url};
use tokio_util::io::ReaderStream;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::product_form::ProductMultipart;
use crate::models::product::*;
use crate::products::UpdateOutcome;
use crate::state::AppState;

/// Where every successful form submission is redirected.
pub const ADMIN_PRODUCTS_PATH: &str = "/api/v1/admin/products";

/// Body limit for product form submissions (two assets plus text fields).
pub fn product_form_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(128 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Validates the submitted form, uploads the downloadable file to the `products` \
        folder and the image to `product-images`, then stores the product as not available for \
        purchase. All of `name`, `description`, `price_in_cents`, `file` and `image` are required.",
    request_body(content_type = "multipart/form-data", description = "Product form"),
    responses(
        (status = 303, description = "Created; redirects to the admin product listing"),
        (status = 400, description = "Field validation failed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 502, description = "An asset could not be stored (UPLOAD_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_product(
    State(state): State<AppState>,
    ProductMultipart(form): ProductMultipart,
) -> Result<Redirect, AppError> {
    let input = validate_new_product(form)?;
    state.products().create(input).await?;

    Ok(Redirect::to(ADMIN_PRODUCTS_PATH))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Edit a product",
    description = "Validates the submitted form and replaces whichever of `file` and `image` \
        were supplied. Replaced assets are removed from the media store once the new references \
        are saved. Any saved edit makes the product unavailable for purchase again. When no \
        replacement asset could be stored, nothing is saved and 204 is returned.",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Product form"),
    responses(
        (status = 303, description = "Saved; redirects to the admin product listing"),
        (status = 204, description = "No replacement asset stored; product unchanged"),
        (status = 400, description = "Field validation failed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ProductMultipart(form): ProductMultipart,
) -> Result<Response, AppError> {
    let id = parse_product_id(&id)?;
    let input = validate_product_edit(form)?;

    match state.products().update(id, input).await? {
        UpdateOutcome::Updated(_) => Ok(Redirect::to(ADMIN_PRODUCTS_PATH).into_response()),
        UpdateOutcome::Unchanged => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

#[utoipa::path(
    put,
    path = "/{id}/availability",
    tag = "Products",
    operation_id = "setProductAvailability",
    summary = "Set whether a product can be purchased",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = AvailabilityRequest,
    responses(
        (status = 204, description = "Availability updated"),
        (status = 400, description = "Malformed request (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(product_id = %id))]
pub async fn set_product_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AvailabilityRequest>,
) -> Result<StatusCode, AppError> {
    let id = parse_product_id(&id)?;
    state
        .products()
        .set_availability(id, payload.is_available_for_purchase)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Removes the product and then its file and image from the media store. \
        Assets whose removal fails stay queued and are retried by the sweeper.",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(product_id = %id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_product_id(&id)?;
    state.products().delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List all products",
    description = "Returns every product ordered by name, including unavailable ones.",
    responses(
        (status = 200, description = "Product list", body = ProductListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, AppError> {
    let products = state.products().list_all().await?;
    let total = products.len() as u64;
    let data = products.into_iter().map(ProductResponse::from).collect();

    Ok(Json(ProductListResponse { data, total }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(product_id = %id))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let id = parse_product_id(&id)?;
    let product = state.products().find(id).await?;

    Ok(Json(ProductResponse::from(product)))
}

#[utoipa::path(
    get,
    path = "/{id}/download",
    tag = "Products",
    operation_id = "downloadProductFile",
    summary = "Download a product's file",
    description = "Streams the product's downloadable asset as an attachment named after the product.",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "Product or asset not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(product_id = %id))]
pub async fn download_product_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_product_id(&id)?;
    let product = state.products().find(id).await?;

    let (name, extension) = extract_filename_from_url(&product.file_path)?;
    let public_id = format!("{name}.{extension}");
    let reader = state.media.get_stream(FILES_FOLDER, &public_id).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_ext(&extension).first_or_octet_stream();
    let download_name = format!("{}.{extension}", product.name);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&download_name),
        )
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

fn parse_product_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid product ID".into()))
}

/// Build a safe `Content-Disposition: attachment` header value.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = match ascii_safe.trim() {
        "" => "download".to_string(),
        trimmed => trimmed.to_string(),
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                String::from(b as char)
            }
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
