use chrono::{DateTime, Utc};
use common::storage::MediaFile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::product;
use crate::error::{AppError, FieldErrors};

pub const FIELD_NAME: &str = "name";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRICE: &str = "price_in_cents";
pub const FIELD_FILE: &str = "file";
pub const FIELD_IMAGE: &str = "image";

const MSG_REQUIRED: &str = "Required";
const MSG_EMPTY_STRING: &str = "String must contain at least 1 character(s)";
const MSG_NOT_A_NUMBER: &str = "Expected number, received nan";
const MSG_NOT_AN_INTEGER: &str = "Expected integer, received float";
const MSG_PRICE_TOO_SMALL: &str = "Number must be greater than or equal to 1";
const MSG_PRICE_TOO_LARGE: &str = "Number must be less than or equal to 2147483647";
const MSG_NOT_AN_IMAGE: &str = "Invalid input";

/// Raw product form as submitted, before validation.
///
/// Every field is optional here; absence and emptiness are judged by the
/// validators so that all field errors are reported together.
#[derive(Debug, Default, Clone)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_in_cents: Option<String>,
    pub file: Option<MediaFile>,
    pub image: Option<MediaFile>,
}

/// A validated create submission. Both assets are present and non-empty.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_in_cents: i32,
    pub file: MediaFile,
    pub image: MediaFile,
}

/// A validated edit submission.
///
/// `file` and `image` are `Some` only when a non-empty replacement was sent.
#[derive(Debug, Clone)]
pub struct ProductEdit {
    pub name: String,
    pub description: String,
    pub price_in_cents: i32,
    pub file: Option<MediaFile>,
    pub image: Option<MediaFile>,
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn required_text(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => {
            push_error(errors, field, MSG_REQUIRED);
            None
        }
        Some(v) if v.is_empty() => {
            push_error(errors, field, MSG_EMPTY_STRING);
            None
        }
        Some(v) => Some(v),
    }
}

/// Coerce a submitted price to whole minor units (>= 1).
///
/// Blank input coerces to 0; integral decimals such as `"12.0"` are accepted.
pub fn coerce_price(raw: Option<&str>) -> Result<i32, &'static str> {
    let Some(raw) = raw else {
        return Err(MSG_NOT_A_NUMBER);
    };
    let trimmed = raw.trim();

    let value: i64 = if trimmed.is_empty() {
        0
    } else if let Ok(v) = trimmed.parse::<i64>() {
        v
    } else {
        match trimmed.parse::<f64>() {
            Ok(f) if !f.is_finite() => return Err(MSG_NOT_A_NUMBER),
            Ok(f) if f.fract() != 0.0 => return Err(MSG_NOT_AN_INTEGER),
            Ok(f) if f > i64::MAX as f64 => return Err(MSG_PRICE_TOO_LARGE),
            Ok(f) => f as i64,
            Err(_) => return Err(MSG_NOT_A_NUMBER),
        }
    };

    if value < 1 {
        return Err(MSG_PRICE_TOO_SMALL);
    }
    i32::try_from(value).map_err(|_| MSG_PRICE_TOO_LARGE)
}

fn price_field(errors: &mut FieldErrors, raw: Option<String>) -> Option<i32> {
    match coerce_price(raw.as_deref()) {
        Ok(v) => Some(v),
        Err(msg) => {
            push_error(errors, FIELD_PRICE, msg);
            None
        }
    }
}

fn check_image_type(errors: &mut FieldErrors, image: &MediaFile) -> bool {
    if image.is_empty() || image.is_image() {
        true
    } else {
        push_error(errors, FIELD_IMAGE, MSG_NOT_AN_IMAGE);
        false
    }
}

/// Validate a create submission. Both assets are mandatory and non-empty.
pub fn validate_new_product(form: ProductForm) -> Result<NewProduct, AppError> {
    let mut errors = FieldErrors::new();

    let name = required_text(&mut errors, FIELD_NAME, form.name);
    let description = required_text(&mut errors, FIELD_DESCRIPTION, form.description);
    let price_in_cents = price_field(&mut errors, form.price_in_cents);

    let file = match form.file {
        Some(f) if !f.is_empty() => Some(f),
        _ => {
            push_error(&mut errors, FIELD_FILE, MSG_REQUIRED);
            None
        }
    };

    let image = match form.image {
        Some(img) => {
            let typed = check_image_type(&mut errors, &img);
            if img.is_empty() {
                push_error(&mut errors, FIELD_IMAGE, MSG_REQUIRED);
                None
            } else if typed {
                Some(img)
            } else {
                None
            }
        }
        None => {
            push_error(&mut errors, FIELD_IMAGE, MSG_REQUIRED);
            None
        }
    };

    match (name, description, price_in_cents, file, image) {
        (Some(name), Some(description), Some(price_in_cents), Some(file), Some(image))
            if errors.is_empty() =>
        {
            Ok(NewProduct {
                name,
                description,
                price_in_cents,
                file,
                image,
            })
        }
        _ => Err(AppError::InvalidFields(errors)),
    }
}

/// Validate an edit submission. Zero-size assets count as "not provided".
pub fn validate_product_edit(form: ProductForm) -> Result<ProductEdit, AppError> {
    let mut errors = FieldErrors::new();

    let name = required_text(&mut errors, FIELD_NAME, form.name);
    let description = required_text(&mut errors, FIELD_DESCRIPTION, form.description);
    let price_in_cents = price_field(&mut errors, form.price_in_cents);

    let file = form.file.filter(|f| !f.is_empty());
    let image = match form.image {
        Some(img) if check_image_type(&mut errors, &img) => Some(img).filter(|i| !i.is_empty()),
        _ => None,
    };

    match (name, description, price_in_cents) {
        (Some(name), Some(description), Some(price_in_cents)) if errors.is_empty() => {
            Ok(ProductEdit {
                name,
                description,
                price_in_cents,
                file,
                image,
            })
        }
        _ => Err(AppError::InvalidFields(errors)),
    }
}

/// Response DTO for a product as seen by administrators.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProductResponse {
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: Uuid,
    #[schema(example = "Rust Handbook")]
    pub name: String,
    pub description: String,
    /// Price in minor currency units.
    #[schema(example = 2999)]
    pub price_in_cents: i32,
    /// URL of the downloadable asset.
    #[schema(example = "http://127.0.0.1:3000/media/products/0193a.pdf")]
    pub file_path: String,
    /// URL of the display image.
    #[schema(example = "http://127.0.0.1:3000/media/product-images/0193b.png")]
    pub image_path: String,
    pub is_available_for_purchase: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProductListResponse {
    pub data: Vec<ProductResponse>,
    pub total: u64,
}

/// Public storefront view of an available product.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StorefrontProduct {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_in_cents: i32,
    pub image_path: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StorefrontResponse {
    pub products: Vec<StorefrontProduct>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AvailabilityRequest {
    pub is_available_for_purchase: bool,
}

impl From<product::Model> for ProductResponse {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price_in_cents: m.price_in_cents,
            file_path: m.file_path,
            image_path: m.image_path,
            is_available_for_purchase: m.is_available_for_purchase,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<product::Model> for StorefrontProduct {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price_in_cents: m.price_in_cents,
            image_path: m.image_path,
        }
    }
}
