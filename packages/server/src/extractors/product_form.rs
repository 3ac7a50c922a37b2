use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};
use common::storage::MediaFile;

use crate::error::AppError;
use crate::models::product::{
    FIELD_DESCRIPTION, FIELD_FILE, FIELD_IMAGE, FIELD_NAME, FIELD_PRICE, ProductForm,
};

/// Reads a multipart product submission into a [`ProductForm`].
///
/// Only transport failures are rejected here. Missing or malformed fields are
/// left for the validators so every field error is reported at once.
pub struct ProductMultipart(pub ProductForm);

impl<S> FromRequest<S> for ProductMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let mut form = ProductForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                FIELD_NAME => form.name = Some(read_text(field).await?),
                FIELD_DESCRIPTION => form.description = Some(read_text(field).await?),
                FIELD_PRICE => form.price_in_cents = Some(read_text(field).await?),
                FIELD_FILE => form.file = read_file(field).await?,
                FIELD_IMAGE => form.image = read_file(field).await?,
                _ => {} // Ignore unknown fields.
            }
        }

        Ok(ProductMultipart(form))
    }
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

/// A part without a filename is a plain value, not a file.
async fn read_file(field: Field<'_>) -> Result<Option<MediaFile>, AppError> {
    let Some(file_name) = field.file_name().map(str::to_string) else {
        return Ok(None);
    };
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{file_name}': {e}")))?;

    Ok(Some(MediaFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}
