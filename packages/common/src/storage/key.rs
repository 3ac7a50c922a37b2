use uuid::Uuid;

use super::error::StorageError;

/// Logical folder holding downloadable product files.
pub const FILES_FOLDER: &str = "products";
/// Logical folder holding product images.
pub const IMAGES_FOLDER: &str = "product-images";

const MAX_EXTENSION_LEN: usize = 16;

/// Validates a single key segment (folder or public identifier).
///
/// Segments end up as path components on disk and in object keys, so they
/// must be flat, visible and free of control characters.
pub fn validate_segment(segment: &str) -> Result<&str, StorageError> {
    if segment.is_empty() {
        return Err(StorageError::InvalidKey("empty segment".into()));
    }
    if segment.contains('/') || segment.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "path separators are not allowed: {segment}"
        )));
    }
    if segment.starts_with('.') {
        return Err(StorageError::InvalidKey(format!(
            "segment must not start with '.': {segment}"
        )));
    }
    if segment.chars().any(|c| c.is_control()) {
        return Err(StorageError::InvalidKey(
            "control characters are not allowed".into(),
        ));
    }
    Ok(segment)
}

/// Generate a fresh public identifier for an upload.
///
/// The extension comes from the original filename, then the declared MIME
/// type, and falls back to `bin`.
pub fn new_public_id(file_name: &str, content_type: Option<&str>) -> String {
    let ext = extension_from_filename(file_name)
        .or_else(|| content_type.and_then(extension_from_mime))
        .unwrap_or_else(|| "bin".to_string());
    format!("{}.{ext}", Uuid::now_v7().simple())
}

fn extension_from_filename(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next()?;
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    sanitize_extension(ext)
}

fn extension_from_mime(content_type: &str) -> Option<String> {
    let exts = mime_guess::get_mime_extensions_str(content_type)?;
    sanitize_extension(exts.first()?)
}

fn sanitize_extension(ext: &str) -> Option<String> {
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Split the last path segment of a stored URL into `(name, extension)`.
///
/// Query strings and fragments are ignored.
pub fn extract_filename_from_url(url: &str) -> Result<(String, String), StorageError> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);

    match last.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() && !ext.is_empty() => {
            Ok((name.to_string(), ext.to_string()))
        }
        _ => Err(StorageError::InvalidUrl(url.to_string())),
    }
}

/// Recover the public identifier (`name.extension`) addressed by a stored URL.
pub fn public_id_from_url(url: &str) -> Result<String, StorageError> {
    let (name, ext) = extract_filename_from_url(url)?;
    Ok(format!("{name}.{ext}"))
}

/// Join a base URL and key segments with exactly one `/` between each.
pub fn join_url(base: &str, folder: &str, public_id: &str) -> String {
    format!("{}/{folder}/{public_id}", base.trim_end_matches('/'))
}
