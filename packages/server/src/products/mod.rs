mod files;
mod service;

pub use files::{ProductFilesUpload, ReplacedFiles, product_files_upload, update_product_files};
pub use service::{ProductService, UpdateOutcome};
