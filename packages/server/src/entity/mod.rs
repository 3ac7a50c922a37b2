pub mod asset_deletion;
pub mod product;
