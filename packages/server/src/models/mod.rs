pub mod asset;
pub mod product;
