pub mod assets;
pub mod media;
pub mod product;
pub mod storefront;
