mod service;
mod sweeper;

pub use service::{
    AssetJanitor, REASON_PRODUCT_DELETED, REASON_REPLACED, REASON_UNATTACHED, SweepReport,
};
pub use sweeper::run_asset_sweeper;
