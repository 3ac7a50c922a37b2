use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A remote asset that must be removed from the media store.
///
/// Rows are written in the same transaction that drops the last database
/// reference to the asset and deleted once the remote delete succeeds, so a
/// crash in between leaves a row for the sweeper instead of an orphan.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset_deletion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Logical folder (`products` or `product-images`).
    pub folder: String,

    pub public_id: String,

    /// Why the asset became unreferenced (e.g. "product_deleted").
    pub reason: String,

    #[sea_orm(indexed)]
    pub attempts: i32,

    #[sea_orm(column_type = "Text")]
    pub last_error: Option<String>,

    pub created_at: DateTimeUtc,
    pub last_attempt_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
