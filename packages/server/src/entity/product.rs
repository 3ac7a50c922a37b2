use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub price_in_cents: i32,

    /// URL of the downloadable asset in the `products` folder.
    pub file_path: String,

    /// URL of the display image in the `product-images` folder.
    pub image_path: String,

    /// Reset to false by every content mutation; only the availability
    /// toggle sets it.
    #[sea_orm(default_value = false, indexed)]
    pub is_available_for_purchase: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
