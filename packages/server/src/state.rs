use std::sync::Arc;

use common::storage::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::products::ProductService;
use crate::views::ViewCache;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub media: Arc<dyn MediaStore>,
    pub views: Arc<ViewCache>,
    pub config: AppConfig,
}

impl AppState {
    pub fn products(&self) -> ProductService<'_> {
        ProductService::new(&self.db, &*self.media, &self.views)
    }
}
