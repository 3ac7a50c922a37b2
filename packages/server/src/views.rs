use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

/// Logical path of the storefront home view.
pub const HOME_VIEW: &str = "/";
/// Logical path of the storefront product listing view.
pub const PRODUCTS_VIEW: &str = "/products";

#[derive(Default)]
struct CachedView {
    /// Bumped on every revalidation; a render may only be stored under the
    /// generation it started from.
    generation: u64,
    body: Option<Arc<Vec<u8>>>,
}

/// Cache of rendered views keyed by logical path.
#[derive(Default)]
pub struct ViewCache {
    entries: DashMap<String, CachedView>,
}

/// Outcome of a cache lookup.
pub enum Lookup {
    Hit(Arc<Vec<u8>>),
    /// Not cached; render and hand the body back with this generation.
    Miss { generation: u64 },
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, path: &str) -> Lookup {
        let entry = self.entries.entry(path.to_string()).or_default();
        match &entry.body {
            Some(body) => Lookup::Hit(Arc::clone(body)),
            None => Lookup::Miss {
                generation: entry.generation,
            },
        }
    }

    /// Store a rendered body.
    ///
    /// Dropped if the path was revalidated after the render started, so a
    /// slow render can never resurrect stale data.
    pub fn store(&self, path: &str, generation: u64, body: Vec<u8>) -> Arc<Vec<u8>> {
        let body = Arc::new(body);
        let mut entry = self.entries.entry(path.to_string()).or_default();
        if entry.generation == generation {
            entry.body = Some(Arc::clone(&body));
        }
        body
    }

    /// Mark the cached rendering of `path` stale.
    pub fn revalidate_path(&self, path: &str) {
        let mut entry = self.entries.entry(path.to_string()).or_default();
        entry.generation += 1;
        entry.body = None;
        debug!(path, generation = entry.generation, "Revalidated view");
    }

    /// Revalidate every storefront view that lists products.
    pub fn revalidate_storefront(&self) {
        self.revalidate_path(HOME_VIEW);
        self.revalidate_path(PRODUCTS_VIEW);
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.entries
            .get(path)
            .is_some_and(|entry| entry.body.is_some())
    }
}
