use serde_json::json;

use crate::common::{TestApp, edit_form, file, routes};

const CACHE_HEADER: &str = "x-view-cache";

async fn make_available(app: &TestApp, id: &str) {
    let res = app
        .put_json(&routes::availability(id), &json!({"is_available_for_purchase": true}))
        .await;
    assert_eq!(res.status, 204);
}

#[tokio::test]
async fn views_only_show_available_products() {
    let app = TestApp::spawn().await;
    let shown = app.create_product("Shown").await;
    app.create_product("Hidden").await;
    make_available(&app, shown["id"].as_str().unwrap()).await;

    for path in [routes::STOREFRONT_HOME, routes::STOREFRONT_PRODUCTS] {
        let res = app.get(path).await;
        assert_eq!(res.status, 200);
        let products = res.body["products"].as_array().unwrap();
        assert_eq!(products.len(), 1, "{path}");
        assert_eq!(products[0]["name"], "Shown");
        assert_eq!(products[0]["image_path"], shown["image_path"]);
    }
}

#[tokio::test]
async fn views_are_served_from_cache_until_revalidated() {
    let app = TestApp::spawn().await;

    let first = app.get(routes::STOREFRONT_HOME).await;
    assert_eq!(first.header(CACHE_HEADER), Some("miss"));
    let second = app.get(routes::STOREFRONT_HOME).await;
    assert_eq!(second.header(CACHE_HEADER), Some("hit"));
    assert_eq!(first.body, second.body);

    let product = app.create_product("Rust Handbook").await;
    let id = product["id"].as_str().unwrap();
    make_available(&app, id).await;

    let after = app.get(routes::STOREFRONT_HOME).await;
    assert_eq!(after.header(CACHE_HEADER), Some("miss"));
    assert_eq!(after.body["products"].as_array().unwrap().len(), 1);
}

async fn prime(app: &TestApp) {
    for path in [routes::STOREFRONT_HOME, routes::STOREFRONT_PRODUCTS] {
        app.get(path).await;
        assert_eq!(app.get(path).await.header(CACHE_HEADER), Some("hit"));
    }
}

async fn assert_revalidated(app: &TestApp) {
    for path in [routes::STOREFRONT_HOME, routes::STOREFRONT_PRODUCTS] {
        assert_eq!(app.get(path).await.header(CACHE_HEADER), Some("miss"), "{path}");
    }
}

#[tokio::test]
async fn every_mutation_revalidates_both_views() {
    let app = TestApp::spawn().await;
    let product = app.create_product("Rust Handbook").await;
    let id = product["id"].as_str().unwrap().to_string();

    prime(&app).await;
    make_available(&app, &id).await;
    assert_revalidated(&app).await;

    prime(&app).await;
    let mut form = edit_form("Rust Handbook, 2nd ed.");
    form.push(file("file", "v2.pdf", "application/pdf", b"v2"));
    assert_eq!(app.patch_form(&routes::product(&id), form).await.status, 303);
    assert_revalidated(&app).await;

    prime(&app).await;
    app.create_product("Another").await;
    assert_revalidated(&app).await;

    prime(&app).await;
    assert_eq!(app.delete(&routes::product(&id)).await.status, 204);
    assert_revalidated(&app).await;
}

#[tokio::test]
async fn home_view_lists_newest_first() {
    let app = TestApp::spawn().await;
    for name in ["First", "Second", "Third"] {
        let product = app.create_product(name).await;
        make_available(&app, product["id"].as_str().unwrap()).await;
    }

    let home = app.get(routes::STOREFRONT_HOME).await;
    let names: Vec<_> = home.body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Third", "Second", "First"]);

    let listing = app.get(routes::STOREFRONT_PRODUCTS).await;
    let names: Vec<_> = listing.body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["First", "Second", "Third"]);
}
