use common::storage::FILES_FOLDER;
use server::assets::AssetJanitor;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn nothing_pending_after_clean_mutations() {
    let app = TestApp::spawn().await;
    let product = app.create_product("Rust Handbook").await;
    app.delete(&routes::product(product["id"].as_str().unwrap()))
        .await;

    let pending = app.get(routes::PENDING_ASSETS).await;
    assert_eq!(pending.status, 200);
    assert_eq!(pending.body["total"], 0);

    let sweep = app.post_empty(routes::SWEEP_ASSETS).await;
    assert_eq!(sweep.status, 200);
    assert_eq!(sweep.body["attempted"], 0);
}

#[tokio::test]
async fn sweep_removes_queued_orphans() {
    let app = TestApp::spawn().await;
    let orphan = app.media_root.join(FILES_FOLDER).join("orphan.pdf");
    std::fs::create_dir_all(orphan.parent().unwrap()).unwrap();
    std::fs::write(&orphan, b"left behind").unwrap();

    AssetJanitor::enqueue(&app.db, FILES_FOLDER, "orphan.pdf", "replaced")
        .await
        .unwrap();

    let pending = app.get(routes::PENDING_ASSETS).await;
    assert_eq!(pending.body["total"], 1);
    assert_eq!(pending.body["data"][0]["public_id"], "orphan.pdf");
    assert_eq!(pending.body["data"][0]["attempts"], 0);

    let sweep = app.post_empty(routes::SWEEP_ASSETS).await;
    assert_eq!(sweep.body["attempted"], 1);
    assert_eq!(sweep.body["removed"], 1);
    assert!(!orphan.exists());
    assert_eq!(app.get(routes::PENDING_ASSETS).await.body["total"], 0);
}

#[tokio::test]
async fn failed_removal_stays_pending_with_error() {
    let app = TestApp::spawn().await;

    AssetJanitor::enqueue(&app.db, FILES_FOLDER, ".hidden", "replaced")
        .await
        .unwrap();

    let sweep = app.post_empty(routes::SWEEP_ASSETS).await;
    assert_eq!(sweep.body["attempted"], 1);
    assert_eq!(sweep.body["failed"], 1);

    let pending = app.get(routes::PENDING_ASSETS).await;
    assert_eq!(pending.body["total"], 1);
    let entry = &pending.body["data"][0];
    assert_eq!(entry["attempts"], 1);
    assert!(entry["last_error"].as_str().is_some());
    assert!(entry["last_attempt_at"].as_str().is_some());
}
