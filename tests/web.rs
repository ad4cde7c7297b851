//! Browser binding tests. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use routineflow_sw::browser::{BrowserCacheStorage, WorkerRequest, WorkerResponse, global_scope};
use routineflow_sw_core::{Cache, CacheStorage, HttpRequest, HttpResponse, ResponseKind};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_service_worker);

#[wasm_bindgen_test]
fn test_seed_request_is_get() {
    let request = WorkerRequest::get("/index.html").unwrap();
    assert_eq!(request.method(), "GET");
    assert!(request.url().ends_with("/index.html"));
    assert!(HttpRequest::is_cacheable(&request));
}

#[wasm_bindgen_test]
async fn test_offline_notice_is_html() {
    let notice = WorkerResponse::offline_notice().unwrap();
    assert_eq!(notice.status(), 200);
    assert_eq!(notice.kind(), ResponseKind::Default);
    assert!(!HttpResponse::is_cacheable(&notice));

    let raw = notice.as_raw();
    assert_eq!(
        raw.headers().get("Content-Type").unwrap(),
        Some("text/html".to_string())
    );
    let body = JsFuture::from(raw.text().unwrap()).await.unwrap();
    assert!(body.as_string().unwrap().contains("You are offline!"));
}

#[wasm_bindgen_test]
async fn test_duplicate_reads_independently() {
    let notice = WorkerResponse::offline_notice().unwrap();
    let copy = notice.duplicate().unwrap();

    let first = JsFuture::from(notice.as_raw().text().unwrap()).await.unwrap();
    let second = JsFuture::from(copy.as_raw().text().unwrap()).await.unwrap();
    assert_eq!(first.as_string(), second.as_string());
}

#[wasm_bindgen_test]
fn test_global_scope_is_service_worker() {
    assert!(global_scope().is_ok());
}

#[wasm_bindgen_test]
async fn test_cache_storage_round_trip() {
    let name = "routineflow-test-round-trip";
    let storage = BrowserCacheStorage::new(global_scope().unwrap().caches().unwrap());

    let cache = storage.open(name).await.unwrap();
    let stored = WorkerRequest::get("/round-trip.html").unwrap();
    let missing = WorkerRequest::get("/never-stored.html").unwrap();
    cache
        .put(&stored, WorkerResponse::offline_notice().unwrap())
        .await
        .unwrap();

    let hit = cache.lookup(&stored).await.unwrap().unwrap();
    assert_eq!(hit.status(), 200);
    let body = JsFuture::from(hit.as_raw().text().unwrap()).await.unwrap();
    assert!(body.as_string().unwrap().contains("You are offline!"));
    assert!(cache.lookup(&missing).await.unwrap().is_none());

    assert!(storage.keys().await.unwrap().contains(&name.to_string()));
    assert!(storage.delete(name).await.unwrap());
    assert!(!storage.keys().await.unwrap().contains(&name.to_string()));
    assert!(!storage.delete(name).await.unwrap());
}
