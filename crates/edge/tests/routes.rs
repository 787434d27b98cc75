use std::fs;
use std::path::Path;
use std::sync::Arc;

use adapt::cache::InMemoryCache;
use adapt::media::MediaLibrary;
use adapt::store::FsContentStore;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use domain::setting::Settings;
use edge::router::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // oneshot

// === Site on disk ===
fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn build_site(frontend_url: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("content");
    write(
        &content,
        "site.json",
        &json!({ "title": "Trellis", "frontendUrl": frontend_url }).to_string(),
    );
    write(&content, "1_home/home.json", r#"{"title": "Home"}"#);
    write(&content, "1_home/logo.svg", r#"<svg width="10" height="10"></svg>"#);
    write(&content, "2_blog/section.json", r#"{"title": "Blog"}"#);
    write(&content, "2_blog/1_first/item.json", r#"{"title": "First"}"#);
    write(&content, "2_blog/1_first/item.de.json", r#"{"title": "Erster", "slug": "erster"}"#);
    write(&content, "2_blog/2_cover/item.json", r#"{"title": "Cover", "coverOnly": "true"}"#);
    write(&content, "z-error/error.json", r#"{"title": "Not found"}"#);
    dir
}

fn settings() -> Settings {
    serde_json::from_value(json!({
        "server": { "ip": "127.0.0.1", "port": 0, "base_url": "https://cms.test" },
        "languages": [
            { "code": "en", "name": "English", "default": true },
            { "code": "de", "name": "Deutsch" }
        ],
        "fallback_frontend_url": "https://fallback.test"
    }))
    .unwrap()
}

fn build_test_app(site: &Path) -> Router {
    let settings = settings();
    let store = FsContentStore::from_settings(site, &settings).unwrap();
    let media = MediaLibrary::new("https://cms.test", site.join("media"), 8);
    build_router(AppState {
        store: Arc::new(store),
        media: Arc::new(media),
        cache: Arc::new(InMemoryCache::new()),
        settings: Arc::new(settings),
    })
}

// === Small IO helpers ===
async fn read(resp: Response) -> (StatusCode, Vec<u8>) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, bytes.to_vec())
}

async fn get(app: &Router, path: &str) -> Response {
    let req = Request::get(path).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let (status, body) = read(get(app, path).await).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn location(resp: &Response) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

// === Tests ===

#[tokio::test]
async fn root_redirects_to_the_panel() {
    let site = build_site("https://www.trellis.test");
    let app = build_test_app(site.path());

    let resp = get(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/panel");
}

#[tokio::test]
async fn index_lists_pages_without_cover_only_items() {
    let site = build_site("https://www.trellis.test");
    let app = build_test_app(site.path());

    let (status, index) = get_json(&app, "/index.json").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = index
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"blog/first"));
    assert!(!ids.contains(&"blog/cover"));

    let (_, de) = get_json(&app, "/de/index.json").await;
    let first = de
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "blog/first")
        .unwrap();
    assert_eq!(first["uri"], "blog/erster");
}

#[tokio::test]
async fn global_settings() {
    let site = build_site("https://www.trellis.test");
    let app = build_test_app(site.path());

    let (status, global) = get_json(&app, "/global.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(global["siteTitle"], "Trellis");
    assert_eq!(global["frontendUrl"], "https://www.trellis.test");
    assert_eq!(global["defaultLang"]["code"], "en");
}

#[tokio::test]
async fn pages_by_uri_and_language() {
    let site = build_site("https://www.trellis.test");
    let app = build_test_app(site.path());

    let (status, page) = get_json(&app, "/blog/first.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "First");
    assert_eq!(page["uid"], "first");
    assert_eq!(page["intendedTemplate"], "item");

    let (status, page) = get_json(&app, "/de/blog/erster.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Erster");

    let (status, home) = get_json(&app, "/home.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(home["title"], "Home");
}

#[tokio::test]
async fn unknown_pages_render_the_error_page() {
    let site = build_site("https://www.trellis.test");
    let app = build_test_app(site.path());

    let (status, page) = get_json(&app, "/does/not/exist.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(page["title"], "Not found");
}

#[tokio::test]
async fn other_paths_redirect_to_the_frontend() {
    let site = build_site("https://www.trellis.test/");
    let app = build_test_app(site.path());

    let resp = get(&app, "/blog/first").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "https://www.trellis.test/blog/first");
}

#[tokio::test]
async fn invalid_frontend_falls_back() {
    let site = build_site("");
    let app = build_test_app(site.path());

    let resp = get(&app, "/blog/first").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "https://fallback.test");
}

#[tokio::test]
async fn media_files_are_served() {
    let site = build_site("https://www.trellis.test");
    let app = build_test_app(site.path());

    let resp = get(&app, "/media/home/logo.svg").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let (_, body) = read(resp).await;
    assert!(String::from_utf8(body).unwrap().starts_with("<svg"));

    let resp = get(&app, "/media/home/missing.svg").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = get(&app, "/media/../settings.toml").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sitemap_points_at_the_frontend() {
    let site = build_site("https://www.trellis.test");
    let app = build_test_app(site.path());

    let resp = get(&app, "/sitemap.xml").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let (_, body) = read(resp).await;
    let xml = String::from_utf8(body).unwrap();
    assert!(xml.contains("https://www.trellis.test/blog/first"));
    assert!(!xml.contains("blog/cover"));
    assert!(!xml.contains("z-error"));
}
