// crates/edge/src/router.rs

//! HTTP surface of the content API.
//!
//! Every path goes through one dispatcher, because a leading language
//! segment is optional and has to be peeled off before the resource is
//! known:
//!
//! ```text
//! /                      302 → panel
//! /[lang/]index.json     page index
//! /[lang/]global.json    site-wide settings
//! /[lang/]<uri>.json     page payload, error page with 404 when unknown
//! /sitemap.xml           sitemap
//! /media/<path>          original files and focus crops
//! /<anything else>       302 → frontend
//! ```

use crate::error::{Error, Result};
use adapt::cache::InMemoryCache;
use adapt::media::{MediaLibrary, MEDIA_SEGMENT};
use adapt::store::FsContentStore;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use domain::model::Language;
use domain::setting::Settings;
use http::{header, StatusCode};
use serve::cache::ApiCache;
use serve::ctx::RenderCtx;
use serve::global::cached_global;
use serve::index::cached_index;
use serve::page::page_payload;
use serve::sitemap::sitemap;
use serve::tree::ContentTree;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const INDEX_JSON: &str = "index.json";
const GLOBAL_JSON: &str = "global.json";
const SITEMAP_XML: &str = "sitemap.xml";
const JSON_SUFFIX: &str = ".json";

/// Shared handles behind every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FsContentStore>,
    pub media: Arc<MediaLibrary>,
    pub cache: Arc<InMemoryCache>,
    pub settings: Arc<Settings>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(panel_redirect))
        .route("/{*path}", get(dispatch))
        .with_state(state)
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

async fn panel_redirect(State(state): State<AppState>) -> Response {
    found(&state.settings.panel_path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Resource part of a request path after its language segment.
struct Target<'t, 'p> {
    lang: Option<&'t Language>,
    /// Whether the path carried an explicit language segment.
    prefixed: bool,
    rest: &'p str,
}

fn split_language<'t, 'p>(tree: &'t dyn ContentTree, path: &'p str) -> Target<'t, 'p> {
    let path = path.trim_matches('/');
    if let Some((code, rest)) = path.split_once('/') {
        if let Some(lang) = tree.language(code) {
            return Target {
                lang: Some(lang),
                prefixed: true,
                rest,
            };
        }
    }
    Target {
        lang: tree.default_language(),
        prefixed: false,
        rest: path,
    }
}

#[tracing::instrument(skip_all, fields(path = %path))]
async fn dispatch(State(state): State<AppState>, Path(path): Path<String>) -> Result<Response> {
    let tree = state.store.snapshot();
    let target = split_language(&*tree, &path);
    let cache: &dyn ApiCache = &*state.cache;
    let ctx = RenderCtx::new(&*tree, &*state.media, target.lang);

    match target.rest {
        INDEX_JSON => {
            let listing = cached_index(cache, &*tree, target.lang).await?;
            Ok(Json(listing).into_response())
        }
        GLOBAL_JSON => {
            let settings = cached_global(cache, &ctx).await?;
            Ok(Json(settings).into_response())
        }
        SITEMAP_XML if !target.prefixed => {
            let body = sitemap(&*tree, &state.settings.error_page);
            Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], body).into_response())
        }
        rest if !target.prefixed && is_media(rest) => serve_media(&state, rest).await,
        rest => match rest.strip_suffix(JSON_SUFFIX) {
            Some(uri) => page_response(&state, &ctx, uri),
            None => frontend_redirect(&state, &*tree, &path),
        },
    }
}

fn is_media(rest: &str) -> bool {
    rest.strip_prefix(MEDIA_SEGMENT)
        .is_some_and(|r| r.starts_with('/'))
}

fn page_response(state: &AppState, ctx: &RenderCtx<'_>, uri: &str) -> Result<Response> {
    let code = ctx.lang.map(|l| l.code.as_str());
    if let Some(page) = ctx.tree.find_by_uri(uri, code) {
        let payload = page_payload(ctx, page)?;
        return Ok(Json(payload).into_response());
    }

    debug!("no page at {:?}", uri);
    match ctx.tree.page(&state.settings.error_page) {
        Some(error_page) => {
            let payload = page_payload(ctx, error_page)?;
            Ok((StatusCode::NOT_FOUND, Json(payload)).into_response())
        }
        None => Err(Error::NotFound(uri.to_owned())),
    }
}

async fn serve_media(state: &AppState, rest: &str) -> Result<Response> {
    let rel = rest[MEDIA_SEGMENT.len()..].to_owned();
    let store = Arc::clone(&state.store);
    let media = Arc::clone(&state.media);
    // Crops are rendered on first request; keep the decode off the reactor.
    let asset = tokio::task::spawn_blocking(move || {
        let tree = store.snapshot();
        media.serve(&*tree, &rel)
    })
    .await??;

    match asset {
        Some(asset) => Ok(([(header::CONTENT_TYPE, asset.mime)], asset.bytes).into_response()),
        None => Err(Error::NotFound(rest.to_owned())),
    }
}

/// Send a non-API path on to the public site, or to the configured fallback
/// when the site's frontend URL does not form a valid URL.
fn frontend_redirect(state: &AppState, tree: &dyn ContentTree, path: &str) -> Result<Response> {
    let frontend = tree.site().content.field("frontendUrl").string();
    let target = format!("{}/{}", frontend.trim_end_matches('/'), path.trim_start_matches('/'));
    if Url::parse(&target).is_ok() {
        return Ok(found(&target));
    }

    let fallback = &state.settings.fallback_frontend_url;
    if fallback.is_empty() {
        return Err(Error::NotFound(path.to_owned()));
    }
    warn!("invalid frontend URL {:?}, using fallback", target);
    Ok(found(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::content::Content;
    use domain::model::{Page, Site};
    use serve::tree::SiteTree;

    fn lang(code: &str, default: bool) -> Language {
        Language {
            code: code.into(),
            name: code.to_uppercase(),
            locale: String::new(),
            default,
        }
    }

    fn bilingual() -> SiteTree {
        let home = Page::new("home", "home", Content::default());
        SiteTree::new(Site::default(), vec![home], Vec::new())
            .with_languages(vec![lang("en", true), lang("de", false)], false)
    }

    #[test]
    fn language_segments_are_peeled() {
        let tree = bilingual();

        let t = split_language(&tree, "de/about.json");
        assert_eq!(t.lang.map(|l| l.code.as_str()), Some("de"));
        assert!(t.prefixed);
        assert_eq!(t.rest, "about.json");

        let t = split_language(&tree, "about/team.json");
        assert_eq!(t.lang.map(|l| l.code.as_str()), Some("en"));
        assert!(!t.prefixed);
        assert_eq!(t.rest, "about/team.json");

        // A bare language segment is not a resource.
        let t = split_language(&tree, "de");
        assert!(!t.prefixed);
        assert_eq!(t.rest, "de");
    }

    #[test]
    fn single_language_has_no_language() {
        let tree = SiteTree::new(Site::default(), Vec::new(), Vec::new());
        let t = split_language(&tree, "/index.json");
        assert!(t.lang.is_none());
        assert_eq!(t.rest, "index.json");
    }

    #[test]
    fn media_paths() {
        assert!(is_media("media/about/hero.jpg"));
        assert!(!is_media("media"));
        assert!(!is_media("mediaplayer.json"));
    }
}
