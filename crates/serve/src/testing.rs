// crates/serve/src/testing.rs

//! Shared fixtures for the serializer tests.

use crate::cache::ApiCache;
use crate::media::MediaStore;
use crate::tree::SiteTree;
use crate::{Error, Result};
use domain::content::Content;
use domain::field::Focus;
use domain::model::{File, Language, Page, Site, Translation};
use serde_json::{json, Value as Json};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

pub struct StubMedia;

impl MediaStore for StubMedia {
    fn url(&self, file: &File) -> String {
        format!("https://cms.test/media/{}", file.id)
    }

    fn crop_url(&self, file: &File, width: u32, height: u32, focus: Focus) -> String {
        format!("crop:{}:{}x{}@{},{}", file.id, width, height, focus.x, focus.y)
    }

    fn placeholder(&self, file: &File) -> Option<String> {
        file.is_raster_image()
            .then(|| "data:image/png;base64,AAAA".to_owned())
    }

    fn read(&self, file: &File) -> Result<Vec<u8>> {
        if file.filename.starts_with("broken") {
            return Err(Error::Asset {
                path: file.id.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "missing"),
            });
        }
        Ok(format!("<svg id=\"{}\"/>", file.filename).into_bytes())
    }
}

/// Map-backed cache that records every `set` as `(key, ttl_minutes)`.
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<String, Json>>,
    sets: Mutex<Vec<(String, u64)>>,
}

impl RecordingCache {
    pub fn sets(&self) -> Vec<(String, u64)> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiCache for RecordingCache {
    async fn get(&self, key: &str) -> Option<Json> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: Json, ttl_minutes: u64) {
        self.sets.lock().unwrap().push((key.to_owned(), ttl_minutes));
        self.entries.lock().unwrap().insert(key.to_owned(), value);
    }

    async fn flush(&self) {
        self.entries.lock().unwrap().clear();
    }
}

pub fn lang(code: &str, default: bool) -> Language {
    Language {
        code: code.to_owned(),
        name: code.to_uppercase(),
        locale: format!("{code}_{}", code.to_uppercase()),
        default,
    }
}

pub fn page(id: &str, num: Option<u32>) -> Page {
    let mut p = Page::new(id, "default", Content::from_json(json!({ "title": id })));
    p.num = num;
    p
}

pub fn tree(pages: Vec<Page>) -> SiteTree {
    SiteTree::new(Site::default(), pages, Vec::new())
}

fn content(v: Json) -> Content {
    Content::from_json(v)
}

fn file(parent: Option<&str>, name: &str, fields: Json, dims: Option<(u32, u32)>) -> File {
    let mut f = File::new(parent, name, PathBuf::from("/content").join(name));
    f.content = content(fields);
    if let Some((w, h)) = dims {
        f.width = Some(w);
        f.height = Some(h);
    }
    f
}

/// A small bilingual site: `en` (default) and `de`.
pub fn fixture() -> SiteTree {
    let site = Site {
        content: content(json!({
            "title": "Trellis",
            "frontendUrl": "https://www.trellis.test",
            "layoutFooter": [{
                "id": "footer",
                "attrs": { "attributes": [{ "attribute": "data-footer", "value": "true" }] },
                "columns": [{ "id": "fc", "width": "1/1", "blocks": [
                    { "id": "ft", "type": "text", "content": { "text": "© footer" } }
                ]}]
            }]
        })),
        ..Site::default()
    };

    let mut home = Page::new("home", "home", content(json!({ "title": "Home", "uuid": "page-home" })));
    home.num = Some(1);

    let mut about = Page::new(
        "about",
        "default",
        content(json!({ "title": "About", "uuid": "page-about", "description": "About us" })),
    );
    about.num = Some(2);
    about.translations.insert(
        "de".into(),
        Translation {
            slug: Some("ueber-uns".into()),
            content: content(json!({ "title": "Über uns" })),
        },
    );

    let mut blog = Page::new("blog", "section", content(json!({ "title": "Blog" })));
    blog.num = Some(3);

    let mut first = Page::new(
        "blog/first",
        "item",
        content(json!({
            "title": "First",
            "description": "<b>Hi</b> & bye",
            "thumbnail": ["file://file-hero"]
        })),
    );
    first.num = Some(1);

    let mut cover = Page::new(
        "blog/cover",
        "item",
        content(json!({ "title": "Cover", "coverOnly": "true" })),
    );
    cover.num = Some(2);

    let error = Page::new("z-error", "error", content(json!({ "title": "Not found" })));

    let files = vec![
        file(
            Some("about"),
            "hero.jpg",
            json!({
                "uuid": "file-hero",
                "alt": "A hero",
                "identifier": "hero-id",
                "focus": { "x": 0.25, "y": 0.75 },
                "captiontoggle": "true",
                "captionobject": {
                    "captiontitle": "Caption",
                    "textColor": "#000",
                    "captionControls": { "options": "overlay" }
                },
                "copyrighttoggle": true,
                "copyrightobject": {
                    "copyrighttitle": "© Trellis",
                    "copyrightBackground": "#fff",
                    "copyrightposition": "bottom-right"
                },
                "toggle": "true"
            }),
            Some((1600, 1200)),
        ),
        file(Some("about"), "team.png", json!({}), None),
        file(Some("about"), "icon.svg", json!({ "uuid": "file-icon", "alt": "Icon" }), Some((24, 24))),
        file(Some("about"), "broken.svg", json!({}), None),
        file(None, "logo.svg", json!({ "uuid": "file-logo" }), Some((120, 40))),
    ];

    SiteTree::new(site, vec![home, about, blog, first, cover, error], files)
        .with_languages(vec![lang("en", true), lang("de", false)], false)
        .with_base_url("https://cms.test")
}
