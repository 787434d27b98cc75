// crates/adapt/src/store/scan.rs

//! Turn a content directory into flat page and file lists.
//!
//! ```text
//! content/site.json                 site fields
//! content/site.de.json              translated site fields
//! content/logo.svg                  site file (+ logo.svg.json sidecar)
//! content/1_about/default.json      listed page "about", template "default"
//! content/1_about/default.de.json   translation, may carry "slug"
//! content/1_about/hero.jpg          page file (+ hero.jpg.json sidecar)
//! content/notes/default.json        unlisted page "notes"
//! ```
//!
//! `_drafts` and dot-entries are skipped. Malformed JSON is logged and
//! treated as an empty field map so one bad file never hides the site.

use super::dimensions::dimensions;
use crate::{Error, Result};
use domain::content::Content;
use domain::model::{File, Language, Page, Site, Translation};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

const SITE_STEM: &str = "site";
const DRAFTS_DIR: &str = "_drafts";

/// Everything read from one content directory.
#[derive(Debug, Default)]
pub struct Scanned {
    pub site: Site,
    pub pages: Vec<Page>,
    pub files: Vec<File>,
}

/// Split `3_about` into `(Some(3), "about")`; plain names are unlisted.
pub fn parse_dir_name(name: &str) -> (Option<u32>, &str) {
    match name.split_once('_') {
        Some((num, slug)) if !slug.is_empty() => match num.parse::<u32>() {
            Ok(n) => (Some(n), slug),
            Err(_) => (None, name),
        },
        _ => (None, name),
    }
}

/// Split a content file stem into `(template, language)`.
fn split_stem<'a>(stem: &'a str, languages: &[Language]) -> (&'a str, Option<&'a str>) {
    match stem.rsplit_once('.') {
        Some((template, code)) if languages.iter().any(|l| l.code == code) => {
            (template, Some(code))
        }
        _ => (stem, None),
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.depth() > 0 && (name.starts_with('.') || (entry.file_type().is_dir() && name == DRAFTS_DIR))
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn read_content(path: &Path) -> Content {
    let parsed = fs::read(path)
        .map_err(Error::from)
        .and_then(|bytes| {
            serde_json::from_slice::<Json>(&bytes).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })
        });
    match parsed {
        Ok(value) => Content::from_json(value),
        Err(e) => {
            warn!("ignoring {}: {}", path.display(), e);
            Content::default()
        }
    }
}

/// Pull the translated slug out of a translation's field map.
fn into_translation(mut content: Content) -> Translation {
    let slug = content
        .field("slug")
        .str()
        .map(str::to_owned);
    if slug.is_some() {
        let mut map = content.into_map();
        map.remove("slug");
        content = Content::new(map);
    }
    Translation { slug, content }
}

/// Walk `root` and collect the site, its pages and their files.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn scan_content(root: &Path, languages: &[Language]) -> Result<Scanned> {
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let mut scanned = Scanned::default();
    // Page directory → page id.
    let mut dirs: HashMap<PathBuf, String> = HashMap::new();
    let mut pages: HashMap<String, Page> = HashMap::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for item in walker {
        let entry = match item {
            Ok(e) => e,
            Err(err) => {
                warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let path = entry.path();
        let parent_dir = path.parent().unwrap_or(root);
        let parent_id = dirs.get(parent_dir).cloned();

        if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy();
            let (num, slug) = parse_dir_name(&name);
            let id = match &parent_id {
                Some(p) => format!("{p}/{slug}"),
                None if parent_dir == root => slug.to_owned(),
                // Parent was not a page (unreadable); so is this.
                None => continue,
            };
            let mut page = Page::new(id.clone(), "default", Content::default());
            page.num = num;
            dirs.insert(path.to_path_buf(), id.clone());
            pages.insert(id, page);
            continue;
        }

        let filename = entry.file_name().to_string_lossy().into_owned();
        if let Some(stem) = filename.strip_suffix(".json") {
            if parent_dir.join(stem).is_file() {
                // Sidecar, read along with its asset.
                continue;
            }
            let (template, lang) = split_stem(stem, languages);
            let content = read_content(path);
            match (&parent_id, lang) {
                (None, None) if template == SITE_STEM => scanned.site.content = content,
                (None, Some(code)) if template == SITE_STEM => {
                    scanned
                        .site
                        .translations
                        .insert(code.to_owned(), into_translation(content));
                }
                (Some(id), None) => {
                    if let Some(page) = pages.get_mut(id) {
                        page.template = template.to_owned();
                        page.content = content;
                        page.modified = modified(path);
                    }
                }
                (Some(id), Some(code)) => {
                    if let Some(page) = pages.get_mut(id) {
                        page.translations.insert(code.to_owned(), into_translation(content));
                    }
                }
                _ => debug!("ignoring stray {}", path.display()),
            }
            continue;
        }

        if parent_id.is_none() && parent_dir != root {
            continue;
        }
        let mut file = File::new(parent_id.as_deref(), filename, path.to_path_buf());
        let sidecar = path.with_file_name(format!("{}.json", file.filename));
        if sidecar.is_file() {
            file.content = read_content(&sidecar);
        }
        if let Some((w, h)) = dimensions(&file) {
            file.width = Some(w);
            file.height = Some(h);
        }
        file.modified = modified(path);
        scanned.files.push(file);
    }

    scanned.pages = pages.into_values().collect();
    debug!(
        "scanned {} pages and {} files",
        scanned.pages.len(),
        scanned.files.len()
    );
    Ok(scanned)
}
