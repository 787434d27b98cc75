// crates/domain/src/model.rs

use crate::content::Content;
use crate::field::Field;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub default: bool,
}

/// Per-language overrides of a page or the site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    /// Localized slug, when the translation renames the page.
    pub slug: Option<String>,
    pub content: Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Listed,
    Unlisted,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Listed => "listed",
            Status::Unlisted => "unlisted",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Page
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Slash-separated path of default-language slugs, e.g. `blog/first-post`.
    pub id: String,
    pub slug: String,
    /// Sort number; `None` for unlisted pages.
    pub num: Option<u32>,
    /// Intended template name.
    pub template: String,
    pub parent: Option<String>,
    pub content: Content,
    pub translations: BTreeMap<String, Translation>,
    /// Ids of child pages in sort order.
    pub children: Vec<String>,
    /// Ids of the page's files.
    pub files: Vec<String>,
    pub modified: Option<SystemTime>,
}

impl Page {
    pub fn new(id: impl Into<String>, template: impl Into<String>, content: Content) -> Self {
        let id = id.into();
        let slug = id.rsplit('/').next().unwrap_or_default().to_owned();
        let parent = id.rsplit_once('/').map(|(p, _)| p.to_owned());
        Self {
            id,
            slug,
            num: None,
            template: template.into(),
            parent,
            content,
            translations: BTreeMap::new(),
            children: Vec::new(),
            files: Vec::new(),
            modified: None,
        }
    }

    pub fn status(&self) -> Status {
        if self.num.is_some() {
            Status::Listed
        } else {
            Status::Unlisted
        }
    }

    pub fn is_listed(&self) -> bool {
        self.num.is_some()
    }

    /// Slug in `lang`, falling back to the default slug.
    pub fn slug_for(&self, lang: Option<&str>) -> &str {
        lang.and_then(|code| self.translations.get(code))
            .and_then(|t| t.slug.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.slug)
    }

    /// Field map in `lang`; untranslated fields come from the default content.
    pub fn content_for(&self, lang: Option<&str>) -> Content {
        match lang.and_then(|code| self.translations.get(code)) {
            Some(t) => self.content.merged(&t.content),
            None => self.content.clone(),
        }
    }

    pub fn title_for(&self, lang: Option<&str>) -> String {
        self.content_for(lang).field("title").or(&self.slug)
    }

    pub fn uuid(&self) -> Option<&str> {
        Field::new(self.content.get("uuid")).str()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// `<page-id>/<filename>`, or just `<filename>` for site files.
    pub id: String,
    pub filename: String,
    /// Owning page id; `None` for site files.
    pub parent: Option<String>,
    /// Absolute path of the asset on disk.
    pub root: PathBuf,
    pub content: Content,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub modified: Option<SystemTime>,
}

impl File {
    pub fn new(parent: Option<&str>, filename: impl Into<String>, root: PathBuf) -> Self {
        let filename = filename.into();
        let id = match parent {
            Some(p) => format!("{p}/{filename}"),
            None => filename.clone(),
        };
        Self {
            id,
            filename,
            parent: parent.map(str::to_owned),
            root,
            content: Content::default(),
            width: None,
            height: None,
            modified: None,
        }
    }

    /// Filename without its extension.
    pub fn name(&self) -> &str {
        match self.filename.rsplit_once('.') {
            Some((name, _)) if !name.is_empty() => name,
            _ => &self.filename,
        }
    }

    /// Lower-cased extension, empty when there is none.
    pub fn extension(&self) -> String {
        match self.filename.rsplit_once('.') {
            Some((name, ext)) if !name.is_empty() => ext.to_ascii_lowercase(),
            _ => String::new(),
        }
    }

    pub fn is_svg(&self) -> bool {
        self.extension() == "svg"
    }

    pub fn is_raster_image(&self) -> bool {
        matches!(
            self.extension().as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "webp"
        )
    }

    pub fn field(&self, key: &str) -> Field<'_> {
        self.content.field(key)
    }

    pub fn uuid(&self) -> Option<&str> {
        self.field("uuid").str()
    }

    /// `landscape`, `portrait` or `square`; `None` without dimensions.
    pub fn orientation(&self) -> Option<&'static str> {
        let (w, h) = (self.width?, self.height?);
        Some(match w.cmp(&h) {
            std::cmp::Ordering::Greater => "landscape",
            std::cmp::Ordering::Less => "portrait",
            std::cmp::Ordering::Equal => "square",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Site
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub content: Content,
    pub translations: BTreeMap<String, Translation>,
    /// Ids of top-level pages in sort order.
    pub children: Vec<String>,
    pub files: Vec<String>,
}

impl Site {
    pub fn content_for(&self, lang: Option<&str>) -> Content {
        match lang.and_then(|code| self.translations.get(code)) {
            Some(t) => self.content.merged(&t.content),
            None => self.content.clone(),
        }
    }
}
