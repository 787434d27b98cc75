// crates/serve/src/tree.rs

//! Read-only view of the content tree.
//!
//! The serializers only ever see a [`ContentTree`]; where the pages come from
//! (disk, memory, a test fixture) is the adapter's business. [`SiteTree`] is
//! the in-memory implementation every adapter builds.

use domain::model::{File, Language, Page, Site};
use std::collections::HashMap;
use tracing::warn;

/// Id of the page served at the site root.
pub const HOME_ID: &str = "home";

pub trait ContentTree: Send + Sync {
    fn site(&self) -> &Site;
    fn languages(&self) -> &[Language];
    fn prefix_default_locale(&self) -> bool;
    /// Public base URL of the API, without a trailing slash.
    fn base_url(&self) -> &str;

    fn page(&self, id: &str) -> Option<&Page>;
    fn file(&self, id: &str) -> Option<&File>;
    fn page_by_uuid(&self, uuid: &str) -> Option<&Page>;
    fn file_by_uuid(&self, uuid: &str) -> Option<&File>;

    fn home_id(&self) -> &str {
        HOME_ID
    }

    fn default_language(&self) -> Option<&Language> {
        let langs = self.languages();
        langs.iter().find(|l| l.default).or_else(|| langs.first())
    }

    fn language(&self, code: &str) -> Option<&Language> {
        self.languages().iter().find(|l| l.code == code)
    }

    fn is_default_language(&self, lang: &Language) -> bool {
        self.default_language()
            .is_some_and(|d| d.code == lang.code)
    }

    /// Children of `parent` (or the top-level pages) in sort order.
    fn children(&self, parent: Option<&Page>) -> Vec<&Page> {
        let ids = match parent {
            Some(p) => &p.children,
            None => &self.site().children,
        };
        ids.iter().filter_map(|id| self.page(id)).collect()
    }

    fn parent(&self, page: &Page) -> Option<&Page> {
        page.parent.as_deref().and_then(|id| self.page(id))
    }

    /// Every page, depth-first, siblings in sort order.
    fn index(&self) -> Vec<&Page> {
        let mut out = Vec::new();
        let mut stack: Vec<&Page> = self.children(None).into_iter().rev().collect();
        while let Some(page) = stack.pop() {
            out.push(page);
            stack.extend(self.children(Some(page)).into_iter().rev());
        }
        out
    }

    /// Slash-joined slugs from the root down to `page`, translated into `lang`.
    fn uri(&self, page: &Page, lang: Option<&str>) -> String {
        let mut parts = vec![page.slug_for(lang)];
        let mut current = self.parent(page);
        while let Some(p) = current {
            parts.push(p.slug_for(lang));
            current = self.parent(p);
        }
        parts.reverse();
        parts.join("/")
    }

    /// Resolve a request path. Translated and default slugs both match; an
    /// empty path is the home page.
    fn find_by_uri(&self, uri: &str, lang: Option<&str>) -> Option<&Page> {
        let uri = uri.trim_matches('/');
        if uri.is_empty() {
            return self.page(self.home_id());
        }
        let mut current: Option<&Page> = None;
        for segment in uri.split('/') {
            let found = self
                .children(current)
                .into_iter()
                .find(|p| p.slug_for(lang) == segment || p.slug == segment)?;
            current = Some(found);
        }
        current
    }

    /// Root URL of a language. The default language drops its prefix unless
    /// `prefix_default_locale` is set.
    fn language_url(&self, lang: Option<&Language>) -> String {
        let base = self.base_url().trim_end_matches('/');
        match lang {
            Some(l) if self.prefix_default_locale() || !self.is_default_language(l) => {
                format!("{base}/{}", l.code)
            }
            _ => base.to_owned(),
        }
    }

    fn page_url(&self, page: &Page, lang: Option<&Language>) -> String {
        let root = self.language_url(lang);
        if page.id == self.home_id() {
            return root;
        }
        let uri = self.uri(page, lang.map(|l| l.code.as_str()));
        format!("{root}/{uri}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SiteTree
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable snapshot of a whole site.
#[derive(Debug, Clone, Default)]
pub struct SiteTree {
    site: Site,
    pages: HashMap<String, Page>,
    files: HashMap<String, File>,
    page_uuids: HashMap<String, String>,
    file_uuids: HashMap<String, String>,
    languages: Vec<Language>,
    prefix_default_locale: bool,
    base_url: String,
}

impl SiteTree {
    /// Link flat page and file lists into a tree.
    ///
    /// Child and file lists on `site` and every page are rebuilt from the
    /// `parent` ids: listed pages by sort number, then unlisted pages by slug.
    pub fn new(mut site: Site, pages: Vec<Page>, files: Vec<File>) -> Self {
        let mut pages: HashMap<String, Page> =
            pages.into_iter().map(|p| (p.id.clone(), p)).collect();

        let mut order: Vec<(Option<String>, (bool, u32, String), String)> = pages
            .values()
            .map(|p| (p.parent.clone(), sort_key(p), p.id.clone()))
            .collect();
        order.sort_by(|a, b| a.1.cmp(&b.1));

        site.children.clear();
        for page in pages.values_mut() {
            page.children.clear();
            page.files.clear();
        }
        for (parent, _, id) in order {
            match parent {
                None => site.children.push(id),
                Some(parent_id) => match pages.get_mut(&parent_id) {
                    Some(parent) => parent.children.push(id),
                    None => warn!("page {} has no parent {}, dropping it from the tree", id, parent_id),
                },
            }
        }

        let mut file_ids: Vec<(Option<String>, String)> = files
            .iter()
            .map(|f| (f.parent.clone(), f.id.clone()))
            .collect();
        file_ids.sort();
        site.files.clear();
        for (parent, id) in file_ids {
            let Some(parent_id) = parent else {
                site.files.push(id);
                continue;
            };
            match pages.get_mut(&parent_id) {
                Some(page) => page.files.push(id),
                None => warn!("file {} has no page {}", id, parent_id),
            }
        }

        let page_uuids = pages
            .values()
            .filter_map(|p| p.uuid().map(|u| (u.to_owned(), p.id.clone())))
            .collect();
        let file_uuids = files
            .iter()
            .filter_map(|f| f.uuid().map(|u| (u.to_owned(), f.id.clone())))
            .collect();
        let files = files.into_iter().map(|f| (f.id.clone(), f)).collect();

        Self {
            site,
            pages,
            files,
            page_uuids,
            file_uuids,
            languages: Vec::new(),
            prefix_default_locale: false,
            base_url: String::new(),
        }
    }

    pub fn with_languages(mut self, languages: Vec<Language>, prefix_default_locale: bool) -> Self {
        self.languages = languages;
        self.prefix_default_locale = prefix_default_locale;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

fn sort_key(page: &Page) -> (bool, u32, String) {
    (page.num.is_none(), page.num.unwrap_or(0), page.slug.clone())
}

impl ContentTree for SiteTree {
    fn site(&self) -> &Site {
        &self.site
    }

    fn languages(&self) -> &[Language] {
        &self.languages
    }

    fn prefix_default_locale(&self) -> bool {
        self.prefix_default_locale
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn page(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    fn file(&self, id: &str) -> Option<&File> {
        self.files.get(id)
    }

    fn page_by_uuid(&self, uuid: &str) -> Option<&Page> {
        self.page_uuids.get(uuid).and_then(|id| self.pages.get(id))
    }

    fn file_by_uuid(&self, uuid: &str) -> Option<&File> {
        self.file_uuids.get(uuid).and_then(|id| self.files.get(id))
    }
}
