// crates/serve/src/ctx.rs

use crate::media::MediaStore;
use crate::tree::ContentTree;
use domain::content::Content;
use domain::link::{FILE_PREFIXES, PAGE_PREFIXES};
use domain::model::{File, Language, Page};

/// Model whose fields are being serialized. Relative file references
/// resolve against it.
#[derive(Debug, Clone, Copy)]
pub enum Owner<'a> {
    Site,
    Page(&'a Page),
}

/// Everything a serializer needs, passed explicitly down the call tree.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub tree: &'a dyn ContentTree,
    pub media: &'a dyn MediaStore,
    /// Active language; `None` on single-language sites.
    pub lang: Option<&'a Language>,
    pub owner: Owner<'a>,
}

impl<'a> RenderCtx<'a> {
    pub fn new(
        tree: &'a dyn ContentTree,
        media: &'a dyn MediaStore,
        lang: Option<&'a Language>,
    ) -> Self {
        Self {
            tree,
            media,
            lang,
            owner: Owner::Site,
        }
    }

    pub fn for_page(self, page: &'a Page) -> Self {
        Self {
            owner: Owner::Page(page),
            ..self
        }
    }

    pub fn for_site(self) -> Self {
        Self {
            owner: Owner::Site,
            ..self
        }
    }

    /// Context for the fields of `file`: its owning page, or the site.
    pub fn for_file(self, file: &File) -> Self {
        match file.parent.as_deref().and_then(|id| self.tree.page(id)) {
            Some(page) => self.for_page(page),
            None => self.for_site(),
        }
    }

    pub fn lang_code(&self) -> Option<&'a str> {
        self.lang.map(|l| l.code.as_str())
    }

    /// Site fields in the active language.
    pub fn site_content(&self) -> Content {
        self.tree.site().content_for(self.lang_code())
    }

    pub fn page_content(&self, page: &Page) -> Content {
        page.content_for(self.lang_code())
    }

    pub fn page_uri(&self, page: &Page) -> String {
        self.tree.uri(page, self.lang_code())
    }

    pub fn page_url(&self, page: &Page) -> String {
        self.tree.page_url(page, self.lang)
    }

    /// Resolve one file reference: `file://<uuid>`, `/@/file/<uuid>`, a
    /// `<page-id>/<filename>` path, or a filename relative to the owner.
    pub fn resolve_file(&self, reference: &str) -> Option<&'a File> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if let Some(uuid) = FILE_PREFIXES.iter().find_map(|p| reference.strip_prefix(p)) {
            return self.tree.file_by_uuid(uuid);
        }
        if reference.contains('/') {
            return self.tree.file(reference.trim_start_matches('/'));
        }
        match self.owner {
            Owner::Site => self.tree.file(reference),
            Owner::Page(page) => self.tree.file(&format!("{}/{}", page.id, reference)),
        }
    }

    /// Resolve a list of references, dropping the dangling ones.
    pub fn resolve_files<'r>(&self, refs: impl IntoIterator<Item = &'r str>) -> Vec<&'a File> {
        refs.into_iter()
            .filter_map(|r| self.resolve_file(r))
            .collect()
    }

    /// Resolve `page://<uuid>`, `/@/page/<uuid>` or a page id.
    pub fn resolve_page(&self, reference: &str) -> Option<&'a Page> {
        let reference = reference.trim();
        if let Some(uuid) = PAGE_PREFIXES.iter().find_map(|p| reference.strip_prefix(p)) {
            return self.tree.page_by_uuid(uuid);
        }
        let id = reference.trim_matches('/');
        if id.is_empty() {
            return None;
        }
        self.tree.page(id)
    }
}
