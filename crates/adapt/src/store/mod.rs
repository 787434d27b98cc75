// crates/adapt/src/store/mod.rs

pub mod dimensions;
pub mod scan;

use crate::Result;
use domain::model::Language;
use domain::setting::Settings;
use parking_lot::RwLock;
use serve::tree::SiteTree;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use self::scan::scan_content;

/// Content tree loaded from a directory, swapped whole on reload.
///
/// Readers take an `Arc` snapshot and keep serving from it while a reload
/// builds the next one.
pub struct FsContentStore {
    root: PathBuf,
    languages: Vec<Language>,
    prefix_default_locale: bool,
    base_url: String,
    snapshot: RwLock<Arc<SiteTree>>,
}

impl FsContentStore {
    /// Scan `root` and hold the result.
    pub fn open(
        root: impl Into<PathBuf>,
        languages: Vec<Language>,
        prefix_default_locale: bool,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let store = Self {
            root: root.into(),
            languages,
            prefix_default_locale,
            base_url: base_url.into(),
            snapshot: RwLock::new(Arc::new(SiteTree::default())),
        };
        store.reload()?;
        Ok(store)
    }

    /// Open the content directory named by `settings`, relative to `site_dir`.
    pub fn from_settings(site_dir: &Path, settings: &Settings) -> Result<Self> {
        Self::open(
            site_dir.join(&settings.content.dir),
            settings.languages.clone(),
            settings.prefix_default_locale,
            settings.server.base_url.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot(&self) -> Arc<SiteTree> {
        Arc::clone(&self.snapshot.read())
    }

    /// Rescan the directory. On failure the previous snapshot stays live.
    #[tracing::instrument(skip_all, fields(root = %self.root.display()))]
    pub fn reload(&self) -> Result<()> {
        let scanned = scan_content(&self.root, &self.languages)?;
        let tree = SiteTree::new(scanned.site, scanned.pages, scanned.files)
            .with_languages(self.languages.clone(), self.prefix_default_locale)
            .with_base_url(self.base_url.clone());
        info!(
            "loaded {} pages and {} files",
            tree.page_count(),
            tree.file_count()
        );
        *self.snapshot.write() = Arc::new(tree);
        Ok(())
    }
}
