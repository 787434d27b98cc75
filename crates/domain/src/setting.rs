// crates/domain/src/setting.rs

use crate::model::Language;
use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// IP address the HTTP listener binds to
    pub ip: IpAddr,

    pub port: u16,

    /// Public base URL of this API, used for media and page URLs
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentSettings {
    /// Content root, relative to the site directory
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Where generated crops are written, relative to the site directory
    #[serde(default = "default_media_dir")]
    pub dir: PathBuf,

    /// Longest edge of the blurred placeholder image
    #[serde(default = "default_placeholder_size")]
    pub placeholder_size: u32,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            dir: default_media_dir(),
            placeholder_size: default_placeholder_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,

    #[serde(default)]
    pub content: ContentSettings,

    #[serde(default)]
    pub media: MediaSettings,

    /// Configured languages; empty means a single-language site.
    #[serde(default)]
    pub languages: Vec<Language>,

    /// Whether the default language also carries its `/<code>` prefix.
    #[serde(default)]
    pub prefix_default_locale: bool,

    /// Target of the `/` redirect
    #[serde(default = "default_panel_path")]
    pub panel_path: String,

    /// Redirect target when the site's frontend URL is missing or invalid
    #[serde(default)]
    pub fallback_frontend_url: String,

    /// Page id served for unknown paths
    #[serde(default = "default_error_page")]
    pub error_page: String,
}

impl Settings {
    pub fn default_language(&self) -> Option<&Language> {
        self.languages
            .iter()
            .find(|l| l.default)
            .or_else(|| self.languages.first())
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_placeholder_size() -> u32 {
    32
}

fn default_panel_path() -> String {
    "/panel".to_owned()
}

fn default_error_page() -> String {
    "z-error".to_owned()
}
