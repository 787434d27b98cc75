// crates/adapt/src/media.rs

//! Media library: public URLs for originals and focus crops, blurred
//! placeholders, and the bytes behind `/media/...`.
//!
//! Crops are named `<name>-<w>x<h>-crop-<fx>-<fy>.webp` next to the original's
//! URL and rendered lazily on first request into the media directory.

use crate::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::field::Focus;
use domain::model::File;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use parking_lot::Mutex;
use regex::Regex;
use serve::media::MediaStore;
use serve::tree::ContentTree;
use serve::Error as ServeError;
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// URL segment every asset is served under.
pub const MEDIA_SEGMENT: &str = "media";

/// Crops larger than this on either side are refused.
const MAX_CROP_EDGE: u32 = 6000;

/// A served asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Parsed crop file name.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub focus: Focus,
}

fn crop_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+)-(?P<w>\d+)x(?P<h>\d+)-crop-(?P<fx>\d{1,3})-(?P<fy>\d{1,3})\.webp$")
            .expect("static regex")
    })
}

pub fn crop_name(name: &str, width: u32, height: u32, focus: Focus) -> String {
    format!(
        "{name}-{width}x{height}-crop-{}-{}.webp",
        focus.x.round() as u32,
        focus.y.round() as u32
    )
}

pub fn parse_crop_name(filename: &str) -> Option<CropSpec> {
    let caps = crop_pattern().captures(filename)?;
    let num = |k: &str| caps[k].parse::<u32>().ok();
    Some(CropSpec {
        name: caps["name"].to_owned(),
        width: num("w")?,
        height: num("h")?,
        focus: Focus::new(f64::from(num("fx")?), f64::from(num("fy")?)),
    })
}

pub fn mime_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/ico",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Scale `img` to cover `width`×`height`, then cut that window around `focus`.
pub fn cover_crop(img: &DynamicImage, width: u32, height: u32, focus: Focus) -> DynamicImage {
    let (iw, ih) = img.dimensions();
    let scale = f64::max(
        f64::from(width) / f64::from(iw.max(1)),
        f64::from(height) / f64::from(ih.max(1)),
    );
    let sw = ((f64::from(iw) * scale).round() as u32).max(width);
    let sh = ((f64::from(ih) * scale).round() as u32).max(height);
    let scaled = img.resize_exact(sw, sh, FilterType::Lanczos3);

    let offset = |scaled: u32, window: u32, percent: f64| {
        let center = f64::from(scaled) * percent / 100.0;
        let start = (center - f64::from(window) / 2.0).round().max(0.0) as u32;
        start.min(scaled - window)
    };
    let x = offset(sw, width, focus.x);
    let y = offset(sh, height, focus.y);
    scaled.crop_imm(x, y, width, height)
}

fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    rgba.write_with_encoder(WebPEncoder::new_lossless(&mut bytes))?;
    Ok(bytes)
}

/// [`MediaStore`] over the files of a content tree.
pub struct MediaLibrary {
    base_url: String,
    crop_dir: PathBuf,
    placeholder_size: u32,
    placeholders: Mutex<HashMap<String, Option<String>>>,
}

impl MediaLibrary {
    pub fn new(base_url: impl Into<String>, crop_dir: impl Into<PathBuf>, placeholder_size: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            crop_dir: crop_dir.into(),
            placeholder_size: placeholder_size.max(1),
            placeholders: Mutex::new(HashMap::new()),
        }
    }

    fn public_url(&self, parent: Option<&str>, filename: &str) -> String {
        match parent {
            Some(p) => format!("{}/{MEDIA_SEGMENT}/{p}/{filename}", self.base_url),
            None => format!("{}/{MEDIA_SEGMENT}/{filename}", self.base_url),
        }
    }

    /// Forget memoized placeholders, after the content changed.
    pub fn clear(&self) {
        self.placeholders.lock().clear();
    }

    fn render_placeholder(&self, file: &File) -> Result<String> {
        let img = image::open(&file.root)?;
        let thumb = img
            .thumbnail(self.placeholder_size, self.placeholder_size)
            .blur(1.0);
        let mut out = Cursor::new(Vec::new());
        thumb.write_to(&mut out, ImageFormat::Png)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(out.into_inner())))
    }

    /// Bytes for a `/media/<path>` request: an original file, or a crop of
    /// one rendered on demand. `None` when nothing matches.
    #[tracing::instrument(skip_all, fields(path = %path))]
    pub fn serve(&self, tree: &dyn ContentTree, path: &str) -> Result<Option<Asset>> {
        let path = path.trim_matches('/');
        if path.is_empty() || path.split('/').any(|s| s == ".." || s == "." || s.is_empty()) {
            return Ok(None);
        }

        if let Some(file) = tree.file(path) {
            let bytes = fs::read(&file.root)?;
            return Ok(Some(Asset {
                bytes,
                mime: mime_type(&file.extension()),
            }));
        }

        let (dir, filename) = match path.rsplit_once('/') {
            Some((dir, name)) => (Some(dir), name),
            None => (None, path),
        };
        let Some(spec) = parse_crop_name(filename) else {
            return Ok(None);
        };
        if spec.width == 0 || spec.height == 0 || spec.width > MAX_CROP_EDGE || spec.height > MAX_CROP_EDGE {
            return Ok(None);
        }
        let siblings = match dir {
            Some(id) => match tree.page(id) {
                Some(page) => &page.files,
                None => return Ok(None),
            },
            None => &tree.site().files,
        };
        let Some(original) = siblings
            .iter()
            .filter_map(|id| tree.file(id))
            .find(|f| f.is_raster_image() && f.name() == spec.name)
        else {
            return Ok(None);
        };

        let bytes = self.crop(original, path, &spec)?;
        Ok(Some(Asset {
            bytes,
            mime: mime_type("webp"),
        }))
    }

    /// Read the crop from the media directory, rendering it first if needed.
    fn crop(&self, original: &File, rel: &str, spec: &CropSpec) -> Result<Vec<u8>> {
        let target = self.crop_dir.join(rel);
        if is_fresh(&target, &original.root) {
            debug!("crop cache hit {}", target.display());
            return Ok(fs::read(&target)?);
        }
        let img = image::open(&original.root)?;
        let bytes = encode_webp(&cover_crop(&img, spec.width, spec.height, spec.focus))?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if let Err(e) = fs::write(&target, &bytes) {
            warn!("could not store crop {}: {}", target.display(), e);
        }
        Ok(bytes)
    }
}

/// `target` exists and is not older than `source`.
fn is_fresh(target: &Path, source: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(target), modified(source)) {
        (Some(t), Some(s)) => t >= s,
        (Some(_), None) => true,
        _ => false,
    }
}

impl MediaStore for MediaLibrary {
    fn url(&self, file: &File) -> String {
        self.public_url(file.parent.as_deref(), &file.filename)
    }

    fn crop_url(&self, file: &File, width: u32, height: u32, focus: Focus) -> String {
        self.public_url(
            file.parent.as_deref(),
            &crop_name(file.name(), width, height, focus),
        )
    }

    fn placeholder(&self, file: &File) -> Option<String> {
        if !file.is_raster_image() {
            return None;
        }
        if let Some(hit) = self.placeholders.lock().get(&file.id) {
            return hit.clone();
        }
        let rendered = match self.render_placeholder(file) {
            Ok(uri) => Some(uri),
            Err(e) => {
                warn!("no placeholder for {}: {}", file.id, e);
                None
            }
        };
        self.placeholders
            .lock()
            .insert(file.id.clone(), rendered.clone());
        rendered
    }

    fn read(&self, file: &File) -> serve::Result<Vec<u8>> {
        fs::read(&file.root).map_err(|source| ServeError::Asset {
            path: file.id.clone(),
            source,
        })
    }
}
