// crates/adapt/src/store/dimensions.rs

use domain::model::File;
use regex::Regex;
use std::fs;
use std::sync::OnceLock;
use tracing::debug;

fn svg_root() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<svg\b[^>]*>").expect("static regex"))
}

fn svg_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:^|\s)(width|height|viewBox)\s*=\s*["']([^"']*)["']"#)
            .expect("static regex")
    })
}

fn pixels(value: f64) -> Option<u32> {
    (value.is_finite() && value > 0.0).then(|| value.round() as u32)
}

fn length(raw: &str) -> Option<u32> {
    pixels(raw.trim().trim_end_matches("px").parse().ok()?)
}

/// Intrinsic size of an SVG document from its root `width`/`height`, falling
/// back to the `viewBox`. Relative units (`%`, `em`) count as unknown.
pub fn svg_dimensions(source: &str) -> Option<(u32, u32)> {
    let root = svg_root().find(source)?.as_str();
    let mut width = None;
    let mut height = None;
    let mut view_box = None;
    for cap in svg_attr().captures_iter(root) {
        let value = &cap[2];
        match &cap[1] {
            "width" => width = length(value),
            "height" => height = length(value),
            _ => view_box = Some(value.to_owned()),
        }
    }
    if let (Some(w), Some(h)) = (width, height) {
        return Some((w, h));
    }
    let numbers: Vec<f64> = view_box?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    match numbers.as_slice() {
        [_, _, w, h] => Some((pixels(*w)?, pixels(*h)?)),
        _ => None,
    }
}

/// Pixel size of an image file; `None` for other files or unreadable ones.
pub fn dimensions(file: &File) -> Option<(u32, u32)> {
    if file.is_svg() {
        let text = fs::read_to_string(&file.root).ok()?;
        return svg_dimensions(&text);
    }
    if !file.is_raster_image() {
        return None;
    }
    match image::image_dimensions(&file.root) {
        Ok(dims) => Some(dims),
        Err(e) => {
            debug!("no dimensions for {}: {}", file.id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_sizes() {
        assert_eq!(svg_dimensions(r#"<svg width="120px" height="40"/>"#), Some((120, 40)));
        assert_eq!(
            svg_dimensions(r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24.4 16"></svg>"#),
            Some((24, 16))
        );
        assert_eq!(svg_dimensions(r#"<svg width="100%" viewBox="0,0,10,5"/>"#), Some((10, 5)));
        assert_eq!(svg_dimensions("<svg/>"), None);
        assert_eq!(svg_dimensions("not svg"), None);
    }
}
