// crates/serve/src/media.rs

//! File descriptors for the frontend: raster images with focus crops,
//! inline SVGs, and the small shapes used by video, thumbnail and icon
//! fields.

use crate::ctx::RenderCtx;
use crate::link::link_value;
use crate::Result;
use domain::content::Content;
use domain::field::{Focus, Ratio};
use domain::model::File;
use serde_json::{json, Map, Value as Json};

/// Asset access the descriptors need. Implemented by the media adapter.
pub trait MediaStore: Send + Sync {
    /// Public URL of the original asset.
    fn url(&self, file: &File) -> String;

    /// URL of a `width`×`height` crop centered on `focus`.
    fn crop_url(&self, file: &File, width: u32, height: u32, focus: Focus) -> String;

    /// Small blurred preview as a data URI, when one can be produced.
    fn placeholder(&self, file: &File) -> Option<String>;

    /// Raw asset bytes.
    fn read(&self, file: &File) -> Result<Vec<u8>>;
}

/// Asset contents as text, for inline rendering.
pub fn read_text(ctx: &RenderCtx<'_>, file: &File) -> Result<String> {
    let bytes = ctx.media.read(file)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn dimension(v: Option<u32>) -> Json {
    v.map(Json::from).unwrap_or(Json::Null)
}

/// Raster image descriptor.
///
/// Non-SVG files additionally carry `thumbhash`, `urlFocus`,
/// `urlFocusMobile`, `focusX` and `focusY`. The crop height follows the
/// given ratios; without known dimensions the focus URLs are the original.
pub fn raster(ctx: &RenderCtx<'_>, file: &File, ratio: Ratio, ratio_mobile: Ratio) -> Map<String, Json> {
    let ctx = ctx.for_file(file);
    let caption = file.field("captionobject").to_object().unwrap_or_default();
    let overlay = caption
        .field("captioncontrols")
        .to_object()
        .map(|c| c.field("options").value())
        .unwrap_or(Json::Null);
    let url = ctx.media.url(file);

    let mut out = Map::new();
    out.insert("url".into(), json!(url));
    out.insert("width".into(), dimension(file.width));
    out.insert("height".into(), dimension(file.height));
    out.insert("alt".into(), json!(file.field("alt").string()));
    out.insert("name".into(), json!(file.name()));
    out.insert("identifier".into(), file.field("identifier").value());
    out.insert("classes".into(), file.field("classes").value());
    out.insert("captiontoggle".into(), json!(file.field("captiontoggle").to_bool(false)));
    out.insert("captiontitle".into(), caption.field("captiontitle").value());
    out.insert("captiontextfont".into(), caption.field("textfont").value());
    out.insert("captiontextsize".into(), caption.field("textsize").value());
    out.insert("captiontextcolor".into(), caption.field("textcolor").value());
    out.insert("captiontextalign".into(), caption.field("textalign").value());
    out.insert("captionoverlay".into(), overlay);
    out.insert("captionalign".into(), caption.field("captionalign").value());
    out.insert("linktoggle".into(), json!(file.field("linktoggle").to_bool(false)));
    out.insert("linkexternal".into(), link_value(&ctx, file.field("linkexternal")));

    if !file.is_svg() {
        let focus = Focus::from_field(file.field("focus"));
        let (url_focus, url_focus_mobile) = match file.width {
            Some(w) => (
                ctx.media.crop_url(file, w, ratio.height_for(w), focus),
                ctx.media.crop_url(file, w, ratio_mobile.height_for(w), focus),
            ),
            None => (url.clone(), url.clone()),
        };
        out.insert(
            "thumbhash".into(),
            ctx.media.placeholder(file).map(Json::String).unwrap_or(Json::Null),
        );
        out.insert("urlFocus".into(), json!(url_focus));
        out.insert("urlFocusMobile".into(), json!(url_focus_mobile));
        out.insert("focusX".into(), json!(focus.x));
        out.insert("focusY".into(), json!(focus.y));
    }
    out
}

/// Raster descriptor plus the image block's copyright fields.
pub fn raster_with_copyright(
    ctx: &RenderCtx<'_>,
    file: &File,
    ratio: Ratio,
    ratio_mobile: Ratio,
) -> Map<String, Json> {
    let mut out = raster(ctx, file, ratio, ratio_mobile);
    let copyright = file.field("copyrightobject").to_object().unwrap_or_default();
    let pick = |key: &str| copyright.field(key).value();
    out.insert("copyrighttoggle".into(), json!(file.field("copyrighttoggle").to_bool(false)));
    out.insert("copyrighttitle".into(), pick("copyrighttitle"));
    out.insert("copyrighttextfont".into(), pick("textfont"));
    out.insert("copyrighttextsize".into(), pick("textsize"));
    out.insert("copyrighttextcolor".into(), pick("textcolor"));
    // published key name is part of the frontend contract
    out.insert("copyrighbackgroundcolor".into(), pick("copyrightbackground"));
    out.insert("copyrightposition".into(), pick("copyrightposition"));
    out
}

/// Vector descriptor with the SVG text inlined under `source`.
pub fn vector(ctx: &RenderCtx<'_>, file: &File) -> Result<Map<String, Json>> {
    let ctx = ctx.for_file(file);
    let source = read_text(&ctx, file)?;
    let mut out = Map::new();
    out.insert("url".into(), json!(ctx.media.url(file)));
    out.insert("width".into(), dimension(file.width));
    out.insert("height".into(), dimension(file.height));
    out.insert("alt".into(), json!(file.field("alt").string()));
    out.insert("name".into(), json!(file.name()));
    out.insert("identifier".into(), file.field("identifier").value());
    out.insert("classes".into(), file.field("classes").value());
    out.insert("linktoggle".into(), json!(file.field("linktoggle").to_bool(false)));
    out.insert("linkexternal".into(), link_value(&ctx, file.field("linkexternal")));
    out.insert("source".into(), json!(source));
    Ok(out)
}

pub fn video(ctx: &RenderCtx<'_>, file: &File) -> Json {
    json!({
        "url": ctx.media.url(file),
        "alt": file.field("alt").string(),
        "identifier": file.field("identifier").value(),
        "classes": file.field("classes").value(),
    })
}

pub fn thumbnail(ctx: &RenderCtx<'_>, file: &File) -> Json {
    json!({
        "url": ctx.media.url(file),
        "alt": file.field("alt").string(),
    })
}

pub fn icon(ctx: &RenderCtx<'_>, file: &File) -> Result<Json> {
    Ok(json!({
        "url": ctx.media.url(file),
        "alt": file.field("alt").string(),
        "source": read_text(ctx, file)?,
    }))
}

/// Card thumbnail used in section listings.
pub fn listing_thumbnail(ctx: &RenderCtx<'_>, file: &File, ratio: Ratio, ratio_mobile: Ratio) -> Json {
    let url = ctx.media.url(file);
    let focus = Focus::from_field(file.field("focus"));
    let crop = |r: Ratio| match file.width {
        Some(w) => ctx.media.crop_url(file, w, r.height_for(w), focus),
        None => url.clone(),
    };
    json!({
        "url": url,
        "urlFocus": crop(ratio),
        "urlFocusMobile": crop(ratio_mobile),
        "width": dimension(file.width),
        "height": dimension(file.height),
        "alt": file.field("alt").string(),
        "name": file.name(),
        "thumbhash": ctx.media.placeholder(file),
        "orientation": file.orientation(),
    })
}

/// Read a `{ratio, ratioMobile}` object field, each defaulting to `fallback`.
pub fn display_ratios(obj: &Content, fallback: &str) -> (Ratio, Ratio) {
    (
        Ratio::parse_or(&obj.field("ratio").string(), fallback),
        Ratio::parse_or(&obj.field("ratiomobile").string(), fallback),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, StubMedia};
    use crate::tree::ContentTree;
    use crate::Error;

    #[test]
    fn raster_descriptor_has_focus_crops() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let hero = tree.file("about/hero.jpg").unwrap();
        let d = raster(&ctx, hero, Ratio::parse("16/9"), Ratio::parse("1/1"));

        assert_eq!(d["url"], "https://cms.test/media/about/hero.jpg");
        assert_eq!(d["width"], 1600);
        assert_eq!(d["height"], 1200);
        assert_eq!(d["name"], "hero");
        assert_eq!(d["alt"], "A hero");
        assert_eq!(d["captiontoggle"], true);
        assert_eq!(d["captiontitle"], "Caption");
        assert_eq!(d["captiontextcolor"], "#000");
        assert_eq!(d["captionoverlay"], "overlay");
        assert_eq!(d["urlFocus"], "crop:about/hero.jpg:1600x900@25,75");
        assert_eq!(d["urlFocusMobile"], "crop:about/hero.jpg:1600x1600@25,75");
        assert_eq!(d["focusX"], 25.0);
        assert_eq!(d["focusY"], 75.0);
        assert_eq!(d["thumbhash"], "data:image/png;base64,AAAA");
        assert_eq!(d["linkexternal"], Json::Null);
    }

    #[test]
    fn missing_focus_is_centered() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let team = tree.file("about/team.png").unwrap();
        let d = raster(&ctx, team, Ratio::default(), Ratio::default());
        assert_eq!(d["focusX"], 50.0);
        assert_eq!(d["focusY"], 50.0);
        // unknown dimensions fall back to the original
        assert_eq!(d["urlFocus"], d["url"]);
        assert_eq!(d["width"], Json::Null);
        assert_eq!(d["captiontitle"], Json::Null);
    }

    #[test]
    fn svg_rasters_skip_the_focus_part() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let icon = tree.file("about/icon.svg").unwrap();
        let d = raster(&ctx, icon, Ratio::parse("16/9"), Ratio::parse("16/9"));
        assert!(!d.contains_key("urlFocus"));
        assert!(!d.contains_key("thumbhash"));
    }

    #[test]
    fn copyright_fields_are_flattened() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let hero = tree.file("about/hero.jpg").unwrap();
        let d = raster_with_copyright(&ctx, hero, Ratio::default(), Ratio::default());
        assert_eq!(d["copyrighttoggle"], true);
        assert_eq!(d["copyrighttitle"], "© Trellis");
        assert_eq!(d["copyrighbackgroundcolor"], "#fff");
        assert_eq!(d["copyrightposition"], "bottom-right");
        assert_eq!(d["copyrighttextsize"], Json::Null);
    }

    #[test]
    fn vector_inlines_source() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let icon = tree.file("about/icon.svg").unwrap();
        let d = vector(&ctx, icon).unwrap();
        assert_eq!(d["source"], "<svg id=\"icon.svg\"/>");
        assert_eq!(d["width"], 24);
        assert_eq!(d["linktoggle"], false);
    }

    #[test]
    fn unreadable_svg_is_an_error() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let broken = tree.file("about/broken.svg").unwrap();
        assert!(matches!(vector(&ctx, broken), Err(Error::Asset { .. })));
        assert!(icon(&ctx, broken).is_err());
    }

    #[test]
    fn small_helpers() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let hero = tree.file("about/hero.jpg").unwrap();
        assert_eq!(
            thumbnail(&ctx, hero),
            json!({ "url": "https://cms.test/media/about/hero.jpg", "alt": "A hero" })
        );
        let v = video(&ctx, hero);
        assert_eq!(v["identifier"], "hero-id");
        assert_eq!(v["classes"], Json::Null);
    }

    #[test]
    fn listing_thumbnail_uses_ratios_and_orientation() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let hero = tree.file("about/hero.jpg").unwrap();
        let (r, rm) = display_ratios(&Content::default(), "16/9");
        let t = listing_thumbnail(&ctx, hero, r, rm);
        assert_eq!(t["urlFocus"], "crop:about/hero.jpg:1600x900@25,75");
        assert_eq!(t["urlFocusMobile"], "crop:about/hero.jpg:1600x900@25,75");
        assert_eq!(t["orientation"], "landscape");
    }
}
