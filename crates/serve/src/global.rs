// crates/serve/src/global.rs

//! Site-wide settings document: languages, navigation, theme tokens,
//! typography, logo and analytics. Computed from site fields only.

use crate::cache::{cache_key, read_through, ApiCache, GLOBAL_NAMESPACE, GLOBAL_TTL_MINUTES};
use crate::ctx::RenderCtx;
use crate::link::{link_value, object_value};
use crate::media::read_text;
use crate::Result;
use domain::content::Content;
use domain::model::Language;
use serde_json::{json, Map, Value as Json};

const FAVICONS: [(&str, &str); 5] = [
    ("svgSrc", "faviconFileSvg"),
    ("icoSrc", "faviconFileIco"),
    ("png192Src", "faviconFilePng1"),
    ("png512Src", "faviconFilePng2"),
    ("pngAppleSrc", "faviconFilePng3"),
];

const COLORS: [&str; 7] = [
    "colorPrimary",
    "colorSecondary",
    "colorTertiary",
    "colorBlack",
    "colorWhite",
    "colorTransparent",
    "colorBackground",
];

const GRID: [&str; 6] = [
    "gridGapMobile",
    "gridMarginMobile",
    "gridGapDesktop",
    "gridMarginDesktop",
    "gridBlockMobile",
    "gridBlockDesktop",
];

const FONT_SIZE_KEYS: [&str; 10] = [
    "name",
    "sizeMobile",
    "lineHeightMobile",
    "letterSpacingMobile",
    "sizeDesktop",
    "lineHeightDesktop",
    "letterSpacingDesktop",
    "sizeDesktopXl",
    "lineHeightDesktopXl",
    "letterSpacingDesktopXl",
];

/// `(object field, keys)` groups copied as strings.
const OBJECT_GROUPS: [(&str, &[&str]); 6] = [
    (
        "headerMenu",
        &[
            "headerFont",
            "headerFontSize",
            "headerColor",
            "headerColorActive",
            "headerBackground",
            "headerBackgroundActive",
        ],
    ),
    (
        "headerHamburger",
        &[
            "hamburgerFont",
            "hamburgerFontSize",
            "hamburgerFontColor",
            "hamburgerMenuColor",
            "hamburgerMenuColorActive",
            "hamburgerOverlay",
        ],
    ),
    (
        "headerLogo",
        &[
            "logoAlign",
            "logoDesktop",
            "logoMobile",
            "logoDesktopActive",
            "logoMobileActive",
        ],
    ),
    (
        "buttonSettings",
        &[
            "buttonFont",
            "buttonFontSize",
            "buttonBorderRadius",
            "buttonBorderWidth",
            "buttonPadding",
        ],
    ),
    (
        "buttonColors",
        &[
            "buttonBackgroundColor",
            "buttonBackgroundColorActive",
            "buttonTextColor",
            "buttonTextColorActive",
            "buttonBorderColor",
            "buttonBorderColorActive",
        ],
    ),
    (
        "paginationColors",
        &[
            "paginationBackgroundColor",
            "paginationBackgroundColorHover",
            "paginationBackgroundColorActive",
            "paginationTextColor",
            "paginationTextColorHover",
            "paginationTextColorActive",
            "paginationBorderColor",
            "paginationBorderColorHover",
            "paginationBorderColorActive",
        ],
    ),
];

/// Pagination settings with their fallbacks (empty string means none).
const PAGINATION: [(&str, &str); 9] = [
    ("paginationFont", ""),
    ("paginationFontSize", ""),
    ("paginationBorderRadius", ""),
    ("paginationBorderWidth", ""),
    ("paginationPadding", "10"),
    ("paginationMargin", "10"),
    ("paginationElements", ""),
    ("paginationTop", "16"),
    ("paginationBottom", "16"),
];

fn object(content: &Content, key: &str) -> Content {
    content.field(key).to_object().unwrap_or_default()
}

fn language_json(ctx: &RenderCtx<'_>, lang: &Language) -> Json {
    json!({
        "code": lang.code,
        "name": lang.name,
        "url": ctx.tree.language_url(Some(lang)),
        "locale": lang.locale,
        "active": ctx.lang.is_some_and(|a| a.code == lang.code),
    })
}

fn file_url(ctx: &RenderCtx<'_>, content: &Content, key: &str) -> Json {
    content
        .field(key)
        .to_refs()
        .first()
        .and_then(|r| ctx.resolve_file(r))
        .map(|f| json!(ctx.media.url(f)))
        .unwrap_or(Json::Null)
}

fn favicon(ctx: &RenderCtx<'_>, site: &Content) -> Json {
    let Some(fav) = site.field("faviconFiles").to_object() else {
        return Json::Null;
    };
    let out: Map<String, Json> = FAVICONS
        .iter()
        .map(|(key, field)| ((*key).to_owned(), file_url(ctx, &fav, field)))
        .collect();
    Json::Object(out)
}

/// Links of a navigation structure; `null` when it has no entries.
fn navigation(ctx: &RenderCtx<'_>, site: &Content, field: &str) -> Json {
    let entries = site.field(field).to_structure();
    if entries.is_empty() {
        return Json::Null;
    }
    Json::Array(
        entries
            .iter()
            .map(|e| link_value(ctx, e.field("linkobject")))
            .collect(),
    )
}

fn fonts(ctx: &RenderCtx<'_>, site: &Content) -> Json {
    let fonts: Vec<Json> = site
        .field("fontFile")
        .to_structure()
        .iter()
        .filter_map(|item| {
            let file = item
                .field("file2")
                .to_refs()
                .first()
                .and_then(|r| ctx.resolve_file(r))?;
            Some(json!({
                "name": item.field("name").string(),
                "url2": ctx.media.url(file),
            }))
        })
        .collect();
    if fonts.is_empty() {
        Json::Null
    } else {
        Json::Array(fonts)
    }
}

fn font_sizes(site: &Content) -> Json {
    let sizes = site
        .field("fontSize")
        .to_structure()
        .iter()
        .map(|item| {
            let mut out: Map<String, Json> = FONT_SIZE_KEYS
                .iter()
                .map(|k| ((*k).to_owned(), json!(item.field(k).string())))
                .collect();
            out.insert("transform".into(), json!(item.field("transform").or("none")));
            out.insert("decoration".into(), json!(item.field("decoration").or("none")));
            Json::Object(out)
        })
        .collect();
    Json::Array(sizes)
}

fn headlines(site: &Content) -> Json {
    let obj = object(site, "headlines");
    let out: Map<String, Json> = (1..=6)
        .map(|i| {
            let tag = format!("h{i}");
            let value = json!({
                "font": obj.field(&format!("{tag}font")).string(),
                "size": obj.field(&format!("{tag}size")).string(),
            });
            (tag, value)
        })
        .collect();
    Json::Object(out)
}

fn logo_file(ctx: &RenderCtx<'_>, site: &Content, title: &str) -> Result<Json> {
    let logo = object(site, "headerLogo");
    let file = logo
        .field("logoFile")
        .to_refs()
        .first()
        .and_then(|r| ctx.resolve_file(r));
    let Some(file) = file else {
        return Ok(json!({}));
    };
    Ok(json!({
        "src": ctx.media.url(file),
        "alt": file.field("alt").or(&format!("{title} Logo")),
        "source": read_text(ctx, file)?,
        "width": file.width,
        "height": file.height,
    }))
}

/// Build the global settings document for the active language.
#[tracing::instrument(skip_all)]
pub fn global_settings(ctx: &RenderCtx<'_>) -> Result<Json> {
    let ctx = ctx.for_site();
    let tree = ctx.tree;
    let site = ctx.site_content();
    let title = site.field("title").string();
    let mut out = Map::new();
    let mut put = |key: &str, value: Json| {
        out.insert(key.to_owned(), value);
    };

    // key kept for existing frontends
    put("kirbyUrl", json!(tree.base_url()));
    put("siteUrl", json!(tree.language_url(ctx.lang)));
    put("siteTitle", json!(title));
    put(
        "defaultLang",
        tree.default_language()
            .map(|l| language_json(&ctx, l))
            .unwrap_or(Json::Null),
    );
    put(
        "translations",
        Json::Array(
            tree.languages()
                .iter()
                .filter(|l| !tree.is_default_language(l))
                .map(|l| language_json(&ctx, l))
                .collect(),
        ),
    );
    put("prefixDefaultLocale", json!(tree.prefix_default_locale()));
    put(
        "allLang",
        Json::Array(tree.languages().iter().map(|l| language_json(&ctx, l)).collect()),
    );
    put("favicon", favicon(&ctx, &site));
    put("frontendUrl", json!(site.field("frontendUrl").string()));
    put("navHeader", navigation(&ctx, &site, "navHeader"));
    let hamburger = if site.field("navHamburger").is_not_empty() {
        "navHamburger"
    } else {
        "navHambuger"
    };
    put("navHamburger", navigation(&ctx, &site, hamburger));

    for key in COLORS {
        put(key, json!(site.field(key).string()));
    }
    put("font", fonts(&ctx, &site));
    put("fontSize", font_sizes(&site));
    put("headlines", headlines(&site));
    put("headerActive", json!(site.field("headerActive").to_bool(false)));

    for (group, keys) in OBJECT_GROUPS {
        let obj = object(&site, group);
        for &key in keys {
            put(key, json!(obj.field(key).string()));
        }
    }

    let logo = object(&site, "headerLogo");
    put("logoFile", logo_file(&ctx, &site, &title)?);
    put(
        "logoCta",
        object_value(&ctx, logo.field("logoCta").to_object().as_ref()),
    );

    for key in GRID {
        put(key, json!(site.field(key).string()));
    }

    let pagination = object(&site, "paginationSettings");
    for (key, fallback) in PAGINATION {
        put(key, json!(pagination.field(key).or(fallback)));
    }

    let search_console = site.field("searchConsoleToggle").to_bool(false);
    let analytics = site.field("googleAnalyticsToggle").to_bool(false);
    put("searchConsoleToggle", json!(search_console));
    put(
        "searchConsoleCode",
        match search_console {
            true => json!(site.field("searchConsoleCode").string()),
            false => Json::Null,
        },
    );
    put("googleAnalyticsToggle", json!(analytics));
    put(
        "googleAnalyticsCode",
        match analytics {
            true => json!(site.field("googleAnalyticsCode").string()),
            false => Json::Null,
        },
    );
    put("analyticsLink", link_value(&ctx, site.field("analyticsLink")));

    let claim = object(&site, "headerClaim");
    for key in ["claimText", "claimFont", "claimFontSize"] {
        put(key, json!(claim.field(key).string()));
    }

    Ok(Json::Object(out))
}

/// [`global_settings`] behind the read-through cache.
#[tracing::instrument(skip_all)]
pub async fn cached_global(cache: &dyn ApiCache, ctx: &RenderCtx<'_>) -> Result<Json> {
    let key = cache_key(GLOBAL_NAMESPACE, ctx.lang);
    read_through(cache, &key, GLOBAL_TTL_MINUTES, || global_settings(ctx)).await
}
