// crates/serve/src/page.rs

//! Page documents: SEO meta, page identity and the serialized regions.
//!
//! Pages with the `section` template additionally list their children as
//! cards and carry the listing display settings.

use crate::block::serialize_blocks;
use crate::ctx::RenderCtx;
use crate::layout::serialize_region;
use crate::media::{display_ratios, listing_thumbnail};
use crate::Result;
use domain::block::parse_blocks;
use domain::content::Content;
use domain::layout::parse_layouts;
use domain::model::Page;
use serde_json::{json, Map, Value as Json};

pub const SECTION_TEMPLATE: &str = "section";
pub const BLOCKS_FIELD: &str = "baukastenbuilder";

const DEFAULT_RATIO: &str = "16/9";

// ─────────────────────────────────────────────────────────────────────────────
// Payload
// ─────────────────────────────────────────────────────────────────────────────

/// Build the JSON document for `page` in the active language.
#[tracing::instrument(skip_all, fields(page = %page.id))]
pub fn page_payload(ctx: &RenderCtx<'_>, page: &Page) -> Result<Json> {
    let ctx = ctx.for_page(page);
    let content = ctx.page_content(page);
    let site = ctx.site_content();
    let section = page.template == SECTION_TEMPLATE;

    let mut out = Map::new();
    out.insert("meta".into(), meta(&ctx, page, &content, &site));
    out.insert("intendedTemplate".into(), json!(page.template));
    out.insert("uid".into(), json!(page.slug));
    out.insert("title".into(), json!(page.title_for(ctx.lang_code())));
    out.insert("lang".into(), json!(ctx.lang_code().unwrap_or_default()));

    if section {
        let children = ctx.tree.children(Some(page));
        if !children.is_empty() {
            out.insert("items".into(), items(&ctx, &content, &children));
        }
        out.insert("settings".into(), settings(&content));
        insert_region(&mut out, "layoutPre", &ctx, &content, "layoutPre")?;
        insert_region(&mut out, "layoutPost", &ctx, &content, "layoutPost")?;
    } else {
        insert_region(&mut out, "layouts", &ctx, &content, "layout")?;
    }

    let site_ctx = ctx.for_site();
    insert_region(&mut out, "layoutFooter", &site_ctx, &site, "layoutFooter")?;

    if content.field(BLOCKS_FIELD).is_not_empty() {
        let blocks = parse_blocks(content.get(BLOCKS_FIELD));
        out.insert("blocks".into(), Json::Array(serialize_blocks(&ctx, &blocks)?));
    }

    Ok(Json::Object(out))
}

/// Serialize the layouts field `field` under `key`, when it has content.
fn insert_region(
    out: &mut Map<String, Json>,
    key: &str,
    ctx: &RenderCtx<'_>,
    content: &Content,
    field: &str,
) -> Result<()> {
    if content.field(field).is_empty() {
        return Ok(());
    }
    let layouts = parse_layouts(content.get(field));
    out.insert(key.to_owned(), Json::Array(serialize_region(ctx, &layouts)?));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Section listing
// ─────────────────────────────────────────────────────────────────────────────

fn items(ctx: &RenderCtx<'_>, content: &Content, children: &[&Page]) -> Json {
    let display = content.field("displayRatio").to_object().unwrap_or_default();
    let (ratio, ratio_mobile) = display_ratios(&display, DEFAULT_RATIO);
    let parent = content.field("title").string().to_lowercase();

    let items = children
        .iter()
        .map(|&item| {
            let item_ctx = ctx.for_page(item);
            let fields = item_ctx.page_content(item);
            let thumbnail = fields
                .field("thumbnail")
                .to_refs()
                .first()
                .and_then(|r| item_ctx.resolve_file(r))
                .map(|file| listing_thumbnail(&item_ctx, file, ratio, ratio_mobile))
                .unwrap_or(Json::Null);
            json!({
                "title": item.title_for(ctx.lang_code()),
                "uri": ctx.page_uri(item),
                "description": html_escape::encode_safe(&fields.field("description").string()),
                "parent": parent,
                "thumbnail": thumbnail,
                "coverOnly": fields.field("coverOnly").to_bool(false),
                "status": item.status().as_str(),
                "position": item.num,
            })
        })
        .collect();
    Json::Array(items)
}

fn settings(content: &Content) -> Json {
    let obj = |key: &str| content.field(key).to_object().unwrap_or_default();
    let display = obj("displayRatio");
    let elements = obj("displayElements");
    let grid = obj("displayGrid");
    let title = obj("fontTitle");
    let text = obj("fontText");

    json!({
        "ratio": display.field("ratio").or(DEFAULT_RATIO),
        "ratioMobile": display.field("ratioMobile").or(DEFAULT_RATIO),
        "grid": {
            "elements": elements.field("elements").or("10"),
            "gap": grid.field("gap").or("16"),
            "gapMobile": grid.field("gapMobile").or("16"),
            "span": grid.field("span").or("6"),
            "spanMobile": grid.field("spanMobile").or("6"),
        },
        "title": {
            "level": title.field("level").or("h2"),
            "font": title.field("titleFont").value(),
            "size": title.field("titleSize").value(),
            "color": title.field("titleColor").value(),
            "align": title.field("titleAlign").value(),
        },
        "text": {
            "font": text.field("textFont").value(),
            "size": text.field("textSize").value(),
            "color": text.field("textColor").value(),
            "align": text.field("textAlign").value(),
        },
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Meta
// ─────────────────────────────────────────────────────────────────────────────

/// `index|noindex, follow|nofollow`, followed by any restriction flags set.
pub fn robots(content: &Content) -> String {
    let flag = |key: &str| content.field(key).to_bool(false);
    let mut parts = vec![
        if flag("robots_noindex") { "noindex" } else { "index" },
        if flag("robots_nofollow") { "nofollow" } else { "follow" },
    ];
    for extra in ["noarchive", "noimageindex", "nosnippet"] {
        if flag(&format!("robots_{extra}")) {
            parts.push(extra);
        }
    }
    parts.join(", ")
}

fn file_url(ctx: &RenderCtx<'_>, content: &Content, key: &str) -> Option<String> {
    content
        .field(key)
        .to_refs()
        .first()
        .and_then(|r| ctx.resolve_file(r))
        .map(|f| ctx.media.url(f))
}

fn social(ctx: &RenderCtx<'_>, content: &Content, site: &Content, title: &str, description: &Json, canonical: &str) -> Json {
    let mut tags = Map::new();
    let mut put = |property: &str, value: Json| {
        if !value.is_null() && value != json!("") {
            tags.insert(property.to_owned(), value);
        }
    };
    let og_title = content.field("og_title").or(title);
    let og_description = match content.field("og_description").str() {
        Some(d) => json!(d),
        None => description.clone(),
    };
    let image = file_url(ctx, content, "og_image").or_else(|| file_url(ctx, content, "meta_image"));

    put("og:title", json!(og_title));
    put("og:description", og_description.clone());
    put("og:url", json!(canonical));
    put("og:site_name", json!(site.field("og_site_name").or(&site.field("title").string())));
    put("og:type", json!(content.field("og_type").or("website")));
    put("og:image", json!(image));
    put(
        "twitter:card",
        json!(content.field("twitter_card_type").or("summary_large_image")),
    );
    put("twitter:title", json!(content.field("twitter_title").or(&og_title)));
    put("twitter:description", og_description);
    put("twitter:site", json!(site.field("twitter_site").string()));
    put("twitter:creator", json!(content.field("twitter_creator").string()));
    put("twitter:image", json!(image));
    Json::Object(tags)
}

fn meta(ctx: &RenderCtx<'_>, page: &Page, content: &Content, site: &Content) -> Json {
    let title = content.field("meta_title").or(&page.title_for(ctx.lang_code()));
    let description = match content.field("meta_description").str() {
        Some(d) => json!(d),
        None => match content.field("description").str() {
            Some(d) => json!(d),
            None => Json::Null,
        },
    };
    let canonical = content
        .field("meta_canonical_url")
        .or(&ctx.page_url(page));

    let mut out = Map::new();
    out.insert("title".into(), json!(title));
    out.insert("description".into(), description.clone());
    out.insert("robots".into(), json!(robots(content)));
    out.insert("canonical".into(), json!(canonical));
    out.insert(
        "separators".into(),
        json!(site.field("meta_title_separator").string()),
    );
    out.insert(
        "social".into(),
        social(ctx, content, site, &title, &description, &canonical),
    );

    let owner_id = format!("{}/#owner", ctx.tree.base_url());
    match site.field("meta_website_owner").string().as_str() {
        "org" => {
            let site_ctx = ctx.for_site();
            let mut org = Map::new();
            org.insert("@type".into(), json!("Organization"));
            org.insert("@id".into(), json!(owner_id));
            org.insert("name".into(), json!(site.field("meta_org_name").string()));
            org.insert("url".into(), json!(ctx.tree.language_url(ctx.lang)));
            if let Some(logo) = file_url(&site_ctx, site, "meta_org_logo") {
                org.insert("logo".into(), json!(logo));
            }
            out.insert("org".into(), Json::Object(org));
        }
        "person" if site.field("meta_person_name").is_not_empty() => {
            out.insert(
                "person".into(),
                json!({
                    "@type": "Person",
                    "@id": owner_id,
                    "name": site.field("meta_person_name").string(),
                    "email": site.field("meta_person_email").string(),
                }),
            );
        }
        _ => {}
    }
    Json::Object(out)
}
