// crates/serve/src/link.rs

use crate::ctx::RenderCtx;
use domain::content::Content;
use domain::field::Field;
use domain::link::{classify, strip_prefix, LinkDescriptor, LinkType};
use serde_json::{json, Value as Json};

/// Normalize a link object field.
///
/// Returns `None` when the field is empty or does not hold an object. Never
/// fails: dangling page and file targets only blank out `uri` (and, for
/// pages, the fallback title).
pub fn resolve_link(ctx: &RenderCtx<'_>, field: Field<'_>) -> Option<LinkDescriptor> {
    if field.is_empty() {
        return None;
    }
    resolve_object(ctx, &field.to_object()?)
}

/// Normalize an already decoded link object; `None` when it is empty.
pub fn resolve_object(ctx: &RenderCtx<'_>, link: &Content) -> Option<LinkDescriptor> {
    if link.is_empty() {
        return None;
    }
    let raw = link.field("link").string();
    let kind = classify(&raw);
    let value = strip_prefix(&raw, "tel:");

    let target = match kind {
        LinkType::Page => ctx.resolve_page(&raw),
        _ => None,
    };

    let uri = match kind {
        LinkType::Page => target.map(|page| {
            if page.id == ctx.tree.home_id() {
                return String::new();
            }
            let uri = ctx.page_uri(page);
            if uri == ctx.tree.home_id() {
                String::new()
            } else {
                uri
            }
        }),
        LinkType::File => ctx.resolve_file(&raw).map(|file| ctx.media.url(file)),
        _ => None,
    };

    let title = match link.field("linktext").str() {
        Some(text) => Some(text.to_owned()),
        None => match kind {
            LinkType::Page => target.map(|page| page.title_for(ctx.lang_code())),
            _ if value.is_empty() => None,
            _ => Some(value.to_owned()),
        },
    };

    let hash = link
        .field("anchortoggle")
        .to_bool(false)
        .then(|| strip_prefix(&link.field("anchor").string(), "#").to_owned());

    Some(LinkDescriptor {
        href: kind.has_href().then(|| value.to_owned()),
        title,
        popup: link.field("target").to_bool(false),
        hash,
        kind,
        uri,
        classes: link.field("classnames").value(),
    })
}

/// JSON form of [`resolve_link`]; `null` when there is no link.
pub fn link_value(ctx: &RenderCtx<'_>, field: Field<'_>) -> Json {
    match resolve_link(ctx, field) {
        Some(link) => descriptor_json(&link),
        None => Json::Null,
    }
}

/// JSON form of [`resolve_object`].
pub fn object_value(ctx: &RenderCtx<'_>, link: Option<&Content>) -> Json {
    match link.and_then(|l| resolve_object(ctx, l)) {
        Some(link) => descriptor_json(&link),
        None => Json::Null,
    }
}

pub fn descriptor_json(link: &LinkDescriptor) -> Json {
    json!({
        "href": link.href,
        "title": link.title,
        "popup": link.popup,
        "hash": link.hash,
        "type": link.kind.as_str(),
        "uri": link.uri,
        "classes": link.classes,
    })
}
