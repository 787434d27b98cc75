// crates/serve/src/block.rs

//! Block serializer.
//!
//! Every block becomes `{id, type, content}`. Dispatch is on the typed
//! [`BlockKind`]; most kinds start from the authored content map and then
//! overwrite the keys they normalize, so unknown keys always survive.

use crate::attrs::coerce_attributes;
use crate::ctx::RenderCtx;
use crate::layout::serialize_columns;
use crate::link::object_value;
use crate::media::{self, icon, raster, raster_with_copyright, thumbnail, vector};
use crate::Result;
use domain::block::{
    Block, BlockKind, ButtonBarBlock, ButtonBlock, CardBlock, ColumnsBlock, GalleryBlock,
    GridBlock, IconListBlock, ImageBlock, MenuBlock, SliderBlock, VectorBlock, VideoBlock,
};
use domain::content::Content;
use serde_json::{json, Map, Value as Json};

type Fields = Map<String, Json>;

pub fn serialize_blocks(ctx: &RenderCtx<'_>, blocks: &[Block]) -> Result<Vec<Json>> {
    blocks.iter().map(|b| serialize_block(ctx, b)).collect()
}

pub fn serialize_block(ctx: &RenderCtx<'_>, block: &Block) -> Result<Json> {
    let mut content = match &block.kind {
        BlockKind::Columns(b) => columns(ctx, b)?,
        BlockKind::Grid(b) => grid(ctx, b)?,
        BlockKind::Image(b) => image(ctx, block, b),
        BlockKind::Vector(b) => vector_block(ctx, block, b)?,
        BlockKind::Slider(b) => slider(ctx, block, b)?,
        BlockKind::Gallery(b) => gallery(ctx, block, b),
        BlockKind::Menu(b) => menu(ctx, block, b),
        BlockKind::Button(b) => button(ctx, block, b),
        BlockKind::ButtonBar(b) => button_bar(ctx, block, b),
        BlockKind::Text(b) => with_raw(block, [("text", json!(b.text.0))]),
        BlockKind::IconList(b) => icon_list(ctx, block, b)?,
        BlockKind::Code(b) => with_raw(block, [("code", json!(b.code.0))]),
        BlockKind::Video(b) => video(ctx, block, b),
        BlockKind::Card(b) => card(ctx, block, b)?,
        BlockKind::Other => raw(block),
    };
    coerce_metadata(&mut content);

    Ok(json!({
        "id": block.id,
        "type": block.type_name,
        "content": Json::Object(content),
    }))
}

fn raw(block: &Block) -> Fields {
    block.content.as_map().clone()
}

fn with_raw<const N: usize>(block: &Block, extra: [(&str, Json); N]) -> Fields {
    let mut out = raw(block);
    for (k, v) in extra {
        out.insert(k.to_owned(), v);
    }
    out
}

fn coerce_metadata(content: &mut Fields) {
    if let Some(Json::Object(meta)) = content.get_mut("metadata") {
        if let Some(attrs) = meta.get_mut("attributes") {
            *attrs = coerce_attributes(attrs);
        }
    }
}

/// Rewrite one key of every structure entry.
fn structure<F>(entries: &[Content], key: &str, mut f: F) -> Result<Json>
where
    F: FnMut(&Content) -> Result<Json>,
{
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let value = f(entry)?;
        let mut map = entry.as_map().clone();
        map.insert(key.to_owned(), value);
        out.push(Json::Object(map));
    }
    Ok(Json::Array(out))
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-kind serializers
// ─────────────────────────────────────────────────────────────────────────────

fn columns(ctx: &RenderCtx<'_>, b: &ColumnsBlock) -> Result<Fields> {
    let cols = match b.layout.first() {
        Some(layout) => serialize_columns(ctx, &layout.columns, true)?,
        None => Vec::new(),
    };
    let mut out = Fields::new();
    out.insert("columns".into(), Json::Array(cols));
    Ok(out)
}

fn grid(ctx: &RenderCtx<'_>, b: &GridBlock) -> Result<Fields> {
    let mut rows = Vec::with_capacity(b.grid.0.len());
    for layout in &b.grid.0 {
        rows.push(json!({
            "id": layout.id,
            "columns": serialize_columns(ctx, &layout.columns, true)?,
        }));
    }
    let mut out = Fields::new();
    out.insert("title".into(), b.title.clone());
    out.insert("grid".into(), Json::Array(rows));
    Ok(out)
}

fn image(ctx: &RenderCtx<'_>, block: &Block, b: &ImageBlock) -> Fields {
    let image = b
        .image
        .first()
        .and_then(|r| ctx.resolve_file(r))
        .map(|f| Json::Object(raster_with_copyright(ctx, f, b.ratio, b.ratio_mobile)))
        .unwrap_or(Json::Null);
    with_raw(block, [("abovefold", json!(b.abovefold.get())), ("image", image)])
}

fn vector_block(ctx: &RenderCtx<'_>, block: &Block, b: &VectorBlock) -> Result<Fields> {
    let image = match b.image.first().and_then(|r| ctx.resolve_file(r)) {
        Some(f) => Json::Object(vector(ctx, f)?),
        None => Json::Null,
    };
    Ok(with_raw(block, [("image", image)]))
}

fn slider(ctx: &RenderCtx<'_>, block: &Block, b: &SliderBlock) -> Result<Fields> {
    let mut images = Vec::new();
    for file in ctx.resolve_files(b.images.iter()) {
        let mut image = if file.is_svg() {
            vector(ctx, file)?
        } else {
            raster(ctx, file, b.ratio, b.ratio_mobile)
        };
        image.insert("toggle".into(), json!(file.field("toggle").to_bool(false)));
        images.push(Json::Object(image));
    }
    Ok(with_raw(
        block,
        [
            ("images", Json::Array(images)),
            ("toggle", json!(b.toggle.get())),
            ("abovefold", json!(b.abovefold.get())),
        ],
    ))
}

fn gallery(ctx: &RenderCtx<'_>, block: &Block, b: &GalleryBlock) -> Fields {
    let images: Vec<Json> = ctx
        .resolve_files(b.images.iter())
        .into_iter()
        .map(|f| Json::Object(raster(ctx, f, b.ratio, b.ratio_mobile)))
        .collect();
    with_raw(
        block,
        [
            ("images", Json::Array(images)),
            ("layoutType", b.layout_type.clone()),
            ("lightbox", json!(b.lightbox.get())),
            ("viewMobile", b.view_mobile.clone()),
            ("viewDesktop", b.view_desktop.clone()),
            ("viewPaddingMobile", b.view_padding_mobile.clone()),
            ("viewPaddingDesktop", b.view_padding_desktop.clone()),
            ("abovefold", json!(b.abovefold.get())),
        ],
    )
}

fn entry_link(ctx: &RenderCtx<'_>, entry: &Content) -> Result<Json> {
    Ok(object_value(ctx, entry.field("linkobject").to_object().as_ref()))
}

fn menu(ctx: &RenderCtx<'_>, block: &Block, b: &MenuBlock) -> Fields {
    // link resolution cannot fail
    let nav = structure(&b.nav.0, "linkobject", |e| entry_link(ctx, e)).unwrap_or(Json::Null);
    with_raw(block, [("nav", nav)])
}

fn button(ctx: &RenderCtx<'_>, block: &Block, b: &ButtonBlock) -> Fields {
    with_raw(
        block,
        [
            ("linkobject", object_value(ctx, b.linkobject.0.as_ref())),
            ("buttonlocal", json!(b.buttonlocal.get())),
        ],
    )
}

fn button_bar(ctx: &RenderCtx<'_>, block: &Block, b: &ButtonBarBlock) -> Fields {
    let buttons =
        structure(&b.buttons.0, "linkobject", |e| entry_link(ctx, e)).unwrap_or(Json::Null);
    with_raw(
        block,
        [("buttons", buttons), ("buttonlocal", json!(b.buttonlocal.get()))],
    )
}

fn icon_list(ctx: &RenderCtx<'_>, block: &Block, b: &IconListBlock) -> Result<Fields> {
    let list = structure(&b.list.0, "icon", |entry| {
        let file = entry
            .field("icon")
            .to_refs()
            .first()
            .and_then(|r| ctx.resolve_file(r));
        match file {
            Some(f) => icon(ctx, f),
            None => Ok(Json::Null),
        }
    })?;
    Ok(with_raw(block, [("list", list)]))
}

fn video(ctx: &RenderCtx<'_>, block: &Block, b: &VideoBlock) -> Fields {
    let file = b
        .file
        .first()
        .and_then(|r| ctx.resolve_file(r))
        .map(|f| media::video(ctx, f))
        .unwrap_or(Json::Null);
    let thumb = b
        .thumbnail
        .first()
        .and_then(|r| ctx.resolve_file(r))
        .map(|f| thumbnail(ctx, f))
        .unwrap_or(Json::Null);
    with_raw(
        block,
        [
            ("abovefold", json!(b.abovefold.get())),
            ("thumbnail", thumb),
            ("file", file),
        ],
    )
}

fn card(ctx: &RenderCtx<'_>, block: &Block, b: &CardBlock) -> Result<Fields> {
    let image = match b.image.first().and_then(|r| ctx.resolve_file(r)) {
        Some(f) => Json::Object(vector(ctx, f)?),
        None => Json::Null,
    };
    Ok(with_raw(
        block,
        [
            ("hovertoggle", json!(b.hovertoggle.get())),
            ("linktoggle", json!(b.linktoggle.get())),
            ("linkobject", object_value(ctx, b.linkobject.0.as_ref())),
            ("image", image),
        ],
    ))
}
