// crates/serve/src/layout.rs

use crate::attrs::coerce_attributes;
use crate::block::serialize_blocks;
use crate::ctx::RenderCtx;
use crate::Result;
use domain::layout::{Column, Layout};
use serde_json::{json, Map, Value as Json};

/// Grid width a column span is measured against.
pub const GRID_COLUMNS: u32 = 12;

/// Styling keys copied from the layout attributes as authored.
const STYLE_KEYS: [&str; 17] = [
    "anchor",
    "classes",
    "attributes",
    "backgroundContainer",
    "backgroundHeight",
    "backgroundColor",
    "backgroundContainerColor",
    "backgroundPadding",
    "backgroundAlignVertical",
    "backgroundAlignItemsVertical",
    "backgroundAlignHorizontal",
    "backgroundArrowColor",
    "backgroundArrowSize",
    "spacingMobileTop",
    "spacingMobileBottom",
    "spacingDesktopTop",
    "spacingDesktopBottom",
];

pub fn serialize_columns(ctx: &RenderCtx<'_>, columns: &[Column], nested: bool) -> Result<Vec<Json>> {
    columns
        .iter()
        .map(|column| {
            let mut out = Map::new();
            out.insert("id".into(), json!(column.id));
            out.insert("width".into(), json!(column.width));
            out.insert("span".into(), json!(column.span(GRID_COLUMNS)));
            if nested {
                out.insert("nested".into(), Json::Bool(true));
            }
            out.insert("blocks".into(), Json::Array(serialize_blocks(ctx, &column.blocks.0)?));
            Ok(Json::Object(out))
        })
        .collect()
}

/// Layout dictionary with `attributes` left as authored.
pub fn serialize_layout(ctx: &RenderCtx<'_>, layout: &Layout) -> Result<Json> {
    let mut out = Map::new();
    out.insert("id".into(), json!(layout.id));
    for key in STYLE_KEYS {
        out.insert(key.to_owned(), layout.attrs.field(key).value());
    }
    out.insert(
        "backgroundArrow".into(),
        json!(layout.attrs.field("backgroundArrow").to_bool(false)),
    );
    out.insert(
        "content".into(),
        json!({ "columns": serialize_columns(ctx, &layout.columns, false)? }),
    );
    Ok(Json::Object(out))
}

/// Serialize a whole region (`layout`, `layoutFooter`, `layoutPre`,
/// `layoutPost`). Attributes become a map on every layout.
pub fn serialize_region(ctx: &RenderCtx<'_>, layouts: &[Layout]) -> Result<Vec<Json>> {
    layouts
        .iter()
        .map(|layout| {
            let mut value = serialize_layout(ctx, layout)?;
            if let Some(attrs) = value.get_mut("attributes") {
                *attrs = coerce_attributes(attrs);
            }
            Ok(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, StubMedia};
    use crate::tree::ContentTree;
    use domain::layout::parse_layouts;

    #[test]
    fn layout_dictionary() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let layouts = parse_layouts(Some(&json!([{
            "id": "l1",
            "attrs": {
                "anchor": "intro",
                "backgroundColor": "#eee",
                "backgroundArrow": "true",
                "attributes": [{ "attribute": "data-dark", "value": "true" }]
            },
            "columns": [{ "id": "c1", "width": "1/2", "blocks": [
                { "id": "t", "type": "text", "content": { "text": "hi" } }
            ]}]
        }])));

        let raw = serialize_layout(&ctx, &layouts[0]).unwrap();
        assert_eq!(raw["attributes"][0]["attribute"], "data-dark");

        let region = serialize_region(&ctx, &layouts).unwrap();
        let l = &region[0];
        assert_eq!(l["id"], "l1");
        assert_eq!(l["anchor"], "intro");
        assert_eq!(l["backgroundColor"], "#eee");
        assert_eq!(l["backgroundArrow"], true);
        assert_eq!(l["spacingDesktopBottom"], Json::Null);
        assert_eq!(l["attributes"], json!({ "data-dark": true }));
        let col = &l["content"]["columns"][0];
        assert_eq!(col["span"], 6);
        assert!(col.get("nested").is_none());
        assert_eq!(col["blocks"][0]["content"]["text"], "hi");
    }

    #[test]
    fn layouts_without_attributes_get_an_empty_map() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let layouts = parse_layouts(Some(&json!([{ "id": "bare" }])));
        let region = serialize_region(&ctx, &layouts).unwrap();
        assert_eq!(region[0]["attributes"], json!({}));
        assert_eq!(region[0]["backgroundArrow"], false);
        assert_eq!(region[0]["content"]["columns"], json!([]));
    }

    #[test]
    fn site_footer_region() {
        let tree = fixture();
        let ctx = RenderCtx::new(&tree, &StubMedia, None);
        let layouts = parse_layouts(tree.site().content.get("layoutFooter"));
        let region = serialize_region(&ctx, &layouts).unwrap();
        assert_eq!(region[0]["attributes"], json!({ "data-footer": true }));
    }
}
