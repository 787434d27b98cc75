// crates/domain/src/block.rs

//! Typed block schemas.
//!
//! A block is stored as `{id, type, content, isHidden}`. The `type` tag picks
//! one of the [`BlockKind`] variants, each decoding only the fields its
//! serializer normalizes. The full content map stays on the [`Block`] so that
//! every other authored key is passed through untouched.

use crate::content::Content;
use crate::field::{to_array, FileRefs, Flag, LinkField, Ratio, Structure, Text};
use crate::layout::Layouts;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value as Json;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    /// The type tag exactly as authored.
    pub type_name: String,
    pub kind: BlockKind,
    pub content: Content,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Columns(ColumnsBlock),
    Grid(GridBlock),
    Image(ImageBlock),
    Vector(VectorBlock),
    Slider(SliderBlock),
    Gallery(GalleryBlock),
    Menu(MenuBlock),
    Button(ButtonBlock),
    ButtonBar(ButtonBarBlock),
    Text(TextBlock),
    IconList(IconListBlock),
    Code(CodeBlock),
    Video(VideoBlock),
    Card(CardBlock),
    /// Unrecognized type; content is emitted as authored.
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnsBlock {
    pub layout: Layouts,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridBlock {
    pub title: Json,
    pub grid: Layouts,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageBlock {
    pub image: FileRefs,
    pub ratio: Ratio,
    #[serde(rename = "ratiomobile")]
    pub ratio_mobile: Ratio,
    pub abovefold: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VectorBlock {
    pub image: FileRefs,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SliderBlock {
    pub images: FileRefs,
    pub ratio: Ratio,
    #[serde(rename = "ratiomobile")]
    pub ratio_mobile: Ratio,
    pub toggle: Flag,
    pub abovefold: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryBlock {
    pub images: FileRefs,
    pub ratio: Ratio,
    #[serde(rename = "ratiomobile")]
    pub ratio_mobile: Ratio,
    #[serde(rename = "layouttype")]
    pub layout_type: Json,
    pub lightbox: Flag,
    #[serde(rename = "viewmobile")]
    pub view_mobile: Json,
    #[serde(rename = "viewdesktop")]
    pub view_desktop: Json,
    #[serde(rename = "viewpaddingmobile")]
    pub view_padding_mobile: Json,
    #[serde(rename = "viewpaddingdesktop")]
    pub view_padding_desktop: Json,
    pub abovefold: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MenuBlock {
    pub nav: Structure,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ButtonBlock {
    pub linkobject: LinkField,
    pub buttonlocal: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ButtonBarBlock {
    pub buttons: Structure,
    pub buttonlocal: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    pub text: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IconListBlock {
    pub list: Structure,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeBlock {
    pub code: Text,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoBlock {
    pub file: FileRefs,
    pub thumbnail: FileRefs,
    pub abovefold: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CardBlock {
    pub hovertoggle: Flag,
    pub linktoggle: Flag,
    pub linkobject: LinkField,
    pub image: FileRefs,
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default)]
    content: Content,
    #[serde(rename = "isHidden", default)]
    hidden: Flag,
}

impl BlockKind {
    /// Pick the schema for a type tag and decode it from `content`.
    ///
    /// Falls back to [`BlockKind::Other`] when the tag is unknown or the
    /// schema cannot be decoded, so content is never dropped.
    pub fn decode(type_name: &str, content: &Content) -> BlockKind {
        fn typed<T: DeserializeOwned>(type_name: &str, content: &Content) -> Option<T> {
            match serde_json::from_value(Json::Object(content.as_map().clone())) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("block type {} did not decode, passing through: {}", type_name, e);
                    None
                }
            }
        }

        let kind = match type_name {
            "columns" => typed(type_name, content).map(BlockKind::Columns),
            "grid" => typed(type_name, content).map(BlockKind::Grid),
            "image" => typed(type_name, content).map(BlockKind::Image),
            "vector" => typed(type_name, content).map(BlockKind::Vector),
            "slider" => typed(type_name, content).map(BlockKind::Slider),
            "gallery" => typed(type_name, content).map(BlockKind::Gallery),
            "menu" => typed(type_name, content).map(BlockKind::Menu),
            "button" => typed(type_name, content).map(BlockKind::Button),
            "buttonBar" => typed(type_name, content).map(BlockKind::ButtonBar),
            "text" => typed(type_name, content).map(BlockKind::Text),
            "iconlist" => typed(type_name, content).map(BlockKind::IconList),
            "code" => typed(type_name, content).map(BlockKind::Code),
            "video" => typed(type_name, content).map(BlockKind::Video),
            "card" => typed(type_name, content).map(BlockKind::Card),
            _ => None,
        };
        kind.unwrap_or(BlockKind::Other)
    }
}

impl Block {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>, content: Content) -> Self {
        let type_name = type_name.into();
        let kind = BlockKind::decode(&type_name, &content);
        Self {
            id: id.into(),
            type_name,
            kind,
            content,
            hidden: false,
        }
    }

    pub fn from_json(value: Json) -> Option<Block> {
        match serde_json::from_value::<Block>(value) {
            Ok(b) => Some(b),
            Err(e) => {
                warn!("skipping malformed block: {}", e);
                None
            }
        }
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = RawBlock::deserialize(d)?;
        let mut block = Block::new(raw.id, raw.type_name, raw.content);
        block.hidden = raw.hidden.get();
        Ok(block)
    }
}

/// Visible blocks of a blocks field, in authored order.
pub fn parse_blocks(value: Option<&Json>) -> Vec<Block> {
    to_array(value)
        .into_iter()
        .filter_map(Block::from_json)
        .filter(|b| !b.hidden)
        .collect()
}

/// Blocks field usable inside typed schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blocks(pub Vec<Block>);

impl<'de> Deserialize<'de> for Blocks {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        Ok(Blocks(parse_blocks(Some(&v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_types_decode_into_their_schema() {
        let b = Block::from_json(json!({
            "id": "b1",
            "type": "button",
            "content": { "linkObject": { "link": "https://x.test" }, "buttonLocal": "true" }
        }))
        .unwrap();
        match &b.kind {
            BlockKind::Button(btn) => {
                assert!(btn.buttonlocal.get());
                assert!(btn.linkobject.0.is_some());
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(b.type_name, "button");
    }

    #[test]
    fn unknown_type_is_other_with_content_kept() {
        let b = Block::from_json(json!({
            "id": "q",
            "type": "quote",
            "content": { "text": "hi", "citation": "me" }
        }))
        .unwrap();
        assert_eq!(b.kind, BlockKind::Other);
        assert_eq!(b.content.get("citation"), Some(&json!("me")));
    }

    #[test]
    fn image_block_reads_ratios() {
        let b = Block::new(
            "i",
            "image",
            Content::from_json(json!({ "image": ["a.jpg"], "ratio": "4/3", "ratioMobile": "1/1" })),
        );
        let BlockKind::Image(img) = b.kind else {
            panic!("expected image");
        };
        assert_eq!(img.image.first(), Some("a.jpg"));
        assert_eq!(img.ratio.height_for(400), 300);
        assert_eq!(img.ratio_mobile.height_for(400), 400);
    }

    #[test]
    fn hidden_and_malformed_blocks_are_skipped() {
        let field = json!([
            { "id": "1", "type": "text", "content": { "text": "a" } },
            { "id": "2", "type": "text", "content": { "text": "b" }, "isHidden": true },
            "garbage",
            { "id": "3", "type": "code", "content": { "code": "fn main() {}" } }
        ]);
        let ids: Vec<_> = parse_blocks(Some(&field)).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn blocks_field_accepts_encoded_string() {
        let field = json!("[{\"id\":\"x\",\"type\":\"text\",\"content\":{}}]");
        assert_eq!(parse_blocks(Some(&field)).len(), 1);
    }
}
