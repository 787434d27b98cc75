// crates/domain/src/layout.rs

use crate::block::Blocks;
use crate::content::Content;
use crate::field::to_array;
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;
use tracing::warn;

/// Row of columns. `attrs` holds the styling attributes (background, spacing,
/// anchor, classes, attribute pairs) as authored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub id: String,
    pub attrs: Content,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Column {
    pub id: String,
    /// Fraction of the row, e.g. `"1/2"`.
    pub width: String,
    pub blocks: Blocks,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            id: String::new(),
            width: "1/1".to_owned(),
            blocks: Blocks::default(),
        }
    }
}

impl Column {
    /// Number of grid columns this column covers on a `columns`-wide grid.
    ///
    /// `"1/2"` on 12 columns spans 6. Unparsable parts count as 1 and a zero
    /// denominator is treated as 1.
    pub fn span(&self, columns: u32) -> u32 {
        let mut parts = self.width.split('/');
        let part = |p: Option<&str>| p.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(1);
        let a = part(parts.next());
        let b = part(parts.next()).max(1);
        columns.saturating_mul(a) / b
    }
}

/// Layout field usable inside typed schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layouts(pub Vec<Layout>);

impl Layouts {
    pub fn first(&self) -> Option<&Layout> {
        self.0.first()
    }
}

impl<'de> Deserialize<'de> for Layouts {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        Ok(Layouts(parse_layouts(Some(&v))))
    }
}

/// Layouts of a layout field, in authored order. Malformed rows are skipped.
pub fn parse_layouts(value: Option<&Json>) -> Vec<Layout> {
    to_array(value)
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<Layout>(v) {
            Ok(l) => Some(l),
            Err(e) => {
                warn!("skipping malformed layout: {}", e);
                None
            }
        })
        .collect()
}
