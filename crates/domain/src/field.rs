// crates/domain/src/field.rs

use crate::content::Content;
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

// ─────────────────────────────────────────────────────────────────────────────
// Field accessor
// ─────────────────────────────────────────────────────────────────────────────

/// Borrowed view of a single field value with the coercions the serializers
/// rely on. A missing field behaves like `null`.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a>(Option<&'a Json>);

impl<'a> Field<'a> {
    pub fn new(value: Option<&'a Json>) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> Option<&'a Json> {
        self.0
    }

    /// Raw value, `null` when missing.
    pub fn value(&self) -> Json {
        self.0.cloned().unwrap_or(Json::Null)
    }

    pub fn is_empty(&self) -> bool {
        is_empty_value(self.0)
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    pub fn to_bool(&self, default: bool) -> bool {
        to_bool(self.0, default)
    }

    /// String cast: `""` for null, scalars rendered, composites as JSON text.
    pub fn string(&self) -> String {
        to_text(self.0)
    }

    /// Non-empty string content, if any.
    pub fn str(&self) -> Option<&'a str> {
        match self.0 {
            Some(Json::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// The string cast, or `fallback` when that is empty.
    pub fn or(&self, fallback: &str) -> String {
        let s = self.string();
        if s.is_empty() {
            fallback.to_owned()
        } else {
            s
        }
    }

    /// Object field: a JSON object, or a string holding one.
    pub fn to_object(&self) -> Option<Content> {
        match self.0? {
            Json::Object(map) => Some(Content::new(map.clone())),
            Json::String(s) => match serde_json::from_str::<Json>(s) {
                Ok(Json::Object(map)) => Some(Content::new(map)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Structure field: each object entry becomes its own `Content`.
    pub fn to_structure(&self) -> Vec<Content> {
        to_array(self.0)
            .into_iter()
            .filter(Json::is_object)
            .map(Content::from_json)
            .collect()
    }

    /// File reference list.
    pub fn to_refs(&self) -> Vec<String> {
        to_refs(self.0)
    }

    /// Array field (blocks / layouts), accepting an encoded string as well.
    pub fn to_array(&self) -> Vec<Json> {
        to_array(self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Free coercion helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn is_empty_value(value: Option<&Json>) -> bool {
    match value {
        None | Some(Json::Null) => true,
        Some(Json::String(s)) => s.trim().is_empty(),
        Some(Json::Array(a)) => a.is_empty(),
        Some(Json::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

/// Boolean coercion used for every toggle field.
///
/// `"1" "true" "on" "yes"` are true and `"0" "false" "off" "no" ""` are false
/// (case-insensitive); numbers are true when non-zero. Anything else,
/// including a missing field, yields `default`.
pub fn to_bool(value: Option<&Json>, default: bool) -> bool {
    match value {
        Some(Json::Bool(b)) => *b,
        Some(Json::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(default),
        Some(Json::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => true,
            "0" | "false" | "off" | "no" | "" => false,
            _ => default,
        },
        _ => default,
    }
}

pub fn to_text(value: Option<&Json>) -> String {
    match value {
        None | Some(Json::Null) => String::new(),
        Some(Json::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn to_array(value: Option<&Json>) -> Vec<Json> {
    match value {
        Some(Json::Array(items)) => items.clone(),
        Some(Json::String(s)) if !s.trim().is_empty() => match serde_json::from_str::<Json>(s) {
            Ok(Json::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub fn to_refs(value: Option<&Json>) -> Vec<String> {
    match value {
        Some(Json::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Vec::new()
            } else if s.starts_with('[') {
                to_array(value)
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            } else {
                vec![s.to_owned()]
            }
        }
        Some(Json::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_owned())
            .collect(),
        _ => Vec::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient typed field values (used by the block schemas)
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle field; absent or unrecognized values are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag(pub bool);

impl Flag {
    pub fn get(self) -> bool {
        self.0
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        Ok(Flag(to_bool(Some(&v), false)))
    }
}

/// Files field: ordered list of file references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRefs(pub Vec<String>);

impl FileRefs {
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for FileRefs {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        Ok(FileRefs(to_refs(Some(&v))))
    }
}

/// String-cast field (`text`, `code`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text(pub String);

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        Ok(Text(to_text(Some(&v))))
    }
}

/// Structure field: list of entries, each a field map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure(pub Vec<Content>);

impl<'de> Deserialize<'de> for Structure {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        Ok(Structure(Field::new(Some(&v)).to_structure()))
    }
}

/// Link object field. `None` when the field is empty or not an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkField(pub Option<Content>);

impl<'de> Deserialize<'de> for LinkField {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        let field = Field::new(Some(&v));
        if field.is_empty() {
            return Ok(LinkField(None));
        }
        Ok(LinkField(field.to_object()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ratio + focus
// ─────────────────────────────────────────────────────────────────────────────

/// Display aspect ratio written as `"w/h"`.
///
/// A missing or unparsable height component leaves `height` empty, which the
/// crop math treats as a square.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ratio {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Ratio {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('/');
        let num = |p: Option<&str>| p.and_then(|s| s.trim().parse::<f64>().ok());
        let width = num(parts.next());
        let height = num(parts.next());
        Self { width, height }
    }

    pub fn parse_or(raw: &str, fallback: &str) -> Self {
        if raw.trim().is_empty() {
            Self::parse(fallback)
        } else {
            Self::parse(raw)
        }
    }

    /// `round(width / w * h)` when both parts are usable, else `width`.
    pub fn height_for(&self, width: u32) -> u32 {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0.0 && h >= 0.0 => {
                (f64::from(width) / w * h).round() as u32
            }
            _ => width,
        }
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(d)?;
        Ok(Ratio::parse(&to_text(Some(&v))))
    }
}

/// Focal point in percent, each axis in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub x: f64,
    pub y: f64,
}

impl Default for Focus {
    fn default() -> Self {
        Self::CENTER
    }
}

impl Focus {
    pub const CENTER: Focus = Focus { x: 50.0, y: 50.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Read the `focus` field of a file: `{"x": 0.25, "y": 0.6}` in fractions,
    /// either as an object or an encoded string. Axes written with a `%`
    /// suffix are already percentages, as is the plain `"25% 60%"` form.
    /// Missing axes fall back to the center.
    pub fn from_field(field: Field<'_>) -> Self {
        let Some(obj) = field.to_object() else {
            return field.str().and_then(parse_pair).unwrap_or(Self::CENTER);
        };
        let axis = |k: &str| {
            obj.get(k)
                .and_then(|v| match v {
                    Json::Number(n) => n.as_f64().map(|f| f * 100.0),
                    Json::String(s) => parse_axis(s),
                    _ => None,
                })
                .filter(|f: &f64| f.is_finite())
                .unwrap_or(50.0)
        };
        Self::new(axis("x"), axis("y"))
    }
}

/// One axis as a percentage: `"25%"` as written, a bare `"0.25"` as a
/// fraction.
fn parse_axis(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw.strip_suffix('%') {
        Some(percent) => percent.trim().parse().ok(),
        None => raw.parse::<f64>().ok().map(|f| f * 100.0),
    }
}

fn parse_pair(raw: &str) -> Option<Focus> {
    let mut parts = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let (x, y) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || !x.ends_with('%') || !y.ends_with('%') {
        return None;
    }
    let x = parse_axis(x).filter(|f| f.is_finite())?;
    let y = parse_axis(y).filter(|f| f.is_finite())?;
    Some(Focus::new(x, y))
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        50.0
    } else {
        v.clamp(0.0, 100.0)
    }
}
