// crates/serve/src/attrs.rs

use domain::field::to_array;
use serde_json::{Map, Value as Json};

/// Turn an authored attribute list into a map.
///
/// The input is a sequence of `{attribute, value}` pairs (or a string
/// holding one). The string `"true"` becomes boolean `true`; every other
/// value is kept verbatim. Used for block `metadata.attributes` and for
/// layout `attributes` alike. A value that is already a map is returned as
/// is; anything else yields an empty map.
pub fn coerce_attributes(value: &Json) -> Json {
    if value.is_object() {
        return value.clone();
    }
    let mut out = Map::new();
    for pair in to_array(Some(value)) {
        let Some(name) = pair.get("attribute").and_then(Json::as_str) else {
            continue;
        };
        let v = match pair.get("value") {
            Some(Json::String(s)) if s == "true" => Json::Bool(true),
            Some(v) => v.clone(),
            None => Json::Null,
        };
        out.insert(name.to_owned(), v);
    }
    Json::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn true_strings_become_booleans() {
        let attrs = json!([
            { "attribute": "data-open", "value": "true" },
            { "attribute": "data-closed", "value": "false" },
            { "attribute": "aria-label", "value": "Menu" },
            { "attribute": "data-count", "value": 3 }
        ]);
        assert_eq!(
            coerce_attributes(&attrs),
            json!({
                "data-open": true,
                "data-closed": "false",
                "aria-label": "Menu",
                "data-count": 3
            })
        );
    }

    #[test]
    fn only_exact_lowercase_true_is_coerced() {
        let attrs = json!([{ "attribute": "a", "value": "TRUE" }, { "attribute": "b", "value": " true" }]);
        assert_eq!(coerce_attributes(&attrs), json!({ "a": "TRUE", "b": " true" }));
    }

    #[test]
    fn empty_and_odd_inputs() {
        assert_eq!(coerce_attributes(&Json::Null), json!({}));
        assert_eq!(coerce_attributes(&json!("")), json!({}));
        assert_eq!(coerce_attributes(&json!([{ "value": "x" }])), json!({}));
        assert_eq!(coerce_attributes(&json!({ "k": "v" })), json!({ "k": "v" }));
        assert_eq!(
            coerce_attributes(&json!("[{\"attribute\":\"x\",\"value\":\"true\"}]")),
            json!({ "x": true })
        );
    }
}
