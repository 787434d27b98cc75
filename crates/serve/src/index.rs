// crates/serve/src/index.rs

use crate::cache::{cache_key, read_through, ApiCache, INDEX_NAMESPACE, INDEX_TTL_MINUTES};
use crate::tree::ContentTree;
use crate::Result;
use domain::model::{Language, Page};
use serde_json::{json, Map, Value as Json};

pub const ITEM_TEMPLATE: &str = "item";

/// Item pages flagged `coverOnly` only exist as cards on their section.
pub fn is_cover_only_item(page: &Page) -> bool {
    page.template == ITEM_TEMPLATE && page.content.field("coveronly").to_bool(false)
}

/// Route listing of every page in the site index.
pub fn index_listing(tree: &dyn ContentTree, lang: Option<&Language>) -> Json {
    let code = lang.map(|l| l.code.as_str());
    let entries = tree
        .index()
        .into_iter()
        .filter(|page| !is_cover_only_item(page))
        .map(|page| {
            let is_item = page.template == ITEM_TEMPLATE;
            let translations: Map<String, Json> = tree
                .languages()
                .iter()
                .map(|l| (l.code.clone(), json!(tree.uri(page, Some(&l.code)))))
                .collect();
            let parent = match (is_item, tree.parent(page)) {
                (true, Some(parent)) => json!(tree.uri(parent, code)),
                _ => Json::Null,
            };
            let cover_only = match is_item {
                true => json!(page.content.field("coveronly").to_bool(false)),
                false => Json::Null,
            };
            json!({
                "id": page.id,
                "uri": tree.uri(page, code),
                "intendedTemplate": page.template,
                "parent": parent,
                "coverOnly": cover_only,
                "translations": translations,
            })
        })
        .collect();
    Json::Array(entries)
}

/// [`index_listing`] behind the read-through cache.
#[tracing::instrument(skip_all)]
pub async fn cached_index(
    cache: &dyn ApiCache,
    tree: &dyn ContentTree,
    lang: Option<&Language>,
) -> Result<Json> {
    let key = cache_key(INDEX_NAMESPACE, lang);
    read_through(cache, &key, INDEX_TTL_MINUTES, || Ok(index_listing(tree, lang))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, page, tree, RecordingCache};

    #[test]
    fn cover_only_items_are_excluded() {
        let tree = fixture();
        let listing = index_listing(&tree, tree.language("en"));
        let ids: Vec<_> = listing
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(ids, vec!["home", "about", "blog", "blog/first", "z-error"]);
    }

    #[test]
    fn entry_shape() {
        let tree = fixture();
        let listing = index_listing(&tree, tree.language("de"));
        let about = &listing[1];
        assert_eq!(about["uri"], "ueber-uns");
        assert_eq!(about["intendedTemplate"], "default");
        assert_eq!(about["parent"], Json::Null);
        assert_eq!(about["coverOnly"], Json::Null);
        assert_eq!(about["translations"], json!({ "en": "about", "de": "ueber-uns" }));

        let item = &listing[3];
        assert_eq!(item["parent"], "blog");
        assert_eq!(item["coverOnly"], false);
    }

    #[tokio::test]
    async fn listing_is_cached_per_language_until_flushed() {
        let cache = RecordingCache::default();
        let site = fixture();

        let first = cached_index(&cache, &site, site.language("en")).await.unwrap();
        let again = cached_index(&cache, &site, site.language("en")).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(cache.sets(), vec![("index.en".to_owned(), INDEX_TTL_MINUTES)]);
        assert_eq!(INDEX_TTL_MINUTES, 10_080);

        cached_index(&cache, &site, site.language("de")).await.unwrap();
        assert_eq!(cache.sets().len(), 2);

        cache.flush().await;
        cached_index(&cache, &site, site.language("en")).await.unwrap();
        assert_eq!(cache.sets().len(), 3);
        assert_eq!(cache.sets()[2].0, "index.en");
    }

    #[tokio::test]
    async fn single_language_sites_use_the_default_key() {
        let cache = RecordingCache::default();
        let before = tree(vec![page("home", Some(1))]);
        let listing = cached_index(&cache, &before, None).await.unwrap();
        assert_eq!(listing.as_array().unwrap().len(), 1);
        assert_eq!(cache.sets(), vec![("index.default".to_owned(), INDEX_TTL_MINUTES)]);

        // Content changed but the cache was not flushed: the stored listing wins.
        let after = tree(vec![page("home", Some(1)), page("news", Some(2))]);
        let stale = cached_index(&cache, &after, None).await.unwrap();
        assert_eq!(stale, listing);

        cache.flush().await;
        let fresh = cached_index(&cache, &after, None).await.unwrap();
        assert_eq!(fresh.as_array().unwrap().len(), 2);
    }
}
