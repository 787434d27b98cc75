// crates/serve/src/sitemap.rs

//! `sitemap.xml` for the public frontend.
//!
//! URLs point at the site's `frontendUrl` rather than the API host. Each
//! listed page appears once per language with `xhtml:link` alternates.

use crate::index::is_cover_only_item;
use crate::tree::ContentTree;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::model::{Language, Page};
use html_escape::{encode_double_quoted_attribute, encode_text};

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">
"#;

fn in_sitemap(page: &Page, error_page: &str) -> bool {
    page.is_listed() && !is_cover_only_item(page) && page.id != error_page
}

/// Public URL of `page` in `lang`, rebased onto `frontend`.
fn public_url(tree: &dyn ContentTree, page: &Page, lang: Option<&Language>, frontend: &str) -> String {
    let url = tree.page_url(page, lang);
    if frontend.is_empty() {
        return url;
    }
    let path = url.strip_prefix(tree.base_url()).unwrap_or(&url);
    // A lone language never gets a prefix on the frontend.
    let path = match lang {
        Some(l) if tree.languages().len() == 1 => {
            let prefix = format!("/{}", l.code);
            match path.strip_prefix(prefix.as_str()) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_owned(),
                _ => path.to_owned(),
            }
        }
        _ => path.to_owned(),
    };
    format!("{frontend}{path}")
}

/// Render the sitemap, skipping unlisted pages, cover-only items and the
/// error page.
#[tracing::instrument(skip_all)]
pub fn sitemap(tree: &dyn ContentTree, error_page: &str) -> String {
    let site = tree.site().content_for(None);
    let frontend = site.field("frontendUrl").string();
    let frontend = frontend.trim().trim_end_matches('/');

    let langs: Vec<Option<&Language>> = match tree.languages() {
        [] => vec![None],
        all => all.iter().map(Some).collect(),
    };

    let mut out = String::from(HEADER);
    for page in tree.index().into_iter().filter(|p| in_sitemap(p, error_page)) {
        let lastmod = page
            .modified
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true));
        for lang in &langs {
            out.push_str("  <url>\n");
            out.push_str(&format!(
                "    <loc>{}</loc>\n",
                encode_text(&public_url(tree, page, *lang, frontend))
            ));
            if let Some(lastmod) = &lastmod {
                out.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
            }
            if langs.len() > 1 {
                for alt in langs.iter().flatten() {
                    out.push_str(&format!(
                        "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                        encode_double_quoted_attribute(&alt.code),
                        encode_double_quoted_attribute(&public_url(tree, page, Some(*alt), frontend)),
                    ));
                }
            }
            out.push_str("  </url>\n");
        }
    }
    out.push_str("</urlset>\n");
    out
}
