//! sitemap.xml generation.

use chrono::NaiveDate;

use super::xml_escape;
use crate::config::AppConfig;

const DEFAULT_CHANGEFREQ: &str = "weekly";
const DEFAULT_PRIORITY: f64 = 0.8;

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: String,
    pub priority: f64,
}

/// Build the sitemap entries for every configured page.
///
/// With no pages configured a single root entry is emitted so the document
/// is never empty.
pub fn sitemap_entries(config: &AppConfig, today: NaiveDate) -> Vec<SitemapEntry> {
    let origin = config.site_origin();
    let today = today.format("%Y-%m-%d").to_string();

    if config.pages.is_empty() {
        return vec![SitemapEntry { loc: page_loc(&origin, "/"), lastmod: today, changefreq: "daily".into(), priority: 1.0 }];
    }

    config
        .pages
        .iter()
        .map(|(path, page)| SitemapEntry {
            loc: page_loc(&origin, path),
            lastmod: page.lastmod.clone().unwrap_or_else(|| today.clone()),
            changefreq: page.changefreq.clone().unwrap_or_else(|| DEFAULT_CHANGEFREQ.into()),
            priority: page.priority.unwrap_or(DEFAULT_PRIORITY),
        })
        .collect()
}

/// Render the sitemap document for `today`.
pub fn sitemap_xml(config: &AppConfig, today: NaiveDate) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for entry in sitemap_entries(config, today) {
        out.push_str("  <url>\n");
        out.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&entry.loc)));
        out.push_str(&format!("    <lastmod>{}</lastmod>\n", xml_escape(&entry.lastmod)));
        out.push_str(&format!("    <changefreq>{}</changefreq>\n", xml_escape(&entry.changefreq)));
        out.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        out.push_str("  </url>\n");
    }

    out.push_str("</urlset>\n");
    out
}

/// Root maps to the bare origin; other paths are appended verbatim.
fn page_loc(origin: &str, path: &str) -> String {
    match (origin.is_empty(), path) {
        (true, _) => path.to_string(),
        (false, "/") => origin.to_string(),
        (false, path) if path.starts_with('/') => format!("{origin}{path}"),
        (false, path) => format!("{origin}/{path}"),
    }
}
