//! Pure SEO document generators.
//!
//! Each generator is a function of the resolved `AppConfig` (plus the current
//! date or request path where needed); HTTP wiring lives in the server crate.

pub mod head;
pub mod manifest;
pub mod robots;
pub mod sitemap;

pub use head::{HeadTags, LinkTag, MetaTag, PageSeo, build_head, resolve_page};
pub use manifest::{WebManifest, web_manifest};
pub use robots::robots_txt;
pub use sitemap::{SitemapEntry, sitemap_entries, sitemap_xml};

/// Escape text for inclusion in XML element content.
pub(crate) fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
