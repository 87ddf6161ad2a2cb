//! Per-page `<head>` metadata.
//!
//! [`resolve_page`] layers site defaults, the `pages` table and explicit
//! per-request overrides into a [`PageSeo`]; [`build_head`] turns that into
//! the meta/link/JSON-LD tags a renderer injects into the document head.

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::config::{AppConfig, PageType, SeoFields};

/// Dimensions advertised for every share image.
const IMAGE_WIDTH: &str = "1200";
const IMAGE_HEIGHT: &str = "630";

const MANIFEST_HREF: &str = "/site.webmanifest";

/// Fully resolved SEO values for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSeo {
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    /// Explicit image only; fallbacks are applied by [`build_head`].
    pub image: Option<String>,
    pub url: String,
    pub page_type: PageType,
    pub author: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub site_name: String,
    pub locale: String,
    pub alternate_locales: Vec<String>,
    pub noindex: bool,
    pub nofollow: bool,
    pub canonical: Option<String>,
    pub structured_data: Option<Value>,
}

/// A `<meta>` element keyed by either `name` or `property`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    pub content: String,
}

impl MetaTag {
    fn name(name: &str, content: impl Into<String>) -> Self {
        Self { name: Some(name.to_string()), property: None, content: content.into() }
    }

    fn property(property: &str, content: impl Into<String>) -> Self {
        Self { name: None, property: Some(property.to_string()), content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTag {
    pub rel: String,
    pub href: String,
}

/// Everything injected into a page's `<head>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadTags {
    pub title: String,
    pub meta: Vec<MetaTag>,
    pub links: Vec<LinkTag>,
    /// Serialized `application/ld+json` script bodies.
    pub json_ld: Vec<String>,
}

impl HeadTags {
    /// First meta tag with the given `name` or `property`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|m| m.name.as_deref() == Some(key) || m.property.as_deref() == Some(key))
            .map(|m| m.content.as_str())
    }
}

/// Resolve SEO values for `path`.
///
/// Precedence, lowest to highest: site defaults, `pages[path]`, `overrides`.
pub fn resolve_page(config: &AppConfig, path: &str, overrides: &SeoFields) -> PageSeo {
    let path = normalize_path(path);
    let mut fields = config.pages.get(&path).map(|p| p.seo.clone()).unwrap_or_default();
    layer(&mut fields, overrides);

    let site = &config.site;
    let origin = config.site_origin();
    let url = fields.url.take().unwrap_or_else(|| format!("{origin}{path}"));

    PageSeo {
        title: fields.title,
        description: fields.description,
        keywords: fields.keywords,
        image: fields.image.filter(|s| !s.is_empty()),
        url,
        page_type: fields.page_type.unwrap_or(site.default_type),
        author: fields.author,
        published_time: fields.published_time,
        modified_time: fields.modified_time,
        site_name: fields.site_name.unwrap_or_else(|| site.name.clone()),
        locale: fields.locale.unwrap_or_else(|| site.locale.clone()),
        alternate_locales: fields.alternate_locales,
        noindex: fields.noindex,
        nofollow: fields.nofollow,
        canonical: fields.canonical,
        structured_data: fields.structured_data,
        path,
    }
}

/// Build the head tags for a resolved page.
pub fn build_head(config: &AppConfig, page: &PageSeo) -> HeadTags {
    let seo_enabled = config.site.enabled;
    let index = seo_enabled && !page.noindex;
    let follow = seo_enabled && !page.nofollow;

    let title = page.title.clone().unwrap_or_default();
    let description = page.description.clone().unwrap_or_default();
    let alt = page.title.clone().unwrap_or_else(|| page.site_name.clone());
    let og_url = page.canonical.clone().unwrap_or_else(|| page.url.clone());
    let image = share_image(config, page);

    let mut meta = vec![MetaTag::name("description", description.as_str())];

    if !page.keywords.is_empty() {
        meta.push(MetaTag::name("keywords", page.keywords.join(", ")));
    }
    if let Some(author) = &page.author {
        meta.push(MetaTag::name("author", author.as_str()));
    }
    meta.push(MetaTag::name(
        "robots",
        format!("{}, {}", if index { "index" } else { "noindex" }, if follow { "follow" } else { "nofollow" }),
    ));

    meta.extend([
        MetaTag::property("og:title", title.as_str()),
        MetaTag::property("og:description", description.as_str()),
        MetaTag::property("og:type", page.page_type.as_str()),
        MetaTag::property("og:url", og_url.as_str()),
        MetaTag::property("og:site_name", page.site_name.as_str()),
        MetaTag::property("og:locale", page.locale.as_str()),
    ]);
    if let Some(image) = &image {
        meta.extend([
            MetaTag::property("og:image", image.as_str()),
            MetaTag::property("og:image:width", IMAGE_WIDTH),
            MetaTag::property("og:image:height", IMAGE_HEIGHT),
            MetaTag::property("og:image:alt", alt.as_str()),
        ]);
    }

    meta.extend([
        MetaTag::name("twitter:card", "summary_large_image"),
        MetaTag::name("twitter:title", title.as_str()),
        MetaTag::name("twitter:description", description.as_str()),
    ]);
    if let Some(image) = &image {
        meta.push(MetaTag::name("twitter:image", image.as_str()));
        meta.push(MetaTag::name("twitter:image:alt", alt.as_str()));
    }

    let twitter = &config.social.twitter;
    if let Some(site) = &twitter.site {
        meta.push(MetaTag::name("twitter:site", site.as_str()));
    }
    if let Some(creator) = &twitter.creator {
        meta.push(MetaTag::name("twitter:creator", creator.as_str()));
    }

    if page.page_type == PageType::Article {
        if let Some(author) = &page.author {
            meta.push(MetaTag::property("article:author", author.as_str()));
        }
        if let Some(published) = &page.published_time {
            meta.push(MetaTag::property("article:published_time", published.as_str()));
        }
        if let Some(modified) = &page.modified_time {
            meta.push(MetaTag::property("article:modified_time", modified.as_str()));
        }
    }

    for locale in &page.alternate_locales {
        meta.push(MetaTag::property("og:locale:alternate", locale.as_str()));
    }

    if let Some(app_id) = &config.social.facebook.app_id {
        meta.push(MetaTag::property("fb:app_id", app_id.as_str()));
    }

    let links = vec![
        LinkTag { rel: "canonical".into(), href: og_url },
        LinkTag { rel: "manifest".into(), href: MANIFEST_HREF.into() },
    ];

    let json_ld = match &page.structured_data {
        Some(Value::Array(items)) => items.iter().map(Value::to_string).collect(),
        Some(value) => vec![value.to_string()],
        None => Vec::new(),
    };

    HeadTags { title, meta, links, json_ld }
}

/// Share image: explicit image, then the OG endpoint, then the site default.
fn share_image(config: &AppConfig, page: &PageSeo) -> Option<String> {
    let origin = config.site_origin();

    if let Some(image) = &page.image {
        return Some(absolute(&origin, image));
    }
    if config.og_image.enabled {
        let encoded: String = form_urlencoded::byte_serialize(page.path.as_bytes()).collect();
        return Some(format!("{origin}{}?path={encoded}", config.og_image.route));
    }

    let default = config.site.default_image.trim();
    if default.is_empty() { None } else { Some(absolute(&origin, default)) }
}

fn absolute(origin: &str, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else if image.starts_with('/') {
        format!("{origin}{image}")
    } else {
        format!("{origin}/{image}")
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Overlay the set fields of `top` onto `base`.
fn layer(base: &mut SeoFields, top: &SeoFields) {
    fn pick<T: Clone>(base: &mut Option<T>, top: &Option<T>) {
        if top.is_some() {
            base.clone_from(top);
        }
    }

    pick(&mut base.title, &top.title);
    pick(&mut base.description, &top.description);
    pick(&mut base.image, &top.image);
    pick(&mut base.url, &top.url);
    pick(&mut base.page_type, &top.page_type);
    pick(&mut base.author, &top.author);
    pick(&mut base.published_time, &top.published_time);
    pick(&mut base.modified_time, &top.modified_time);
    pick(&mut base.site_name, &top.site_name);
    pick(&mut base.locale, &top.locale);
    pick(&mut base.canonical, &top.canonical);
    pick(&mut base.structured_data, &top.structured_data);

    if !top.keywords.is_empty() {
        base.keywords.clone_from(&top.keywords);
    }
    if !top.alternate_locales.is_empty() {
        base.alternate_locales.clone_from(&top.alternate_locales);
    }
    base.noindex |= top.noindex;
    base.nofollow |= top.nofollow;
}
