//! robots.txt generation.

use crate::config::AppConfig;

/// Document served when SEO is globally disabled.
pub const DISALLOW_ALL: &str = "User-Agent: *\nDisallow: /\n";

/// SEO scrapers blocked outright.
const BLOCKED_AGENTS: &[&str] = &["AhrefsBot", "SemrushBot", "DotBot"];

/// Render the crawl-policy document.
///
/// When OG generation is enabled its route is explicitly allowed so preview
/// crawlers that honour robots.txt can still fetch images under a
/// disallowed `/api/` prefix.
pub fn robots_txt(config: &AppConfig) -> String {
    if !config.site.enabled {
        return DISALLOW_ALL.to_string();
    }

    let robots = &config.robots;
    let mut out = String::from("User-Agent: *\nAllow: /\n");

    if config.og_image.enabled {
        out.push_str(&format!("Allow: {}\n", config.og_image.route));
    }
    for path in &robots.disallow {
        out.push_str(&format!("Disallow: {path}\n"));
    }

    if robots.sitemap {
        out.push_str(&format!("\nSitemap: {}{}\n", config.site_origin(), robots.sitemap_path));
    }

    out.push_str("\nCrawl-delay: 1\n");

    for agent in BLOCKED_AGENTS {
        out.push_str(&format!("\nUser-Agent: {agent}\nDisallow: /\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use robotstxt_rs::RobotsTxt;

    fn enabled_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.site.url = "https://x.test".into();
        config
    }

    #[test]
    fn test_disabled_blocks_everything() {
        let mut config = AppConfig::default();
        config.site.enabled = false;
        assert_eq!(robots_txt(&config), "User-Agent: *\nDisallow: /\n");
    }

    #[test]
    fn test_enabled_layout() {
        let body = robots_txt(&enabled_config());
        assert!(body.starts_with("User-Agent: *\nAllow: /\nDisallow: /api/\nDisallow: /admin/\n"));
        assert!(body.contains("\nSitemap: https://x.test/sitemap.xml\n"));
        assert!(body.contains("\nCrawl-delay: 1\n"));
        assert!(body.contains("User-Agent: AhrefsBot\nDisallow: /\n"));
        assert!(body.contains("User-Agent: SemrushBot\nDisallow: /\n"));
        assert!(body.ends_with("User-Agent: DotBot\nDisallow: /\n"));
    }

    #[test]
    fn test_sitemap_line_follows_toggle() {
        let mut config = enabled_config();
        config.robots.sitemap = false;
        assert!(!robots_txt(&config).contains("Sitemap:"));
    }

    #[test]
    fn test_custom_sitemap_path() {
        let mut config = enabled_config();
        config.robots.sitemap_path = "/sitemap-index.xml".into();
        assert!(robots_txt(&config).contains("Sitemap: https://x.test/sitemap-index.xml"));
    }

    #[test]
    fn test_og_route_allowed() {
        let mut config = enabled_config();
        assert!(!robots_txt(&config).contains("Allow: /api/og"));

        config.og_image.enabled = true;
        assert!(robots_txt(&config).contains("Allow: /api/og\n"));
    }

    #[test]
    fn test_parses_as_expected() {
        let body = robots_txt(&enabled_config());
        let robots = RobotsTxt::parse(&body);
        assert!(robots.can_fetch("Googlebot", "https://x.test/about"));
        assert!(!robots.can_fetch("Googlebot", "https://x.test/admin/users"));
        assert!(!robots.can_fetch("AhrefsBot", "https://x.test/about"));
    }

    #[test]
    fn test_disabled_parses_as_block_all() {
        let robots = RobotsTxt::parse(DISALLOW_ALL);
        assert!(!robots.can_fetch("Googlebot", "https://x.test/"));
    }
}
