//! Link-preview crawler detection.
//!
//! Matching is a case-insensitive substring test of the `User-Agent` against
//! a fixed signature list. Classification happens before the cache key is
//! derived because the crawler profile forces its own output format.

use crate::profile::{ProfileSet, RenderProfile};

/// Lowercased `User-Agent` fragments of known preview crawlers.
pub const CRAWLER_SIGNATURES: &[&str] = &[
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "linkedinbot",
    "slackbot",
    "discordbot",
    "whatsapp",
    "telegrambot",
    "pinterest",
];

/// Outcome of classifying one request.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'a> {
    /// Matched signature, if the client is a known crawler.
    pub crawler: Option<&'static str>,
    pub profile: &'a RenderProfile,
}

impl Classification<'_> {
    pub fn is_crawler(&self) -> bool {
        self.crawler.is_some()
    }
}

/// Return the first crawler signature contained in `user_agent`.
pub fn crawler_signature(user_agent: &str) -> Option<&'static str> {
    let ua = user_agent.to_ascii_lowercase();
    CRAWLER_SIGNATURES.iter().copied().find(|sig| ua.contains(sig))
}

/// Pick the render profile for a request's declared client identity.
pub fn classify<'a>(user_agent: Option<&str>, profiles: &'a ProfileSet) -> Classification<'a> {
    match user_agent.and_then(crawler_signature) {
        Some(sig) => Classification { crawler: Some(sig), profile: &profiles.crawler },
        None => Classification { crawler: None, profile: &profiles.default },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OgImageConfig;
    use crate::format::ImageFormat;
    use crate::profile::ProfileKind;

    fn profiles() -> ProfileSet {
        ProfileSet::from_config(&OgImageConfig::default())
    }

    #[test]
    fn test_facebook_is_crawler() {
        let profiles = profiles();
        let ua = "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";
        let class = classify(Some(ua), &profiles);
        assert!(class.is_crawler());
        assert_eq!(class.crawler, Some("facebookexternalhit"));
        assert_eq!(class.profile.kind, ProfileKind::Crawler);
        assert_eq!(class.profile.format, ImageFormat::Jpeg);
        assert_eq!(class.profile.viewport, (1200, 630));
    }

    #[test]
    fn test_signatures_case_insensitive() {
        assert_eq!(crawler_signature("Mozilla/5.0 (compatible; Twitterbot/1.0)"), Some("twitterbot"));
        assert_eq!(crawler_signature("LinkedInBot/1.0 (compatible; Mozilla/5.0)"), Some("linkedinbot"));
        assert_eq!(crawler_signature("Slackbot-LinkExpanding 1.0"), Some("slackbot"));
        assert_eq!(crawler_signature("Mozilla/5.0 (compatible; Discordbot/2.0)"), Some("discordbot"));
        assert_eq!(crawler_signature("WhatsApp/2.23.20.0"), Some("whatsapp"));
    }

    #[test]
    fn test_browser_is_default() {
        let profiles = profiles();
        let ua = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";
        let class = classify(Some(ua), &profiles);
        assert!(!class.is_crawler());
        assert_eq!(class.profile.kind, ProfileKind::Default);
        assert_eq!(class.profile.format, ImageFormat::Webp);
    }

    #[test]
    fn test_missing_user_agent_is_default() {
        let profiles = profiles();
        let class = classify(None, &profiles);
        assert!(!class.is_crawler());
        assert_eq!(class.profile, &profiles.default);

        let class = classify(Some(""), &profiles);
        assert!(!class.is_crawler());
    }
}
