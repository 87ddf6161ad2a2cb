//! Web app manifest generation.

use serde::Serialize;

use crate::config::{AppConfig, ManifestIcon};

/// The `site.webmanifest` document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub display: String,
    pub background_color: String,
    pub theme_color: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<ManifestIcon>,
}

pub fn web_manifest(config: &AppConfig) -> WebManifest {
    let manifest = &config.webmanifest;
    WebManifest {
        name: config.site.name.clone(),
        short_name: config.site.name.clone(),
        description: config.site.description.clone(),
        start_url: manifest.start_url.clone(),
        display: manifest.display.clone(),
        background_color: manifest.background_color.clone(),
        theme_color: manifest.theme_color.clone(),
        icons: manifest.icons.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_site() {
        let mut config = AppConfig::default();
        config.site.name = "Acme".into();
        config.site.description = "Widgets".into();

        let json = serde_json::to_value(web_manifest(&config)).unwrap();
        assert_eq!(json["name"], "Acme");
        assert_eq!(json["short_name"], "Acme");
        assert_eq!(json["description"], "Widgets");
        assert_eq!(json["start_url"], "/");
        assert_eq!(json["display"], "standalone");
        assert_eq!(json["theme_color"], "#000000");
        assert!(json.get("icons").is_none());
    }

    #[test]
    fn test_manifest_icons() {
        let mut config = AppConfig::default();
        config.webmanifest.icons.push(ManifestIcon {
            src: "/icon-192.png".into(),
            sizes: "192x192".into(),
            mime_type: "image/png".into(),
            purpose: None,
        });

        let json = serde_json::to_value(web_manifest(&config)).unwrap();
        assert_eq!(json["icons"][0]["src"], "/icon-192.png");
        assert_eq!(json["icons"][0]["type"], "image/png");
        assert!(json["icons"][0].get("purpose").is_none());
    }
}
