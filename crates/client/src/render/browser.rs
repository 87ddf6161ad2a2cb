//! Chrome/Chromium executable discovery and launch arguments.

use std::path::{Path, PathBuf};

use seokit_core::config::BrowserSettings;

/// Install locations probed when no executable is configured.
const WELL_KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/snap/bin/chromium",
];

const BASE_ARGS: &[&str] = &["--hide-scrollbars", "--disable-gpu", "--disable-dev-shm-usage"];

/// Locate a browser executable.
///
/// Order: configured path (which already includes `CHROME_PATH`), then the
/// first well-known location that exists. `None` leaves detection to
/// chromiumoxide.
pub fn find_executable(settings: &BrowserSettings) -> Option<PathBuf> {
    find_executable_with(settings, Path::exists)
}

fn find_executable_with(settings: &BrowserSettings, exists: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    if let Some(path) = &settings.executable {
        return Some(path.clone());
    }

    WELL_KNOWN_PATHS.iter().map(Path::new).find(|p| exists(p)).map(Path::to_path_buf)
}

/// Command-line arguments for a headless capture.
pub fn launch_args(settings: &BrowserSettings) -> Vec<String> {
    let mut args: Vec<String> = BASE_ARGS.iter().map(|a| a.to_string()).collect();
    if !settings.sandbox {
        args.push("--no-sandbox".into());
    }
    args.extend(settings.args.iter().cloned());
    args
}
