//! Color palette, filesystem locations, and user settings for boardwatch.
//!
//! The palette leans cold and muted, with a handful of accents for prices,
//! discounts, and warnings. Settings live in a plain `key = value` file under
//! the XDG config directory; a commented skeleton is written on first run.
use ratatui::style::Color;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::state::SortKey;

/// Application theme palette used by rendering code.
pub struct Theme {
    /// Primary background color for the canvas.
    pub base: Color,
    /// Slightly lighter background layer used behind panels.
    pub mantle: Color,
    /// Border color for blocks and modals.
    pub border: Color,
    /// Primary foreground text color.
    pub text: Color,
    /// Secondary text for less prominent content.
    pub subtext: Color,
    /// Muted text for captions and counters.
    pub faint: Color,
    /// Accent for the focused input and interactive highlights.
    pub accent: Color,
    /// Brand tags in the product list.
    pub brand: Color,
    /// Current prices.
    pub price: Color,
    /// Discount badges and staleness markers.
    pub warn: Color,
    /// Error borders and failure text.
    pub err: Color,
    /// Selection bar background.
    pub highlight: Color,
}

/// Construct a [`Color::Rgb`] from an 8-bit RGB triplet.
fn hex(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Return the application's palette.
pub fn theme() -> Theme {
    Theme {
        base: hex((0x16, 0x1a, 0x21)),
        mantle: hex((0x11, 0x14, 0x1a)),
        border: hex((0x3a, 0x42, 0x50)),
        text: hex((0xd5, 0xdc, 0xe6)),
        subtext: hex((0x9e, 0xa8, 0xb8)),
        faint: hex((0x6b, 0x75, 0x87)),
        accent: hex((0x7a, 0xc1, 0xe4)),
        brand: hex((0xc8, 0xa8, 0xe9)),
        price: hex((0x99, 0xd6, 0x9a)),
        warn: hex((0xe8, 0xc9, 0x7a)),
        err: hex((0xe8, 0x8b, 0x9a)),
        highlight: hex((0xaf, 0xbe, 0xe1)),
    }
}

/// Resolve an XDG base directory from environment or default to `$HOME` +
/// segments.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// XDG config directory for boardwatch (ensured to exist).
pub fn config_dir() -> PathBuf {
    let dir = xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join("boardwatch");
    let _ = fs::create_dir_all(&dir);
    dir
}

/// XDG cache directory for boardwatch (ensured to exist).
pub fn cache_dir() -> PathBuf {
    let dir = xdg_base_dir("XDG_CACHE_HOME", &[".cache"]).join("boardwatch");
    let _ = fs::create_dir_all(&dir);
    dir
}

/// Log directory under the config dir (ensured to exist).
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = fs::create_dir_all(&dir);
    dir
}

/// User-configurable application settings parsed from `settings.conf`.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Base URL of the catalog publisher.
    pub base_url: String,
    /// Products revealed per page of the list.
    pub page_size: usize,
    /// Initial sort key for the product list.
    pub sort_key: SortKey,
    /// Whether a catalog fetch is issued at startup.
    pub refresh_on_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://waljj123.github.io/snowboard-monitor".to_string(),
            page_size: crate::state::DEFAULT_PAGE_SIZE,
            sort_key: SortKey::Name,
            refresh_on_start: true,
        }
    }
}

/// Commented settings skeleton written on first run.
const SKELETON_SETTINGS: &str = "\
# boardwatch settings
#
# base_url = https://waljj123.github.io/snowboard-monitor
# page_size = 10
# sort = name            # name | brand | price_asc | price_desc
# refresh_on_start = true
";

/// Drop everything after an unquoted `#` or `//` marker.
fn strip_inline_comment(val: &str) -> &str {
    let cut = val
        .find('#')
        .into_iter()
        .chain(val.find("//"))
        .min()
        .unwrap_or(val.len());
    val[..cut].trim()
}

/// Parse settings file content. Unknown keys and malformed values are
/// ignored so a stale config never prevents startup.
fn parse_settings(content: &str) -> Settings {
    let mut out = Settings::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }
        let Some((raw_key, raw_val)) = trimmed.split_once('=') else {
            continue;
        };
        let key = raw_key.trim().to_lowercase().replace(['.', '-', ' '], "_");
        let val = strip_inline_comment(raw_val);
        match key.as_str() {
            "base_url" => {
                if !val.is_empty() {
                    out.base_url = val.trim_end_matches('/').to_string();
                }
            }
            "page_size" => {
                if let Ok(v) = val.parse::<usize>()
                    && v > 0
                {
                    out.page_size = v;
                }
            }
            "sort" | "sort_key" => {
                if let Some(k) = SortKey::from_config_key(val) {
                    out.sort_key = k;
                }
            }
            "refresh_on_start" => {
                let lv = val.to_ascii_lowercase();
                out.refresh_on_start = lv == "true" || lv == "1" || lv == "yes" || lv == "on";
            }
            _ => {}
        }
    }
    out
}

/// Load user settings from `settings.conf` under the config directory,
/// writing the commented skeleton when the file does not exist yet. Falls
/// back to [`Settings::default`] when unreadable.
pub fn settings() -> Settings {
    let path = config_dir().join("settings.conf");
    if !path.is_file() {
        let _ = fs::write(&path, SKELETON_SETTINGS);
    }
    match fs::read_to_string(&path) {
        Ok(content) => parse_settings(&content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_parses_to_defaults() {
        let parsed = parse_settings(SKELETON_SETTINGS);
        let defaults = Settings::default();
        assert_eq!(parsed.base_url, defaults.base_url);
        assert_eq!(parsed.page_size, defaults.page_size);
        assert_eq!(parsed.sort_key, defaults.sort_key);
        assert_eq!(parsed.refresh_on_start, defaults.refresh_on_start);
    }

    #[test]
    fn values_and_inline_comments() {
        let parsed = parse_settings(
            "base_url = https://boards.example.com/feed/   # mirror\n\
             page_size = 25\n\
             sort = price_desc // expensive first\n\
             refresh_on_start = no\n",
        );
        assert_eq!(parsed.base_url, "https://boards.example.com/feed");
        assert_eq!(parsed.page_size, 25);
        assert_eq!(parsed.sort_key, SortKey::PriceDesc);
        assert!(!parsed.refresh_on_start);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let parsed = parse_settings(
            "page_size = zero\npage_size = 0\nsort = fastest\nnot a line\nbase_url =\n",
        );
        let defaults = Settings::default();
        assert_eq!(parsed.page_size, defaults.page_size);
        assert_eq!(parsed.sort_key, defaults.sort_key);
        assert_eq!(parsed.base_url, defaults.base_url);
    }
}
