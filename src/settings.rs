use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Error, Result};

pub const PREFERENCES_FILE: &str = "preferences.json";

const APP_DIR_NAME: &str = "isle-browser";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TabLayoutMode {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SearchEngine {
    #[default]
    Google,
    Bing,
    #[serde(alias = "Duckduckgo")]
    DuckDuckGo,
    Brave,
    Yahoo,
    Perplexity,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 6] = [
        Self::Google,
        Self::Bing,
        Self::DuckDuckGo,
        Self::Brave,
        Self::Yahoo,
        Self::Perplexity,
    ];

    pub fn query_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        format!(
            "https://{}{}?{}={}",
            self.host(),
            self.path(),
            self.query_param(),
            q
        )
    }

    fn host(&self) -> &'static str {
        match self {
            Self::Google => "www.google.com",
            Self::Bing => "www.bing.com",
            Self::DuckDuckGo => "duckduckgo.com",
            Self::Brave => "search.brave.com",
            Self::Yahoo => "search.yahoo.com",
            Self::Perplexity => "www.perplexity.ai",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "/",
            _ => "/search",
        }
    }

    fn query_param(&self) -> &'static str {
        match self {
            Self::Yahoo => "p",
            _ => "q",
        }
    }

    /// Returns the decoded query if `url` is a result page of this engine.
    pub fn extract_query(&self, url: &Url) -> Option<String> {
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if url.host_str()? != self.host() || url.path() != self.path() {
            return None;
        }
        url.query_pairs()
            .find(|(key, _)| key == self.query_param())
            .map(|(_, value)| value.into_owned())
            .filter(|q| !q.is_empty())
    }
}

/// An sRGB color parsed from `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in 0..=1, Rec. 709 weights on the raw channels.
    pub fn luminance(&self) -> f64 {
        (0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b))
            / 255.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
    Background(Rgb),
}

impl Theme {
    pub fn is_light(&self) -> bool {
        match self {
            Self::Light => true,
            Self::Dark => false,
            Self::Background(color) => color.luminance() > 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "PreferencesFile", into = "PreferencesFile")]
pub struct Preferences {
    pub tab_mode: TabLayoutMode,
    pub theme: Theme,
    pub bottom_bar_height: Option<u32>,
    pub search_engine: SearchEngine,
}

// On-disk layout. `background_color` wins over `light_mode` when it parses.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct PreferencesFile {
    tab_mode: TabLayoutMode,
    light_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bottom_bar_height: Option<u32>,
    search_engine: SearchEngine,
}

impl From<PreferencesFile> for Preferences {
    fn from(file: PreferencesFile) -> Self {
        let background = file.background_color.as_deref().and_then(|raw| {
            let parsed = Rgb::parse_hex(raw);
            if parsed.is_none() {
                log::warn!("[Preferences] Ignoring invalid background color {:?}", raw);
            }
            parsed
        });
        let theme = match background {
            Some(color) => Theme::Background(color),
            None if file.light_mode => Theme::Light,
            None => Theme::Dark,
        };
        Self {
            tab_mode: file.tab_mode,
            theme,
            bottom_bar_height: file.bottom_bar_height,
            search_engine: file.search_engine,
        }
    }
}

impl From<Preferences> for PreferencesFile {
    fn from(prefs: Preferences) -> Self {
        Self {
            tab_mode: prefs.tab_mode,
            light_mode: prefs.theme.is_light(),
            background_color: match prefs.theme {
                Theme::Background(color) => Some(color.to_hex()),
                Theme::Light | Theme::Dark => None,
            },
            bottom_bar_height: prefs.bottom_bar_height,
            search_engine: prefs.search_engine,
        }
    }
}

impl Preferences {
    /// `<config dir>/isle-browser/preferences.json`, for runs outside the shell.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(PREFERENCES_FILE))
            .ok_or(Error::NoDataDir)
    }

    /// Never fails: a missing or unreadable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("[Preferences] No file at {:?}, using defaults", path);
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("[Preferences] Failed to parse {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("[Preferences] Failed to read {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        fs::write(&tmp_path, json).map_err(|e| Error::io(&tmp_path, e))?;
        fs::rename(&tmp_path, path).map_err(|e| Error::io(path, e))?;

        log::debug!("[Preferences] Saved to {:?}", path);
        Ok(())
    }

    pub fn light_mode(&self) -> bool {
        self.theme.is_light()
    }
}
