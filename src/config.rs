//! Settings and theme store
//!
//! User-visible appearance settings persisted as JSON under
//! `~/.config/herminal/settings.json`, plus the built-in preset theme
//! catalog. Settings are advisory for rendering; emulation correctness
//! never depends on them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Cursor rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Beam,
}

/// Persisted appearance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background color as `#rrggbb`
    pub background_color: String,
    /// Text color as `#rrggbb`
    pub text_color: String,
    /// Selection highlight color as `#rrggbb`
    pub selection_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub cursor_style: CursorStyle,
    /// Window opacity, 10-100
    pub opacity_percent: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_color: "#1a0a2e".to_string(),
            text_color: "#e0d0ff".to_string(),
            selection_color: "#6a4c93".to_string(),
            font_family: "monospace".to_string(),
            font_size: 11,
            cursor_style: CursorStyle::Block,
            opacity_percent: 100,
        }
    }
}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location, falling back to defaults on any
    /// missing or unreadable file
    pub fn load_or_default() -> Self {
        if let Some(path) = default_settings_path() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(settings) => return settings,
                    Err(e) => {
                        tracing::warn!(error = %e, path = %path.display(), "failed to load settings");
                    }
                }
            }
        }
        Self::default()
    }

    /// Apply a preset theme's colors, leaving font and cursor settings alone
    pub fn apply_theme(&mut self, theme: &Theme) {
        self.background_color = theme.background.to_string();
        self.text_color = theme.text.to_string();
        self.selection_color = theme.selection.to_string();
    }
}

/// Default settings file location: `~/.config/herminal/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("herminal")
            .join("settings.json")
    })
}

/// Settings store error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A preset color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Stable identifier used for lookup
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub background: &'static str,
    pub text: &'static str,
    pub selection: &'static str,
}

/// The built-in theme catalog
pub const THEMES: &[Theme] = &[
    Theme {
        id: "purple",
        name: "Purple Night",
        background: "#1a0a2e",
        text: "#e0d0ff",
        selection: "#6a4c93",
    },
    Theme {
        id: "ocean",
        name: "Ocean",
        background: "#001f3f",
        text: "#7fdbff",
        selection: "#0074d9",
    },
    Theme {
        id: "forest",
        name: "Forest",
        background: "#0d1f0d",
        text: "#90ee90",
        selection: "#2d5a2d",
    },
    Theme {
        id: "fire",
        name: "Fire",
        background: "#1a0a00",
        text: "#ffcc99",
        selection: "#cc3300",
    },
    Theme {
        id: "sunset",
        name: "Sunset",
        background: "#2d1b2e",
        text: "#ffb347",
        selection: "#ff6b9d",
    },
    Theme {
        id: "dracula",
        name: "Dracula",
        background: "#282a36",
        text: "#f8f8f2",
        selection: "#44475a",
    },
    Theme {
        id: "monokai",
        name: "Monokai",
        background: "#272822",
        text: "#f8f8f2",
        selection: "#49483e",
    },
    Theme {
        id: "solarized_dark",
        name: "Solarized Dark",
        background: "#002b36",
        text: "#839496",
        selection: "#073642",
    },
    Theme {
        id: "nord",
        name: "Nord",
        background: "#2e3440",
        text: "#d8dee9",
        selection: "#434c5e",
    },
    Theme {
        id: "gruvbox",
        name: "Gruvbox",
        background: "#282828",
        text: "#ebdbb2",
        selection: "#504945",
    },
    Theme {
        id: "tokyo_night",
        name: "Tokyo Night",
        background: "#1a1b26",
        text: "#c0caf5",
        selection: "#414868",
    },
    Theme {
        id: "cyberpunk",
        name: "Cyberpunk",
        background: "#0a0e27",
        text: "#00ff9f",
        selection: "#ff00ff",
    },
    Theme {
        id: "matrix",
        name: "Matrix",
        background: "#000000",
        text: "#00ff00",
        selection: "#003300",
    },
    Theme {
        id: "amber",
        name: "Amber",
        background: "#1a1200",
        text: "#ffb000",
        selection: "#664400",
    },
    Theme {
        id: "synthwave",
        name: "Synthwave",
        background: "#2b213a",
        text: "#ff7edb",
        selection: "#6d77b3",
    },
    Theme {
        id: "cherry_blossom",
        name: "Cherry Blossom",
        background: "#2d1a2e",
        text: "#ffb3d9",
        selection: "#944d6b",
    },
    Theme {
        id: "lavender",
        name: "Lavender",
        background: "#1e1433",
        text: "#e6d9ff",
        selection: "#7b68a6",
    },
    Theme {
        id: "mint",
        name: "Mint",
        background: "#0f2922",
        text: "#98ff98",
        selection: "#2d5a4a",
    },
    Theme {
        id: "coffee",
        name: "Coffee",
        background: "#1a0f0a",
        text: "#d4a574",
        selection: "#6b4423",
    },
    Theme {
        id: "midnight",
        name: "Midnight",
        background: "#0c0f1a",
        text: "#a8b5d1",
        selection: "#1e2742",
    },
];

/// Look up a preset theme by id
pub fn theme_by_id(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.background_color, "#1a0a2e");
        assert_eq!(settings.font_size, 11);
        assert_eq!(settings.cursor_style, CursorStyle::Block);
        assert_eq!(settings.opacity_percent, 100);
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let mut settings = Settings::default();
        settings.font_size = 14;
        settings.cursor_style = CursorStyle::Beam;

        let json = serde_json::to_string(&settings).unwrap();
        let restored: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, restored);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let restored: Settings = serde_json::from_str(r#"{"font_size": 16}"#).unwrap();
        assert_eq!(restored.font_size, 16);
        assert_eq!(restored.background_color, "#1a0a2e");
    }

    #[test]
    fn test_theme_catalog_integrity() {
        assert_eq!(THEMES.len(), 20);

        let mut seen = std::collections::HashSet::new();
        for theme in THEMES {
            assert!(seen.insert(theme.id), "duplicate theme id: {}", theme.id);
            for color in [theme.background, theme.text, theme.selection] {
                assert!(color.starts_with('#') && color.len() == 7, "bad color {color}");
                assert!(u32::from_str_radix(&color[1..], 16).is_ok());
            }
        }
    }

    #[test]
    fn test_theme_lookup_and_apply() {
        let theme = theme_by_id("dracula").unwrap();
        assert_eq!(theme.name, "Dracula");

        let mut settings = Settings::default();
        settings.apply_theme(theme);
        assert_eq!(settings.background_color, "#282a36");
        assert_eq!(settings.text_color, "#f8f8f2");
        // Font settings untouched
        assert_eq!(settings.font_family, "monospace");

        assert!(theme_by_id("nonexistent").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.apply_theme(theme_by_id("nord").unwrap());
        settings.save(&path).unwrap();

        let restored = Settings::load(&path).unwrap();
        assert_eq!(settings, restored);
    }
}
