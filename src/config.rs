use crate::nav::NavOptions;
use crate::parser::RenderOptions;
use crate::sync::ObserveOptions;
use crate::toc::DEFAULT_INDENT_STEP;
use crate::tui::theme::ThemeName;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub theme: CustomThemeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Sidebar width as a percentage of the screen
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u16,

    /// TOC width as a percentage of the screen
    #[serde(default = "default_toc_width")]
    pub toc_width: u16,

    /// Animate jumps to a heading (default: true)
    #[serde(default = "default_true")]
    pub smooth_scroll: bool,
}

/// Where documents live and how the viewer treats them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Manifest path, relative to the docs root
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Document shown when the manifest is missing or empty
    #[serde(default = "default_sample")]
    pub sample: String,

    /// Render the sample instead of a "no docs" message (default: true)
    #[serde(default = "default_true")]
    pub fallback_sample: bool,

    /// Share of the content pane, from the top, that activates a heading
    #[serde(default = "default_activation_ratio")]
    pub activation_ratio: f32,

    /// TOC indent per heading level
    #[serde(default = "default_toc_indent")]
    pub toc_indent: u16,

    /// Reload the current document when it changes on disk (default: true)
    #[serde(default = "default_true")]
    pub watch: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Suffix repeated heading slugs (`intro-1`) instead of sharing one anchor
    #[serde(default)]
    pub unique_slugs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file for the interactive viewer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Custom theme color overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_focused: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_fg: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_bg: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_fg: Option<ColorValue>,
}

/// Color value that can be specified in multiple formats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Named color (e.g., "Red", "Cyan", "White")
    Named(String),
    /// RGB color { rgb = [r, g, b] }
    Rgb { rgb: [u8; 3] },
    /// Indexed color { indexed = 235 }
    Indexed { indexed: u8 },
}

impl ColorValue {
    /// Convert to ratatui Color
    pub fn to_color(&self) -> Option<Color> {
        match self {
            ColorValue::Named(name) => match name.to_lowercase().as_str() {
                "black" => Some(Color::Black),
                "red" => Some(Color::Red),
                "green" => Some(Color::Green),
                "yellow" => Some(Color::Yellow),
                "blue" => Some(Color::Blue),
                "magenta" => Some(Color::Magenta),
                "cyan" => Some(Color::Cyan),
                "gray" | "grey" => Some(Color::Gray),
                "darkgray" | "darkgrey" => Some(Color::DarkGray),
                "white" => Some(Color::White),
                _ => None,
            },
            ColorValue::Rgb { rgb } => Some(Color::Rgb(rgb[0], rgb[1], rgb[2])),
            ColorValue::Indexed { indexed } => Some(Color::Indexed(*indexed)),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            sidebar_width: default_sidebar_width(),
            toc_width: default_toc_width(),
            smooth_scroll: true,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            sample: default_sample(),
            fallback_sample: true,
            activation_ratio: default_activation_ratio(),
            toc_indent: default_toc_indent(),
            watch: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_theme() -> String {
    "OceanDark".to_string()
}

fn default_sidebar_width() -> u16 {
    22
}

fn default_toc_width() -> u16 {
    26
}

fn default_manifest() -> String {
    "docs/list.json".to_string()
}

fn default_sample() -> String {
    "docs/sample.md".to_string()
}

fn default_true() -> bool {
    true
}

fn default_activation_ratio() -> f32 {
    0.4
}

fn default_toc_indent() -> u16 {
    DEFAULT_INDENT_STEP
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Get the platform-specific config file path
    /// - macOS: ~/Library/Application Support/docshelf/config.toml
    /// - Linux: ~/.config/docshelf/config.toml
    /// - Windows: %APPDATA%/docshelf/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("docshelf").join("config.toml"))
    }

    /// Load config from file, or return default if file doesn't exist
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load config from a specific file; `None` if it is missing or invalid
    pub fn load_from(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        match toml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Parse theme name from string
    pub fn theme_name(&self) -> ThemeName {
        self.ui.theme.parse().unwrap_or(ThemeName::OceanDark)
    }

    /// Update theme and save it to the config file.
    ///
    /// Only the theme is written back. Command-line overrides applied to
    /// `self` stay out of the file.
    pub fn set_theme(&mut self, theme: ThemeName) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("Could not determine config directory")?;
        self.set_theme_at(&path, theme)
    }

    /// Like [`Config::set_theme`], for the config file at `path`. The file's
    /// other settings are kept as they are on disk.
    pub fn set_theme_at(
        &mut self,
        path: &Path,
        theme: ThemeName,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.ui.theme = theme.to_string();
        let mut on_disk = Self::load_from(path).unwrap_or_default();
        on_disk.ui.theme = theme.to_string();
        on_disk.save_to(path)
    }

    /// Controller settings derived from this config
    pub fn nav_options(&self) -> NavOptions {
        NavOptions {
            sample_path: self.viewer.sample.clone(),
            fallback_sample: self.viewer.fallback_sample,
            render: RenderOptions {
                unique_slugs: self.render.unique_slugs,
            },
            toc_indent_step: self.viewer.toc_indent,
        }
    }

    /// Scroll-sync settings derived from this config
    pub fn observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            activation_ratio: self.viewer.activation_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.viewer.manifest, "docs/list.json");
        assert_eq!(config.viewer.sample, "docs/sample.md");
        assert!(config.viewer.fallback_sample);
        assert_eq!(config.viewer.toc_indent, 8);
        assert!(!config.render.unique_slugs);
        assert_eq!(config.observe_options(), ObserveOptions::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [viewer]
            manifest = "manual/index.json"
            activation_ratio = 0.25

            [render]
            unique_slugs = true
            "#,
        )
        .unwrap();
        assert_eq!(config.viewer.manifest, "manual/index.json");
        assert_eq!(config.viewer.sample, "docs/sample.md");
        assert_eq!(config.observe_options().activation_ratio, 0.25);
        assert!(config.nav_options().render.unique_slugs);
        assert_eq!(config.ui.theme, "OceanDark");
    }

    #[test]
    fn test_color_values() {
        let config: Config = toml::from_str(
            r#"
            [theme]
            active_fg = "Yellow"
            active_bg = { rgb = [1, 2, 3] }
            heading = { indexed = 33 }
            "#,
        )
        .unwrap();
        assert_eq!(config.theme.active_fg.unwrap().to_color(), Some(Color::Yellow));
        assert_eq!(config.theme.active_bg.unwrap().to_color(), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(config.theme.heading.unwrap().to_color(), Some(Color::Indexed(33)));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "ui = 3").unwrap();
        assert!(Config::load_from(&path).is_none());
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_none());
    }

    #[test]
    fn test_theme_save_keeps_overrides_out_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docshelf").join("config.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[viewer]\nsample = \"docs/start.md\"\n").unwrap();

        // As main leaves it after `--manifest x.json --unique-slugs`
        let mut running = Config::load_from(&path).unwrap();
        running.viewer.manifest = "x.json".to_string();
        running.render.unique_slugs = true;
        running.set_theme_at(&path, ThemeName::Gruvbox).unwrap();
        assert_eq!(running.theme_name(), ThemeName::Gruvbox);

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.ui.theme, "Gruvbox");
        assert_eq!(saved.viewer.sample, "docs/start.md");
        assert_eq!(saved.viewer.manifest, "docs/list.json");
        assert!(!saved.render.unique_slugs);
    }

    #[test]
    fn test_theme_save_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::default().set_theme_at(&path, ThemeName::Nord).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().theme_name(), ThemeName::Nord);
    }

    #[test]
    fn test_theme_name_fallback() {
        let mut config = Config::default();
        config.ui.theme = "Nord".to_string();
        assert_eq!(config.theme_name(), ThemeName::Nord);
        config.ui.theme = "Nope".to_string();
        assert_eq!(config.theme_name(), ThemeName::OceanDark);
    }
}
