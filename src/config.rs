use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::parse::Options;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub parse: ParseSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ParseSettings {
    /// Escape character outside single quotes.
    #[serde(default = "default_escape")]
    pub escape: char,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            escape: default_escape(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String,
    /// Log file path; `~` is expanded. Stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

fn default_escape() -> char {
    '\\'
}

fn default_level() -> String {
    "warn".into()
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    parse: ParseOverlay,
    #[serde(default)]
    log: LogOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct ParseOverlay {
    escape: Option<char>,
}

#[derive(Debug, Deserialize, Default)]
struct LogOverlay {
    level: Option<String>,
    file: Option<String>,
}

/// Whether `c` can serve as the escape character without clashing with
/// other syntax.
pub fn valid_escape(c: char) -> bool {
    !(c.is_whitespace()
        || c.is_alphanumeric()
        || matches!(c, '\'' | '"' | '$' | '#' | '{' | '}' | '_')
        || crate::parse::Operator::starts_with(c))
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from `path`, or ~/.config/shell-tokens/config.toml
    ///
    /// Scalars set in the overlay replace the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::default_config();
        let path = path.map(Path::to_path_buf).or_else(Self::default_overlay_path);
        if let Some(overlay) = path.and_then(|p| Self::load_overlay(&p)) {
            config.apply_overlay(overlay);
        }
        config
    }

    fn default_overlay_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/shell-tokens/config.toml"))
    }

    /// Try to load a user overlay. A missing file is not an error.
    fn load_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("shell-tokens: config parse error in {}: {e}", path.display());
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(c) = overlay.parse.escape {
            if valid_escape(c) {
                self.parse.escape = c;
            } else {
                eprintln!("shell-tokens: ignoring unusable escape character {c:?}");
            }
        }
        if let Some(v) = overlay.log.level {
            self.log.level = v;
        }
        if let Some(v) = overlay.log.file {
            self.log.file = Some(v);
        }
    }

    /// Parser options from the `[parse]` section.
    pub fn options(&self) -> Options {
        Options::with_escape(self.parse.escape)
    }

    /// Log level from the `[log]` section, `warn` if unrecognized.
    pub fn log_level(&self) -> LevelFilter {
        self.log.level.parse().unwrap_or(LevelFilter::Warn)
    }

    /// Log file from the `[log]` section with `~` expanded.
    pub fn log_file(&self) -> Option<PathBuf> {
        let file = self.log.file.as_deref()?;
        Some(PathBuf::from(shellexpand::tilde(file).into_owned()))
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert_eq!(config.parse.escape, '\\');
        assert_eq!(config.log.level, "warn");
        assert!(config.log.file.is_none());
    }

    #[test]
    fn default_options() {
        assert_eq!(Config::default_config().options(), Options::default());
    }

    #[test]
    fn overlay_escape() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [parse]
            escape = "^"
        "#,
        );
        assert_eq!(config.options().escape, '^');
    }

    #[test]
    fn overlay_rejects_unusable_escape() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [parse]
            escape = "'"
        "#,
        );
        assert_eq!(config.parse.escape, '\\');
    }

    #[test]
    fn overlay_log_settings() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [log]
            level = "debug"
            file = "/tmp/shell-tokens.log"
        "#,
        );
        assert_eq!(config.log_level(), LevelFilter::Debug);
        assert_eq!(config.log_file(), Some(PathBuf::from("/tmp/shell-tokens.log")));
    }

    #[test]
    fn overlay_omitted_settings_unchanged() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [log]
            level = "info"
        "#,
        );
        assert_eq!(config.parse.escape, '\\');
    }

    #[test]
    fn unknown_level_falls_back_to_warn() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [log]
            level = "loud"
        "#,
        );
        assert_eq!(config.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.parse.escape, '\\');
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/shell-tokens.toml")));
        assert_eq!(config.parse.escape, '\\');
    }

    #[test]
    fn escape_validation() {
        assert!(valid_escape('\\'));
        assert!(valid_escape('^'));
        assert!(valid_escape('%'));
        assert!(!valid_escape(' '));
        assert!(!valid_escape('"'));
        assert!(!valid_escape('|'));
        assert!(!valid_escape('a'));
    }

    #[test]
    fn dump_round_trips() {
        let config = Config::default_config();
        let text = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.parse.escape, config.parse.escape);
        assert_eq!(back.log.level, config.log.level);
    }
}
