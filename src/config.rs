use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "WORDCLOUD_CONFIG";
/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "wordcloud.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Cloud rendering configuration
// ---------------------------------------------------------------------------

/// Canvas, font and word-selection settings. Every field has a default, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub width: u32,
    pub height: u32,
    /// Background colour as `[r, g, b]`.
    pub background: [u8; 3],
    /// Only the most frequent `max_words` words are laid out.
    pub max_words: usize,
    pub min_font_size: u32,
    /// Size of the most frequent word. `None` picks the largest size, stepping
    /// down by 10% from the canvas height, at which the two most frequent
    /// words both fit.
    pub max_font_size: Option<u32>,
    /// 0.0 ranks words only by order, 1.0 scales size linearly with frequency.
    pub relative_scaling: f32,
    /// Padding around each word's box, in pixels.
    pub margin: u32,
    /// Shorter words (in characters) are left out of the cloud.
    pub min_word_length: usize,
    /// TrueType/OpenType font (or collection) used for the cloud and the UI.
    /// Unset: `./msyh.ttc`, then common system CJK fonts, then egui's face.
    pub font_path: Option<PathBuf>,
    /// Face index inside a font collection (`.ttc`).
    pub font_index: u32,
    pub extra_stopwords: Vec<String>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background: [255, 255, 255],
            max_words: 200,
            min_font_size: 4,
            max_font_size: None,
            relative_scaling: 0.5,
            margin: 2,
            min_word_length: 2,
            font_path: None,
            font_index: 0,
            extra_stopwords: Vec::new(),
        }
    }
}

impl CloudConfig {
    /// Load from `$WORDCLOUD_CONFIG`, else `./wordcloud.json`, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.relative_scaling) {
            return Err(ConfigError::Invalid(format!(
                "relative_scaling must be within [0, 1], got {}",
                self.relative_scaling
            )));
        }
        if self.min_font_size == 0 {
            return Err(ConfigError::Invalid("min_font_size must be at least 1".into()));
        }
        if self.max_font_size.is_some_and(|max| max < self.min_font_size) {
            return Err(ConfigError::Invalid(
                "max_font_size must not be below min_font_size".into(),
            ));
        }
        if self.max_words == 0 {
            return Err(ConfigError::Invalid("max_words must be at least 1".into()));
        }
        if self.min_word_length == 0 {
            return Err(ConfigError::Invalid("min_word_length must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_classic_canvas() {
        let config = CloudConfig::default();
        assert_eq!((config.width, config.height), (800, 400));
        assert_eq!(config.background, [255, 255, 255]);
        assert_eq!(config.min_word_length, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wordcloud.json");
        std::fs::write(&path, r#"{"max_words": 50, "extra_stopwords": ["项目"]}"#).unwrap();

        let config = CloudConfig::from_file(&path).unwrap();
        assert_eq!(config.max_words, 50);
        assert_eq!(config.extra_stopwords, vec!["项目"]);
        assert_eq!(config.width, 800);
        assert_eq!(config.font_path, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wordcloud.json");
        std::fs::write(&path, r#"{"relative_scaling": 1.5}"#).unwrap();
        assert!(matches!(
            CloudConfig::from_file(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, r#"{"width": 0}"#).unwrap();
        assert!(matches!(
            CloudConfig::from_file(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, r#"{"min_word_length": 0}"#).unwrap();
        assert!(matches!(
            CloudConfig::from_file(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wordcloud.json");
        std::fs::write(&path, "{ width: ").unwrap();
        assert!(matches!(
            CloudConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
