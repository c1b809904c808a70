// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handler and pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// Parameters of a single `stylize` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylizeConfig {
    /// Lossy encoding quality (1-100).
    pub quality: u8,
    /// Longest permitted width in pixels.
    pub max_width: u32,
    /// Longest permitted height in pixels.
    pub max_height: u32,
}

impl Default for StylizeConfig {
    fn default() -> Self {
        Self {
            quality: 80,
            max_width: 1280,
            max_height: 1280,
        }
    }
}

impl StylizeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(BildwerkError::Config("stylize.quality must be 1-100".into()));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(BildwerkError::Config(
                "stylize.max_width and stylize.max_height must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for the event handler process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerConfig {
    /// Only records from this bucket are processed. `None` accepts all.
    pub source_bucket: Option<String>,
    /// Bucket that receives stylized images.
    pub destination_bucket: String,
    /// Prefix prepended to the source key to form the destination key.
    pub destination_prefix: String,
    /// Topic that receives completion notifications.
    pub topic: String,
    /// Root directory of the filesystem object store and outbox.
    pub storage_root: PathBuf,
    pub stylize: StylizeConfig,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            source_bucket: None,
            destination_bucket: "image-sized-1".into(),
            destination_prefix: "stylized/".into(),
            topic: "image-stylized".into(),
            storage_root: PathBuf::from("./bildwerk-data"),
            stylize: StylizeConfig::default(),
        }
    }
}

impl HandlerConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.destination_bucket.trim().is_empty() {
            return Err(BildwerkError::Config("destination_bucket must not be empty".into()));
        }
        if self.topic.trim().is_empty() {
            return Err(BildwerkError::Config("topic must not be empty".into()));
        }
        self.stylize.validate()
    }

    /// Key under which the stylized rendition of `source_key` is stored.
    pub fn destination_key(&self, source_key: &str) -> String {
        format!("{}{}", self.destination_prefix, source_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylize_defaults() {
        let config = StylizeConfig::default();
        assert_eq!(config.quality, 80);
        assert_eq!((config.max_width, config.max_height), (1280, 1280));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stylize_rejects_out_of_range_quality() {
        let config = StylizeConfig {
            quality: 0,
            ..StylizeConfig::default()
        };
        assert!(matches!(config.validate(), Err(BildwerkError::Config(_))));

        let config = StylizeConfig {
            quality: 101,
            ..StylizeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn stylize_rejects_zero_dimensions() {
        let config = StylizeConfig {
            max_height: 0,
            ..StylizeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn destination_key_uses_prefix() {
        let config = HandlerConfig::default();
        assert_eq!(config.destination_key("photos/cat.jpg"), "stylized/photos/cat.jpg");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: HandlerConfig =
            serde_json::from_str(r#"{ "source_bucket": "uploads", "stylize": { "quality": 90 } }"#)
                .unwrap();
        assert_eq!(config.source_bucket.as_deref(), Some("uploads"));
        assert_eq!(config.stylize.quality, 90);
        assert_eq!(config.stylize.max_width, 1280);
        assert_eq!(config.topic, "image-stylized");
    }

    #[test]
    fn unknown_key_rejected() {
        let result: std::result::Result<HandlerConfig, _> =
            serde_json::from_str(r#"{ "destination_bucket": "out", "colour": "red" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_and_validates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bildwerk.json");

        std::fs::write(&path, r#"{ "destination_bucket": "out", "topic": "done" }"#).unwrap();
        let config = HandlerConfig::load(&path).unwrap();
        assert_eq!(config.destination_bucket, "out");
        assert_eq!(config.topic, "done");

        std::fs::write(&path, r#"{ "destination_bucket": "  " }"#).unwrap();
        assert!(matches!(
            HandlerConfig::load(&path),
            Err(BildwerkError::Config(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = HandlerConfig::load(&tmp.path().join("absent.json"));
        assert!(matches!(result, Err(BildwerkError::Io(_))));
    }
}
