//! Engine configuration.
//!
//! ```
//! use readaloud::{Granularity, ReadAloudConfig};
//!
//! let config = ReadAloudConfig::from_json(r#"{"highlight": {"granularity": "phrase"}}"#).unwrap();
//! assert_eq!(config.highlight.granularity, Granularity::Phrase);
//! assert!(config.highlight.scroll_into_view);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Unit size the highlight follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Sentence,
    #[default]
    Word,
    Phrase,
    /// Speak without highlighting.
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub granularity: Granularity,
    /// Scroll the current highlight into view after each rewrite.
    pub scroll_into_view: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            scroll_into_view: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Start over from the first unit on every content update instead of
    /// only on explicit resets.
    pub reset_on_content_update: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadAloudConfig {
    pub highlight: HighlightConfig,
    pub segmentation: SegmentationConfig,
}

impl ReadAloudConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
