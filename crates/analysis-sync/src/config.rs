//! Session configuration
//!
//! The host page hands the session a JSON object once at startup. Every field
//! has a default so a partial object is still a valid configuration.

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::tabs::ActiveDimensions;

/// Main configuration structure read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Whether the keyword analysis dimension is enabled
    #[serde(default)]
    pub keyword_analysis_active: bool,
    /// Whether the content analysis dimension is enabled
    #[serde(default)]
    pub content_analysis_active: bool,
    /// Whether marks may be painted into the editor ("1"/"0" or a bool)
    #[serde(default = "default_show_markers", deserialize_with = "flag")]
    pub show_markers: bool,
    /// Locale passed through to the scoring engine
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Translation bundle for the scoring engine
    #[serde(default)]
    pub translations: Option<Translations>,
    /// Keyword score saved with the post, used to prime the indicators
    #[serde(default)]
    pub saved_keyword_score: Option<String>,
    /// Content score saved with the post, used to prime the indicators
    #[serde(default)]
    pub saved_content_score: Option<String>,
    /// Multiple focus keywords are managed elsewhere when set
    #[serde(default, deserialize_with = "flag")]
    pub multi_keyword: bool,
    /// Quiet period before a burst of edits triggers re-analysis (default: 500)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Post currently open in the editor
    #[serde(default)]
    pub post_id: Option<u64>,
    /// Element id of the rich-text editor
    #[serde(default = "default_editor_id")]
    pub editor_id: String,
    /// Element ids of the host page fields
    #[serde(default)]
    pub fields: FieldIds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            keyword_analysis_active: false,
            content_analysis_active: false,
            show_markers: default_show_markers(),
            locale: default_locale(),
            translations: None,
            saved_keyword_score: None,
            saved_content_score: None,
            multi_keyword: false,
            debounce_ms: default_debounce_ms(),
            post_id: None,
            editor_id: default_editor_id(),
            fields: FieldIds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse configuration from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type
    ///
    /// # Example
    ///
    /// ```
    /// use analysis_sync::config::AnalysisConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = AnalysisConfig::from_json(r#"{"keyword_analysis_active": true}"#)?;
    /// assert!(config.keyword_analysis_active);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("Failed to parse analysis configuration")
    }

    pub fn active_dimensions(&self) -> ActiveDimensions {
        ActiveDimensions::from_flags(self.keyword_analysis_active, self.content_analysis_active)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Translation bundle forwarded to the scoring engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub locale_data: serde_json::Value,
}

impl Translations {
    /// Bundles without a domain are not usable by the engine
    pub fn is_usable(&self) -> bool {
        self.domain.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Element ids of the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldIds {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub post_name: String,
    pub editable_post_name: String,
    pub editable_post_name_full: String,
    pub focus_keyword: String,
    pub focus_keyword_input: String,
    pub meta_description: String,
    pub seo_title: String,
    pub keyword_score: String,
    pub content_score: String,
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            title: "title".to_string(),
            content: "content".to_string(),
            excerpt: "excerpt".to_string(),
            post_name: "post_name".to_string(),
            editable_post_name: "editable-post-name".to_string(),
            editable_post_name_full: "editable-post-name-full".to_string(),
            focus_keyword: "seo_focuskw".to_string(),
            focus_keyword_input: "seo_focuskw_text_input".to_string(),
            meta_description: "seo_metadesc".to_string(),
            seo_title: "seo_title".to_string(),
            keyword_score: "seo_linkdex".to_string(),
            content_score: "seo_content_score".to_string(),
        }
    }
}

fn default_show_markers() -> bool {
    true
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_editor_id() -> String {
    "content".to_string()
}

/// Accepts `true`/`false`, `"1"`/`"0"` and `1`/`0`
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Number(value) => value != 0,
        Flag::Text(value) => matches!(value.trim(), "1" | "true" | "yes"),
    })
}
