//! Scoring engine boundary
//!
//! The engine is an opaque collaborator. It is built once from `EngineArgs`,
//! receives one `AnalysisRequest` per analysis cycle and posts its results
//! back through the `EventSender` it was built with.

use serde::Serialize;
use shared_types::{AnalysisDimension, DocumentSnapshot, SnippetFields};

use crate::config::Translations;
use crate::error::SyncError;
use crate::inbox::{EventSender, RequestId};
use crate::tabs::ActiveDimensions;

/// Output element ids for the engine's result lists
pub const KEYWORD_OUTPUT: &str = "seo-keyword-analysis";
pub const CONTENT_OUTPUT: &str = "seo-content-analysis";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub id: RequestId,
    pub snapshot: DocumentSnapshot,
    /// Other posts using the focus term, once looked up
    pub keyword_usage: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTargets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_output: Option<String>,
}

/// Which result callbacks the engine delivers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCallbacks {
    pub save_scores: bool,
    pub save_content_score: bool,
}

impl ResultCallbacks {
    pub fn delivers(&self, dimension: AnalysisDimension) -> bool {
        match dimension {
            AnalysisDimension::Keyword => self.save_scores,
            AnalysisDimension::Content => self.save_content_score,
        }
    }
}

/// Construction arguments for the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineArgs {
    /// Fields whose change schedules a re-analysis
    #[serde(rename = "elementTarget")]
    pub element_targets: Vec<String>,
    pub targets: OutputTargets,
    pub callbacks: ResultCallbacks,
    pub marker: bool,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    pub snippet_preview: SnippetFields,
    pub content_analysis_active: bool,
    pub keyword_analysis_active: bool,
}

impl EngineArgs {
    /// Output targets and callbacks exist only for enabled dimensions
    pub fn for_dimensions(dimensions: ActiveDimensions) -> Self {
        let keyword = dimensions.keyword();
        let content = dimensions.content();
        Self {
            element_targets: Vec::new(),
            targets: OutputTargets {
                output: keyword.then(|| KEYWORD_OUTPUT.to_string()),
                content_output: content.then(|| CONTENT_OUTPUT.to_string()),
            },
            callbacks: ResultCallbacks {
                save_scores: keyword,
                save_content_score: content,
            },
            marker: false,
            locale: String::new(),
            translations: None,
            snippet_preview: SnippetFields::default(),
            content_analysis_active: content,
            keyword_analysis_active: keyword,
        }
    }
}

pub trait ScoringEngine {
    /// Start analysing a snapshot. Results arrive later through the inbox.
    fn analyze(&mut self, request: AnalysisRequest);
}

pub trait EngineFactory {
    fn create(
        &self,
        args: &EngineArgs,
        events: EventSender,
    ) -> Result<Box<dyn ScoringEngine>, SyncError>;
}
