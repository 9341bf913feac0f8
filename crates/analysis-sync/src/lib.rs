//! Synchronization layer between a live post editor and its analysis widgets
//!
//! The session collects snapshots of the post being edited, hands them to an
//! asynchronous scoring engine and fans the results out to the score widgets,
//! the editor marks and the search result preview. All collaborators are
//! traits in [`host`] and [`engine`]; this crate never touches a browser API.
//!
//! Everything runs on one thread. Asynchronous results come back as
//! [`EngineEvent`]s through an ordered [`Inbox`] and are dropped when a newer
//! request has been issued since.

pub mod collector;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod host;
pub mod inbox;
pub mod indicator;
pub mod marker;
pub mod marks;
pub mod orchestrator;
pub mod permalink;
pub mod preview;
pub mod propagator;
pub mod tabs;
pub mod usage;

pub use collector::SnapshotCollector;
pub use config::{AnalysisConfig, FieldIds, Translations};
pub use debounce::{DebounceTicket, Debouncer};
pub use engine::{AnalysisRequest, EngineArgs, EngineFactory, ScoringEngine};
pub use error::SyncError;
pub use host::{
    Decorator, EditorAdapter, FormFields, KeywordUsageLookup, PageEvents, PreviewWidget,
    ScoreWidget, SessionContext, TabView,
};
pub use inbox::{EngineEvent, EventSender, Inbox, RequestId};
pub use indicator::{map_score, IndicatorLevel, ScoreIndicator};
pub use marker::{MarkOutcome, MarkerPipeline};
pub use orchestrator::{Orchestrator, PermalinkOutcome, READY_EVENT};
pub use permalink::RequestCompletion;
pub use preview::{PreviewChange, PreviewReconciler, SlugOutcome, UrlPathState};
pub use propagator::ScorePropagator;
pub use tabs::{ActiveDimensions, TabManager, VisibleTab};
pub use usage::KeywordUsage;

pub use shared_types::{
    AnalysisDimension, DocumentSnapshot, Mark, MarkSet, SnippetField, SnippetFields,
};
