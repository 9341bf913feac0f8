//! Session orchestration
//!
//! Wires the collector, tabs, preview, propagator and marker pipeline to the
//! scoring engine and drives them from page events:
//!
//! - tracked field change → debounce ticket → snapshot → engine request
//! - engine event → stale check → persist score, publish indicator, paint marks
//! - completed permalink request → preview reconciler
//! - focus keyword usage answer → re-analysis of the current keyword

use std::rc::Rc;

use shared_types::{AnalysisDimension, DocumentSnapshot, MarkSet, SnippetField};
use tracing::{debug, error, info, warn};

use crate::collector::SnapshotCollector;
use crate::debounce::{DebounceTicket, Debouncer};
use crate::engine::{AnalysisRequest, EngineArgs, EngineFactory, ScoringEngine};
use crate::error::SyncError;
use crate::host::SessionContext;
use crate::indicator::{map_field_value, ScoreIndicator};
use crate::inbox::{EngineEvent, EventSender, Inbox, RequestId, RequestSequencer};
use crate::marker::{MarkOutcome, MarkerPipeline};
use crate::permalink::{slug_from_response, RequestCompletion};
use crate::preview::{PreviewReconciler, SlugOutcome};
use crate::propagator::ScorePropagator;
use crate::tabs::{ActiveDimensions, TabManager};
use crate::usage::KeywordUsage;

/// Signal emitted once startup wiring is complete
pub const READY_EVENT: &str = "analysis:ready";

/// What happened to a completed request observed on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermalinkOutcome {
    NotPermalink,
    OtherPost(u64),
    Applied(String),
    IgnoredUserEdited,
}

pub struct Orchestrator {
    ctx: SessionContext,
    tabs: TabManager,
    collector: Rc<SnapshotCollector>,
    preview: PreviewReconciler,
    propagator: ScorePropagator,
    marker: MarkerPipeline,
    engine: Box<dyn ScoringEngine>,
    args: EngineArgs,
    inbox: Inbox,
    requests: RequestSequencer,
    debouncer: Debouncer,
    in_flight: Option<AnalysisRequest>,
    usage: KeywordUsage,
}

impl Orchestrator {
    /// Build and wire a session
    ///
    /// # Errors
    /// Returns an error only if the engine cannot be constructed. Every other
    /// startup problem is logged and the session continues.
    pub fn start(ctx: SessionContext, factory: &dyn EngineFactory) -> Result<Self, SyncError> {
        let config = ctx.config.clone();
        let dimensions = config.active_dimensions();

        let tabs = TabManager::new(dimensions, ctx.tabs.clone());

        let collector = Rc::new(SnapshotCollector::new(
            config.clone(),
            ctx.form.clone(),
            ctx.editor.clone(),
        ));

        let save_target = collector.clone();
        let preview = PreviewReconciler::initialize(
            collector.snippet_fields(),
            ctx.preview.clone(),
            Box::new(move |fields, change| save_target.save_snippet_data(fields, change)),
        );

        let mut args = EngineArgs::for_dimensions(dimensions);
        args.element_targets = tracked_field_ids(&ctx);
        args.marker = config.show_markers;
        args.locale = config.locale.clone();
        args.translations = config
            .translations
            .clone()
            .filter(|translations| translations.is_usable());
        args.snippet_preview = preview.fields();

        let inbox = Inbox::new();
        let engine = factory.create(&args, inbox.sender())?;

        let mut orchestrator = Self {
            propagator: ScorePropagator::new(ctx.score_widgets.clone()),
            marker: MarkerPipeline::new(ctx.editor.clone(), &config.editor_id, config.show_markers),
            debouncer: Debouncer::new(config.debounce()),
            tabs,
            collector,
            preview,
            engine,
            args,
            inbox,
            requests: RequestSequencer::new(),
            in_flight: None,
            usage: KeywordUsage::new(ctx.keyword_usage.clone()),
            ctx,
        };

        for missing in orchestrator.collector.missing_targets() {
            debug!(error = %missing, "Page is missing a field, related updates are skipped");
        }
        orchestrator.initialize_dimensions();
        if config.show_markers && !orchestrator.marker.can_paint() {
            debug!("Editor is in text view, marks start once the visual editor shows");
        }
        orchestrator.ctx.events.emit(READY_EVENT);
        info!(dimensions = ?dimensions, "Analysis session ready");

        Ok(orchestrator)
    }

    /// Prime indicators from saved scores and set up tabs and preview
    fn initialize_dimensions(&mut self) {
        let dimensions = self.tabs.dimensions();

        for dimension in self.tabs.enabled_dimensions() {
            let indicator = map_field_value(&self.collector.saved_score(dimension));
            self.propagator.publish_indicator(dimension, indicator);
            self.tabs.update_tab_score(dimension, &indicator);
        }

        if let Some(initial) = dimensions.initial_tab() {
            if let Err(e) = self.tabs.activate(initial) {
                error!(error = %e, "Failed to activate initial tab");
            }
        }

        if dimensions.keyword() {
            let keyword = self.collector.focus_term();
            self.usage.check(&keyword);
        } else {
            self.tabs.hide_add_keyword();
        }

        if dimensions == ActiveDimensions::Neither {
            self.preview.isolate();
        }
    }

    pub fn engine_args(&self) -> &EngineArgs {
        &self.args
    }

    /// Field ids whose change schedules a re-analysis
    pub fn tracked_fields(&self) -> &[String] {
        &self.args.element_targets
    }

    pub fn is_tracked(&self, field_id: &str) -> bool {
        self.args.element_targets.iter().any(|id| id == field_id)
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn preview(&self) -> &PreviewReconciler {
        &self.preview
    }

    pub fn propagator(&self) -> &ScorePropagator {
        &self.propagator
    }

    pub fn collector(&self) -> &SnapshotCollector {
        &self.collector
    }

    pub fn marker(&self) -> &MarkerPipeline {
        &self.marker
    }

    pub fn debounce_delay(&self) -> std::time::Duration {
        self.debouncer.delay()
    }

    /// Sender for engines that post results from outside the factory
    pub fn sender(&self) -> EventSender {
        self.inbox.sender()
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.requests.latest()
    }

    /// A tracked field changed. Returns the ticket the platform timer should
    /// fire with after the debounce delay.
    pub fn on_field_changed(&mut self, field_id: &str) -> Option<DebounceTicket> {
        if !self.is_tracked(field_id) {
            return None;
        }
        let ticket = self.debouncer.schedule();
        debug!(field = field_id, ticket = ticket.id(), "Scheduled re-analysis");
        Some(ticket)
    }

    /// A debounce timer fired
    pub fn on_debounce_elapsed(&mut self, ticket: DebounceTicket) -> Option<RequestId> {
        if !self.debouncer.fire(ticket) {
            debug!(ticket = ticket.id(), "Superseded debounce ticket");
            return None;
        }
        Some(self.request_analysis())
    }

    /// Snapshot the document and hand it to the engine
    pub fn request_analysis(&mut self) -> RequestId {
        if self.debouncer.is_pending() {
            debug!("Immediate analysis supersedes pending debounce");
            self.debouncer.cancel();
        }
        let snapshot = self.collector.collect();
        self.usage.check(&snapshot.focus_term);
        let request = AnalysisRequest {
            id: self.requests.issue(),
            keyword_usage: self.usage.posts(&snapshot.focus_term).map(<[u64]>::to_vec),
            snapshot,
        };
        let id = request.id;
        self.in_flight = Some(request.clone());
        debug!(request = %id, "Requesting analysis");
        self.engine.analyze(request);
        id
    }

    /// Apply every pending engine event in arrival order
    ///
    /// Returns the number of events applied; stale events are dropped.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.inbox.pop() {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    fn current_snapshot(&self, request: RequestId) -> Option<DocumentSnapshot> {
        if !self.requests.is_current(request) {
            debug!(request = %request, "Dropping stale engine result");
            return None;
        }
        self.in_flight
            .as_ref()
            .filter(|in_flight| in_flight.id == request)
            .map(|in_flight| in_flight.snapshot.clone())
    }

    fn handle_event(&mut self, event: EngineEvent) -> bool {
        match event {
            EngineEvent::Scored {
                request,
                dimension,
                raw_score,
                marks,
            } => {
                if !self.args.callbacks.delivers(dimension) {
                    warn!(dimension = %dimension, "Dropping result for disabled dimension");
                    return false;
                }
                let Some(snapshot) = self.current_snapshot(request) else {
                    return false;
                };
                self.apply_score(dimension, raw_score);
                if let Some(marks) = marks {
                    self.apply_marks(&snapshot, &marks);
                }
                true
            }
            EngineEvent::Marks { request, marks } => {
                let Some(snapshot) = self.current_snapshot(request) else {
                    return false;
                };
                self.apply_marks(&snapshot, &marks);
                true
            }
        }
    }

    fn apply_score(&mut self, dimension: AnalysisDimension, raw: Option<f64>) -> ScoreIndicator {
        self.collector.persist_score(dimension, raw);
        let indicator = self.propagator.publish(dimension, raw);
        self.tabs.update_tab_score(dimension, &indicator);
        indicator
    }

    fn apply_marks(&mut self, snapshot: &DocumentSnapshot, marks: &MarkSet) -> MarkOutcome {
        let outcome = self.marker.apply_marks(snapshot, marks);
        debug!(?outcome, "Applied marks");
        outcome
    }

    /// A request completed somewhere on the page
    pub fn on_request_completed(&mut self, completion: &RequestCompletion) -> PermalinkOutcome {
        if !completion.is_permalink_request() {
            return PermalinkOutcome::NotPermalink;
        }

        if let (Some(requested), Some(open)) = (completion.post_id(), self.ctx.config.post_id) {
            if requested != open {
                warn!(requested, open, "Ignoring permalink generated for another post");
                return PermalinkOutcome::OtherPost(requested);
            }
        }

        let slug = slug_from_response(&completion.response_text).unwrap_or_else(|| {
            debug!("No slug in permalink response, falling back to title");
            self.collector.title()
        });

        if self.preview.is_user_edited() {
            debug!(slug = %slug, "Preview url was edited by the user, keeping it");
            return PermalinkOutcome::IgnoredUserEdited;
        }

        self.collector.leave_post_name_untouched();
        match self.preview.on_server_slug_available(&slug) {
            SlugOutcome::Applied => PermalinkOutcome::Applied(slug),
            SlugOutcome::IgnoredUserEdited => PermalinkOutcome::IgnoredUserEdited,
        }
    }

    /// The host answered a focus keyword usage lookup
    ///
    /// Re-analyses when the answer is for the keyword currently typed.
    pub fn on_keyword_usage(&mut self, keyword: &str, posts: Vec<u64>) -> Option<RequestId> {
        if !self.tabs.dimensions().keyword() {
            debug!(keyword, "Ignoring keyword usage, keyword analysis is off");
            return None;
        }
        self.usage.record(keyword, posts, self.ctx.config.post_id);
        if self.collector.focus_term() != keyword {
            return None;
        }
        Some(self.request_analysis())
    }

    pub fn keyword_usage(&self) -> &KeywordUsage {
        &self.usage
    }

    /// The user edited a preview field in place
    pub fn on_preview_edited(&mut self, field: SnippetField, value: &str) -> bool {
        self.preview.edit_field(field, value)
    }

    /// The user touched the preview url without committing a value yet
    pub fn on_user_edited_url(&mut self) {
        self.preview.on_user_edited_url();
    }

    /// The post form is being submitted
    ///
    /// Marks are removed so highlight markup is never saved with the post.
    pub fn on_form_submit(&mut self) -> bool {
        self.marker.clear();
        self.collector
            .sync_focus_keyword(&self.tabs.keyword_from_tab())
    }

    /// The user clicked an analysis tab
    pub fn activate_tab(&mut self, dimension: AnalysisDimension) -> Result<(), SyncError> {
        self.tabs.activate(dimension).inspect_err(|e| {
            error!(error = %e, "Tab activation rejected");
        })
    }
}

/// Every field that feeds the snapshot
fn tracked_field_ids(ctx: &SessionContext) -> Vec<String> {
    let fields = &ctx.config.fields;
    let mut ids = vec![
        ctx.config.editor_id.clone(),
        fields.title.clone(),
        fields.focus_keyword_input.clone(),
        fields.meta_description.clone(),
        fields.excerpt.clone(),
        fields.editable_post_name.clone(),
        fields.editable_post_name_full.clone(),
    ];
    // The plain textarea stands in for the editor when it is not loaded
    if fields.content != ctx.config.editor_id {
        ids.push(fields.content.clone());
    }
    ids
}
