//! In-memory host page for driving a session in tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use analysis_sync::{
    ActiveDimensions, AnalysisConfig, AnalysisDimension, AnalysisRequest, Decorator,
    DocumentSnapshot, EditorAdapter, EngineArgs, EngineFactory, EventSender, FormFields,
    KeywordUsageLookup, Mark, MarkSet, Orchestrator, PageEvents, PreviewWidget, ScoreIndicator,
    ScoreWidget, ScoringEngine, SessionContext, SyncError, TabView,
};

#[derive(Default)]
pub struct FakePage {
    pub values: RefCell<HashMap<String, String>>,
    pub texts: RefCell<HashMap<String, String>>,
    pub visible_tabs: RefCell<HashMap<AnalysisDimension, bool>>,
    pub tab_scores: RefCell<HashMap<AnalysisDimension, &'static str>>,
    pub keyword: RefCell<String>,
    pub add_keyword_hidden: Cell<bool>,
    pub preview_title: RefCell<String>,
    pub preview_url: RefCell<String>,
    pub preview_description: RefCell<String>,
    pub preview_interactive: Cell<bool>,
    pub events: RefCell<Vec<String>>,
    pub usage_lookups: RefCell<Vec<String>>,
}

impl FakePage {
    pub fn with_values(values: &[(&str, &str)]) -> Rc<Self> {
        let page = Self::default();
        for (id, value) in values {
            page.values
                .borrow_mut()
                .insert(id.to_string(), value.to_string());
        }
        Rc::new(page)
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.values.borrow().get(id).cloned()
    }

    pub fn put(&self, id: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(id.to_string(), value.to_string());
    }

    pub fn tab_visible(&self, dimension: AnalysisDimension) -> bool {
        self.visible_tabs
            .borrow()
            .get(&dimension)
            .copied()
            .unwrap_or(false)
    }
}

impl FormFields for FakePage {
    fn value(&self, id: &str) -> Option<String> {
        self.get(id)
    }

    fn set_value(&self, id: &str, value: &str) {
        self.put(id, value);
    }

    fn text(&self, id: &str) -> Option<String> {
        self.texts.borrow().get(id).cloned()
    }

    fn set_text(&self, id: &str, value: &str) {
        self.texts
            .borrow_mut()
            .insert(id.to_string(), value.to_string());
    }
}

impl TabView for FakePage {
    fn show_tab(&self, dimension: AnalysisDimension, visible: bool) {
        self.visible_tabs.borrow_mut().insert(dimension, visible);
    }

    fn set_tab_score(&self, dimension: AnalysisDimension, indicator: &ScoreIndicator) {
        self.tab_scores
            .borrow_mut()
            .insert(dimension, indicator.display_class);
    }

    fn keyword(&self) -> String {
        self.keyword.borrow().clone()
    }

    fn hide_add_keyword(&self) {
        self.add_keyword_hidden.set(true);
    }
}

impl PreviewWidget for FakePage {
    fn set_title(&self, title: &str) {
        *self.preview_title.borrow_mut() = title.to_string();
    }

    fn set_url(&self, url_path: &str) {
        *self.preview_url.borrow_mut() = url_path.to_string();
    }

    fn set_description(&self, description: &str) {
        *self.preview_description.borrow_mut() = description.to_string();
    }

    fn set_interactive(&self, interactive: bool) {
        self.preview_interactive.set(interactive);
    }
}

impl PageEvents for FakePage {
    fn emit(&self, name: &str) {
        self.events.borrow_mut().push(name.to_string());
    }
}

impl KeywordUsageLookup for FakePage {
    fn request(&self, keyword: &str) {
        self.usage_lookups.borrow_mut().push(keyword.to_string());
    }
}

/// Score widget remembering every indicator it was shown
pub struct FakeWidget {
    pub name: &'static str,
    pub only: Option<AnalysisDimension>,
    pub shown: RefCell<Vec<(AnalysisDimension, ScoreIndicator)>>,
}

impl FakeWidget {
    pub fn new(name: &'static str, only: Option<AnalysisDimension>) -> Rc<Self> {
        Rc::new(Self {
            name,
            only,
            shown: RefCell::new(Vec::new()),
        })
    }

    pub fn last(&self, dimension: AnalysisDimension) -> Option<&'static str> {
        self.shown
            .borrow()
            .iter()
            .rev()
            .find(|(d, _)| *d == dimension)
            .map(|(_, indicator)| indicator.display_class)
    }
}

impl ScoreWidget for FakeWidget {
    fn name(&self) -> &str {
        self.name
    }

    fn accepts(&self, dimension: AnalysisDimension) -> bool {
        self.only.map_or(true, |only| only == dimension)
    }

    fn show(&self, dimension: AnalysisDimension, indicator: &ScoreIndicator) {
        self.shown.borrow_mut().push((dimension, *indicator));
    }
}

/// Editor whose decorations are a plain list of marks
#[derive(Default)]
pub struct FakeEditor {
    pub available: Cell<bool>,
    pub content: RefCell<String>,
    pub decorations: Rc<RefCell<Vec<Mark>>>,
    pub binds: Cell<usize>,
}

struct ListDecorator(Rc<RefCell<Vec<Mark>>>);

impl Decorator for ListDecorator {
    fn clear(&mut self) -> Result<(), SyncError> {
        self.0.borrow_mut().clear();
        Ok(())
    }

    fn paint(&mut self, _snapshot: &DocumentSnapshot, marks: &MarkSet) -> Result<(), SyncError> {
        self.0.borrow_mut().extend(marks.iter().cloned());
        Ok(())
    }
}

impl EditorAdapter for FakeEditor {
    fn is_available(&self, _editor_id: &str) -> bool {
        self.available.get()
    }

    fn content(&self, _editor_id: &str) -> Option<String> {
        self.available.get().then(|| self.content.borrow().clone())
    }

    fn decorator(&self, _editor_id: &str) -> Result<Box<dyn Decorator>, SyncError> {
        self.binds.set(self.binds.get() + 1);
        Ok(Box::new(ListDecorator(self.decorations.clone())))
    }
}

/// Engine that records requests; tests post results through `sender`
#[derive(Default)]
pub struct FakeEngineLog {
    pub args: RefCell<Option<EngineArgs>>,
    pub requests: RefCell<Vec<AnalysisRequest>>,
    pub sender: RefCell<Option<EventSender>>,
}

struct RecordingEngine(Rc<FakeEngineLog>);

impl ScoringEngine for RecordingEngine {
    fn analyze(&mut self, request: AnalysisRequest) {
        self.0.requests.borrow_mut().push(request);
    }
}

pub struct FakeFactory(pub Rc<FakeEngineLog>);

impl EngineFactory for FakeFactory {
    fn create(
        &self,
        args: &EngineArgs,
        events: EventSender,
    ) -> Result<Box<dyn ScoringEngine>, SyncError> {
        *self.0.args.borrow_mut() = Some(args.clone());
        *self.0.sender.borrow_mut() = Some(events);
        Ok(Box::new(RecordingEngine(self.0.clone())))
    }
}

/// Route session logs through the test harness so they show on failure
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct Harness {
    pub page: Rc<FakePage>,
    pub editor: Rc<FakeEditor>,
    pub status_light: Rc<FakeWidget>,
    pub status_bar: Rc<FakeWidget>,
    pub save_panel: Rc<FakeWidget>,
    pub engine: Rc<FakeEngineLog>,
    pub session: Orchestrator,
}

impl Harness {
    pub fn start(config: AnalysisConfig, page: Rc<FakePage>) -> Self {
        init_logging();
        let dimensions: ActiveDimensions = config.active_dimensions();
        let editor = Rc::new(FakeEditor::default());
        editor.available.set(true);
        let status_light = FakeWidget::new("status-light", dimensions.status_light_dimension());
        let status_bar = FakeWidget::new("status-bar", None);
        let save_panel = FakeWidget::new("save-panel", None);
        let engine = Rc::new(FakeEngineLog::default());

        let score_widgets: Vec<Rc<dyn ScoreWidget>> =
            vec![status_light.clone(), status_bar.clone(), save_panel.clone()];
        let ctx = SessionContext {
            config: Rc::new(config),
            form: page.clone(),
            editor: editor.clone(),
            score_widgets,
            tabs: page.clone(),
            preview: page.clone(),
            events: page.clone(),
            keyword_usage: page.clone(),
        };
        let session = Orchestrator::start(ctx, &FakeFactory(engine.clone()))
            .expect("session starts");

        Self {
            page,
            editor,
            status_light,
            status_bar,
            save_panel,
            engine,
            session,
        }
    }

    pub fn sender(&self) -> EventSender {
        self.engine
            .sender
            .borrow()
            .clone()
            .expect("engine was created")
    }

    pub fn last_request(&self) -> AnalysisRequest {
        self.engine
            .requests
            .borrow()
            .last()
            .cloned()
            .expect("a request was issued")
    }
}

pub fn config(keyword: bool, content: bool) -> AnalysisConfig {
    AnalysisConfig {
        keyword_analysis_active: keyword,
        content_analysis_active: content,
        ..Default::default()
    }
}
