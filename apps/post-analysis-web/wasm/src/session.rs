//! JS-facing analysis session
//!
//! Holds the orchestrator in Rust and exposes one method per page event.
//! The engine may call back into `postScore` while the session is still
//! handing it a snapshot, so results always go through the inbox first and
//! are applied once the session is free again.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use analysis_sync::{
    AnalysisConfig, AnalysisDimension, EngineEvent, EventSender, Mark, MarkSet, Orchestrator,
    PermalinkOutcome, RequestCompletion, RequestId, ScoreWidget, SessionContext, SnippetField,
    SyncError,
};
use js_sys::{Array, Function};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::dom::{
    self, AdminBar, DomEvents, DomForm, DomKeywordUsage, DomPreview, DomTabs, PublishBox,
    TrafficLight,
};
use crate::editor::TinyMceEditor;
use crate::engine::{to_js, JsEngineFactory};

fn config_error(message: String) -> JsValue {
    JsValue::from_str(&SyncError::Config(message).to_string())
}

fn parse_dimension(name: &str) -> Result<AnalysisDimension, JsValue> {
    AnalysisDimension::parse(name)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown analysis dimension: {}", name)))
}

/// Parse a JSON array of `{start, end, kind}` marks
fn parse_marks(json: &str) -> Result<MarkSet, JsValue> {
    let marks: Vec<Mark> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse marks: {}", e)))?;
    Ok(MarkSet::new(marks))
}

fn whole_number(raw: f64) -> Option<u64> {
    (raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0).then_some(raw as u64)
}

fn request_id(raw: f64) -> Result<RequestId, JsValue> {
    whole_number(raw)
        .map(RequestId)
        .ok_or_else(|| JsValue::from_str(&format!("Invalid request id: {}", raw)))
}

/// Analysis session bound to the post editor page
#[wasm_bindgen]
pub struct PostAnalysisSession {
    inner: Rc<RefCell<Orchestrator>>,
    events: EventSender,
}

impl PostAnalysisSession {
    /// Wire DOM-backed collaborators around `config`
    fn start(config: AnalysisConfig, engine: Function) -> Result<Self, JsValue> {
        let document = dom::document()?;
        let dimensions = config.active_dimensions();

        let score_widgets: Vec<Rc<dyn ScoreWidget>> = vec![
            Rc::new(TrafficLight::new(
                document.clone(),
                dimensions.status_light_dimension(),
            )),
            Rc::new(AdminBar::new(document.clone())),
            Rc::new(PublishBox::new(document.clone())),
        ];

        let ctx = SessionContext {
            form: Rc::new(DomForm::new(document.clone())),
            editor: Rc::new(TinyMceEditor),
            tabs: Rc::new(DomTabs::new(
                document.clone(),
                &config.fields.focus_keyword_input,
            )),
            preview: Rc::new(DomPreview::new(document)),
            events: Rc::new(DomEvents),
            keyword_usage: Rc::new(DomKeywordUsage),
            score_widgets,
            config: Rc::new(config),
        };

        let orchestrator = Orchestrator::start(ctx, &JsEngineFactory::new(engine))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let events = orchestrator.sender();

        Ok(Self {
            inner: Rc::new(RefCell::new(orchestrator)),
            events,
        })
    }

    fn session(&self) -> Result<RefMut<'_, Orchestrator>, JsValue> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Analysis session is busy"))
    }

    /// Apply queued engine results unless the session is mid-call
    fn drain(&self) -> usize {
        match self.inner.try_borrow_mut() {
            Ok(mut session) => session.process_events(),
            Err(_) => {
                debug!("Session busy, leaving results queued");
                0
            }
        }
    }
}

#[wasm_bindgen]
impl PostAnalysisSession {
    /// Create a session from a configuration object and an engine class
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, engine: Function) -> Result<PostAnalysisSession, JsValue> {
        let config: AnalysisConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| config_error(e.to_string()))?;
        Self::start(config, engine)
    }

    /// Create a session from a JSON configuration string
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str, engine: Function) -> Result<PostAnalysisSession, JsValue> {
        let config =
            AnalysisConfig::from_json(json).map_err(|e| config_error(format!("{:#}", e)))?;
        Self::start(config, engine)
    }

    /// Field ids whose `input` events should be forwarded to `fieldChanged`
    #[wasm_bindgen(js_name = trackedFields)]
    pub fn tracked_fields(&self) -> Result<Array, JsValue> {
        Ok(self
            .session()?
            .tracked_fields()
            .iter()
            .map(|id| JsValue::from_str(id))
            .collect())
    }

    /// Arguments the engine was constructed with
    #[wasm_bindgen(js_name = engineArgs)]
    pub fn engine_args(&self) -> Result<JsValue, JsValue> {
        to_js(self.session()?.engine_args())
    }

    /// A tracked field changed; re-analysis runs once edits settle
    #[wasm_bindgen(js_name = fieldChanged)]
    pub fn field_changed(&self, field_id: &str) -> Result<(), JsValue> {
        let (ticket, delay) = {
            let mut session = self.session()?;
            (session.on_field_changed(field_id), session.debounce_delay())
        };
        let Some(ticket) = ticket else {
            return Ok(());
        };

        let inner = Rc::clone(&self.inner);
        let callback = Closure::once_into_js(move || {
            let Ok(mut session) = inner.try_borrow_mut() else {
                warn!(ticket = ticket.id(), "Session busy when debounce elapsed");
                return;
            };
            session.on_debounce_elapsed(ticket);
            session.process_events();
        });

        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay_ms,
        )?;
        Ok(())
    }

    /// Analyze immediately, bypassing the debounce. Returns the request id.
    #[wasm_bindgen(js_name = analyzeNow)]
    pub fn analyze_now(&self) -> Result<f64, JsValue> {
        let id = {
            let mut session = self.session()?;
            let id = session.request_analysis();
            session.process_events();
            id
        };
        Ok(id.0 as f64)
    }

    /// Engine callback: a score (and optionally marks) for one dimension
    #[wasm_bindgen(js_name = postScore)]
    pub fn post_score(
        &self,
        request: f64,
        dimension: &str,
        raw_score: Option<f64>,
        marks_json: Option<String>,
    ) -> Result<usize, JsValue> {
        let marks = marks_json.as_deref().map(parse_marks).transpose()?;
        self.events.post(EngineEvent::Scored {
            request: request_id(request)?,
            dimension: parse_dimension(dimension)?,
            raw_score,
            marks,
        });
        Ok(self.drain())
    }

    /// Engine callback: marks for the latest snapshot
    #[wasm_bindgen(js_name = postMarks)]
    pub fn post_marks(&self, request: f64, marks_json: &str) -> Result<usize, JsValue> {
        self.events.post(EngineEvent::Marks {
            request: request_id(request)?,
            marks: parse_marks(marks_json)?,
        });
        Ok(self.drain())
    }

    /// Answer to a focus keyword usage lookup: ids of posts using `keyword`
    ///
    /// Returns the id of the re-analysis it triggered, if any. Call it
    /// asynchronously from the lookup event handler.
    #[wasm_bindgen(js_name = keywordUsage)]
    pub fn keyword_usage(
        &self,
        keyword: &str,
        post_ids: Vec<f64>,
    ) -> Result<Option<f64>, JsValue> {
        let posts = post_ids
            .into_iter()
            .map(|raw| {
                whole_number(raw)
                    .ok_or_else(|| JsValue::from_str(&format!("Invalid post id: {}", raw)))
            })
            .collect::<Result<Vec<u64>, JsValue>>()?;
        let id = {
            let mut session = self.session()?;
            let id = session.on_keyword_usage(keyword, posts);
            session.process_events();
            id
        };
        Ok(id.map(|id| id.0 as f64))
    }

    /// A request completed on the page. Returns the slug if the preview took it.
    #[wasm_bindgen(js_name = requestCompleted)]
    pub fn request_completed(
        &self,
        url: &str,
        data: Option<String>,
        response_text: &str,
    ) -> Result<Option<String>, JsValue> {
        let completion = RequestCompletion::new(url, data.as_deref(), response_text);
        match self.session()?.on_request_completed(&completion) {
            PermalinkOutcome::Applied(slug) => Ok(Some(slug)),
            _ => Ok(None),
        }
    }

    /// The user edited a preview field (`title`, `urlPath` or `metaDesc`)
    #[wasm_bindgen(js_name = previewEdited)]
    pub fn preview_edited(&self, field: &str, value: &str) -> Result<bool, JsValue> {
        let field = SnippetField::parse(field)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown preview field: {}", field)))?;
        Ok(self.session()?.on_preview_edited(field, value))
    }

    /// The user started editing the preview url
    #[wasm_bindgen(js_name = userEditedUrl)]
    pub fn user_edited_url(&self) -> Result<(), JsValue> {
        self.session()?.on_user_edited_url();
        Ok(())
    }

    /// The post form is about to submit
    #[wasm_bindgen(js_name = formSubmit)]
    pub fn form_submit(&self) -> Result<bool, JsValue> {
        Ok(self.session()?.on_form_submit())
    }

    #[wasm_bindgen(js_name = activateTab)]
    pub fn activate_tab(&self, dimension: &str) -> Result<(), JsValue> {
        let dimension = parse_dimension(dimension)?;
        self.session()?
            .activate_tab(dimension)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Url path currently shown in the preview
    #[wasm_bindgen(getter, js_name = urlPath)]
    pub fn url_path(&self) -> Result<String, JsValue> {
        Ok(self.session()?.preview().url_path().to_string())
    }
}
