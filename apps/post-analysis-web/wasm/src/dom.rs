//! DOM-backed host page
//!
//! Each struct implements one collaborator trait from `analysis_sync::host`
//! against elements looked up by id. Missing elements are not errors: the
//! host page may leave out any widget.

use analysis_sync::{
    AnalysisDimension, FormFields, KeywordUsageLookup, PageEvents, PreviewWidget, ScoreIndicator,
    ScoreWidget, TabView,
};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement,
};

/// Element ids of the widgets this crate renders into
pub mod ids {
    pub const TRAFFIC_LIGHT: &str = "analysis-traffic-light";
    pub const ADMIN_BAR_SCORE: &str = "analysis-adminbar-score";
    pub const PUBLISH_SCORE_PREFIX: &str = "analysis-score-";
    pub const TAB_PREFIX: &str = "analysis-tab-";
    pub const TAB_SCORE_SUFFIX: &str = "-score";
    pub const ADD_KEYWORD: &str = "analysis-tab-add-keyword";
    pub const SNIPPET: &str = "analysis-snippet";
    pub const SNIPPET_TITLE: &str = "analysis-snippet-title";
    pub const SNIPPET_URL: &str = "analysis-snippet-url";
    pub const SNIPPET_DESCRIPTION: &str = "analysis-snippet-description";
}

/// Class toggled on the visible analysis tab
pub const ACTIVE_CLASS: &str = "active";
/// Class set on the preview when it is isolated from analysis
pub const ISOLATED_CLASS: &str = "isolated";

/// Dispatched on `window` with the keyword as `detail`; answer through
/// `PostAnalysisSession.keywordUsage`
pub const KEYWORD_USAGE_EVENT: &str = "analysis:keyword-usage";

const INDICATOR_CLASSES: [&str; 4] = ["na", "bad", "ok", "good"];

/// Get the page document
///
/// # Errors
/// Returns JsValue error if unable to access window or document
pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window object available"))?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object available"))
}

/// Replace whichever indicator class the element carries with `class`
fn set_indicator_class(element: &Element, class: &str) {
    let classes = element.class_list();
    for old in INDICATOR_CLASSES {
        if old != class {
            let _ = classes.remove_1(old);
        }
    }
    if let Err(e) = classes.add_1(class) {
        warn!(id = %element.id(), error = ?e, "Failed to set indicator class");
    }
}

/// Form controls and plain elements addressed by id
#[derive(Clone)]
pub struct DomForm {
    document: Document,
}

impl DomForm {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }
}

impl FormFields for DomForm {
    fn value(&self, id: &str) -> Option<String> {
        let element = self.element(id)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        element
            .dyn_ref::<HtmlTextAreaElement>()
            .map(HtmlTextAreaElement::value)
    }

    fn set_value(&self, id: &str, value: &str) {
        let Some(element) = self.element(id) else {
            return;
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    fn text(&self, id: &str) -> Option<String> {
        self.element(id)?.text_content()
    }

    fn set_text(&self, id: &str, value: &str) {
        if let Some(element) = self.element(id) {
            element.set_text_content(Some(value));
        }
    }
}

/// Single status light in the publish area
pub struct TrafficLight {
    document: Document,
    owner: Option<AnalysisDimension>,
}

impl TrafficLight {
    pub fn new(document: Document, owner: Option<AnalysisDimension>) -> Self {
        Self { document, owner }
    }
}

impl ScoreWidget for TrafficLight {
    fn name(&self) -> &str {
        "traffic-light"
    }

    fn accepts(&self, dimension: AnalysisDimension) -> bool {
        self.owner == Some(dimension)
    }

    fn show(&self, _dimension: AnalysisDimension, indicator: &ScoreIndicator) {
        if let Some(light) = self.document.get_element_by_id(ids::TRAFFIC_LIGHT) {
            set_indicator_class(&light, indicator.display_class);
        }
    }
}

/// Admin bar score icon, showing whichever dimension reported last
pub struct AdminBar {
    document: Document,
}

impl AdminBar {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ScoreWidget for AdminBar {
    fn name(&self) -> &str {
        "admin-bar"
    }

    fn show(&self, _dimension: AnalysisDimension, indicator: &ScoreIndicator) {
        if let Some(icon) = self.document.get_element_by_id(ids::ADMIN_BAR_SCORE) {
            set_indicator_class(&icon, indicator.display_class);
        }
    }
}

/// One score badge per dimension in the publish box
pub struct PublishBox {
    document: Document,
}

impl PublishBox {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn badge_id(dimension: AnalysisDimension) -> String {
        format!("{}{}", ids::PUBLISH_SCORE_PREFIX, dimension)
    }
}

impl ScoreWidget for PublishBox {
    fn name(&self) -> &str {
        "publish-box"
    }

    fn show(&self, dimension: AnalysisDimension, indicator: &ScoreIndicator) {
        if let Some(badge) = self.document.get_element_by_id(&Self::badge_id(dimension)) {
            set_indicator_class(&badge, indicator.display_class);
        }
    }
}

/// Keyword and content tabs
pub struct DomTabs {
    document: Document,
    keyword_input: String,
}

impl DomTabs {
    pub fn new(document: Document, keyword_input: &str) -> Self {
        Self {
            document,
            keyword_input: keyword_input.to_string(),
        }
    }

    pub fn tab_id(dimension: AnalysisDimension) -> String {
        format!("{}{}", ids::TAB_PREFIX, dimension)
    }

    pub fn tab_score_id(dimension: AnalysisDimension) -> String {
        format!("{}{}", Self::tab_id(dimension), ids::TAB_SCORE_SUFFIX)
    }
}

impl TabView for DomTabs {
    fn show_tab(&self, dimension: AnalysisDimension, visible: bool) {
        let Some(tab) = self.document.get_element_by_id(&Self::tab_id(dimension)) else {
            return;
        };
        if let Err(e) = tab.class_list().toggle_with_force(ACTIVE_CLASS, visible) {
            warn!(tab = %dimension, error = ?e, "Failed to toggle tab");
        }
    }

    fn set_tab_score(&self, dimension: AnalysisDimension, indicator: &ScoreIndicator) {
        if let Some(score) = self
            .document
            .get_element_by_id(&Self::tab_score_id(dimension))
        {
            set_indicator_class(&score, indicator.display_class);
        }
    }

    fn keyword(&self) -> String {
        DomForm::new(self.document.clone())
            .value(&self.keyword_input)
            .unwrap_or_default()
    }

    fn hide_add_keyword(&self) {
        let Some(button) = self
            .document
            .get_element_by_id(ids::ADD_KEYWORD)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        if let Err(e) = button.style().set_property("display", "none") {
            warn!(error = ?e, "Failed to hide add keyword button");
        }
    }
}

/// Search result preview
pub struct DomPreview {
    document: Document,
}

impl DomPreview {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn set(&self, id: &str, value: &str) {
        if let Some(element) = self.document.get_element_by_id(id) {
            element.set_text_content(Some(value));
        }
    }
}

impl PreviewWidget for DomPreview {
    fn set_title(&self, title: &str) {
        self.set(ids::SNIPPET_TITLE, title);
    }

    fn set_url(&self, url_path: &str) {
        self.set(ids::SNIPPET_URL, url_path);
    }

    fn set_description(&self, description: &str) {
        self.set(ids::SNIPPET_DESCRIPTION, description);
    }

    fn set_interactive(&self, interactive: bool) {
        let editable = if interactive { "true" } else { "false" };
        for id in [ids::SNIPPET_TITLE, ids::SNIPPET_URL, ids::SNIPPET_DESCRIPTION] {
            if let Some(field) = self.document.get_element_by_id(id) {
                let _ = field.set_attribute("contenteditable", editable);
            }
        }
        if let Some(container) = self.document.get_element_by_id(ids::SNIPPET) {
            let _ = container
                .class_list()
                .toggle_with_force(ISOLATED_CLASS, !interactive);
        }
    }
}

/// Page-wide signals dispatched on `window`
pub struct DomEvents;

impl PageEvents for DomEvents {
    fn emit(&self, name: &str) {
        let dispatched = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window object available"))
            .and_then(|window| {
                let event = Event::new(name)?;
                window.dispatch_event(&event)
            });
        if let Err(e) = dispatched {
            warn!(event = name, error = ?e, "Failed to dispatch page event");
        }
    }
}

/// Hands focus keyword lookups to the page script
pub struct DomKeywordUsage;

impl KeywordUsageLookup for DomKeywordUsage {
    fn request(&self, keyword: &str) {
        let dispatched = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window object available"))
            .and_then(|window| {
                let init = CustomEventInit::new();
                init.set_detail(&JsValue::from_str(keyword));
                let event = CustomEvent::new_with_event_init_dict(KEYWORD_USAGE_EVENT, &init)?;
                window.dispatch_event(&event)
            });
        if let Err(e) = dispatched {
            warn!(keyword, error = ?e, "Failed to request keyword usage");
        }
    }
}
