//! Host page collaborators
//!
//! Everything the synchronization layer reads from or writes to the page goes
//! through these traits. The browser bindings implement them over the DOM;
//! tests implement them over plain maps. All methods take `&self` because the
//! page is a shared, single-threaded resource.

use std::rc::Rc;

use shared_types::{AnalysisDimension, DocumentSnapshot, MarkSet};

use crate::config::AnalysisConfig;
use crate::error::SyncError;
use crate::indicator::ScoreIndicator;

/// Form fields and editable elements of the post form
pub trait FormFields {
    /// Value of an input or textarea, `None` when the element is missing
    fn value(&self, id: &str) -> Option<String>;

    fn set_value(&self, id: &str, value: &str);

    /// Text content of a non-input element
    fn text(&self, id: &str) -> Option<String>;

    fn set_text(&self, id: &str, value: &str);
}

/// Paints marks onto the live editor
pub trait Decorator {
    /// Remove every decoration previously painted
    fn clear(&mut self) -> Result<(), SyncError>;

    /// Paint `marks` over the given body text
    fn paint(&mut self, snapshot: &DocumentSnapshot, marks: &MarkSet) -> Result<(), SyncError>;
}

/// The rich-text editor
pub trait EditorAdapter {
    fn is_available(&self, editor_id: &str) -> bool;

    /// Current editor markup, `None` when the editor is not loaded
    fn content(&self, editor_id: &str) -> Option<String>;

    /// Bind a decorator to the live editor instance
    fn decorator(&self, editor_id: &str) -> Result<Box<dyn Decorator>, SyncError>;
}

/// A widget showing score indicators
pub trait ScoreWidget {
    fn name(&self) -> &str;

    fn accepts(&self, _dimension: AnalysisDimension) -> bool {
        true
    }

    fn show(&self, dimension: AnalysisDimension, indicator: &ScoreIndicator);
}

/// The analysis tabs
pub trait TabView {
    fn show_tab(&self, dimension: AnalysisDimension, visible: bool);

    fn set_tab_score(&self, dimension: AnalysisDimension, indicator: &ScoreIndicator);

    /// Keyword currently typed into the keyword tab
    fn keyword(&self) -> String;

    fn hide_add_keyword(&self);
}

/// The search result preview
pub trait PreviewWidget {
    fn set_title(&self, title: &str);

    fn set_url(&self, url_path: &str);

    fn set_description(&self, description: &str);

    fn set_interactive(&self, interactive: bool);
}

/// Page level signals other scripts can listen for
pub trait PageEvents {
    fn emit(&self, name: &str);
}

/// Looks up other posts already targeting a focus keyword
///
/// Answers are delivered later through `Orchestrator::on_keyword_usage`.
pub trait KeywordUsageLookup {
    fn request(&self, keyword: &str);
}

/// Everything a session needs from its host, created once at startup
#[derive(Clone)]
pub struct SessionContext {
    pub config: Rc<AnalysisConfig>,
    pub form: Rc<dyn FormFields>,
    pub editor: Rc<dyn EditorAdapter>,
    pub score_widgets: Vec<Rc<dyn ScoreWidget>>,
    pub tabs: Rc<dyn TabView>,
    pub preview: Rc<dyn PreviewWidget>,
    pub events: Rc<dyn PageEvents>,
    pub keyword_usage: Rc<dyn KeywordUsageLookup>,
}
