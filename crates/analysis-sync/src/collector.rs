//! Document snapshot collection and form persistence
//!
//! The collector is the only component that reads the post form and the only
//! path that writes analysis results back into it.

use std::cell::Cell;
use std::rc::Rc;

use shared_types::{AnalysisDimension, DocumentSnapshot, SnippetField, SnippetFields};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::SyncError;
use crate::host::{EditorAdapter, FormFields};
use crate::indicator::format_raw_score;
use crate::marks::strip_marks;
use crate::preview::PreviewChange;
use crate::tabs::ActiveDimensions;

pub struct SnapshotCollector {
    config: Rc<AnalysisConfig>,
    form: Rc<dyn FormFields>,
    editor: Rc<dyn EditorAdapter>,
    dimensions: ActiveDimensions,
    leave_post_name_untouched: Cell<bool>,
}

impl SnapshotCollector {
    pub fn new(
        config: Rc<AnalysisConfig>,
        form: Rc<dyn FormFields>,
        editor: Rc<dyn EditorAdapter>,
    ) -> Self {
        let dimensions = config.active_dimensions();
        Self {
            config,
            form,
            editor,
            dimensions,
            leave_post_name_untouched: Cell::new(false),
        }
    }

    fn value(&self, id: &str) -> String {
        self.form.value(id).unwrap_or_default()
    }

    /// Read the live document state
    pub fn collect(&self) -> DocumentSnapshot {
        let fields = &self.config.fields;
        DocumentSnapshot {
            title: self.value(&fields.title),
            body_text: self.body_text(),
            excerpt: self.value(&fields.excerpt),
            focus_term: self.focus_term(),
            url_path: self.url_path(),
            meta_description: self.meta_description(),
        }
    }

    /// Trimmed focus keyword, empty without keyword analysis
    pub fn focus_term(&self) -> String {
        if self.dimensions.keyword() {
            self.value(&self.config.fields.focus_keyword_input)
                .trim()
                .to_string()
        } else {
            String::new()
        }
    }

    /// Editor markup when the editor is loaded, the plain textarea otherwise
    fn body_text(&self) -> String {
        let editor_id = &self.config.editor_id;
        let raw = if self.editor.is_available(editor_id) {
            self.editor.content(editor_id)
        } else {
            None
        };
        let raw = raw.unwrap_or_else(|| self.value(&self.config.fields.content));
        strip_marks(&raw)
    }

    /// Slug from the post name field, then the editable permalink, then the title
    pub fn url_path(&self) -> String {
        let fields = &self.config.fields;
        [
            self.form.value(&fields.post_name),
            self.form.text(&fields.editable_post_name_full),
        ]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| self.title())
    }

    pub fn title(&self) -> String {
        self.value(&self.config.fields.title)
    }

    fn meta_description(&self) -> String {
        self.value(&self.config.fields.meta_description)
    }

    /// Fields seeding the search result preview
    ///
    /// A blank SEO title shows the post title instead. The fallback is for
    /// display only and is never written back.
    pub fn snippet_fields(&self) -> SnippetFields {
        let seo_title = self.value(&self.config.fields.seo_title);
        let title = if seo_title.trim().is_empty() {
            self.title()
        } else {
            seo_title
        };

        SnippetFields {
            title,
            url_path: self.url_path(),
            meta_description: self.meta_description(),
        }
    }

    fn score_field(&self, dimension: AnalysisDimension) -> &str {
        match dimension {
            AnalysisDimension::Keyword => &self.config.fields.keyword_score,
            AnalysisDimension::Content => &self.config.fields.content_score,
        }
    }

    /// Score saved with the post, if any
    pub fn saved_score(&self, dimension: AnalysisDimension) -> String {
        let configured = match dimension {
            AnalysisDimension::Keyword => self.config.saved_keyword_score.clone(),
            AnalysisDimension::Content => self.config.saved_content_score.clone(),
        };
        configured.unwrap_or_else(|| self.value(self.score_field(dimension)))
    }

    /// Write a score into the dimension's hidden field
    ///
    /// Returns `false` when the field already held the same value.
    pub fn persist_score(&self, dimension: AnalysisDimension, raw: Option<f64>) -> bool {
        let id = self.score_field(dimension);
        let formatted = format_raw_score(raw);
        if self.form.value(id).as_deref() == Some(formatted.as_str()) {
            return false;
        }
        self.form.set_value(id, &formatted);
        debug!(dimension = %dimension, score = %formatted, "Persisted score");
        true
    }

    /// Skip the next post name write
    ///
    /// The host does not persist auto-generated slugs, so a slug applied from
    /// the server must not be written back as if the user chose it.
    pub fn leave_post_name_untouched(&self) {
        self.leave_post_name_untouched.set(true);
    }

    pub fn is_post_name_untouched(&self) -> bool {
        self.leave_post_name_untouched.get()
    }

    /// Persistence hook for edits made in the preview
    pub fn save_snippet_data(&self, fields: &SnippetFields, change: PreviewChange) {
        let ids = &self.config.fields;
        if change == PreviewChange::Edited(SnippetField::Title) {
            self.form.set_value(&ids.seo_title, &fields.title);
        }
        self.form.set_value(&ids.meta_description, &fields.meta_description);

        if self.leave_post_name_untouched.replace(false) {
            debug!("Left post name untouched after server slug");
            return;
        }

        if self.form.value(&ids.post_name).is_some() {
            self.form.set_value(&ids.post_name, &fields.url_path);
        }
        if self.form.text(&ids.editable_post_name).is_some() {
            self.form.set_text(&ids.editable_post_name, &fields.url_path);
            self.form
                .set_text(&ids.editable_post_name_full, &fields.url_path);
        }
    }

    /// Fields the collector depends on that the page does not have
    ///
    /// Scores for an enabled dimension are lost without its hidden field.
    pub fn missing_targets(&self) -> Vec<SyncError> {
        let mut ids = vec![self.config.fields.title.as_str()];
        ids.extend(
            self.dimensions
                .enabled()
                .into_iter()
                .map(|dimension| self.score_field(dimension)),
        );
        ids.into_iter()
            .filter(|id| self.form.value(id).is_none())
            .map(|id| SyncError::MissingTarget(id.to_string()))
            .collect()
    }

    /// Copy the visible keyword into the hidden focus keyword field
    ///
    /// Called when the post form is submitted. Returns whether a write happened.
    pub fn sync_focus_keyword(&self, visible_keyword: &str) -> bool {
        if !self.dimensions.keyword() || self.config.multi_keyword {
            return false;
        }
        let id = &self.config.fields.focus_keyword;
        if self.form.value(id).as_deref() == Some(visible_keyword) {
            return false;
        }
        self.form.set_value(id, visible_keyword);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Decorator;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapForm {
        values: RefCell<HashMap<String, String>>,
        texts: RefCell<HashMap<String, String>>,
        writes: Cell<usize>,
    }

    impl MapForm {
        fn with(values: &[(&str, &str)]) -> Rc<Self> {
            let form = Self::default();
            for (k, v) in values {
                form.values.borrow_mut().insert(k.to_string(), v.to_string());
            }
            Rc::new(form)
        }
    }

    impl FormFields for MapForm {
        fn value(&self, id: &str) -> Option<String> {
            self.values.borrow().get(id).cloned()
        }

        fn set_value(&self, id: &str, value: &str) {
            self.writes.set(self.writes.get() + 1);
            self.values
                .borrow_mut()
                .insert(id.to_string(), value.to_string());
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

    struct NoEditor;

    impl EditorAdapter for NoEditor {
        fn is_available(&self, _editor_id: &str) -> bool {
            false
        }

        fn content(&self, _editor_id: &str) -> Option<String> {
            None
        }

        fn decorator(&self, editor_id: &str) -> Result<Box<dyn Decorator>, SyncError> {
            Err(SyncError::EditorUnavailable(editor_id.to_string()))
        }
    }

    struct LoadedEditor(&'static str);

    impl EditorAdapter for LoadedEditor {
        fn is_available(&self, _editor_id: &str) -> bool {
            true
        }

        fn content(&self, _editor_id: &str) -> Option<String> {
            Some(self.0.to_string())
        }

        fn decorator(&self, editor_id: &str) -> Result<Box<dyn Decorator>, SyncError> {
            Err(SyncError::EditorUnavailable(editor_id.to_string()))
        }
    }

    fn collector(form: Rc<MapForm>, keyword: bool) -> SnapshotCollector {
        let config = AnalysisConfig {
            keyword_analysis_active: keyword,
            content_analysis_active: true,
            ..Default::default()
        };
        SnapshotCollector::new(Rc::new(config), form, Rc::new(NoEditor))
    }

    #[test]
    fn test_missing_targets() {
        let page = &[("title", "Hello"), ("seo_content_score", "")];
        assert_eq!(
            collector(MapForm::with(page), true).missing_targets(),
            vec![SyncError::MissingTarget("seo_linkdex".to_string())]
        );
        assert!(collector(MapForm::with(page), false)
            .missing_targets()
            .is_empty());
    }

    #[test]
    fn test_collect_reads_live_values() {
        let form = MapForm::with(&[
            ("title", "Hello"),
            ("content", "<p>Body</p>"),
            ("excerpt", "Short"),
            ("seo_focuskw_text_input", " rust "),
            ("seo_metadesc", "Meta"),
            ("post_name", "hello"),
        ]);
        let collector = collector(form.clone(), true);

        let snapshot = collector.collect();
        assert_eq!(
            snapshot,
            DocumentSnapshot {
                title: "Hello".to_string(),
                body_text: "<p>Body</p>".to_string(),
                excerpt: "Short".to_string(),
                focus_term: "rust".to_string(),
                url_path: "hello".to_string(),
                meta_description: "Meta".to_string(),
            }
        );

        form.set_value("title", "Hello again");
        assert_eq!(collector.collect().title, "Hello again");
    }

    #[test]
    fn test_focus_term_empty_without_keyword_analysis() {
        let form = MapForm::with(&[("seo_focuskw_text_input", "rust")]);
        assert_eq!(collector(form, false).collect().focus_term, "");
    }

    #[test]
    fn test_editor_content_is_preferred_and_stripped() {
        let form = MapForm::with(&[("content", "textarea")]);
        let collector = SnapshotCollector::new(
            Rc::new(AnalysisConfig::default()),
            form,
            Rc::new(LoadedEditor(
                "A <analysismark class=\"analysis-text-mark\">long</analysismark> text",
            )),
        );
        assert_eq!(collector.collect().body_text, "A long text");
    }

    #[test]
    fn test_url_path_falls_back_to_title() {
        let form = MapForm::with(&[("title", "Hello")]);
        assert_eq!(collector(form, true).url_path(), "Hello");
    }

    #[test]
    fn test_url_path_prefers_editable_permalink_over_title() {
        let form = MapForm::with(&[("title", "Hello"), ("post_name", "")]);
        form.set_text("editable-post-name-full", "hello-world");
        assert_eq!(collector(form, true).url_path(), "hello-world");
    }

    #[test]
    fn test_persist_score_is_idempotent() {
        let form = MapForm::with(&[]);
        let collector = collector(form.clone(), true);

        assert!(collector.persist_score(AnalysisDimension::Keyword, Some(63.0)));
        assert!(!collector.persist_score(AnalysisDimension::Keyword, Some(63.0)));
        assert_eq!(form.value("seo_linkdex").as_deref(), Some("63"));
        assert_eq!(form.writes.get(), 1);
    }

    #[test]
    fn test_persist_score_per_dimension() {
        let form = MapForm::with(&[]);
        let collector = collector(form.clone(), true);
        collector.persist_score(AnalysisDimension::Content, Some(30.0));
        assert_eq!(form.value("seo_content_score").as_deref(), Some("30"));
        assert_eq!(form.value("seo_linkdex"), None);
    }

    #[test]
    fn test_snippet_fields_fall_back_to_post_title() {
        let form = MapForm::with(&[("title", "Hello"), ("seo_metadesc", "Meta")]);
        let fields = collector(form, true).snippet_fields();
        assert_eq!(fields.title, "Hello");
        assert_eq!(fields.url_path, "Hello");
        assert_eq!(fields.meta_description, "Meta");
    }

    #[test]
    fn test_save_snippet_data_writes_post_name() {
        let form = MapForm::with(&[("post_name", "old")]);
        form.set_text("editable-post-name", "old");
        let collector = collector(form.clone(), true);

        collector.save_snippet_data(
            &SnippetFields {
                title: "T".to_string(),
                url_path: "new-slug".to_string(),
                meta_description: "D".to_string(),
            },
            PreviewChange::Edited(SnippetField::Title),
        );

        assert_eq!(form.value("post_name").as_deref(), Some("new-slug"));
        assert_eq!(form.text("editable-post-name-full").as_deref(), Some("new-slug"));
        assert_eq!(form.value("seo_title").as_deref(), Some("T"));
        assert_eq!(form.value("seo_metadesc").as_deref(), Some("D"));
    }

    #[test]
    fn test_title_fallback_is_not_persisted() {
        let form = MapForm::with(&[("title", "Hello"), ("seo_title", ""), ("seo_metadesc", "")]);
        let collector = collector(form.clone(), true);
        let mut fields = collector.snippet_fields();
        assert_eq!(fields.title, "Hello");

        fields.meta_description = "New meta".to_string();
        collector.save_snippet_data(&fields, PreviewChange::Edited(SnippetField::MetaDesc));
        collector.save_snippet_data(&fields, PreviewChange::ServerSlug);

        assert_eq!(form.value("seo_title").as_deref(), Some(""));
        assert_eq!(form.value("seo_metadesc").as_deref(), Some("New meta"));
    }

    #[test]
    fn test_leave_post_name_untouched_is_one_shot() {
        let form = MapForm::with(&[("post_name", "old")]);
        let collector = collector(form.clone(), true);
        let fields = SnippetFields {
            url_path: "server-slug".to_string(),
            ..Default::default()
        };

        collector.leave_post_name_untouched();
        collector.save_snippet_data(&fields, PreviewChange::ServerSlug);
        assert_eq!(form.value("post_name").as_deref(), Some("old"));
        assert!(!collector.is_post_name_untouched());

        collector.save_snippet_data(&fields, PreviewChange::Edited(SnippetField::UrlPath));
        assert_eq!(form.value("post_name").as_deref(), Some("server-slug"));
    }

    #[test]
    fn test_sync_focus_keyword() {
        let form = MapForm::with(&[("seo_focuskw", "old")]);
        let collector = collector(form.clone(), true);

        assert!(collector.sync_focus_keyword("new"));
        assert!(!collector.sync_focus_keyword("new"));
        assert_eq!(form.value("seo_focuskw").as_deref(), Some("new"));
    }

    #[test]
    fn test_sync_focus_keyword_skipped_for_multi_keyword() {
        let form = MapForm::with(&[("seo_focuskw", "old")]);
        let config = AnalysisConfig {
            keyword_analysis_active: true,
            multi_keyword: true,
            ..Default::default()
        };
        let collector = SnapshotCollector::new(Rc::new(config), form.clone(), Rc::new(NoEditor));
        assert!(!collector.sync_focus_keyword("new"));
        assert_eq!(form.value("seo_focuskw").as_deref(), Some("old"));
    }

    #[test]
    fn test_saved_score_prefers_configuration() {
        let form = MapForm::with(&[("seo_linkdex", "12")]);
        let config = AnalysisConfig {
            saved_keyword_score: Some("80".to_string()),
            ..Default::default()
        };
        let collector = SnapshotCollector::new(Rc::new(config), form, Rc::new(NoEditor));
        assert_eq!(collector.saved_score(AnalysisDimension::Keyword), "80");
        assert_eq!(collector.saved_score(AnalysisDimension::Content), "");
    }
}
