//! Analysis tab state
//!
//! Which dimensions are enabled is fixed at startup. Which tab is visible
//! changes at runtime and is mutually exclusive across dimensions.

use std::rc::Rc;

use shared_types::AnalysisDimension;
use tracing::debug;

use crate::error::SyncError;
use crate::host::TabView;
use crate::indicator::ScoreIndicator;

/// Enabled analysis dimensions, computed once from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveDimensions {
    KeywordOnly,
    ContentOnly,
    Both,
    Neither,
}

impl ActiveDimensions {
    pub fn from_flags(keyword: bool, content: bool) -> Self {
        match (keyword, content) {
            (true, true) => ActiveDimensions::Both,
            (true, false) => ActiveDimensions::KeywordOnly,
            (false, true) => ActiveDimensions::ContentOnly,
            (false, false) => ActiveDimensions::Neither,
        }
    }

    pub fn is_enabled(&self, dimension: AnalysisDimension) -> bool {
        match (self, dimension) {
            (ActiveDimensions::Both, _) => true,
            (ActiveDimensions::KeywordOnly, AnalysisDimension::Keyword) => true,
            (ActiveDimensions::ContentOnly, AnalysisDimension::Content) => true,
            _ => false,
        }
    }

    pub fn keyword(&self) -> bool {
        self.is_enabled(AnalysisDimension::Keyword)
    }

    pub fn content(&self) -> bool {
        self.is_enabled(AnalysisDimension::Content)
    }

    pub fn enabled(&self) -> Vec<AnalysisDimension> {
        AnalysisDimension::ALL
            .into_iter()
            .filter(|d| self.is_enabled(*d))
            .collect()
    }

    /// Dimension driving the single status light
    pub fn status_light_dimension(&self) -> Option<AnalysisDimension> {
        // Keyword owns the light whenever it is enabled
        self.initial_tab()
    }

    /// Tab shown when the session starts
    pub fn initial_tab(&self) -> Option<AnalysisDimension> {
        match self {
            ActiveDimensions::KeywordOnly | ActiveDimensions::Both => {
                Some(AnalysisDimension::Keyword)
            }
            ActiveDimensions::ContentOnly => Some(AnalysisDimension::Content),
            ActiveDimensions::Neither => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleTab {
    Keyword,
    Content,
    Neither,
}

impl VisibleTab {
    pub fn dimension(&self) -> Option<AnalysisDimension> {
        match self {
            VisibleTab::Keyword => Some(AnalysisDimension::Keyword),
            VisibleTab::Content => Some(AnalysisDimension::Content),
            VisibleTab::Neither => None,
        }
    }
}

impl From<AnalysisDimension> for VisibleTab {
    fn from(dimension: AnalysisDimension) -> Self {
        match dimension {
            AnalysisDimension::Keyword => VisibleTab::Keyword,
            AnalysisDimension::Content => VisibleTab::Content,
        }
    }
}

pub struct TabManager {
    dimensions: ActiveDimensions,
    visible: VisibleTab,
    view: Rc<dyn TabView>,
}

impl TabManager {
    pub fn new(dimensions: ActiveDimensions, view: Rc<dyn TabView>) -> Self {
        Self {
            dimensions,
            visible: VisibleTab::Neither,
            view,
        }
    }

    pub fn dimensions(&self) -> ActiveDimensions {
        self.dimensions
    }

    pub fn is_enabled(&self, dimension: AnalysisDimension) -> bool {
        self.dimensions.is_enabled(dimension)
    }

    pub fn enabled_dimensions(&self) -> Vec<AnalysisDimension> {
        self.dimensions.enabled()
    }

    pub fn visible(&self) -> VisibleTab {
        self.visible
    }

    pub fn active_tab(&self) -> Option<AnalysisDimension> {
        self.visible.dimension()
    }

    /// Make `dimension` the visible tab
    ///
    /// # Errors
    /// Returns `DimensionDisabled` if the dimension is not enabled
    pub fn activate(&mut self, dimension: AnalysisDimension) -> Result<(), SyncError> {
        if !self.is_enabled(dimension) {
            return Err(SyncError::DimensionDisabled(dimension));
        }

        if let Some(previous) = self.visible.dimension() {
            if previous != dimension {
                self.view.show_tab(previous, false);
            }
        }
        self.view.show_tab(dimension, true);
        self.visible = dimension.into();
        debug!(tab = %dimension, "Activated analysis tab");
        Ok(())
    }

    pub fn activate_keyword_tab(&mut self) -> Result<(), SyncError> {
        self.activate(AnalysisDimension::Keyword)
    }

    pub fn activate_content_tab(&mut self) -> Result<(), SyncError> {
        self.activate(AnalysisDimension::Content)
    }

    /// Show the latest indicator on the dimension's tab
    pub fn update_tab_score(&self, dimension: AnalysisDimension, indicator: &ScoreIndicator) {
        if self.is_enabled(dimension) {
            self.view.set_tab_score(dimension, indicator);
        }
    }

    /// Keyword typed into the keyword tab, empty when keyword analysis is off
    pub fn keyword_from_tab(&self) -> String {
        if self.dimensions.keyword() {
            self.view.keyword()
        } else {
            String::new()
        }
    }

    pub fn hide_add_keyword(&self) {
        self.view.hide_add_keyword();
    }
}
