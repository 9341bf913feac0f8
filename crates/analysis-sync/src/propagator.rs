//! Score fan-out to every subscribed widget

use std::collections::HashMap;
use std::rc::Rc;

use shared_types::AnalysisDimension;
use tracing::debug;

use crate::host::ScoreWidget;
use crate::indicator::{map_score, ScoreIndicator};

pub struct ScorePropagator {
    widgets: Vec<Rc<dyn ScoreWidget>>,
    current: HashMap<AnalysisDimension, ScoreIndicator>,
}

impl ScorePropagator {
    pub fn new(widgets: Vec<Rc<dyn ScoreWidget>>) -> Self {
        Self {
            widgets,
            current: HashMap::new(),
        }
    }

    /// Map `raw` once and show the same indicator on every widget
    pub fn publish(&mut self, dimension: AnalysisDimension, raw: Option<f64>) -> ScoreIndicator {
        let indicator = map_score(raw);
        self.publish_indicator(dimension, indicator);
        indicator
    }

    pub fn publish_indicator(&mut self, dimension: AnalysisDimension, indicator: ScoreIndicator) {
        for widget in self.widgets.iter().filter(|w| w.accepts(dimension)) {
            widget.show(dimension, &indicator);
        }
        debug!(
            dimension = %dimension,
            class = indicator.display_class,
            "Published score indicator"
        );
        self.current.insert(dimension, indicator);
    }

    /// Last indicator published for `dimension`
    pub fn current(&self, dimension: AnalysisDimension) -> Option<ScoreIndicator> {
        self.current.get(&dimension).copied()
    }
}
