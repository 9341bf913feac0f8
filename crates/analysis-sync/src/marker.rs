//! Marker pipeline
//!
//! Paints engine marks onto the live editor. The decorator is bound lazily on
//! the first paint and reused afterwards. Every failure degrades to a no-op so
//! the scoring flow never sees an editor error.

use std::rc::Rc;

use shared_types::{DocumentSnapshot, MarkSet};
use tracing::{debug, warn};

use crate::host::{Decorator, EditorAdapter};

/// Why a paint request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MarkersDisabled,
    EditorUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Applied { marks: usize },
    Skipped(SkipReason),
    Failed,
}

pub struct MarkerPipeline {
    editor: Rc<dyn EditorAdapter>,
    editor_id: String,
    enabled: bool,
    decorator: Option<Box<dyn Decorator>>,
}

impl MarkerPipeline {
    pub fn new(editor: Rc<dyn EditorAdapter>, editor_id: &str, enabled: bool) -> Self {
        Self {
            editor,
            editor_id: editor_id.to_string(),
            enabled,
            decorator: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether marks would be painted right now
    pub fn can_paint(&self) -> bool {
        self.enabled && self.editor.is_available(&self.editor_id)
    }

    pub fn is_bound(&self) -> bool {
        self.decorator.is_some()
    }

    /// Replace the editor's decorations with `marks`
    pub fn apply_marks(&mut self, snapshot: &DocumentSnapshot, marks: &MarkSet) -> MarkOutcome {
        if !self.enabled {
            return MarkOutcome::Skipped(SkipReason::MarkersDisabled);
        }
        if !self.editor.is_available(&self.editor_id) {
            debug!(editor = %self.editor_id, "Editor not available, skipping marks");
            return MarkOutcome::Skipped(SkipReason::EditorUnavailable);
        }

        if self.decorator.is_none() {
            match self.editor.decorator(&self.editor_id) {
                Ok(decorator) => self.decorator = Some(decorator),
                Err(e) => {
                    warn!(error = %e, "Failed to bind editor decorator");
                    return MarkOutcome::Failed;
                }
            }
        }

        let Some(decorator) = self.decorator.as_mut() else {
            return MarkOutcome::Failed;
        };

        let result = match decorator.clear() {
            Ok(()) => decorator.paint(snapshot, marks),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => MarkOutcome::Applied { marks: marks.len() },
            Err(e) => {
                warn!(error = %e, "Failed to paint marks");
                MarkOutcome::Failed
            }
        }
    }

    /// Remove every decoration, if a decorator was ever bound
    pub fn clear(&mut self) {
        if let Some(decorator) = self.decorator.as_mut() {
            if let Err(e) = decorator.clear() {
                warn!(error = %e, "Failed to clear marks");
            }
        }
    }
}
