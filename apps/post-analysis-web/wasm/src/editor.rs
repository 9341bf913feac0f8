//! TinyMCE integration
//!
//! The editor global is looked up on every call since it may load after the
//! session starts, or be switched off in favour of the plain textarea.

use analysis_sync::marks::{has_marks, render_marks, strip_marks};
use analysis_sync::{Decorator, DocumentSnapshot, EditorAdapter, MarkSet, SyncError};
use js_sys::{Array, Function, Reflect};
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Name of the editor global on `window`
pub const EDITOR_GLOBAL: &str = "tinyMCE";

fn js_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

/// Call `target[name](...args)`
fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue, JsValue> {
    let method = Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("{} is not a function", name)))?;
    method.apply(target, args)
}

/// Live editor instance for `editor_id`, if the editor library is loaded
fn editor_instance(editor_id: &str) -> Option<JsValue> {
    let global = Reflect::get(&js_sys::global(), &JsValue::from_str(EDITOR_GLOBAL)).ok()?;
    if global.is_undefined() || global.is_null() {
        return None;
    }
    let editor = call_method(&global, "get", &Array::of1(&JsValue::from_str(editor_id))).ok()?;
    if editor.is_undefined() || editor.is_null() {
        None
    } else {
        Some(editor)
    }
}

fn get_content(editor: &JsValue) -> Result<String, SyncError> {
    call_method(editor, "getContent", &Array::new())
        .map_err(|e| SyncError::EditorUnavailable(js_error(e)))?
        .as_string()
        .ok_or_else(|| SyncError::EditorUnavailable("getContent returned no text".to_string()))
}

fn set_content(editor: &JsValue, content: &str) -> Result<(), SyncError> {
    call_method(editor, "setContent", &Array::of1(&JsValue::from_str(content)))
        .map(|_| ())
        .map_err(|e| SyncError::Decorator(js_error(e)))
}

/// Editor adapter over the global TinyMCE instance
#[derive(Debug, Clone, Copy, Default)]
pub struct TinyMceEditor;

impl EditorAdapter for TinyMceEditor {
    fn is_available(&self, editor_id: &str) -> bool {
        let Some(editor) = editor_instance(editor_id) else {
            return false;
        };
        // A hidden editor means the textarea is showing
        let hidden = call_method(&editor, "isHidden", &Array::new())
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        !hidden
    }

    fn content(&self, editor_id: &str) -> Option<String> {
        let editor = editor_instance(editor_id)?;
        get_content(&editor).ok()
    }

    fn decorator(&self, editor_id: &str) -> Result<Box<dyn Decorator>, SyncError> {
        let editor = editor_instance(editor_id)
            .ok_or_else(|| SyncError::EditorUnavailable(editor_id.to_string()))?;
        Ok(Box::new(TinyMceDecorator { editor }))
    }
}

/// Paints marks into the editor markup
pub struct TinyMceDecorator {
    editor: JsValue,
}

impl Decorator for TinyMceDecorator {
    fn clear(&mut self) -> Result<(), SyncError> {
        let content = get_content(&self.editor)?;
        if has_marks(&content) {
            set_content(&self.editor, &strip_marks(&content))?;
        }
        Ok(())
    }

    fn paint(&mut self, snapshot: &DocumentSnapshot, marks: &MarkSet) -> Result<(), SyncError> {
        let content = get_content(&self.editor)?;
        // Offsets only hold for the text that was analysed
        if content != snapshot.body_text {
            debug!("Editor content changed since analysis, not painting marks");
            return Ok(());
        }
        let (marked, painted) = render_marks(&content, marks);
        if painted > 0 {
            set_content(&self.editor, &marked)?;
        }
        debug!(painted, skipped = marks.len().saturating_sub(painted), "Painted marks");
        Ok(())
    }
}
