//! JavaScript-hosted scoring engine
//!
//! The engine is a JS class constructed with the serialized `EngineArgs`. It
//! must expose `analyze(requestId, snapshot, keywordUsage)` and report back
//! through the session's `postScore` and `postMarks` methods, tagging each
//! result with the request id it was given. `keywordUsage` is the list of
//! other posts using the focus keyword, or `null` while unknown.
//!
//! The constructed engine and its arguments are published on
//! `window.postAnalysis` before the ready event fires, so page plugins can
//! attach to the engine from their ready handler.

use analysis_sync::{
    AnalysisRequest, EngineArgs, EngineFactory, EventSender, ScoringEngine, SyncError,
};
use js_sys::{Array, Function, Object, Reflect};
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Global holding `{ engine, engineArgs }` for page plugins
pub const ANALYSIS_GLOBAL: &str = "postAnalysis";

/// Serialize to plain JS objects rather than `Map`s
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

pub struct JsEngineFactory {
    constructor: Function,
}

impl JsEngineFactory {
    pub fn new(constructor: Function) -> Self {
        Self { constructor }
    }
}

impl EngineFactory for JsEngineFactory {
    fn create(
        &self,
        args: &EngineArgs,
        _events: EventSender,
    ) -> Result<Box<dyn ScoringEngine>, SyncError> {
        // Results come back through the session's postScore and postMarks,
        // which share this inbox
        let js_args = to_js(args).map_err(|e| SyncError::Engine(format!("{:?}", e)))?;
        let instance = Reflect::construct(&self.constructor, &Array::of1(&js_args))
            .map_err(|e| SyncError::Engine(format!("Failed to construct engine: {:?}", e)))?;

        let analyze = Reflect::get(&instance, &JsValue::from_str("analyze"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| SyncError::Engine("Engine has no analyze method".to_string()))?;

        if let Err(e) = publish_global(&instance, &js_args) {
            warn!(error = ?e, "Failed to publish engine for plugins");
        }

        Ok(Box::new(JsEngine { instance, analyze }))
    }
}

fn publish_global(engine: &JsValue, args: &JsValue) -> Result<(), JsValue> {
    let exposed = Object::new();
    Reflect::set(&exposed, &JsValue::from_str("engine"), engine)?;
    Reflect::set(&exposed, &JsValue::from_str("engineArgs"), args)?;
    Reflect::set(&js_sys::global(), &JsValue::from_str(ANALYSIS_GLOBAL), &exposed)?;
    Ok(())
}

pub struct JsEngine {
    instance: JsValue,
    analyze: Function,
}

impl ScoringEngine for JsEngine {
    fn analyze(&mut self, request: AnalysisRequest) {
        let snapshot = match to_js(&request.snapshot) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(request = %request.id, error = ?e, "Failed to serialize snapshot");
                return;
            }
        };
        let usage = match to_js(&request.keyword_usage) {
            Ok(usage) => usage,
            Err(e) => {
                warn!(request = %request.id, error = ?e, "Failed to serialize keyword usage");
                JsValue::NULL
            }
        };
        let id = JsValue::from_f64(request.id.0 as f64);

        match self.analyze.call3(&self.instance, &id, &snapshot, &usage) {
            Ok(_) => debug!(request = %request.id, "Handed snapshot to engine"),
            Err(e) => warn!(request = %request.id, error = ?e, "Engine rejected snapshot"),
        }
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use analysis_sync::{ActiveDimensions, DocumentSnapshot, Inbox, RequestId};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn engine_class() -> Function {
        Function::new_no_args(
            "return class {
                 constructor(args) { this.args = args; this.seen = []; }
                 analyze(id, snapshot, usage) { this.seen.push([id, snapshot.title, usage]); }
             };",
        )
        .call0(&JsValue::NULL)
        .unwrap()
        .dyn_into()
        .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_factory_passes_camel_case_args() {
        let class = engine_class();
        let factory = JsEngineFactory::new(class);
        let args = EngineArgs::for_dimensions(ActiveDimensions::ContentOnly);

        assert!(factory.create(&args, Inbox::new().sender()).is_ok());
        let exposed = Reflect::get(&js_sys::global(), &ANALYSIS_GLOBAL.into()).unwrap();
        let engine = Reflect::get(&exposed, &"engine".into()).unwrap();
        assert!(Reflect::has(&engine, &"seen".into()).unwrap());
        let exposed_args = Reflect::get(&exposed, &"engineArgs".into()).unwrap();
        assert_eq!(
            Reflect::get(&exposed_args, &"contentAnalysisActive".into())
                .unwrap()
                .as_bool(),
            Some(true)
        );
        let js_args = to_js(&args).unwrap();
        let callbacks = Reflect::get(&js_args, &"callbacks".into()).unwrap();
        assert_eq!(
            Reflect::get(&callbacks, &"saveContentScore".into())
                .unwrap()
                .as_bool(),
            Some(true)
        );
    }

    #[wasm_bindgen_test]
    fn test_engine_without_analyze_is_rejected() {
        let class: Function = Function::new_no_args("return class {};")
            .call0(&JsValue::NULL)
            .unwrap()
            .dyn_into()
            .unwrap();
        let factory = JsEngineFactory::new(class);
        let args = EngineArgs::for_dimensions(ActiveDimensions::Both);
        assert!(matches!(
            factory.create(&args, Inbox::new().sender()),
            Err(SyncError::Engine(_))
        ));
    }

    #[wasm_bindgen_test]
    fn test_analyze_forwards_request() {
        let factory = JsEngineFactory::new(engine_class());
        let mut engine = factory
            .create(
                &EngineArgs::for_dimensions(ActiveDimensions::Both),
                Inbox::new().sender(),
            )
            .unwrap();

        engine.analyze(AnalysisRequest {
            id: RequestId(3),
            snapshot: DocumentSnapshot {
                title: "Hello".to_string(),
                ..Default::default()
            },
            keyword_usage: Some(vec![4]),
        });

        let exposed = Reflect::get(&js_sys::global(), &ANALYSIS_GLOBAL.into()).unwrap();
        let engine = Reflect::get(&exposed, &"engine".into()).unwrap();
        let seen: Array = Reflect::get(&engine, &"seen".into()).unwrap().into();
        let call: Array = seen.get(0).into();
        assert_eq!(call.get(0).as_f64(), Some(3.0));
        assert_eq!(call.get(1).as_string().as_deref(), Some("Hello"));
        let usage: Array = call.get(2).into();
        assert_eq!(usage.get(0).as_f64(), Some(4.0));
    }
}
