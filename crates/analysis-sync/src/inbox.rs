//! Ordered event inbox for asynchronous engine results
//!
//! The engine never calls back into the session directly. It posts
//! `EngineEvent`s through an `EventSender`; the orchestrator drains them in
//! arrival order and compares each event's request id with the latest issued
//! request, so stale results are a plain comparison.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use shared_types::{AnalysisDimension, MarkSet};

/// Identity of one analysis request, increasing for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A dimension finished scoring
    Scored {
        request: RequestId,
        dimension: AnalysisDimension,
        raw_score: Option<f64>,
        marks: Option<MarkSet>,
    },
    /// Marks requested for display, e.g. from an assessment's marker button
    Marks { request: RequestId, marks: MarkSet },
}

impl EngineEvent {
    pub fn request(&self) -> RequestId {
        match self {
            EngineEvent::Scored { request, .. } | EngineEvent::Marks { request, .. } => *request,
        }
    }
}

type Queue = Rc<RefCell<VecDeque<EngineEvent>>>;

/// Handle given to the engine for posting results
#[derive(Clone)]
pub struct EventSender {
    queue: Queue,
}

impl EventSender {
    pub fn post(&self, event: EngineEvent) {
        self.queue.borrow_mut().push_back(event);
    }
}

pub struct Inbox {
    queue: Queue,
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            queue: self.queue.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Take the oldest event. The queue borrow ends before the event is
    /// handled, so handlers may post new events.
    pub fn pop(&self) -> Option<EngineEvent> {
        self.queue.borrow_mut().pop_front()
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues request ids and remembers the newest one
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: Cell<u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestId {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        RequestId(next)
    }

    pub fn latest(&self) -> Option<RequestId> {
        match self.latest.get() {
            0 => None,
            n => Some(RequestId(n)),
        }
    }

    /// An event is current only if it answers the newest request
    pub fn is_current(&self, request: RequestId) -> bool {
        self.latest() == Some(request)
    }
}
