//! In-memory collaborators shared by the unit tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::component::TemplateFetcher;
use crate::error::{Result, RouterError};
use crate::instruction::RouteParams;
use crate::router::{NavigationOutcome, Router, SharedViewportHooks};
use crate::viewport::{AnimationHandle, ContextId, ElementId, ViewHost};

/// Router double: `:param` patterns for generation, an explicit recognised
/// set, and a log of every navigation and viewport registration.
#[derive(Default)]
pub struct RecordingRouter {
    routes: Mutex<HashMap<String, String>>,
    recognized: Mutex<HashSet<String>>,
    corrections: Mutex<HashMap<String, String>>,
    navigations: Mutex<Vec<String>>,
    viewports: Mutex<Vec<(String, SharedViewportHooks)>>,
    generated: AtomicUsize,
}

impl RecordingRouter {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, name: &str, pattern: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(name.to_string(), pattern.to_string());
    }

    pub fn recognize_path(&self, path: &str) {
        self.recognized.lock().unwrap().insert(path.to_string());
    }

    pub fn correct(&self, from: &str, to: &str) {
        self.corrections
            .lock()
            .unwrap()
            .insert(from.to_string(), to.to_string());
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }

    pub fn viewport_names(&self) -> Vec<String> {
        self.viewports
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn viewport(&self, name: &str) -> Option<SharedViewportHooks> {
        self.viewports
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, hooks)| Arc::clone(hooks))
    }
}

impl Router for RecordingRouter {
    fn navigate(&self, path: &str) -> Result<NavigationOutcome> {
        self.navigations.lock().unwrap().push(path.to_string());
        Ok(match self.corrections.lock().unwrap().get(path) {
            Some(corrected) => NavigationOutcome::corrected(corrected.clone()),
            None => NavigationOutcome::unchanged(),
        })
    }

    fn recognize(&self, path: &str) -> bool {
        self.recognized.lock().unwrap().contains(path)
    }

    fn generate(&self, name: &str, params: &RouteParams) -> Result<String> {
        let pattern = self
            .routes
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| RouterError::UnresolvableLink(name.to_string()))?;
        self.generated.fetch_add(1, Ordering::SeqCst);
        let path = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(key) => match params.get(key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                },
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/");
        Ok(path)
    }

    fn register_viewport(&self, name: &str, hooks: SharedViewportHooks) -> Result<()> {
        self.viewports
            .lock()
            .unwrap()
            .push((name.to_string(), hooks));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    CreateContext { parent: ContextId, id: ContextId },
    DestroyContext(ContextId),
    Render { context: ContextId, element: ElementId, template: String },
    Enter { element: ElementId, after: ElementId, handle: AnimationHandle },
    Leave { element: ElementId, handle: AnimationHandle },
    Cancel(AnimationHandle),
    Remove(ElementId),
}

/// View host double that hands out sequential ids and records every call.
#[derive(Default)]
pub struct RecordingHost {
    next: AtomicU64,
    ops: Mutex<Vec<HostOp>>,
    live: Mutex<BTreeSet<ContextId>>,
}

impl RecordingHost {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            next: AtomicU64::new(1000),
            ..Self::default()
        })
    }

    pub fn ops(&self) -> Vec<HostOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn live_contexts(&self) -> BTreeSet<ContextId> {
        self.live.lock().unwrap().clone()
    }

    fn id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    fn push(&self, op: HostOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl ViewHost for RecordingHost {
    fn create_context(&self, parent: ContextId) -> ContextId {
        let id = ContextId(self.id());
        self.live.lock().unwrap().insert(id);
        self.push(HostOp::CreateContext { parent, id });
        id
    }

    fn destroy_context(&self, context: ContextId) {
        self.live.lock().unwrap().remove(&context);
        self.push(HostOp::DestroyContext(context));
    }

    fn render(&self, context: ContextId, template: &str) -> ElementId {
        let element = ElementId(self.id());
        self.push(HostOp::Render {
            context,
            element,
            template: template.to_string(),
        });
        element
    }

    fn enter(&self, element: ElementId, after: ElementId) -> AnimationHandle {
        let handle = AnimationHandle(self.id());
        self.push(HostOp::Enter {
            element,
            after,
            handle,
        });
        handle
    }

    fn leave(&self, element: ElementId) -> AnimationHandle {
        let handle = AnimationHandle(self.id());
        self.push(HostOp::Leave { element, handle });
        handle
    }

    fn cancel(&self, animation: AnimationHandle) {
        self.push(HostOp::Cancel(animation));
    }

    fn remove(&self, element: ElementId) {
        self.push(HostOp::Remove(element));
    }
}

/// Template fetcher serving a fixed location map.
#[derive(Default)]
pub struct StaticFetcher {
    templates: Mutex<HashMap<String, String>>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, location: &str, text: &str) {
        self.templates
            .lock()
            .unwrap()
            .insert(location.to_string(), text.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl TemplateFetcher for StaticFetcher {
    fn fetch(&self, location: &str) -> BoxFuture<'static, Result<String>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = self
            .templates
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| RouterError::TemplateFetch {
                location: location.to_string(),
                reason: "not found".to_string(),
            });
        futures::future::ready(result).boxed()
    }
}
