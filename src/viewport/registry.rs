use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, RouterError};
use crate::logging::{LogLevel, TARGET_VIEWPORT, json_kv, json_str};
use crate::router::{Router, SharedViewportHooks};

use super::coordinator::{TransitionCoordinator, ViewportServices};
use super::host::{AnimationHandle, ContextId, ElementId};

pub type SharedCoordinator = Arc<Mutex<TransitionCoordinator>>;

/// Stable handle to a registered view slot. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(usize);

impl ViewportId {
    pub fn index(&self) -> usize {
        self.0
    }
}

struct ViewportNode {
    name: String,
    /// Lookup-only back reference; ownership runs through `children`.
    parent: Option<ViewportId>,
    children: Vec<ViewportId>,
    router: Arc<dyn Router>,
    coordinator: SharedCoordinator,
}

/// Tree of named view slots.
pub struct ViewportRegistry {
    root_router: Arc<dyn Router>,
    services: ViewportServices,
    nodes: Vec<Option<ViewportNode>>,
    roots: Vec<ViewportId>,
}

impl ViewportRegistry {
    pub fn new(root_router: Arc<dyn Router>, services: ViewportServices) -> Self {
        Self {
            root_router,
            services,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn root_router(&self) -> Arc<dyn Router> {
        Arc::clone(&self.root_router)
    }

    /// Register a view slot under `parent` (or at the top level) and hand its
    /// hooks to the nearest router scope.
    pub fn register(
        &mut self,
        parent: Option<ViewportId>,
        name: Option<&str>,
        context: ContextId,
        anchor: ElementId,
    ) -> Result<ViewportId> {
        let name = name
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.services.config().default_viewport_name.clone());

        if let Some(parent) = parent {
            self.node(parent)?;
        }
        if self.find(parent, &name).is_some() {
            return Err(RouterError::DuplicateViewport(name));
        }

        let router = self.router_for(parent)?;
        let coordinator = Arc::new(Mutex::new(TransitionCoordinator::new(
            name.clone(),
            context,
            anchor,
            self.services.clone(),
        )));
        let hooks: SharedViewportHooks = coordinator.clone();
        router.register_viewport(&name, hooks)?;

        let id = ViewportId(self.nodes.len());
        self.nodes.push(Some(ViewportNode {
            name: name.clone(),
            parent,
            children: Vec::new(),
            router,
            coordinator,
        }));
        match parent {
            Some(parent) => self.node_mut(parent)?.children.push(id),
            None => self.roots.push(id),
        }

        self.services.config().log(
            LogLevel::Debug,
            TARGET_VIEWPORT,
            "viewport_registered",
            [
                json_str("viewport", name),
                json_kv("id", id.0),
                json_kv("parent", parent.map(|p| p.0)),
            ],
        );
        Ok(id)
    }

    /// Nearest router scope for content inside `scope`: the router bound by
    /// the closest activated ancestor slot, or the root router.
    pub fn router_for(&self, scope: Option<ViewportId>) -> Result<Arc<dyn Router>> {
        let mut cursor = scope;
        while let Some(id) = cursor {
            let node = self.node(id)?;
            if let Some(router) = lock(&node.coordinator)?.bound_router() {
                return Ok(router);
            }
            cursor = node.parent;
        }
        Ok(self.root_router())
    }

    /// Router the slot registered its hooks with.
    pub fn registered_router(&self, id: ViewportId) -> Result<Arc<dyn Router>> {
        Ok(Arc::clone(&self.node(id)?.router))
    }

    pub fn coordinator(&self, id: ViewportId) -> Result<SharedCoordinator> {
        Ok(Arc::clone(&self.node(id)?.coordinator))
    }

    pub fn find(&self, parent: Option<ViewportId>, name: &str) -> Option<ViewportId> {
        let siblings = match parent {
            Some(parent) => &self.node(parent).ok()?.children,
            None => &self.roots,
        };
        siblings
            .iter()
            .copied()
            .find(|id| self.node(*id).map(|n| n.name == name).unwrap_or(false))
    }

    pub fn name(&self, id: ViewportId) -> Result<&str> {
        Ok(self.node(id)?.name.as_str())
    }

    pub fn parent(&self, id: ViewportId) -> Result<Option<ViewportId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: ViewportId) -> Result<&[ViewportId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Report that the entering view of `id` finished inserting.
    pub fn finish_enter(&self, id: ViewportId, handle: AnimationHandle) -> Result<bool> {
        let coordinator = self.coordinator(id)?;
        let committed = lock(&coordinator)?.finish_enter(handle);
        Ok(committed)
    }

    pub fn finish_leave(&self, id: ViewportId, handle: AnimationHandle) -> Result<bool> {
        let coordinator = self.coordinator(id)?;
        let cleared = lock(&coordinator)?.finish_leave(handle);
        Ok(cleared)
    }

    /// Tear down `id` and every slot beneath it. Returns the number of slots removed.
    pub fn destroy(&mut self, id: ViewportId) -> Result<usize> {
        let parent = self.node(id)?.parent;

        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend(self.node(next)?.children.iter().copied());
        }

        // deepest slots first
        for victim in order.iter().rev() {
            if let Some(node) = self.nodes.get_mut(victim.0).and_then(Option::take) {
                lock(&node.coordinator)?.teardown();
            }
        }

        match parent {
            Some(parent) => {
                if let Ok(node) = self.node_mut(parent) {
                    node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        self.services.config().log(
            LogLevel::Debug,
            TARGET_VIEWPORT,
            "viewport_destroyed",
            [json_kv("id", id.0), json_kv("removed", order.len())],
        );
        Ok(order.len())
    }

    fn node(&self, id: ViewportId) -> Result<&ViewportNode> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(RouterError::ViewportNotFound(id.0))
    }

    fn node_mut(&mut self, id: ViewportId) -> Result<&mut ViewportNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(RouterError::ViewportNotFound(id.0))
    }
}

fn lock(coordinator: &SharedCoordinator) -> Result<MutexGuard<'_, TransitionCoordinator>> {
    coordinator
        .lock()
        .map_err(|_| RouterError::Poisoned("viewport coordinator"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentPipeline, ComponentRegistry};
    use crate::config::RouterConfig;
    use crate::instruction::Instruction;
    use crate::naming::NamingConvention;
    use crate::test_support::{RecordingHost, RecordingRouter};
    use crate::viewport::{ActivationOutcome, ViewportState};

    fn registry(root: Arc<RecordingRouter>) -> (ViewportRegistry, Arc<RecordingHost>) {
        let host = RecordingHost::shared();
        let pipeline = ComponentPipeline::new(
            Arc::new(NamingConvention::default()),
            Arc::new(ComponentRegistry::new()),
            RouterConfig::default(),
        );
        let services = ViewportServices::new(host.clone(), Arc::new(pipeline));
        (ViewportRegistry::new(root, services), host)
    }

    fn activate(registry: &ViewportRegistry, id: ViewportId, instruction: Instruction) {
        let coordinator = registry.coordinator(id).unwrap();
        let outcome = coordinator.lock().unwrap().activate(instruction).unwrap();
        if let ActivationOutcome::Entering(handle) = outcome {
            assert!(registry.finish_enter(id, handle).unwrap());
        }
    }

    #[test]
    fn unnamed_slots_use_default_name_and_register_with_root() {
        let root = RecordingRouter::shared();
        let (mut registry, _host) = registry(root.clone());
        let id = registry
            .register(None, None, ContextId(100), ElementId(100))
            .unwrap();

        assert_eq!(registry.name(id).unwrap(), "default");
        assert_eq!(root.viewport_names(), vec!["default".to_string()]);
    }

    #[test]
    fn sibling_names_must_be_unique() {
        let (mut registry, _host) = registry(RecordingRouter::shared());
        let app = registry
            .register(None, Some("app"), ContextId(1), ElementId(1))
            .unwrap();
        registry
            .register(Some(app), Some("main"), ContextId(2), ElementId(2))
            .unwrap();
        let err = registry
            .register(Some(app), Some("main"), ContextId(3), ElementId(3))
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateViewport(name) if name == "main"));

        // same name under a different parent is fine
        let side = registry
            .register(None, Some("side"), ContextId(4), ElementId(4))
            .unwrap();
        assert!(registry
            .register(Some(side), Some("main"), ContextId(5), ElementId(5))
            .is_ok());
    }

    #[test]
    fn nested_slots_register_with_parent_router_scope() {
        let root = RecordingRouter::shared();
        let child_router = RecordingRouter::shared();
        let (mut registry, _host) = registry(root.clone());

        let outer = registry
            .register(None, None, ContextId(1), ElementId(1))
            .unwrap();
        activate(
            &registry,
            outer,
            Instruction::new("/mail", "mail", child_router.clone()),
        );

        let inner = registry
            .register(Some(outer), None, ContextId(2), ElementId(2))
            .unwrap();
        assert_eq!(child_router.viewport_names(), vec!["default".to_string()]);
        assert_eq!(root.viewport_names(), vec!["default".to_string()]);

        let scoped = registry.router_for(Some(inner)).unwrap();
        let expected: Arc<dyn Router> = child_router;
        assert!(Arc::ptr_eq(&scoped, &expected));
        assert_eq!(registry.parent(inner).unwrap(), Some(outer));
    }

    #[test]
    fn unbound_ancestors_fall_back_to_root_router() {
        let root = RecordingRouter::shared();
        let (mut registry, _host) = registry(root.clone());
        let outer = registry
            .register(None, None, ContextId(1), ElementId(1))
            .unwrap();
        let inner = registry
            .register(Some(outer), None, ContextId(2), ElementId(2))
            .unwrap();

        let scoped = registry.router_for(Some(inner)).unwrap();
        let expected: Arc<dyn Router> = root.clone();
        assert!(Arc::ptr_eq(&scoped, &expected));
        assert!(Arc::ptr_eq(&registry.router_for(None).unwrap(), &expected));
        assert_eq!(root.viewport_names().len(), 2);
    }

    #[test]
    fn destroy_removes_subtree_and_releases_contexts() {
        let root = RecordingRouter::shared();
        let (mut registry, host) = registry(root.clone());
        let outer = registry
            .register(None, None, ContextId(1), ElementId(1))
            .unwrap();
        activate(&registry, outer, Instruction::new("/a", "a", root.clone()));
        let inner = registry
            .register(Some(outer), Some("detail"), ContextId(2), ElementId(2))
            .unwrap();
        activate(&registry, inner, Instruction::new("/a/b", "b", root.clone()));
        let inner_coordinator = registry.coordinator(inner).unwrap();

        let removed = registry.destroy(outer).unwrap();

        assert_eq!(removed, 2);
        assert!(registry.is_empty());
        assert!(host.live_contexts().is_empty());
        assert_eq!(
            inner_coordinator.lock().unwrap().state(),
            ViewportState::Empty
        );
        assert!(matches!(
            registry.coordinator(inner),
            Err(RouterError::ViewportNotFound(_))
        ));
        assert!(registry.find(None, "default").is_none());
    }

    #[test]
    fn router_drives_registered_hooks() {
        let root = RecordingRouter::shared();
        let (mut registry, _host) = registry(root.clone());
        let id = registry
            .register(None, None, ContextId(1), ElementId(1))
            .unwrap();

        let hooks = root.viewport("default").unwrap();
        let instr = Instruction::new("/home", "home", root.clone());
        let outcome = {
            let mut hooks = hooks.lock().unwrap();
            assert!(hooks.can_deactivate(&instr));
            hooks.activate(instr).unwrap()
        };
        let ActivationOutcome::Entering(handle) = outcome else {
            panic!("expected entering");
        };
        assert!(registry.finish_enter(id, handle).unwrap());
        let coordinator = registry.coordinator(id).unwrap();
        assert_eq!(coordinator.lock().unwrap().active_component(), Some("home"));
    }

    #[test]
    fn router_cannot_revive_a_destroyed_slot() {
        let root = RecordingRouter::shared();
        let (mut registry, host) = registry(root.clone());
        let id = registry
            .register(None, None, ContextId(1), ElementId(1))
            .unwrap();
        registry.destroy(id).unwrap();
        host.clear();

        let hooks = root.viewport("default").unwrap();
        let outcome = hooks
            .lock()
            .unwrap()
            .activate(Instruction::new("/late", "late", root.clone()))
            .unwrap();

        assert_eq!(outcome, ActivationOutcome::Unchanged);
        assert!(host.ops().is_empty());
        assert!(host.live_contexts().is_empty());
    }
}
