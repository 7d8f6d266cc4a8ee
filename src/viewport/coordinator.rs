use std::sync::Arc;

use serde_json::json;

use crate::component::{Component, ComponentPipeline};
use crate::config::RouterConfig;
use crate::error::Result;
use crate::instruction::{Fingerprint, Instruction};
use crate::logging::{LogLevel, TARGET_VIEWPORT, json_kv, json_str};
use crate::router::{Router, ViewportHooks};

use super::host::{AnimationHandle, ContextId, ElementId, ViewHost};

/// Collaborators shared by every coordinator in a registry.
#[derive(Clone)]
pub struct ViewportServices {
    pub host: Arc<dyn ViewHost>,
    pub pipeline: Arc<ComponentPipeline>,
}

impl ViewportServices {
    pub fn new(host: Arc<dyn ViewHost>, pipeline: Arc<ComponentPipeline>) -> Self {
        Self { host, pipeline }
    }

    pub fn config(&self) -> &RouterConfig {
        self.pipeline.config()
    }
}

/// Observable state of a single view slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Empty,
    Active(Fingerprint),
    Transitioning {
        from: Option<Fingerprint>,
        to: Fingerprint,
    },
}

/// What `activate` did with an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Same logical view as the committed (or already entering) one.
    Unchanged,
    /// New view is entering; completion must be reported with this handle.
    Entering(AnimationHandle),
    /// Instruction matched the committed view; the view that was still
    /// entering has been discarded.
    Reverted,
}

/// Result of a guarded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Refused,
    Activated(ActivationOutcome),
}

struct LiveView {
    context: ContextId,
    element: ElementId,
    component: Box<dyn Component>,
    component_name: String,
    fingerprint: Fingerprint,
}

struct IncomingView {
    view: LiveView,
    enter: AnimationHandle,
}

/// At most one teardown animation per slot.
#[derive(Debug, Default)]
pub struct PendingLeave {
    handle: Option<AnimationHandle>,
}

impl PendingLeave {
    pub fn handle(&self) -> Option<AnimationHandle> {
        self.handle
    }

    fn start(&mut self, handle: AnimationHandle) {
        self.handle = Some(handle);
    }

    /// Cancel the in-flight animation, if any. Returns whether one was cancelled.
    fn cancel(&mut self, host: &dyn ViewHost) -> bool {
        match self.handle.take() {
            Some(handle) => {
                host.cancel(handle);
                true
            }
            None => false,
        }
    }

    fn complete(&mut self, handle: AnimationHandle) -> bool {
        if self.handle == Some(handle) {
            self.handle = None;
            true
        } else {
            false
        }
    }
}

/// Activation protocol for one view slot.
pub struct TransitionCoordinator {
    name: String,
    context: ContextId,
    anchor: ElementId,
    services: ViewportServices,
    bound_router: Option<Arc<dyn Router>>,
    current: Option<LiveView>,
    incoming: Option<IncomingView>,
    leave: PendingLeave,
    committed: Option<Fingerprint>,
    /// Set by `teardown`; the slot ignores every later activation.
    destroyed: bool,
}

impl TransitionCoordinator {
    /// `context` is the slot's own reactive context; `anchor` the placeholder
    /// element new content is inserted after while the slot is empty.
    pub fn new(
        name: impl Into<String>,
        context: ContextId,
        anchor: ElementId,
        services: ViewportServices,
    ) -> Self {
        Self {
            name: name.into(),
            context,
            anchor,
            services,
            bound_router: None,
            current: None,
            incoming: None,
            leave: PendingLeave::default(),
            committed: None,
            destroyed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ViewportState {
        match (&self.incoming, self.committed) {
            (Some(incoming), from) => ViewportState::Transitioning {
                from,
                to: incoming.view.fingerprint,
            },
            (None, Some(fingerprint)) => ViewportState::Active(fingerprint),
            (None, None) => ViewportState::Empty,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn committed_fingerprint(&self) -> Option<Fingerprint> {
        self.committed
    }

    /// Component shown once the slot settles: the entering one if any,
    /// otherwise the committed one.
    pub fn active_component(&self) -> Option<&str> {
        self.incoming
            .as_ref()
            .map(|incoming| &incoming.view)
            .or(self.current.as_ref())
            .map(|view| view.component_name.as_str())
    }

    pub fn active_context(&self) -> Option<ContextId> {
        self.current.as_ref().map(|view| view.context)
    }

    pub fn pending_leave(&self) -> Option<AnimationHandle> {
        self.leave.handle()
    }

    /// Router scope handed down to slots nested inside this one.
    pub fn bound_router(&self) -> Option<Arc<dyn Router>> {
        self.bound_router.clone()
    }

    /// Ask the displayed component whether it may be replaced by `next`.
    pub fn can_deactivate(&self, next: &Instruction) -> bool {
        if self.destroyed {
            return true;
        }
        let view = self
            .incoming
            .as_ref()
            .map(|incoming| &incoming.view)
            .or(self.current.as_ref());
        view.and_then(|view| view.component.deactivation_guard())
            .map(|guard| guard.can_deactivate(next))
            .unwrap_or(true)
    }

    /// Consult the deactivation guard, then activate.
    pub fn transition(&mut self, instruction: Instruction) -> Result<TransitionOutcome> {
        if !self.can_deactivate(&instruction) {
            self.config().record(|m| m.record_refusal());
            self.log(
                LogLevel::Info,
                "deactivation_refused",
                [json_str("component", instruction.component.as_str())],
            );
            return Ok(TransitionOutcome::Refused);
        }
        self.activate(instruction).map(TransitionOutcome::Activated)
    }

    /// Apply `instruction` to the slot. A torn-down slot reports `Unchanged`
    /// and touches nothing.
    pub fn activate(&mut self, instruction: Instruction) -> Result<ActivationOutcome> {
        if self.destroyed {
            self.log(
                LogLevel::Debug,
                "activation_ignored_after_teardown",
                [json_str("component", instruction.component.as_str())],
            );
            return Ok(ActivationOutcome::Unchanged);
        }
        let fingerprint = Fingerprint::of(&instruction, &self.config().child_route_key);

        if self
            .incoming
            .as_ref()
            .is_some_and(|incoming| incoming.view.fingerprint == fingerprint)
        {
            self.record_skip(&instruction, fingerprint);
            return Ok(ActivationOutcome::Unchanged);
        }

        if self.committed == Some(fingerprint) {
            if self.discard_incoming() {
                self.log(
                    LogLevel::Debug,
                    "activation_reverted",
                    [json_str("fingerprint", fingerprint.to_string())],
                );
                return Ok(ActivationOutcome::Reverted);
            }
            self.record_skip(&instruction, fingerprint);
            return Ok(ActivationOutcome::Unchanged);
        }

        if self.discard_incoming() {
            self.config().record(|m| m.record_superseded());
        }
        self.config().record(|m| m.record_activation());

        self.bound_router = Some(Arc::clone(&instruction.router));
        let host = Arc::clone(&self.services.host);
        let context = host.create_context(self.context);
        let (mut component, fallback) = self.services.pipeline.init(&instruction);
        let element = host.render(context, instruction.template.as_deref().unwrap_or_default());
        let after = self
            .current
            .as_ref()
            .map(|view| view.element)
            .unwrap_or(self.anchor);
        let enter = host.enter(element, after);

        if let Some(hook) = component.activation_hook() {
            hook.activate(&instruction);
        }

        self.log(
            LogLevel::Debug,
            "activation_started",
            [
                json_str("component", instruction.component.as_str()),
                json_str("path", instruction.path.as_str()),
                json_str("fingerprint", fingerprint.to_string()),
                json_kv("fallback", fallback),
            ],
        );

        self.incoming = Some(IncomingView {
            view: LiveView {
                context,
                element,
                component,
                component_name: instruction.component,
                fingerprint,
            },
            enter,
        });
        Ok(ActivationOutcome::Entering(enter))
    }

    /// Insertion of the entering view completed. Commits it and tears the
    /// previous view down. Completions for superseded views are ignored.
    pub fn finish_enter(&mut self, handle: AnimationHandle) -> bool {
        let matches = self
            .incoming
            .as_ref()
            .is_some_and(|incoming| incoming.enter == handle);
        if !matches {
            self.config().record(|m| m.record_stale_completion());
            self.log(
                LogLevel::Debug,
                "stale_enter_ignored",
                [json_kv("handle", handle.0)],
            );
            return false;
        }
        let Some(IncomingView { view, .. }) = self.incoming.take() else {
            return false;
        };

        self.cleanup_previous_view();
        self.committed = Some(view.fingerprint);
        self.config().record(|m| m.record_commit());
        self.log(
            LogLevel::Info,
            "activation_committed",
            [
                json_str("component", view.component_name.as_str()),
                json_str("fingerprint", view.fingerprint.to_string()),
            ],
        );
        self.current = Some(view);
        true
    }

    /// Leave animation completed.
    pub fn finish_leave(&mut self, handle: AnimationHandle) -> bool {
        self.leave.complete(handle)
    }

    /// Release the displayed view: cancel any overlapping teardown, destroy
    /// its context, and start its leave animation. References are cleared
    /// immediately; the slot does not wait for the animation.
    pub fn cleanup_previous_view(&mut self) {
        let host = Arc::clone(&self.services.host);
        if self.leave.cancel(host.as_ref()) {
            self.config().record(|m| m.record_leave_cancelled());
        }
        if let Some(view) = self.current.take() {
            host.destroy_context(view.context);
            let handle = host.leave(view.element);
            self.leave.start(handle);
            self.config().record(|m| m.record_leave());
            self.log(
                LogLevel::Debug,
                "leave_started",
                [
                    json_str("component", view.component_name.as_str()),
                    json_kv("handle", handle.0),
                ],
            );
        }
    }

    /// Drop everything the slot displays, without animation. Used when the
    /// owning component goes away.
    pub fn teardown(&mut self) {
        let host = Arc::clone(&self.services.host);
        self.leave.cancel(host.as_ref());
        self.discard_incoming();
        if let Some(view) = self.current.take() {
            host.destroy_context(view.context);
            host.remove(view.element);
        }
        self.committed = None;
        self.bound_router = None;
        self.destroyed = true;
        self.log(LogLevel::Debug, "viewport_torn_down", std::iter::empty());
    }

    fn discard_incoming(&mut self) -> bool {
        let Some(incoming) = self.incoming.take() else {
            return false;
        };
        let host = self.services.host.as_ref();
        host.cancel(incoming.enter);
        host.destroy_context(incoming.view.context);
        host.remove(incoming.view.element);
        self.log(
            LogLevel::Debug,
            "incoming_discarded",
            [json_str(
                "component",
                incoming.view.component_name.as_str(),
            )],
        );
        true
    }

    fn record_skip(&self, instruction: &Instruction, fingerprint: Fingerprint) {
        self.config().record(|m| m.record_skip());
        self.log(
            LogLevel::Trace,
            "activation_skipped",
            [
                json_str("component", instruction.component.as_str()),
                json_str("fingerprint", fingerprint.to_string()),
            ],
        );
    }

    fn config(&self) -> &RouterConfig {
        self.services.config()
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        let fields = std::iter::once(("viewport".to_string(), json!(self.name))).chain(fields);
        self.config().log(level, TARGET_VIEWPORT, message, fields);
    }
}

impl ViewportHooks for TransitionCoordinator {
    fn can_deactivate(&self, instruction: &Instruction) -> bool {
        TransitionCoordinator::can_deactivate(self, instruction)
    }

    fn activate(&mut self, instruction: Instruction) -> Result<ActivationOutcome> {
        TransitionCoordinator::activate(self, instruction)
    }
}
