/// Reactive context owned by a view slot or the component it displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

/// Rendered element as known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// In-flight enter or leave animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(pub u64);

/// Templating, animation, and reactive-context primitives the engine drives.
///
/// Completion of `enter` and `leave` is reported back asynchronously through
/// [`TransitionCoordinator::finish_enter`](super::TransitionCoordinator::finish_enter)
/// and [`TransitionCoordinator::finish_leave`](super::TransitionCoordinator::finish_leave).
pub trait ViewHost: Send + Sync {
    fn create_context(&self, parent: ContextId) -> ContextId;
    fn destroy_context(&self, context: ContextId);
    /// Bind `template` into a fresh element rendered against `context`.
    fn render(&self, context: ContextId, template: &str) -> ElementId;
    /// Insert `element` right after `after` and animate it in.
    fn enter(&self, element: ElementId, after: ElementId) -> AnimationHandle;
    fn leave(&self, element: ElementId) -> AnimationHandle;
    fn cancel(&self, animation: AnimationHandle);
    /// Detach `element` immediately, without animation.
    fn remove(&self, element: ElementId);
}
