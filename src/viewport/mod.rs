//! Hierarchical view slots and the activation protocol that swaps their content.
//!
//! A [`ViewportRegistry`] owns the slot tree. Every slot carries a
//! [`TransitionCoordinator`] that decides, per routing instruction, whether
//! the displayed component has to be replaced, and coordinates the animated
//! swap through the [`ViewHost`] collaborator.

mod coordinator;
mod host;
mod registry;

pub use coordinator::{
    ActivationOutcome, PendingLeave, TransitionCoordinator, TransitionOutcome, ViewportServices,
    ViewportState,
};
pub use host::{AnimationHandle, ContextId, ElementId, ViewHost};
pub use registry::{SharedCoordinator, ViewportId, ViewportRegistry};
