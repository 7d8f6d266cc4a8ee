//! Contracts the viewport engine consumes from the route matcher.
//!
//! Route grammar, recognition, and path generation live outside this crate;
//! the engine only needs the narrow surface below.

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::instruction::{Instruction, RouteParams};
use crate::viewport::ActivationOutcome;

/// Result of asking a router to navigate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Path the location should adopt instead of the requested one, e.g.
    /// after a redirect.
    pub corrected_path: Option<String>,
}

impl NavigationOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn corrected(path: impl Into<String>) -> Self {
        Self {
            corrected_path: Some(path.into()),
        }
    }
}

/// Router scope as seen by view slots, links, and anchors.
pub trait Router: Send + Sync {
    fn navigate(&self, path: &str) -> Result<NavigationOutcome>;
    fn recognize(&self, path: &str) -> bool;
    fn generate(&self, name: &str, params: &RouteParams) -> Result<String>;
    fn register_viewport(&self, name: &str, hooks: SharedViewportHooks) -> Result<()>;
}

/// Per-slot callbacks a router drives while applying an instruction tree.
///
/// Routers are expected to consult `can_deactivate` for every affected slot
/// before calling `activate` on any of them.
pub trait ViewportHooks: Send {
    fn can_deactivate(&self, instruction: &Instruction) -> bool;
    fn activate(&mut self, instruction: Instruction) -> Result<ActivationOutcome>;
}

pub type SharedViewportHooks = Arc<Mutex<dyn ViewportHooks>>;
