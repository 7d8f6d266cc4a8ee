//! Viewport routing engine for component-based UIs.
//!
//! A router decides *what* should be on screen; this crate decides *how* it
//! gets there. Named view slots ([`viewport`]) accept routing instructions,
//! skip work when the target is already displayed, ask the outgoing
//! component for permission, instantiate the incoming one through the
//! [`component`] pipeline, and hand the animated swap to a [`ViewHost`].
//! Around that core sit deferred route registration ([`registration`]),
//! symbolic links and anchor interception ([`link`]), and location sync
//! ([`navigation`]).

pub mod component;
pub mod config;
pub mod error;
pub mod instruction;
pub mod link;
pub mod logging;
pub mod metrics;
pub mod naming;
pub mod navigation;
pub mod registration;
pub mod router;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use component::{
    Component, ComponentDescriptor, ComponentPipeline, ComponentRegistry, Injector,
    TemplateFetcher,
};
pub use config::{DrainOrder, RouterConfig};
pub use error::{Result, RouterError};
pub use instruction::{Fingerprint, Instruction, RouteParams};
pub use link::{AnchorElement, AnchorInterceptor, ClickDisposition, LinkBinding, LinkResolver};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{MetricSnapshot, RouterMetrics};
pub use naming::NamingConvention;
pub use navigation::{Location, LocationSync};
pub use registration::{RouteConfig, RouteDefinition, RouteRegistrationQueue};
pub use router::{NavigationOutcome, Router, ViewportHooks};
pub use viewport::{
    ActivationOutcome, TransitionCoordinator, ViewHost, ViewportId, ViewportRegistry,
    ViewportServices,
};
