//! Components, the registry that instantiates them, and the pipeline that
//! prepares them for a view slot.

mod core;
pub mod pipeline;

pub use self::core::{
    ActivationHook, Component, ComponentDescriptor, ComponentFactory, ComponentRegistry,
    DeactivationGuard, Injector, Locals, NoopComponent, RegistrationObserver,
};
pub use pipeline::{ComponentPipeline, TemplateFetcher};
