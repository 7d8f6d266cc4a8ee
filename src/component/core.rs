use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::{Result, RouterError};
use crate::instruction::{Instruction, RouteParams};
use crate::registration::RouteConfig;
use crate::router::Router;

/// Consulted before the component's slot switches to another view.
pub trait DeactivationGuard {
    fn can_deactivate(&self, next: &Instruction) -> bool;
}

/// Invoked once the component is wired into its slot.
pub trait ActivationHook {
    fn activate(&mut self, instruction: &Instruction);
}

/// Controller instance living inside a view slot.
///
/// Both capabilities are optional; a component that exposes neither is a
/// plain view controller.
pub trait Component: Send {
    fn name(&self) -> &str {
        "component"
    }

    fn deactivation_guard(&self) -> Option<&dyn DeactivationGuard> {
        None
    }

    fn activation_hook(&mut self) -> Option<&mut dyn ActivationHook> {
        None
    }
}

/// Stand-in controller used when the real one cannot be instantiated.
#[derive(Debug, Default)]
pub struct NoopComponent;

impl Component for NoopComponent {
    fn name(&self) -> &str {
        "noop"
    }
}

/// Values made available to a controller while it is constructed.
#[derive(Clone)]
pub struct Locals {
    pub router: Arc<dyn Router>,
    pub route_params: RouteParams,
}

impl Locals {
    pub fn for_instruction(instruction: &Instruction) -> Self {
        Self {
            router: Arc::clone(&instruction.router),
            route_params: instruction.params.clone(),
        }
    }
}

/// Object-instantiation collaborator.
pub trait Injector: Send + Sync {
    fn instantiate(&self, identifier: &str, locals: &Locals) -> Result<Box<dyn Component>>;
}

/// Factory responsible for creating a fresh controller instance.
pub type ComponentFactory = Arc<dyn Fn(&Locals) -> Box<dyn Component> + Send + Sync>;

/// Declarative controller definition registered with the [`ComponentRegistry`].
#[derive(Clone)]
pub struct ComponentDescriptor {
    pub factory: ComponentFactory,
    pub route_config: Option<RouteConfig>,
}

impl ComponentDescriptor {
    pub fn new(factory: ComponentFactory) -> Self {
        Self {
            factory,
            route_config: None,
        }
    }

    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(&Locals) -> Box<dyn Component> + Send + Sync + 'static,
    {
        Self::new(Arc::new(factory))
    }

    pub fn with_route_config(mut self, config: RouteConfig) -> Self {
        self.route_config = Some(config);
        self
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("route_config", &self.route_config)
            .finish_non_exhaustive()
    }
}

/// Notified, in registration order, whenever a controller is registered.
pub trait RegistrationObserver: Send + Sync {
    fn on_registered(&self, controller: &str, descriptor: &ComponentDescriptor);
}

/// Controller identifier to descriptor map. Doubles as the default [`Injector`].
#[derive(Default)]
pub struct ComponentRegistry {
    descriptors: RwLock<HashMap<String, ComponentDescriptor>>,
    observers: Vec<Arc<dyn RegistrationObserver>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observers(observers: Vec<Arc<dyn RegistrationObserver>>) -> Self {
        Self {
            descriptors: RwLock::new(HashMap::new()),
            observers,
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn RegistrationObserver>) {
        self.observers.push(observer);
    }

    /// Register a controller and tell every observer about it.
    ///
    /// Re-registering an identifier replaces the previous descriptor.
    pub fn register(
        &self,
        controller: impl Into<String>,
        descriptor: ComponentDescriptor,
    ) -> Result<()> {
        let controller = controller.into();
        {
            let mut guard = self
                .descriptors
                .write()
                .map_err(|_| RouterError::Poisoned("component registry"))?;
            guard.insert(controller.clone(), descriptor.clone());
        }
        for observer in &self.observers {
            observer.on_registered(&controller, &descriptor);
        }
        Ok(())
    }

    pub fn contains(&self, controller: &str) -> bool {
        self.descriptors
            .read()
            .map(|guard| guard.contains_key(controller))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.descriptors.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Injector for ComponentRegistry {
    fn instantiate(&self, identifier: &str, locals: &Locals) -> Result<Box<dyn Component>> {
        let factory = {
            let guard = self
                .descriptors
                .read()
                .map_err(|_| RouterError::Poisoned("component registry"))?;
            guard
                .get(identifier)
                .map(|descriptor| Arc::clone(&descriptor.factory))
                .ok_or_else(|| RouterError::InstantiationFailure(identifier.to_string()))?
        };
        Ok(factory(locals))
    }
}
