use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::component::{ComponentDescriptor, RegistrationObserver};
use crate::config::{DrainOrder, RouterConfig};
use crate::error::{Result, RouterError};
use crate::logging::{LogLevel, TARGET_REGISTRATION, json_kv, json_str};
use crate::naming::NamingConvention;

/// One entry of a controller's route configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDefinition {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl RouteDefinition {
    pub fn component(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            component: Some(component.into()),
            redirect_to: None,
            alias: None,
        }
    }

    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            component: None,
            redirect_to: Some(target.into()),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

pub type RouteConfig = Vec<RouteDefinition>;

/// Parse a route configuration from its JSON array form.
pub fn route_config_from_json(text: &str) -> Result<RouteConfig> {
    Ok(serde_json::from_str(text)?)
}

/// Announcement held until a consumer attaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    /// Controller identifier as announced (not yet translated).
    pub name: String,
    pub config: RouteConfig,
}

/// Receives route configurations keyed by component name.
pub trait RouteConfigConsumer: Send {
    fn configure(&mut self, component: &str, config: RouteConfig) -> Result<()>;
}

impl<F> RouteConfigConsumer for F
where
    F: FnMut(&str, RouteConfig) -> Result<()> + Send,
{
    fn configure(&mut self, component: &str, config: RouteConfig) -> Result<()> {
        self(component, config)
    }
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<RegistrationRecord>,
    consumer: Option<Box<dyn RouteConfigConsumer>>,
}

/// Buffers route announcements until the matcher attaches, then forwards
/// everything (buffered and new) with controller identifiers translated to
/// component names.
///
/// Exactly one consumer may attach for the lifetime of the queue. Consumers
/// must not announce back into the queue from `configure`.
pub struct RouteRegistrationQueue {
    naming: Arc<NamingConvention>,
    config: RouterConfig,
    state: Mutex<QueueState>,
}

impl RouteRegistrationQueue {
    pub fn new(naming: Arc<NamingConvention>, config: RouterConfig) -> Self {
        Self {
            naming,
            config,
            state: Mutex::new(QueueState::default()),
        }
    }

    pub fn announce(&self, name: impl Into<String>, config: RouteConfig) -> Result<()> {
        let name = name.into();
        let mut state = self.lock()?;
        if let Some(consumer) = state.consumer.as_mut() {
            return self.forward(&mut **consumer, &name, config);
        }

        state.pending.push_back(RegistrationRecord { name, config });
        let buffered = state.pending.len();
        drop(state);
        self.config.log(
            LogLevel::Debug,
            TARGET_REGISTRATION,
            "registration_buffered",
            [json_kv("buffered", buffered)],
        );
        Ok(())
    }

    /// Install `consumer` and replay every buffered record into it.
    /// Returns the number of records drained. A record the consumer rejects
    /// is logged and skipped; the drain always empties the buffer, and the
    /// first rejection is returned once it has.
    pub fn attach_consumer<C>(&self, consumer: C) -> Result<usize>
    where
        C: RouteConfigConsumer + 'static,
    {
        let mut state = self.lock()?;
        if state.consumer.is_some() {
            return Err(RouterError::ConsumerAlreadyAttached);
        }
        state.consumer = Some(Box::new(consumer));

        let QueueState { pending, consumer } = &mut *state;
        let mut drained = 0usize;
        let mut first_error = None;
        if let Some(consumer) = consumer.as_mut() {
            loop {
                let next = match self.config.drain_order {
                    DrainOrder::LastInFirstOut => pending.pop_back(),
                    DrainOrder::Arrival => pending.pop_front(),
                };
                let Some(record) = next else { break };
                drained += 1;
                if let Err(err) = self.forward(&mut **consumer, &record.name, record.config) {
                    self.config.log(
                        LogLevel::Error,
                        TARGET_REGISTRATION,
                        "drain_record_rejected",
                        [
                            json_str("controller", record.name.as_str()),
                            json_str("error", err.to_string()),
                        ],
                    );
                    first_error.get_or_insert(err);
                }
            }
        }
        drop(state);

        self.config.log(
            LogLevel::Info,
            TARGET_REGISTRATION,
            "consumer_attached",
            [
                json_kv("drained", drained),
                json_str("order", format!("{:?}", self.config.drain_order)),
            ],
        );
        match first_error {
            Some(err) => Err(err),
            None => Ok(drained),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.lock().map(|s| s.consumer.is_some()).unwrap_or(false)
    }

    pub fn pending_len(&self) -> usize {
        self.lock().map(|s| s.pending.len()).unwrap_or(0)
    }

    fn forward(
        &self,
        consumer: &mut dyn RouteConfigConsumer,
        name: &str,
        config: RouteConfig,
    ) -> Result<()> {
        let component = self.naming.component_of(name);
        self.config.log(
            LogLevel::Debug,
            TARGET_REGISTRATION,
            "registration_forwarded",
            [
                json_str("controller", name),
                json_str("component", component.as_str()),
                json_kv("routes", config.len()),
            ],
        );
        consumer.configure(&component, config)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, QueueState>> {
        self.state
            .lock()
            .map_err(|_| RouterError::Poisoned("registration queue"))
    }
}

impl RegistrationObserver for RouteRegistrationQueue {
    fn on_registered(&self, controller: &str, descriptor: &ComponentDescriptor) {
        let Some(config) = descriptor.route_config.clone() else {
            return;
        };
        if let Err(err) = self.announce(controller, config) {
            self.config.log(
                LogLevel::Error,
                TARGET_REGISTRATION,
                "announce_failed",
                [
                    json_str("controller", controller),
                    json_str("error", err.to_string()),
                ],
            );
        }
    }
}
