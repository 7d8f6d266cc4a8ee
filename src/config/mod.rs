use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::Result;
use crate::logging::{FileSink, LogLevel, Logger, emit};
use crate::metrics::RouterMetrics;

pub const DEFAULT_VIEWPORT_NAME: &str = "default";
pub const DEFAULT_CHILD_ROUTE_KEY: &str = "childRoute";
pub const DEFAULT_LINK_PREFIX: &str = ".";

/// Order in which buffered route registrations are replayed once a consumer attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainOrder {
    /// Most recently announced first (stack semantics).
    #[default]
    LastInFirstOut,
    /// Announcement order.
    Arrival,
}

/// Configuration knobs shared by the viewport engine and its helpers.
#[derive(Clone)]
pub struct RouterConfig {
    /// Name given to view slots registered without one.
    pub default_viewport_name: String,
    /// Reserved params key holding a nested child instruction.
    pub child_route_key: String,
    /// Prefix marking generated hrefs as relative to the current location.
    pub link_prefix: String,
    /// Replay order for registrations buffered before a consumer attaches.
    pub drain_order: DrainOrder,
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Metrics accumulator; `None` disables counting.
    pub metrics: Option<Arc<Mutex<RouterMetrics>>>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_viewport_name: DEFAULT_VIEWPORT_NAME.to_string(),
            child_route_key: DEFAULT_CHILD_ROUTE_KEY.to_string(),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            drain_order: DrainOrder::default(),
            logger: None,
            metrics: None,
            metrics_target: "room::router.metrics".to_string(),
        }
    }
}

impl RouterConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Log JSON lines to `path`, truncating past `max_bytes`.
    pub fn with_log_file(self, path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let sink = FileSink::new(path, max_bytes)?;
        Ok(self.with_logger(Logger::new(sink)))
    }

    pub fn with_drain_order(mut self, order: DrainOrder) -> Self {
        self.drain_order = order;
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(RouterMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<RouterMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    /// Emit the current metrics snapshot through the logger, if both are configured.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(metrics)) = (self.logger.as_ref(), self.metrics.as_ref()) {
            if let Ok(guard) = metrics.lock() {
                let _ = logger.log_event(guard.snapshot().to_log_event(&self.metrics_target));
            }
        }
    }

    pub(crate) fn record(&self, update: impl FnOnce(&mut RouterMetrics)) {
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut guard);
            }
        }
    }

    pub(crate) fn log<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        emit(self.logger.as_ref(), level, target, message, fields);
    }
}
