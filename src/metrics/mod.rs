use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters describing what the viewport engine has been doing.
#[derive(Debug, Default, Clone)]
pub struct RouterMetrics {
    activations: u64,
    commits: u64,
    idempotent_skips: u64,
    refusals: u64,
    superseded: u64,
    stale_completions: u64,
    fallback_controllers: u64,
    leaves_started: u64,
    leaves_cancelled: u64,
    links_generated: u64,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_activation(&mut self) {
        self.activations = self.activations.saturating_add(1);
    }

    pub fn record_commit(&mut self) {
        self.commits = self.commits.saturating_add(1);
    }

    pub fn record_skip(&mut self) {
        self.idempotent_skips = self.idempotent_skips.saturating_add(1);
    }

    pub fn record_refusal(&mut self) {
        self.refusals = self.refusals.saturating_add(1);
    }

    pub fn record_superseded(&mut self) {
        self.superseded = self.superseded.saturating_add(1);
    }

    pub fn record_stale_completion(&mut self) {
        self.stale_completions = self.stale_completions.saturating_add(1);
    }

    pub fn record_fallback(&mut self) {
        self.fallback_controllers = self.fallback_controllers.saturating_add(1);
    }

    pub fn record_leave(&mut self) {
        self.leaves_started = self.leaves_started.saturating_add(1);
    }

    pub fn record_leave_cancelled(&mut self) {
        self.leaves_cancelled = self.leaves_cancelled.saturating_add(1);
    }

    pub fn record_link(&mut self) {
        self.links_generated = self.links_generated.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            activations: self.activations,
            commits: self.commits,
            idempotent_skips: self.idempotent_skips,
            refusals: self.refusals,
            superseded: self.superseded,
            stale_completions: self.stale_completions,
            fallback_controllers: self.fallback_controllers,
            leaves_started: self.leaves_started,
            leaves_cancelled: self.leaves_cancelled,
            links_generated: self.links_generated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub activations: u64,
    pub commits: u64,
    pub idempotent_skips: u64,
    pub refusals: u64,
    pub superseded: u64,
    pub stale_completions: u64,
    pub fallback_controllers: u64,
    pub leaves_started: u64,
    pub leaves_cancelled: u64,
    pub links_generated: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "router_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("activations".to_string(), json!(self.activations));
        map.insert("commits".to_string(), json!(self.commits));
        map.insert("idempotent_skips".to_string(), json!(self.idempotent_skips));
        map.insert("refusals".to_string(), json!(self.refusals));
        map.insert("superseded".to_string(), json!(self.superseded));
        map.insert("stale_completions".to_string(), json!(self.stale_completions));
        map.insert(
            "fallback_controllers".to_string(),
            json!(self.fallback_controllers),
        );
        map.insert("leaves_started".to_string(), json!(self.leaves_started));
        map.insert("leaves_cancelled".to_string(), json!(self.leaves_cancelled));
        map.insert("links_generated".to_string(), json!(self.links_generated));
        map
    }
}
