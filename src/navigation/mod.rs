//! Keeps the host's location and the root router in step.

use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::Result;
use crate::link::{AnchorElement, AnchorInterceptor, ClickDecision, ClickDisposition};
use crate::logging::{LogLevel, TARGET_NAVIGATION, json_str};
use crate::router::{NavigationOutcome, Router};

/// Host location (address bar, history, test double).
pub trait Location: Send {
    fn path(&self) -> String;
    fn set_path(&mut self, path: &str);
}

/// Watches a [`Location`] and forwards path changes to the root router.
pub struct LocationSync<L: Location> {
    root: Arc<dyn Router>,
    location: L,
    last_seen: Option<String>,
    config: RouterConfig,
}

impl<L: Location> LocationSync<L> {
    pub fn new(root: Arc<dyn Router>, location: L, config: RouterConfig) -> Self {
        Self {
            root,
            location,
            last_seen: None,
            config,
        }
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// Navigate if the location changed since the last poll. The first poll
    /// always navigates.
    pub fn poll(&mut self) -> Result<Option<NavigationOutcome>> {
        let path = self.location.path();
        if self.last_seen.as_deref() == Some(path.as_str()) {
            return Ok(None);
        }
        self.navigate(&path).map(Some)
    }

    /// Navigate the root router and adopt any corrected path into the
    /// location without triggering a second navigation.
    pub fn navigate(&mut self, path: &str) -> Result<NavigationOutcome> {
        let outcome = match self.root.navigate(path) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.last_seen = Some(path.to_string());
                self.config.log(
                    LogLevel::Error,
                    TARGET_NAVIGATION,
                    "navigation_failed",
                    [json_str("path", path), json_str("error", err.to_string())],
                );
                return Err(err);
            }
        };

        let settled = outcome.corrected_path.as_deref().unwrap_or(path).to_string();
        if self.location.path() != settled {
            self.location.set_path(&settled);
        }
        self.config.log(
            LogLevel::Info,
            TARGET_NAVIGATION,
            "navigated",
            [json_str("path", path), json_str("settled", settled.as_str())],
        );
        self.last_seen = Some(settled);
        Ok(outcome)
    }

    /// Route a click through `interceptor`, updating the location when the
    /// click navigates.
    pub fn handle_click(
        &mut self,
        interceptor: &AnchorInterceptor,
        anchor: &AnchorElement<'_>,
    ) -> Result<ClickDisposition> {
        match interceptor.decide(anchor) {
            ClickDecision::PassThrough => Ok(ClickDisposition::PassThrough),
            ClickDecision::Suppress => Ok(ClickDisposition::Suppressed),
            ClickDecision::Navigate(target) => {
                let outcome = self.navigate(&target)?;
                Ok(ClickDisposition::Navigated {
                    corrected_path: outcome.corrected_path,
                })
            }
        }
    }
}
