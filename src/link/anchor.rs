use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::Result;
use crate::logging::{LogLevel, TARGET_LINK, json_str};
use crate::router::Router;

/// The parts of a clicked element the interceptor looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorElement<'a> {
    pub tag_name: &'a str,
    pub href: Option<&'a str>,
    /// SVG anchors carry their target here instead of `href`.
    pub xlink_href: Option<&'a str>,
    pub is_svg: bool,
}

impl<'a> AnchorElement<'a> {
    pub fn html(href: &'a str) -> Self {
        Self {
            tag_name: "a",
            href: Some(href),
            ..Self::default()
        }
    }

    pub fn svg(xlink_href: &'a str) -> Self {
        Self {
            tag_name: "a",
            xlink_href: Some(xlink_href),
            is_svg: true,
            ..Self::default()
        }
    }

    fn target(&self) -> Option<&'a str> {
        if self.is_svg {
            self.xlink_href
        } else {
            self.href
        }
    }
}

/// What a click should do, decided before anything navigates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDecision {
    /// Not an anchor, or a target the router does not know.
    PassThrough,
    /// Anchor with an empty target: suppress the browser default.
    Suppress,
    /// Recognised in-app path.
    Navigate(String),
}

/// What happened after a click was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDisposition {
    PassThrough,
    Suppressed,
    Navigated { corrected_path: Option<String> },
}

impl ClickDisposition {
    /// Whether the host must cancel the click's default action.
    pub fn prevents_default(&self) -> bool {
        !matches!(self, ClickDisposition::PassThrough)
    }
}

/// Document-level click handler routing recognised anchors through the
/// root router.
pub struct AnchorInterceptor {
    root: Arc<dyn Router>,
    config: RouterConfig,
}

impl AnchorInterceptor {
    pub fn new(root: Arc<dyn Router>, config: RouterConfig) -> Self {
        Self { root, config }
    }

    pub fn decide(&self, anchor: &AnchorElement<'_>) -> ClickDecision {
        if !anchor.tag_name.eq_ignore_ascii_case("a") {
            return ClickDecision::PassThrough;
        }
        match anchor.target() {
            None | Some("") => ClickDecision::Suppress,
            Some(target) if self.root.recognize(target) => ClickDecision::Navigate(target.to_string()),
            Some(_) => ClickDecision::PassThrough,
        }
    }

    /// Decide and, for recognised targets, navigate the root router.
    pub fn on_click(&self, anchor: &AnchorElement<'_>) -> Result<ClickDisposition> {
        match self.decide(anchor) {
            ClickDecision::PassThrough => Ok(ClickDisposition::PassThrough),
            ClickDecision::Suppress => Ok(ClickDisposition::Suppressed),
            ClickDecision::Navigate(target) => {
                let outcome = self.root.navigate(&target)?;
                self.config.log(
                    LogLevel::Debug,
                    TARGET_LINK,
                    "anchor_navigated",
                    [json_str("target", target)],
                );
                Ok(ClickDisposition::Navigated {
                    corrected_path: outcome.corrected_path,
                })
            }
        }
    }
}
