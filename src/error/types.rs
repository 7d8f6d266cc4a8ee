use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the router crate.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors surfaced by the viewport engine, link resolution, and registration.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no path can be generated for route `{0}`")]
    UnresolvableLink(String),
    #[error("controller `{0}` could not be instantiated")]
    InstantiationFailure(String),
    #[error("link `{link}` is malformed: {reason}")]
    MalformedLink { link: String, reason: String },
    #[error("link parameters evaluated to `{0}`, expected an object")]
    InvalidLinkParams(String),
    #[error("viewport `{0}` is already registered under this parent")]
    DuplicateViewport(String),
    #[error("viewport {0} not found")]
    ViewportNotFound(usize),
    #[error("a route configuration consumer is already attached")]
    ConsumerAlreadyAttached,
    #[error("template fetch failed for `{location}`: {reason}")]
    TemplateFetch { location: String, reason: String },
    #[error("navigation to `{path}` failed: {reason}")]
    Navigation { path: String, reason: String },
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
