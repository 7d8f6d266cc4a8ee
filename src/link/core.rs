use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::instruction::RouteParams;
use crate::logging::{LogLevel, TARGET_LINK, json_str};
use crate::router::Router;
use crate::viewport::{ViewportId, ViewportRegistry};

use super::expr::ParamsExpr;

static LINK_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)(?:\(((?s:.*))\))?$").expect("link syntax pattern is valid")
});

/// A parsed `routeName(paramsExpression)` link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkExpression {
    pub route: String,
    pub params: Option<ParamsExpr>,
}

impl LinkExpression {
    pub fn parse(link: &str) -> Result<Self> {
        let malformed = |reason: String| RouterError::MalformedLink {
            link: link.to_string(),
            reason,
        };
        if link.is_empty() {
            return Err(malformed("link is empty".to_string()));
        }
        let captures = LINK_SYNTAX
            .captures(link)
            .ok_or_else(|| malformed("link does not match `name(params)`".to_string()))?;
        let route = captures
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        if route.is_empty() {
            return Err(malformed("missing route name".to_string()));
        }
        let params = match captures.get(2).map(|m| m.as_str().trim()) {
            Some(source) if !source.is_empty() => Some(ParamsExpr::parse(source).map_err(malformed)?),
            _ => None,
        };
        Ok(Self { route, params })
    }

    pub fn is_dynamic(&self) -> bool {
        self.params.as_ref().is_some_and(|params| !params.is_constant())
    }
}

/// Binds link expressions to the router in scope.
#[derive(Clone, Default)]
pub struct LinkResolver {
    config: RouterConfig,
}

impl LinkResolver {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Bind a link using the router of the nearest enclosing view slot.
    pub fn bind_in(
        &self,
        registry: &ViewportRegistry,
        scope_viewport: Option<ViewportId>,
        link: &str,
        scope: &Value,
    ) -> Result<LinkBinding> {
        let router = registry.router_for(scope_viewport)?;
        self.bind(link, router, scope)
    }

    /// Parse `link` and generate its initial href. Constant links are
    /// generated exactly once; dynamic ones regenerate on [`LinkBinding::refresh`].
    pub fn bind(&self, link: &str, router: Arc<dyn Router>, scope: &Value) -> Result<LinkBinding> {
        let expression = LinkExpression::parse(link)?;
        let mut binding = LinkBinding {
            link: link.to_string(),
            expression,
            router,
            config: self.config.clone(),
            href: String::new(),
            last_params: None,
        };
        let params = binding.evaluate(scope);
        binding.regenerate(params)?;
        Ok(binding)
    }
}

/// A link attached to an anchor. Holds the current href and, for dynamic
/// links, the last evaluated params.
pub struct LinkBinding {
    link: String,
    expression: LinkExpression,
    router: Arc<dyn Router>,
    config: RouterConfig,
    href: String,
    last_params: Option<Value>,
}

impl LinkBinding {
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn route(&self) -> &str {
        &self.expression.route
    }

    pub fn is_dynamic(&self) -> bool {
        self.expression.is_dynamic()
    }

    /// Re-evaluate a dynamic link against `scope`. The href is regenerated
    /// only when the evaluated params differ structurally from the last ones.
    /// Returns whether the href was regenerated.
    pub fn refresh(&mut self, scope: &Value) -> Result<bool> {
        if !self.is_dynamic() {
            return Ok(false);
        }
        let params = self.evaluate(scope);
        if self.last_params.as_ref() == Some(&params) {
            return Ok(false);
        }
        self.regenerate(params)?;
        Ok(true)
    }

    fn evaluate(&self, scope: &Value) -> Value {
        match &self.expression.params {
            Some(expr) => expr.evaluate(scope),
            None => Value::Null,
        }
    }

    fn regenerate(&mut self, params: Value) -> Result<()> {
        let route_params = to_route_params(&params)?;
        let path = self.router.generate(&self.expression.route, &route_params)?;
        self.href = format!("{}{}", self.config.link_prefix, path);
        self.last_params = Some(params);
        self.config.record(|m| m.record_link());
        self.config.log(
            LogLevel::Debug,
            TARGET_LINK,
            "link_generated",
            [
                json_str("link", self.link.as_str()),
                json_str("href", self.href.as_str()),
            ],
        );
        Ok(())
    }
}

fn to_route_params(params: &Value) -> Result<RouteParams> {
    match params {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(RouteParams::new()),
        other => Err(RouterError::InvalidLinkParams(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Logger, MemorySink};
    use crate::test_support::RecordingRouter;
    use serde_json::json;

    fn router() -> Arc<RecordingRouter> {
        let router = RecordingRouter::shared();
        router.route("user", "/user/:id");
        router.route("home", "/");
        router
    }

    #[test]
    fn parse_splits_name_and_params() {
        let parsed = LinkExpression::parse("user({id: 123})").unwrap();
        assert_eq!(parsed.route, "user");
        assert!(parsed.params.is_some());
        assert!(!parsed.is_dynamic());

        let bare = LinkExpression::parse("home").unwrap();
        assert_eq!(bare.route, "home");
        assert!(bare.params.is_none());

        let empty_parens = LinkExpression::parse("home()").unwrap();
        assert!(empty_parens.params.is_none());
    }

    #[test]
    fn parse_rejects_empty_and_bad_params() {
        assert!(matches!(
            LinkExpression::parse(""),
            Err(RouterError::MalformedLink { .. })
        ));
        assert!(matches!(
            LinkExpression::parse("user({id: })"),
            Err(RouterError::MalformedLink { .. })
        ));
    }

    #[test]
    fn params_may_span_lines() {
        let parsed = LinkExpression::parse("user({\n  id: 1,\n  tab: 'info'\n})").unwrap();
        assert_eq!(parsed.route, "user");
        assert_eq!(
            parsed.params.unwrap().evaluate(&Value::Null),
            json!({"id": 1, "tab": "info"})
        );
    }

    #[test]
    fn unmatched_link_reports_the_expected_shape() {
        let err = LinkExpression::parse("us\ner").unwrap_err();
        assert!(
            matches!(err, RouterError::MalformedLink { reason, .. } if reason.contains("name(params)"))
        );
    }

    #[test]
    fn constant_link_generates_once() {
        let router = router();
        let resolver = LinkResolver::default();
        let mut binding = resolver
            .bind("user({id: 123})", router.clone(), &Value::Null)
            .unwrap();
        assert_eq!(binding.href(), "./user/123");
        assert!(!binding.refresh(&json!({"anything": 1})).unwrap());
        assert_eq!(router.generated(), 1);
    }

    #[test]
    fn link_without_params_uses_empty_map() {
        let binding = LinkResolver::default()
            .bind("home", router(), &Value::Null)
            .unwrap();
        assert_eq!(binding.href(), "./");
    }

    #[test]
    fn dynamic_link_tracks_scope_changes() {
        let router = router();
        let mut config = RouterConfig::default();
        config.enable_metrics();
        let resolver = LinkResolver::new(config.clone());

        let mut scope = json!({"app": {"user": {"id": 123}}});
        let mut binding = resolver
            .bind("user({id: app.user.id})", router.clone(), &scope)
            .unwrap();
        assert!(binding.is_dynamic());
        assert_eq!(binding.href(), "./user/123");

        assert!(!binding.refresh(&scope).unwrap());
        assert_eq!(router.generated(), 1);

        scope["app"]["user"]["id"] = json!(456);
        assert!(binding.refresh(&scope).unwrap());
        assert_eq!(binding.href(), "./user/456");
        assert_eq!(router.generated(), 2);

        let metrics = config.metrics_handle().unwrap();
        assert_eq!(metrics.lock().unwrap().snapshot().links_generated, 2);
    }

    #[test]
    fn unknown_route_propagates() {
        let err = LinkResolver::default()
            .bind("nowhere({id: 1})", router(), &Value::Null)
            .err()
            .unwrap();
        assert!(matches!(err, RouterError::UnresolvableLink(name) if name == "nowhere"));
    }

    #[test]
    fn non_object_params_are_rejected() {
        let err = LinkResolver::default()
            .bind("user([1, 2])", router(), &Value::Null)
            .err()
            .unwrap();
        assert!(matches!(err, RouterError::InvalidLinkParams(_)));
    }

    #[test]
    fn generation_is_logged() {
        let sink = MemorySink::new();
        let resolver =
            LinkResolver::new(RouterConfig::default().with_logger(Logger::new(sink.clone())));
        resolver.bind("home", router(), &Value::Null).unwrap();
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, TARGET_LINK);
        assert_eq!(events[0].field("href"), Some(&json!("./")));
    }
}
