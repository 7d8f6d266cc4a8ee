//! Resolved routing decisions and their fingerprints.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::DEFAULT_CHILD_ROUTE_KEY;
use crate::router::Router;

/// Route parameters keyed by name.
pub type RouteParams = Map<String, Value>;

/// A resolved routing decision for one view slot, possibly nesting the
/// decision for the slot below it. Produced by the route matcher and never
/// mutated by the viewport engine.
#[derive(Clone)]
pub struct Instruction {
    pub path: String,
    pub component: String,
    pub params: RouteParams,
    /// Router scope for this instruction's subtree.
    pub router: Arc<dyn Router>,
    pub child: Option<Box<Instruction>>,
    /// Template text, resolved before activation.
    pub template: Option<String>,
    /// Params key the nested child's path was recorded under.
    child_key: Option<String>,
}

impl Instruction {
    pub fn new(
        path: impl Into<String>,
        component: impl Into<String>,
        router: Arc<dyn Router>,
    ) -> Self {
        Self {
            path: path.into(),
            component: component.into(),
            params: RouteParams::new(),
            router,
            child: None,
            template: None,
            child_key: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Nest `child`, recording its path under the default child-route key.
    pub fn with_child(self, child: Instruction) -> Self {
        self.with_child_under(DEFAULT_CHILD_ROUTE_KEY, child)
    }

    /// Nest `child`, recording its path under `key`. The key travels with
    /// the instruction and is always left out of its fingerprint.
    pub fn with_child_under(mut self, key: impl Into<String>, child: Instruction) -> Self {
        let key = key.into();
        if let Some(previous) = self.child_key.take() {
            self.params.remove(&previous);
        }
        self.params
            .insert(key.clone(), Value::String(child.path.clone()));
        self.child_key = Some(key);
        self.child = Some(Box::new(child));
        self
    }

    pub fn child_route_key(&self) -> Option<&str> {
        self.child_key.as_deref()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self, DEFAULT_CHILD_ROUTE_KEY)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("path", &self.path)
            .field("component", &self.component)
            .field("params", &self.params)
            .field("child", &self.child)
            .field("has_template", &self.template.is_some())
            .finish_non_exhaustive()
    }
}

/// Identity of the logical view an instruction selects.
///
/// Hash of the canonical `{path, component, params}` form with the child-route
/// key removed. Two instructions with equal fingerprints are the same view.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    pub fn of(instruction: &Instruction, child_route_key: &str) -> Self {
        Self(blake3::hash(
            canonical_form(instruction, child_route_key).as_bytes(),
        ))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.0.to_hex();
        f.write_str(&hex.as_str()[..12])
    }
}

/// Canonical serialization: object keys sorted at every depth. Both
/// `child_route_key` and the key the instruction nested its own child under
/// are dropped from the params.
pub fn canonical_form(instruction: &Instruction, child_route_key: &str) -> String {
    let nested_under = instruction.child_route_key();
    let params: Map<String, Value> = instruction
        .params
        .iter()
        .filter(|(key, _)| key.as_str() != child_route_key && Some(key.as_str()) != nested_under)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut root = Map::new();
    root.insert("component".into(), Value::String(instruction.component.clone()));
    root.insert("params".into(), Value::Object(params));
    root.insert("path".into(), Value::String(instruction.path.clone()));
    sorted(&Value::Object(root)).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRouter;
    use serde_json::json;

    fn router() -> Arc<dyn Router> {
        RecordingRouter::shared()
    }

    #[test]
    fn child_instruction_does_not_affect_fingerprint() {
        let r = router();
        let base = Instruction::new("/inbox", "inbox", r.clone()).with_param("folder", "work");
        let with_a = base
            .clone()
            .with_child(Instruction::new("/message/1", "message", r.clone()));
        let with_b = base
            .clone()
            .with_child(Instruction::new("/compose", "compose", r.clone()));

        assert_eq!(with_a.fingerprint(), with_b.fingerprint());
        assert_eq!(with_a.fingerprint(), base.fingerprint());
    }

    #[test]
    fn param_changes_change_fingerprint() {
        let r = router();
        let a = Instruction::new("/user/123", "user", r.clone()).with_param("id", 123);
        let b = Instruction::new("/user/456", "user", r.clone()).with_param("id", 456);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn param_insertion_order_is_irrelevant() {
        let r = router();
        let a = Instruction::new("/s", "search", r.clone())
            .with_param("q", "rust")
            .with_param("page", json!({"size": 10, "n": 2}));
        let b = Instruction::new("/s", "search", r.clone())
            .with_param("page", json!({"n": 2, "size": 10}))
            .with_param("q", "rust");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn template_is_not_part_of_identity() {
        let r = router();
        let a = Instruction::new("/", "home", r.clone()).with_template("<p>a</p>");
        let b = Instruction::new("/", "home", r.clone());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn canonical_form_excludes_child_key() {
        let r = router();
        let instr = Instruction::new("/a", "a", r.clone())
            .with_param("x", 1)
            .with_child(Instruction::new("/b", "b", r));
        assert_eq!(
            canonical_form(&instr, "childRoute"),
            r#"{"component":"a","params":{"x":1},"path":"/a"}"#
        );
    }

    #[test]
    fn custom_child_key_is_excluded_under_any_configured_key() {
        let r = router();
        let base = Instruction::new("/inbox", "inbox", r.clone());
        let first = base
            .clone()
            .with_child_under("sub", Instruction::new("/1", "message", r.clone()));
        let second = base
            .clone()
            .with_child_under("sub", Instruction::new("/2", "message", r.clone()));

        assert_eq!(first.params.get("sub"), Some(&json!("/1")));
        assert_eq!(first.child_route_key(), Some("sub"));
        for key in ["sub", "childRoute", "other"] {
            assert_eq!(Fingerprint::of(&first, key), Fingerprint::of(&second, key));
            assert_eq!(Fingerprint::of(&first, key), Fingerprint::of(&base, key));
        }
    }

    #[test]
    fn renesting_replaces_the_previous_child_key() {
        let r = router();
        let instr = Instruction::new("/a", "a", r.clone())
            .with_child(Instruction::new("/b", "b", r.clone()))
            .with_child_under("sub", Instruction::new("/c", "c", r));
        assert!(instr.params.get("childRoute").is_none());
        assert_eq!(instr.params.get("sub"), Some(&json!("/c")));
    }
}
