use std::fmt;
use std::sync::Arc;

pub const DEFAULT_SUFFIX: &str = "Controller";
pub const DEFAULT_TEMPLATE_ROOT: &str = "./components";
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "html";

/// Replaceable mapping between two name spaces.
pub type NameMapping = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Frozen bidirectional mapping between component, controller, and template names.
///
/// Built once during configuration; there is no way to swap a mapping
/// afterwards, so every consumer sharing the `Arc` sees the same answers.
#[derive(Clone)]
pub struct NamingConvention {
    controller: NameMapping,
    template: NameMapping,
    component: NameMapping,
}

impl NamingConvention {
    pub fn builder() -> NamingConventionBuilder {
        NamingConventionBuilder::new()
    }

    pub fn controller_name_of(&self, component: &str) -> String {
        (self.controller)(component)
    }

    pub fn template_location_of(&self, component: &str) -> String {
        (self.template)(component)
    }

    /// Inverse of [`controller_name_of`](Self::controller_name_of) for
    /// lower-camel identifiers (`myWidget`). A name that starts upper-case
    /// does not round-trip: `X` becomes `XController`, which maps back to `x`.
    pub fn component_of(&self, controller: &str) -> String {
        (self.component)(controller)
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        NamingConventionBuilder::new().build()
    }
}

impl fmt::Debug for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingConvention").finish_non_exhaustive()
    }
}

/// Configuration-phase builder for [`NamingConvention`].
pub struct NamingConventionBuilder {
    suffix: String,
    template_root: String,
    template_extension: String,
    controller: Option<NameMapping>,
    template: Option<NameMapping>,
    component: Option<NameMapping>,
}

impl Default for NamingConventionBuilder {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            template_root: DEFAULT_TEMPLATE_ROOT.to_string(),
            template_extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            controller: None,
            template: None,
            component: None,
        }
    }
}

impl NamingConventionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suffix appended to controller names by the default mappings.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn template_root(mut self, root: impl Into<String>) -> Self {
        self.template_root = root.into().trim_end_matches('/').to_string();
        self
    }

    pub fn template_extension(mut self, extension: impl Into<String>) -> Self {
        self.template_extension = extension.into();
        self
    }

    pub fn controller_mapping<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.controller = Some(Arc::new(mapping));
        self
    }

    pub fn template_mapping<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.template = Some(Arc::new(mapping));
        self
    }

    pub fn component_mapping<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.component = Some(Arc::new(mapping));
        self
    }

    pub fn build(self) -> NamingConvention {
        let Self {
            suffix,
            template_root,
            template_extension,
            controller,
            template,
            component,
        } = self;

        let controller = controller.unwrap_or_else(|| {
            let suffix = suffix.clone();
            Arc::new(move |name: &str| format!("{}{}", upper_first(name), suffix))
        });
        let component = component.unwrap_or_else(|| {
            Arc::new(move |name: &str| {
                let stem = name.strip_suffix(suffix.as_str()).unwrap_or(name);
                lower_first(stem)
            })
        });
        let template = template.unwrap_or_else(|| {
            Arc::new(move |name: &str| {
                let dashed = dash_case(name);
                format!("{template_root}/{dashed}/{dashed}.{template_extension}")
            })
        });

        NamingConvention {
            controller,
            template,
            component,
        }
    }
}

/// `myWidget` -> `my-widget`. Every upper-case ASCII letter becomes `-` plus its lower-case form.
pub fn dash_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
