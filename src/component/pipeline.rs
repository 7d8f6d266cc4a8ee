use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::instruction::Instruction;
use crate::logging::{LogLevel, TARGET_PIPELINE, json_str};
use crate::naming::NamingConvention;

use super::core::{Component, Injector, Locals, NoopComponent};

/// Template-fetch collaborator.
pub trait TemplateFetcher: Send + Sync {
    fn fetch(&self, location: &str) -> BoxFuture<'static, Result<String>>;
}

/// Turns an instruction into a live controller and a resolved template.
pub struct ComponentPipeline {
    naming: Arc<NamingConvention>,
    injector: Arc<dyn Injector>,
    fetcher: Option<Arc<dyn TemplateFetcher>>,
    templates: Mutex<HashMap<String, String>>,
    config: RouterConfig,
}

impl ComponentPipeline {
    pub fn new(
        naming: Arc<NamingConvention>,
        injector: Arc<dyn Injector>,
        config: RouterConfig,
    ) -> Self {
        Self {
            naming,
            injector,
            fetcher: None,
            templates: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn TemplateFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn naming(&self) -> &NamingConvention {
        &self.naming
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Instantiate the instruction's controller, substituting [`NoopComponent`]
    /// when the injector cannot produce it. Navigation never fails here.
    pub fn init(&self, instruction: &Instruction) -> (Box<dyn Component>, bool) {
        let controller = self.naming.controller_name_of(&instruction.component);
        let locals = Locals::for_instruction(instruction);
        match self.injector.instantiate(&controller, &locals) {
            Ok(component) => (component, false),
            Err(err) => {
                self.config.log(
                    LogLevel::Warn,
                    TARGET_PIPELINE,
                    "controller_fallback",
                    [
                        json_str("controller", controller.as_str()),
                        json_str("component", instruction.component.as_str()),
                        json_str("error", err.to_string()),
                    ],
                );
                self.config.record(|m| m.record_fallback());
                (Box::new(NoopComponent), true)
            }
        }
    }

    /// Resolve the template for a single instruction. Already-resolved
    /// templates are left alone; fetched templates are cached by location.
    pub async fn load(&self, instruction: &mut Instruction) -> Result<()> {
        if instruction.template.is_some() {
            return Ok(());
        }

        let location = self.naming.template_location_of(&instruction.component);
        if let Some(cached) = self.cached(&location)? {
            instruction.template = Some(cached);
            return Ok(());
        }

        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| RouterError::TemplateFetch {
                location: location.clone(),
                reason: "no template fetcher configured".to_string(),
            })?;
        let text = fetcher.fetch(&location).await?;

        self.templates
            .lock()
            .map_err(|_| RouterError::Poisoned("template cache"))?
            .insert(location.clone(), text.clone());
        self.config.log(
            LogLevel::Debug,
            TARGET_PIPELINE,
            "template_loaded",
            [
                json_str("component", instruction.component.as_str()),
                json_str("location", location),
            ],
        );
        instruction.template = Some(text);
        Ok(())
    }

    /// Resolve templates for an instruction and every nested child.
    pub fn load_tree<'a>(&'a self, instruction: &'a mut Instruction) -> BoxFuture<'a, Result<()>> {
        async move {
            self.load(instruction).await?;
            if let Some(child) = instruction.child.as_deref_mut() {
                self.load_tree(child).await?;
            }
            Ok(())
        }
        .boxed()
    }

    fn cached(&self, location: &str) -> Result<Option<String>> {
        let guard = self
            .templates
            .lock()
            .map_err(|_| RouterError::Poisoned("template cache"))?;
        Ok(guard.get(location).cloned())
    }
}
