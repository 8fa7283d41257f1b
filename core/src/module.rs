//! Pluggable keyboard modules.
//!
//! A module is handed the keyboard state once, at load time, and may adjust
//! it: add candidate triggers, preset inputs, or store properties other
//! modules read back. Modules arrive either ready-made or as a factory that
//! builds them from the state.

use crate::keyboard::KeyboardState;
use std::collections::HashMap;
use std::fmt;

pub trait KeyboardModule {
    fn name(&self) -> &str;

    /// Called once after the module is resolved.
    fn init(&mut self, keyboard: &mut KeyboardState);
}

/// Builds a module from the keyboard it is loaded into.
pub type ModuleFactory = Box<dyn FnOnce(&mut KeyboardState) -> Box<dyn KeyboardModule>>;

pub enum ModuleSpec {
    Factory(ModuleFactory),
    Instance(Box<dyn KeyboardModule>),
}

impl ModuleSpec {
    pub fn factory<F>(f: F) -> Self
    where
        F: FnOnce(&mut KeyboardState) -> Box<dyn KeyboardModule> + 'static,
    {
        ModuleSpec::Factory(Box::new(f))
    }

    pub fn instance<M: KeyboardModule + 'static>(module: M) -> Self {
        ModuleSpec::Instance(Box::new(module))
    }

    pub(crate) fn resolve(self, keyboard: &mut KeyboardState) -> Box<dyn KeyboardModule> {
        match self {
            ModuleSpec::Factory(build) => build(keyboard),
            ModuleSpec::Instance(module) => module,
        }
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleSpec::Factory(_) => f.write_str("ModuleSpec::Factory"),
            ModuleSpec::Instance(module) => write!(f, "ModuleSpec::Instance({})", module.name()),
        }
    }
}

/// Loaded modules and the properties they registered.
#[derive(Default)]
pub struct ModuleSet {
    modules: Vec<Box<dyn KeyboardModule>>,
    props: HashMap<String, HashMap<String, String>>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, module: Box<dyn KeyboardModule>) {
        self.modules.push(module);
    }

    pub fn names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn register_prop<M, P, V>(&mut self, module: M, prop: P, value: V)
    where
        M: Into<String>,
        P: Into<String>,
        V: Into<String>,
    {
        self.props
            .entry(module.into())
            .or_default()
            .insert(prop.into(), value.into());
    }

    pub fn prop(&self, module: &str, prop: &str) -> Option<&str> {
        self.props
            .get(module)
            .and_then(|props| props.get(prop))
            .map(String::as_str)
    }
}

impl fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSet")
            .field("modules", &self.names())
            .field("props", &self.props)
            .finish()
    }
}
