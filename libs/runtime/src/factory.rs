//! Actor factories and the factory registry
//!
//! Factories are registered by name on the manager that owns them; there is
//! no global registry. Each factory enumerates the types it can create, and
//! create-by-type scans factories in registration order, so two factories
//! offering the same type resolve to the earlier registration.

use tracing::{debug, warn};

use types::ActorType;

use crate::error::{GameError, Result};
use crate::proxy::ActorProxy;

/// Builds actor proxies for the types it advertises
pub trait ActorFactory: Send {
    /// The types this factory can create
    fn supported_types(&self) -> Vec<ActorType>;

    /// Build a fresh proxy for the given type
    ///
    /// Only called with types the factory advertises, but a factory may
    /// still fail when a type needs resources that are unavailable.
    fn create(&self, actor_type: &ActorType) -> Result<ActorProxy>;
}

/// Named collection of factories, owned by one manager
#[derive(Default)]
pub struct FactoryRegistry {
    factories: Vec<(String, Box<dyn ActorFactory>)>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a unique name
    pub fn register(&mut self, name: impl Into<String>, factory: Box<dyn ActorFactory>) -> Result<()> {
        let name = name.into();
        if self.factories.iter().any(|(n, _)| *n == name) {
            return Err(GameError::invalid_state(format!(
                "factory '{name}' is already registered"
            )));
        }
        debug!(
            factory = %name,
            types = factory.supported_types().len(),
            "registered actor factory"
        );
        self.factories.push((name, factory));
        Ok(())
    }

    /// Remove a factory by name, returning it; unknown names are a no-op
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn ActorFactory>> {
        match self.factories.iter().position(|(n, _)| n == name) {
            Some(idx) => {
                debug!(factory = %name, "unregistered actor factory");
                Some(self.factories.remove(idx).1)
            }
            None => {
                warn!(factory = %name, "unregister for unknown factory");
                None
            }
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.iter().any(|(n, _)| n == name)
    }

    /// Registered factory names, registration order
    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Create a proxy for the type, scanning factories in registration order
    pub fn create(&self, actor_type: &ActorType) -> Result<ActorProxy> {
        for (_, factory) in &self.factories {
            if factory.supported_types().iter().any(|t| t == actor_type) {
                return factory.create(actor_type);
            }
        }
        Err(GameError::unknown_type(actor_type))
    }

    /// Every creatable type, registration order, deduplicated
    pub fn supported_types(&self) -> Vec<ActorType> {
        let mut out = Vec::new();
        for (_, factory) in &self.factories {
            for ty in factory.supported_types() {
                if !out.contains(&ty) {
                    out.push(ty);
                }
            }
        }
        out
    }

    /// Resolve a category/name pair against the registered types
    pub fn find_type(&self, category: &str, name: &str) -> Option<ActorType> {
        self.supported_types()
            .into_iter()
            .find(|t| t.category() == category && t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
