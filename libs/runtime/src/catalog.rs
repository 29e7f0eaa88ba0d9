//! Message kind catalog
//!
//! Maps kind ids to stable names for logs and diagnostics. The built-in
//! vocabulary is preloaded; applications register their own kinds from
//! [`MessageKind::USER_BASE`] up, ideally at startup so every kind seen on
//! the wire has a name.

use std::collections::HashMap;

use tracing::debug;

use types::MessageKind;

use crate::error::{GameError, Result};

/// Kind-to-name registry for one manager
pub struct MessageCatalog {
    names: HashMap<MessageKind, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCatalog {
    /// Catalog preloaded with the built-in vocabulary
    pub fn new() -> Self {
        let mut names = HashMap::new();
        for (kind, name) in [
            (MessageKind::TICK_LOCAL, "tick-local"),
            (MessageKind::TICK_REMOTE, "tick-remote"),
            (MessageKind::TIMER_ELAPSED, "timer-elapsed"),
            (MessageKind::ACTOR_CREATED, "actor-created"),
            (MessageKind::ACTOR_PUBLISHED, "actor-published"),
            (MessageKind::ACTOR_UPDATED, "actor-updated"),
            (MessageKind::ACTOR_ABOUT_TO_DELETE, "actor-about-to-delete"),
            (MessageKind::ACTOR_DELETED, "actor-deleted"),
            (MessageKind::MAP_LOADED, "map-loaded"),
            (MessageKind::MAP_UNLOADED, "map-unloaded"),
            (MessageKind::TIME_CHANGED, "time-changed"),
            (MessageKind::PAUSED, "paused"),
            (MessageKind::RESUMED, "resumed"),
            (MessageKind::REQUEST_REJECTED, "request-rejected"),
        ] {
            names.insert(kind, name.to_string());
        }
        Self { names }
    }

    /// Register an application-defined kind
    ///
    /// Ids below `USER_BASE` are reserved for the runtime; duplicate ids
    /// are refused rather than renamed.
    pub fn register(&mut self, kind: MessageKind, name: impl Into<String>) -> Result<()> {
        if !kind.is_user_defined() {
            return Err(GameError::invalid_state(format!(
                "message kind {kind} is in the reserved range"
            )));
        }
        if self.names.contains_key(&kind) {
            return Err(GameError::invalid_state(format!(
                "message kind {kind} is already registered"
            )));
        }
        let name = name.into();
        debug!(kind = %kind, name = %name, "registered message kind");
        self.names.insert(kind, name);
        Ok(())
    }

    pub fn name(&self, kind: MessageKind) -> Option<&str> {
        self.names.get(&kind).map(String::as_str)
    }

    pub fn is_registered(&self, kind: MessageKind) -> bool {
        self.names.contains_key(&kind)
    }

    /// Loggable description, falling back to the raw id
    pub fn describe(&self, kind: MessageKind) -> String {
        match self.names.get(&kind) {
            Some(name) => format!("{name} ({})", kind.id()),
            None => format!("unregistered ({})", kind.id()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_preloaded() {
        let catalog = MessageCatalog::new();
        assert_eq!(catalog.name(MessageKind::TICK_LOCAL), Some("tick-local"));
        assert_eq!(
            catalog.name(MessageKind::REQUEST_REJECTED),
            Some("request-rejected")
        );
        assert!(catalog.len() >= 14);
    }

    #[test]
    fn test_user_registration() {
        let mut catalog = MessageCatalog::new();
        let kind = MessageKind::user(0);
        catalog.register(kind, "chat-line").unwrap();
        assert_eq!(catalog.name(kind), Some("chat-line"));
        assert_eq!(catalog.describe(kind), format!("chat-line ({})", kind.id()));
    }

    #[test]
    fn test_reserved_range_refused() {
        let mut catalog = MessageCatalog::new();
        let err = catalog
            .register(MessageKind::new(99), "sneaky")
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidState { .. }));
    }

    #[test]
    fn test_duplicate_refused() {
        let mut catalog = MessageCatalog::new();
        let kind = MessageKind::user(3);
        catalog.register(kind, "first").unwrap();
        assert!(catalog.register(kind, "second").is_err());
        assert_eq!(catalog.name(kind), Some("first"));
    }

    #[test]
    fn test_describe_fallback() {
        let catalog = MessageCatalog::new();
        let described = catalog.describe(MessageKind::user(42));
        assert!(described.starts_with("unregistered"));
    }
}
