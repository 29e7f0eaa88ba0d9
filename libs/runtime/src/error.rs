//! Error types for runtime operations
//!
//! Lookups that merely find nothing are not errors here; they return
//! `Option` or an empty collection. These variants cover operations that
//! were asked to do something impossible in the current world state.

use thiserror::Error;

use types::{ActorId, ActorType};

/// Result alias used throughout the runtime
pub type Result<T> = std::result::Result<T, GameError>;

/// Errors surfaced by factory, registry, and manager operations
#[derive(Debug, Clone, Error)]
pub enum GameError {
    /// Create-by-type was asked for a type no registered factory provides
    #[error("unknown actor type: {actor_type}")]
    UnknownType { actor_type: String },

    /// An insertion collided with an identity that is already registered
    #[error("duplicate actor identity: {id}")]
    DuplicateIdentity { id: ActorId },

    /// The operation is not valid in the current state
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// A seam requiring the game-actor capability was handed a plain actor
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A collaborator (map source, state store) failed; context preserved
    #[error("game manager error: {context}")]
    General { context: String },
}

impl GameError {
    pub fn unknown_type(actor_type: &ActorType) -> Self {
        Self::UnknownType {
            actor_type: actor_type.full_name(),
        }
    }

    pub fn duplicate_identity(id: ActorId) -> Self {
        Self::DuplicateIdentity { id }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn general(context: impl Into<String>) -> Self {
        Self::General {
            context: context.into(),
        }
    }

    /// True when a collaborator failed, as opposed to a bad call
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::General { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let ty = ActorType::new("vegetation", "Tree");
        let err = GameError::unknown_type(&ty);
        assert_eq!(err.to_string(), "unknown actor type: vegetation.Tree");

        let id = ActorId::new();
        let err = GameError::duplicate_identity(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_classification() {
        assert!(GameError::general("map source exploded").is_collaborator_failure());
        assert!(!GameError::invalid_state("already paused").is_collaborator_failure());
    }
}
