//! Actor type descriptors
//!
//! An `ActorType` names a creatable kind of actor. Factories enumerate the
//! types they can build; the registry indexes live actors by their type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category-qualified name of a creatable actor kind
///
/// The category groups related types (`"vegetation"`, `"characters"`); the
/// name identifies the concrete kind within it. Equality covers both fields,
/// so `vegetation.Tree` and `props.Tree` are distinct types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorType {
    category: String,
    name: String,
}

impl ActorType {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified `category.name` form
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.category, self.name)
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_format() {
        let ty = ActorType::new("vegetation", "Tree");
        assert_eq!(ty.full_name(), "vegetation.Tree");
        assert_eq!(ty.to_string(), "vegetation.Tree");
    }

    #[test]
    fn test_equality_covers_category() {
        let a = ActorType::new("vegetation", "Tree");
        let b = ActorType::new("props", "Tree");
        assert_ne!(a, b, "same name in different categories is a different type");
        assert_eq!(a, ActorType::new("vegetation", "Tree"));
    }
}
