//! Actor and machine identity
//!
//! Both identifiers are UUID-backed so they stay unique across processes
//! without coordination. `MachineInfo` describes one runtime process; a
//! message whose source matches the local machine id is a local message.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    id: Uuid,
}

impl ActorId {
    /// Generate a new unique actor ID
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Create an actor ID from an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self { id }
    }

    /// Get the underlying UUID
    pub fn uuid(&self) -> &Uuid {
        &self.id
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.id.simple())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a runtime process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineId {
    id: Uuid,
}

impl MachineId {
    /// Generate a new unique machine ID
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Create a machine ID from an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self { id }
    }

    /// The nil machine ID, used on messages whose source has not been
    /// stamped yet. The runtime replaces it with the local machine id at
    /// enqueue time.
    pub const fn nil() -> Self {
        Self { id: Uuid::nil() }
    }

    /// True for the nil (unstamped) machine ID
    pub fn is_nil(&self) -> bool {
        self.id.is_nil()
    }

    /// Get the underlying UUID
    pub fn uuid(&self) -> &Uuid {
        &self.id
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "machine-{}", self.id.simple())
    }
}

impl Default for MachineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of one runtime process in a session
///
/// Every GameManager owns exactly one of these. Remote peers are known by
/// the `MachineId` carried on their messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInfo {
    name: String,
    id: MachineId,
    host_name: String,
}

impl MachineInfo {
    /// Create machine info with a fresh id, picking up the host name from
    /// the environment when available
    pub fn new(name: impl Into<String>) -> Self {
        let host_name = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        Self {
            name: name.into(),
            id: MachineId::new(),
            host_name,
        }
    }

    /// Override the host name
    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }
}

impl fmt::Display for MachineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
