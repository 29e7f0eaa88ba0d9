//! Map sources and game-state stores
//!
//! The runtime does not know where maps or saves live. Collaborators
//! implement these traits and the manager calls into them: map loads
//! produce a manifest of actors to spawn, save/load move a serializable
//! world census in and out. Store failures stay opaque at the manager
//! surface (booleans), with details logged by whoever knows them.

use serde::{Deserialize, Serialize};

use types::{ActorId, ActorType, Vec3};

/// One actor to instantiate when a map loads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub actor_type: ActorType,
    pub name: String,
    /// Insert as a game actor (ticks, receives messages) or a plain one
    pub game_actor: bool,
    /// Publish after insertion; meaningful for game actors only
    pub publish: bool,
    pub position: Option<Vec3>,
}

/// Everything a map contributes to the world
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapManifest {
    pub spawns: Vec<SpawnRecord>,
}

/// Source of map content
pub trait MapSource {
    /// Load the named map's manifest
    ///
    /// Failures are wrapped into the manager's collaborator error with the
    /// map name attached.
    fn load(
        &mut self,
        map_name: &str,
    ) -> std::result::Result<MapManifest, Box<dyn std::error::Error + Send + Sync>>;
}

/// One actor in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: ActorId,
    pub actor_type: ActorType,
    pub name: String,
    /// Whether the actor was in the game index
    pub game_actor: bool,
    pub remote: bool,
    pub published: bool,
    pub position: Option<Vec3>,
}

/// A captured census of the running world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub sim_time: f64,
    pub map_name: Option<String>,
    pub actors: Vec<ActorRecord>,
}

/// Destination for save/load
///
/// Both directions are opaque to the manager: a failing store returns
/// `false`/`None` after logging whatever it knows.
pub trait GameStateStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> bool;

    fn load(&mut self) -> Option<GameSnapshot>;
}
