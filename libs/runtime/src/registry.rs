//! Actor bookkeeping: identity map, game index, deferred deletion
//!
//! One registry holds every live actor, keyed by id, with a separate index
//! of the ids that participate in the game loop. Insertion order is kept so
//! enumeration and linear queries are deterministic.
//!
//! Deletion is two-phase. `mark_for_delete` is cheap, synchronous, and
//! idempotent; marked actors stay fully queryable until the manager flushes
//! them at its end-of-frame point via `take_doomed` and `remove`. Between
//! mark and flush the id answers `is_marked_for_delete`, which is how the
//! delivery loop knows to stop handing it messages.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use types::{ActorId, ActorType, Vec3};

use crate::error::{GameError, Result};
use crate::proxy::ActorProxy;

/// Identity-keyed actor storage with a game-actor index
#[derive(Default)]
pub struct ActorRegistry {
    actors: HashMap<ActorId, ActorProxy>,
    order: Vec<ActorId>,
    game_ids: HashSet<ActorId>,
    doomed: Vec<ActorId>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a proxy into the generic map only
    ///
    /// The actor will not tick or receive invokables even if its instance
    /// is game-capable; use [`ActorRegistry::add_game_actor`] for that.
    pub fn add_actor(&mut self, proxy: ActorProxy) -> Result<ActorId> {
        let id = proxy.id();
        if self.actors.contains_key(&id) {
            return Err(GameError::duplicate_identity(id));
        }
        debug!(actor_id = %id, actor_type = %proxy.actor_type(), "added actor");
        self.order.push(id);
        self.actors.insert(id, proxy);
        Ok(id)
    }

    /// Insert a game-capable proxy into the map and the game index
    ///
    /// The capability tag is checked here, at the seam. `publish_intent`
    /// participates in validation only (a remote actor cannot be published);
    /// publication itself is a manager operation.
    pub fn add_game_actor(
        &mut self,
        mut proxy: ActorProxy,
        remote: bool,
        publish_intent: bool,
    ) -> Result<ActorId> {
        let id = proxy.id();
        if !proxy.is_game_actor() {
            return Err(GameError::type_mismatch(
                "game actor",
                format!("plain actor {}", proxy.actor_type()),
            ));
        }
        if remote && publish_intent {
            return Err(GameError::invalid_state(format!(
                "cannot publish remote actor {id}"
            )));
        }
        if self.actors.contains_key(&id) {
            return Err(GameError::duplicate_identity(id));
        }
        proxy.set_remote(remote);
        debug!(actor_id = %id, actor_type = %proxy.actor_type(), remote, "added game actor");
        self.order.push(id);
        self.game_ids.insert(id);
        self.actors.insert(id, proxy);
        Ok(id)
    }

    /// Mark an actor for removal at the end-of-frame flush
    ///
    /// O(1) on the happy path, idempotent, and a warn-level no-op for ids
    /// that are not registered.
    pub fn mark_for_delete(&mut self, id: ActorId) {
        if !self.actors.contains_key(&id) {
            warn!(actor_id = %id, "delete requested for unknown actor");
            return;
        }
        if self.doomed.contains(&id) {
            return;
        }
        debug!(actor_id = %id, "actor marked for delete");
        self.doomed.push(id);
    }

    pub fn is_marked_for_delete(&self, id: ActorId) -> bool {
        self.doomed.contains(&id)
    }

    /// Drain the pending-delete list, preserving mark order
    pub fn take_doomed(&mut self) -> Vec<ActorId> {
        std::mem::take(&mut self.doomed)
    }

    /// Remove an actor from every container, returning its proxy
    pub fn remove(&mut self, id: ActorId) -> Option<ActorProxy> {
        let proxy = self.actors.remove(&id)?;
        self.order.retain(|x| *x != id);
        self.game_ids.remove(&id);
        self.doomed.retain(|x| *x != id);
        debug!(actor_id = %id, "actor removed");
        Some(proxy)
    }

    /// Remove everything at once, returning proxies in insertion order
    pub fn drain_all(&mut self) -> Vec<ActorProxy> {
        let order = std::mem::take(&mut self.order);
        self.game_ids.clear();
        self.doomed.clear();
        order
            .into_iter()
            .filter_map(|id| self.actors.remove(&id))
            .collect()
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorProxy> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut ActorProxy> {
        self.actors.get_mut(&id)
    }

    /// Lookup restricted to actors in the game index
    pub fn get_game(&self, id: ActorId) -> Option<&ActorProxy> {
        if self.game_ids.contains(&id) {
            self.actors.get(&id)
        } else {
            None
        }
    }

    pub fn get_game_mut(&mut self, id: ActorId) -> Option<&mut ActorProxy> {
        if self.game_ids.contains(&id) {
            self.actors.get_mut(&id)
        } else {
            None
        }
    }

    /// True when the id participates in the game loop
    pub fn is_game_actor(&self, id: ActorId) -> bool {
        self.game_ids.contains(&id)
    }

    /// All actors sharing a name, insertion order; names are not unique
    pub fn find_by_name(&self, name: &str) -> Vec<&ActorProxy> {
        self.actors_in_order().filter(|p| p.name() == name).collect()
    }

    /// All actors of a type, insertion order
    pub fn find_by_type(&self, actor_type: &ActorType) -> Vec<&ActorProxy> {
        self.actors_in_order()
            .filter(|p| p.actor_type() == actor_type)
            .collect()
    }

    /// All positioned actors within `radius` of `center`, insertion order
    ///
    /// Actors without a position never match.
    pub fn find_within_radius(&self, center: Vec3, radius: f32) -> Vec<&ActorProxy> {
        self.actors_in_order()
            .filter(|p| match p.position() {
                Some(pos) => pos.distance(center) <= radius,
                None => false,
            })
            .collect()
    }

    /// Every actor, insertion order
    pub fn actors(&self) -> impl Iterator<Item = &ActorProxy> + '_ {
        self.actors_in_order()
    }

    /// Actors in the game index, insertion order
    pub fn game_actors(&self) -> impl Iterator<Item = &ActorProxy> + '_ {
        self.order
            .iter()
            .filter(|id| self.game_ids.contains(id))
            .filter_map(|id| self.actors.get(id))
    }

    /// Actors outside the game index, insertion order
    pub fn non_game_actors(&self) -> impl Iterator<Item = &ActorProxy> + '_ {
        self.order
            .iter()
            .filter(|id| !self.game_ids.contains(id))
            .filter_map(|id| self.actors.get(id))
    }

    /// Ids in the game index, insertion order
    pub fn game_actor_ids(&self) -> Vec<ActorId> {
        self.order
            .iter()
            .filter(|id| self.game_ids.contains(id))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn num_game_actors(&self) -> usize {
        self.game_ids.len()
    }

    fn actors_in_order(&self) -> impl Iterator<Item = &ActorProxy> + '_ {
        self.order.iter().filter_map(|id| self.actors.get(id))
    }
}
