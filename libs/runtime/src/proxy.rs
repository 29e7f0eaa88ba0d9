//! Owning actor wrapper with identity and world metadata
//!
//! Identity and world-facing metadata live on the proxy so the registry can
//! index and query actors without touching their behavior. The remote and
//! published flags are maintained by the runtime, never by application code.

use types::{ActorId, ActorType, Vec3};

use crate::actor::{Actor, ActorInstance, GameActor};

/// Owning wrapper around one actor instance
#[derive(Debug)]
pub struct ActorProxy {
    id: ActorId,
    name: String,
    actor_type: ActorType,
    remote: bool,
    published: bool,
    position: Option<Vec3>,
    instance: ActorInstance,
}

impl ActorProxy {
    /// Wrap an instance with a fresh id; the name defaults to the type name
    pub fn new(actor_type: ActorType, instance: ActorInstance) -> Self {
        let name = actor_type.name().to_string();
        Self {
            id: ActorId::new(),
            name,
            actor_type,
            remote: false,
            published: false,
            position: None,
            instance,
        }
    }

    /// Replace the generated id
    ///
    /// For restoring saved actors and applying peer state, where identity is
    /// assigned elsewhere. Must happen before insertion.
    pub fn with_id(mut self, id: ActorId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn actor_type(&self) -> &ActorType {
        &self.actor_type
    }

    /// True when the actor lives on a peer machine
    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// True once the actor has been announced to the session
    pub fn is_published(&self) -> bool {
        self.published
    }

    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = Some(position);
    }

    /// Capability tag of the wrapped instance
    pub fn is_game_actor(&self) -> bool {
        self.instance.is_game()
    }

    pub fn instance_kind(&self) -> &'static str {
        self.instance.kind_name()
    }

    pub fn actor(&self) -> &dyn Actor {
        self.instance.as_actor()
    }

    pub fn actor_mut(&mut self) -> &mut dyn Actor {
        self.instance.as_actor_mut()
    }

    /// Game-capable access; `None` for plain instances
    pub fn game_actor_mut(&mut self) -> Option<&mut dyn GameActor> {
        self.instance.as_game_actor_mut()
    }

    pub(crate) fn set_remote(&mut self, remote: bool) {
        self.remote = remote;
    }

    pub(crate) fn set_published(&mut self, published: bool) {
        self.published = published;
    }
}
