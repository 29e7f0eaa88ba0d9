//! Actor behavior traits and capability tagging
//!
//! Two capability levels exist: [`Actor`] is a bare simulated entity, and
//! [`GameActor`] additionally participates in the frame loop through world
//! lifecycle hooks and named-callback dispatch. Which level an instance has
//! is fixed at construction by the [`ActorInstance`] tag; the registry
//! checks the tag at insertion, and nothing downcasts on the dispatch path.
//!
//! Game actors receive nothing by default. They opt in by registering
//! listeners (usually from `on_entered_world`), naming which invokable a
//! message kind should reach.

use std::any::Any;
use std::fmt;

use types::Message;

use crate::context::GameContext;

/// Built-in invokable names
///
/// Conventional targets for listener registrations; an actor is free to
/// dispatch on any names it likes.
pub mod invokable {
    /// Per-frame tick for locally owned actors
    pub const TICK_LOCAL: &str = "tick-local";
    /// Per-frame tick for remote actors
    pub const TICK_REMOTE: &str = "tick-remote";
    /// Catch-all message handler
    pub const PROCESS_MESSAGE: &str = "process-message";
}

/// Minimal behavior every simulated entity carries
pub trait Actor: Send {
    /// Concrete-type access for application code
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Full game participation: world lifecycle plus named-callback dispatch
pub trait GameActor: Actor {
    /// Called once when the actor joins the world (local actors only)
    fn on_entered_world(&mut self, _ctx: &mut GameContext) {}

    /// Called once at the end-of-frame flush, just before the actor is gone
    fn on_removed_from_world(&mut self, _ctx: &mut GameContext) {}

    /// Named-callback dispatch
    ///
    /// Listener registrations name the invokable a message should reach;
    /// unrecognized names should be ignored, not treated as errors.
    fn invoke(&mut self, invokable: &str, message: &Message, ctx: &mut GameContext);
}

/// An owned actor instance, tagged with its capability at construction
pub enum ActorInstance {
    Plain(Box<dyn Actor>),
    Game(Box<dyn GameActor>),
}

impl ActorInstance {
    pub fn is_game(&self) -> bool {
        matches!(self, Self::Game(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Game(_) => "game",
        }
    }

    pub fn as_actor(&self) -> &dyn Actor {
        match self {
            Self::Plain(actor) => actor.as_ref(),
            Self::Game(actor) => actor.as_ref(),
        }
    }

    pub fn as_actor_mut(&mut self) -> &mut dyn Actor {
        match self {
            Self::Plain(actor) => actor.as_mut(),
            Self::Game(actor) => actor.as_mut(),
        }
    }

    pub fn as_game_actor_mut(&mut self) -> Option<&mut dyn GameActor> {
        match self {
            Self::Game(actor) => Some(actor.as_mut()),
            Self::Plain(_) => None,
        }
    }
}

impl fmt::Debug for ActorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorInstance::{}", self.kind_name())
    }
}
