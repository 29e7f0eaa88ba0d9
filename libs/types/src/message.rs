//! Message envelope and built-in vocabulary
//!
//! Messages are immutable once queued: the runtime shares them as
//! `Arc<Message>` between queues and listeners. The envelope carries routing
//! metadata (kind, source machine, optional about-actor and destination);
//! the payload lives in [`MessageBody`].
//!
//! Kinds below [`MessageKind::USER_BASE`] are reserved for the runtime;
//! applications register their own kinds from `USER_BASE` up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::{ActorId, MachineId};

/// Identifies what a message means
///
/// An open set: the constants below are the runtime's own vocabulary, and
/// applications extend it with [`MessageKind::user`] kinds registered in the
/// message catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageKind(u16);

impl MessageKind {
    // Frame ticks, synthesized once per frame.
    pub const TICK_LOCAL: MessageKind = MessageKind(1);
    pub const TICK_REMOTE: MessageKind = MessageKind(2);

    // Timers.
    pub const TIMER_ELAPSED: MessageKind = MessageKind(10);

    // Actor lifecycle.
    pub const ACTOR_CREATED: MessageKind = MessageKind(20);
    pub const ACTOR_PUBLISHED: MessageKind = MessageKind(21);
    pub const ACTOR_UPDATED: MessageKind = MessageKind(22);
    pub const ACTOR_ABOUT_TO_DELETE: MessageKind = MessageKind(23);
    pub const ACTOR_DELETED: MessageKind = MessageKind(24);

    // Environment.
    pub const MAP_LOADED: MessageKind = MessageKind(30);
    pub const MAP_UNLOADED: MessageKind = MessageKind(31);
    pub const TIME_CHANGED: MessageKind = MessageKind(40);
    pub const PAUSED: MessageKind = MessageKind(41);
    pub const RESUMED: MessageKind = MessageKind(42);

    // Requests.
    pub const REQUEST_REJECTED: MessageKind = MessageKind(50);

    /// First id available to application-defined kinds.
    pub const USER_BASE: u16 = 1024;

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Application-defined kind at `USER_BASE + offset`
    pub const fn user(offset: u16) -> Self {
        Self(Self::USER_BASE + offset)
    }

    pub const fn id(&self) -> u16 {
        self.0
    }

    pub const fn is_user_defined(&self) -> bool {
        self.0 >= Self::USER_BASE
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind-{}", self.0)
    }
}

/// Payload of a tick message, one per frame per locality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickInfo {
    /// Scaled simulation seconds elapsed since the previous frame
    pub delta_sim: f64,
    /// Wall-clock seconds elapsed since the previous frame
    pub delta_real: f64,
    /// Current simulation time scale
    pub time_scale: f32,
    /// Simulation time at the start of this frame, in seconds
    pub sim_time: f64,
}

/// Payload of a timer-elapsed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerElapsedInfo {
    /// Name the timer was registered under (names are non-unique)
    pub timer_name: String,
    /// Seconds past the deadline when the expiry was observed
    pub late_time: f64,
}

/// Payload of a request-rejected message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionInfo {
    /// The message that was rejected, carried whole so the originator can
    /// correlate the failure
    pub cause: Box<Message>,
    /// Human-readable reason for the rejection
    pub description: String,
}

/// Payload of map lifecycle messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    pub map_name: String,
}

/// Payload of a time-settings-changed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeChangeInfo {
    pub sim_time: f64,
    pub time_scale: f32,
}

/// Message payload variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageBody {
    Empty,
    Tick(TickInfo),
    TimerElapsed(TimerElapsedInfo),
    Rejection(RejectionInfo),
    MapEvent(MapInfo),
    TimeChange(TimeChangeInfo),
    /// Application payloads; structure is the application's business
    Custom(serde_json::Value),
}

/// Immutable message envelope
///
/// Built with the consuming `with_*` methods, then queued. A freshly built
/// message carries the nil source; the runtime stamps the local machine id
/// at enqueue time, so only transports injecting peer traffic ever set the
/// source explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    kind: MessageKind,
    source: MachineId,
    sending_actor: Option<ActorId>,
    about_actor: Option<ActorId>,
    destination: Option<MachineId>,
    body: MessageBody,
}

impl Message {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            source: MachineId::nil(),
            sending_actor: None,
            about_actor: None,
            destination: None,
            body: MessageBody::Empty,
        }
    }

    pub fn with_source(mut self, source: MachineId) -> Self {
        self.source = source;
        self
    }

    pub fn with_sending_actor(mut self, actor: ActorId) -> Self {
        self.sending_actor = Some(actor);
        self
    }

    pub fn with_about_actor(mut self, actor: ActorId) -> Self {
        self.about_actor = Some(actor);
        self
    }

    pub fn with_destination(mut self, destination: MachineId) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_body(mut self, body: MessageBody) -> Self {
        self.body = body;
        self
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn source(&self) -> MachineId {
        self.source
    }

    pub fn sending_actor(&self) -> Option<ActorId> {
        self.sending_actor
    }

    pub fn about_actor(&self) -> Option<ActorId> {
        self.about_actor
    }

    pub fn destination(&self) -> Option<MachineId> {
        self.destination
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// True when the message originated on the given machine
    pub fn is_from(&self, machine: MachineId) -> bool {
        self.source == machine
    }

    /// Tick payload, if this is a tick message
    pub fn tick(&self) -> Option<&TickInfo> {
        match &self.body {
            MessageBody::Tick(info) => Some(info),
            _ => None,
        }
    }

    /// Timer payload, if this is a timer-elapsed message
    pub fn timer(&self) -> Option<&TimerElapsedInfo> {
        match &self.body {
            MessageBody::TimerElapsed(info) => Some(info),
            _ => None,
        }
    }

    /// Rejection payload, if this is a request-rejected message
    pub fn rejection(&self) -> Option<&RejectionInfo> {
        match &self.body {
            MessageBody::Rejection(info) => Some(info),
            _ => None,
        }
    }

    /// Custom payload, if this is an application message
    pub fn custom(&self) -> Option<&serde_json::Value> {
        match &self.body {
            MessageBody::Custom(value) => Some(value),
            _ => None,
        }
    }
}
