//! Deferred operations raised during delivery
//!
//! Hooks and invokables run while the manager is mid-iteration, so they
//! cannot reach back into the registry or the queues directly. Instead
//! every hook receives a `GameContext` and queues operations on it; the
//! manager applies the buffer after the hook returns, between deliveries.
//!
//! Messages raised here re-enter the queues rather than being delivered
//! recursively: process-queue messages drain in the same pass, sends wait
//! for the next frame's drain.

use std::time::Duration;

use types::{ActorId, ActorType, MachineId, Message, MessageKind, Vec3};

/// One deferred operation
#[derive(Debug)]
pub(crate) enum GameOp {
    Send(Message),
    Process(Message),
    Reject {
        cause: Box<Message>,
        description: String,
    },
    DeleteActor(ActorId),
    SpawnActor {
        actor_type: ActorType,
        name: Option<String>,
        publish: bool,
    },
    PublishActor(ActorId),
    MoveActor {
        id: ActorId,
        position: Vec3,
    },
    SetTimer {
        name: String,
        about: Option<ActorId>,
        interval: Duration,
        repeat: bool,
        real_time: bool,
    },
    ClearTimer(String),
    RegisterGlobal {
        kind: MessageKind,
        listener: ActorId,
        invokable: String,
    },
    UnregisterGlobal {
        kind: MessageKind,
        listener: ActorId,
        invokable: String,
    },
    RegisterForActor {
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: String,
    },
    UnregisterForActor {
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: String,
    },
}

/// Operation buffer handed to every hook during delivery
///
/// Operations apply in the order they were queued, after the current hook
/// returns.
pub struct GameContext {
    machine: MachineId,
    sim_time: f64,
    current_actor: Option<ActorId>,
    ops: Vec<GameOp>,
}

impl GameContext {
    pub(crate) fn new(machine: MachineId, sim_time: f64) -> Self {
        Self {
            machine,
            sim_time,
            current_actor: None,
            ops: Vec::new(),
        }
    }

    pub(crate) fn set_current_actor(&mut self, actor: Option<ActorId>) {
        self.current_actor = actor;
    }

    /// Id of the machine this runtime is
    pub fn machine_id(&self) -> MachineId {
        self.machine
    }

    /// Simulation time at the start of the current frame, seconds
    pub fn simulation_time(&self) -> f64 {
        self.sim_time
    }

    /// Id of the actor whose hook or invokable is running
    ///
    /// `None` inside component hooks. This is how an actor learns its own
    /// id to register itself as a listener or arm timers about itself.
    pub fn actor_id(&self) -> Option<ActorId> {
        self.current_actor
    }

    /// Queue an outbound message
    pub fn send_message(&mut self, message: Message) {
        self.ops.push(GameOp::Send(message));
    }

    /// Queue a simulation-facing message
    pub fn process_message(&mut self, message: Message) {
        self.ops.push(GameOp::Process(message));
    }

    /// Answer a request with a rejection; the manager routes it back
    /// toward the cause's origin
    pub fn reject_message(&mut self, cause: &Message, description: impl Into<String>) {
        self.ops.push(GameOp::Reject {
            cause: Box::new(cause.clone()),
            description: description.into(),
        });
    }

    /// Mark an actor for removal at this frame's flush point
    pub fn delete_actor(&mut self, id: ActorId) {
        self.ops.push(GameOp::DeleteActor(id));
    }

    /// Create and insert an actor of the given type once delivery allows
    ///
    /// The spawn happens between deliveries; failures are logged, not
    /// returned. Use the manager's synchronous create/add path when the
    /// caller needs the result.
    pub fn spawn_actor(&mut self, actor_type: ActorType, name: Option<String>, publish: bool) {
        self.ops.push(GameOp::SpawnActor {
            actor_type,
            name,
            publish,
        });
    }

    /// Publish a local game actor
    pub fn publish_actor(&mut self, id: ActorId) {
        self.ops.push(GameOp::PublishActor(id));
    }

    /// Reposition an actor; published actors announce the update
    pub fn move_actor(&mut self, id: ActorId, position: Vec3) {
        self.ops.push(GameOp::MoveActor { id, position });
    }

    /// Arm a named timer; `real_time` timers ignore simulation scaling
    pub fn set_timer(
        &mut self,
        name: impl Into<String>,
        about: Option<ActorId>,
        interval: Duration,
        repeat: bool,
        real_time: bool,
    ) {
        self.ops.push(GameOp::SetTimer {
            name: name.into(),
            about,
            interval,
            repeat,
            real_time,
        });
    }

    /// Drop every timer with the name
    pub fn clear_timer(&mut self, name: impl Into<String>) {
        self.ops.push(GameOp::ClearTimer(name.into()));
    }

    /// Listen for a kind regardless of its about-actor
    pub fn register_global_listener(
        &mut self,
        kind: MessageKind,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        self.ops.push(GameOp::RegisterGlobal {
            kind,
            listener,
            invokable: invokable.into(),
        });
    }

    pub fn unregister_global_listener(
        &mut self,
        kind: MessageKind,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        self.ops.push(GameOp::UnregisterGlobal {
            kind,
            listener,
            invokable: invokable.into(),
        });
    }

    /// Listen for a kind only when it is about a particular actor
    pub fn register_actor_listener(
        &mut self,
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        self.ops.push(GameOp::RegisterForActor {
            kind,
            about,
            listener,
            invokable: invokable.into(),
        });
    }

    pub fn unregister_actor_listener(
        &mut self,
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        self.ops.push(GameOp::UnregisterForActor {
            kind,
            about,
            listener,
            invokable: invokable.into(),
        });
    }

    pub(crate) fn take_ops(&mut self) -> Vec<GameOp> {
        std::mem::take(&mut self.ops)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
