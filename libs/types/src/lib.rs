//! Core types shared across the Tarn runtime
//!
//! Everything that crosses a crate boundary lives here: actor and machine
//! identity, actor type descriptors, and the immutable message envelope with
//! its built-in vocabulary. The runtime crate owns behavior; this crate owns
//! vocabulary.

pub mod actor_type;
pub mod identity;
pub mod message;

pub use actor_type::ActorType;
pub use identity::{ActorId, MachineId, MachineInfo};
pub use message::{
    MapInfo, Message, MessageBody, MessageKind, RejectionInfo, TickInfo, TimeChangeInfo,
    TimerElapsedInfo,
};

/// World-space position used by proxies and radius queries.
pub use glam::Vec3;
