//! Actor Runtime for Distributed Soft-Realtime Simulations
//!
//! A frame-driven game runtime: one [`GameManager`] per process owns the
//! actors, the message queues, the listener tables, timers, and the
//! simulation clock. All simulation state changes flow through messages
//! drained once per frame, so every machine in a session observes the same
//! ordered stream.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       GameManager                          │
//! │                                                            │
//! │  pre_frame ──► clock ──► ticks ──► inlet pump ──► timers   │
//! │                                                            │
//! │  drain ──► send queue ──► components (routing hook)        │
//! │        └─► process queue ─► components ─► global listeners │
//! │                                        └► about listeners  │
//! │                                                            │
//! │  post_frame ──► deferred deletion flush                    │
//! └────────────────────────────────────────────────────────────┘
//!         ▲                                      │
//!   MessageInlet (other threads)          GameContext ops
//!   bounded, non-blocking                 applied between deliveries
//! ```
//!
//! Actors never talk to the manager during delivery; they queue operations
//! on a [`GameContext`] and the manager applies them between deliveries.
//! Deletion is two-phase: marked actors stay queryable until the end-of-
//! frame flush, then leave with full lifecycle notifications.
//!
//! # Example
//!
//! ```rust
//! use game_runtime::GameManager;
//!
//! let mut gm = GameManager::named("example");
//! gm.advance_frame(1.0 / 60.0, 1.0 / 60.0);
//! assert_eq!(gm.stats().frames, 1);
//! assert_eq!(gm.simulation_time(), 1.0 / 60.0);
//! ```

pub mod actor;
pub mod catalog;
pub mod component;
pub mod context;
pub mod error;
pub mod factory;
pub mod inlet;
pub mod manager;
pub mod proxy;
pub mod registry;
pub mod router;
pub mod timer;
pub mod world;

pub use actor::{invokable, Actor, ActorInstance, GameActor};
pub use catalog::MessageCatalog;
pub use component::Component;
pub use context::GameContext;
pub use error::{GameError, Result};
pub use factory::{ActorFactory, FactoryRegistry};
pub use inlet::{InletError, MessageInlet};
pub use manager::{FrameStats, GameManager};
pub use proxy::ActorProxy;
pub use registry::ActorRegistry;
pub use router::{MessageRouter, Registration, RouterStats};
pub use timer::{ExpiredTimer, TimerSet};
pub use world::{
    ActorRecord, GameSnapshot, GameStateStore, MapManifest, MapSource, SpawnRecord,
};

// The message vocabulary and identity types live in their own crate so
// transports and tools can speak them without pulling in the runtime.
pub use types;
