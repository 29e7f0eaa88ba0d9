//! Scenario cast and world assembly
//!
//! The grove map spawns one tree (plain) and one published keeper (game
//! actor). The keeper records every invocation it receives and turns away
//! greet requests that came from other machines, so tests can watch the
//! whole request/reject path without any real peer.

use std::any::Any;
use std::sync::{Arc, Mutex};

use tracing::debug;

use config::RuntimeConfig;
use game_runtime::{
    Actor, ActorFactory, ActorInstance, ActorProxy, Component, GameActor, GameContext, GameManager,
    MapManifest, MapSource, SpawnRecord,
};
use types::{ActorId, ActorType, Message, MessageKind, Vec3};

/// Application request kind the scenarios exchange
pub const GREET_REQUEST: MessageKind = MessageKind::user(100);

/// Messages captured by the recording component, in delivery order
pub type Captured = Arc<Mutex<Vec<Message>>>;

/// `(invokable, kind)` pairs seen by the keeper, in delivery order
pub type InvokeLog = Arc<Mutex<Vec<(String, MessageKind)>>>;

/// Scenery with no game participation
pub struct Tree;

impl Actor for Tree {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The scenario's game actor
///
/// Records every invocation and rejects greet requests sourced from other
/// machines; local greets are simply logged.
pub struct Keeper {
    log: InvokeLog,
}

impl Actor for Keeper {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl GameActor for Keeper {
    fn invoke(&mut self, invokable: &str, message: &Message, ctx: &mut GameContext) {
        self.log
            .lock()
            .unwrap()
            .push((invokable.to_string(), message.kind()));
        if message.kind() == GREET_REQUEST && !message.is_from(ctx.machine_id()) {
            ctx.reject_message(message, "the keeper is busy");
        }
    }
}

pub fn tree_type() -> ActorType {
    ActorType::new("scenario", "Tree")
}

pub fn keeper_type() -> ActorType {
    ActorType::new("scenario", "Keeper")
}

/// Factory for the scenario cast; every keeper shares the given log
pub struct ScenarioFactory {
    pub keeper_log: InvokeLog,
}

impl ActorFactory for ScenarioFactory {
    fn supported_types(&self) -> Vec<ActorType> {
        vec![tree_type(), keeper_type()]
    }

    fn create(&self, actor_type: &ActorType) -> game_runtime::Result<ActorProxy> {
        let instance = if *actor_type == keeper_type() {
            ActorInstance::Game(Box::new(Keeper {
                log: self.keeper_log.clone(),
            }))
        } else {
            ActorInstance::Plain(Box::new(Tree))
        };
        Ok(ActorProxy::new(actor_type.clone(), instance))
    }
}

/// In-memory map source with the single grove map
pub struct ScenarioMaps;

impl MapSource for ScenarioMaps {
    fn load(
        &mut self,
        map_name: &str,
    ) -> Result<MapManifest, Box<dyn std::error::Error + Send + Sync>> {
        match map_name {
            "grove" => Ok(MapManifest {
                spawns: vec![
                    SpawnRecord {
                        actor_type: tree_type(),
                        name: "old-oak".to_string(),
                        game_actor: false,
                        publish: false,
                        position: Some(Vec3::new(3.0, 0.0, -2.0)),
                    },
                    SpawnRecord {
                        actor_type: keeper_type(),
                        name: "keeper".to_string(),
                        game_actor: true,
                        publish: true,
                        position: None,
                    },
                ],
            }),
            other => Err(format!("no scenario map named '{other}'").into()),
        }
    }
}

/// Captures both queue hooks for later inspection
pub struct RecordingComponent {
    routed: Captured,
    processed: Captured,
}

impl Component for RecordingComponent {
    fn name(&self) -> &str {
        "recording"
    }

    fn on_message_for_routing(&mut self, message: &Message, _ctx: &mut GameContext) {
        debug!(kind = message.kind().id(), "captured outbound");
        self.routed.lock().unwrap().push(message.clone());
    }

    fn on_message_for_processing(&mut self, message: &Message, _ctx: &mut GameContext) {
        debug!(kind = message.kind().id(), "captured processed");
        self.processed.lock().unwrap().push(message.clone());
    }
}

/// A fully wired session: manager, factory, catalog entry, and recorder
pub struct ScenarioWorld {
    pub gm: GameManager,
    pub routed: Captured,
    pub processed: Captured,
    pub keeper_log: InvokeLog,
}

impl ScenarioWorld {
    pub fn new() -> Self {
        let config = RuntimeConfig::local_session();
        let mut gm = GameManager::with_config(&config);
        let keeper_log = InvokeLog::default();
        let routed = Captured::default();
        let processed = Captured::default();

        gm.register_message_kind(GREET_REQUEST, "greet-request")
            .unwrap();
        gm.register_factory(
            "scenario",
            Box::new(ScenarioFactory {
                keeper_log: keeper_log.clone(),
            }),
        )
        .unwrap();
        gm.add_component(Box::new(RecordingComponent {
            routed: routed.clone(),
            processed: processed.clone(),
        }));

        Self {
            gm,
            routed,
            processed,
            keeper_log,
        }
    }

    /// Load the grove and hand back the keeper's id
    pub fn load_grove(&mut self) -> ActorId {
        self.gm.change_map(&mut ScenarioMaps, "grove").unwrap();
        self.gm.find_actors_by_name("keeper")[0].id()
    }

    /// Kinds the keeper was invoked with, in order
    pub fn keeper_kinds(&self) -> Vec<MessageKind> {
        self.keeper_log
            .lock()
            .unwrap()
            .iter()
            .map(|(_, kind)| *kind)
            .collect()
    }

    /// Kinds on the processed capture that are about the given actor
    pub fn processed_kinds_about(&self, about: ActorId) -> Vec<MessageKind> {
        self.processed
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.about_actor() == Some(about))
            .map(|m| m.kind())
            .collect()
    }
}

impl Default for ScenarioWorld {
    fn default() -> Self {
        Self::new()
    }
}
