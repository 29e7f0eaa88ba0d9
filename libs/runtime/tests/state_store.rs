//! Saving and restoring world state through a GameStateStore
//!
//! A JSON file store over a scratch directory stands in for real
//! persistence. Verifies that save/load round-trips identity, names,
//! positions, game participation, and the remote/published flags, and
//! that the failure paths return `false` instead of erroring.

use std::any::Any;
use std::fs;
use std::path::PathBuf;

use game_runtime::{
    Actor, ActorFactory, ActorInstance, ActorProxy, GameActor, GameContext, GameManager,
    GameSnapshot, GameStateStore,
};
use types::{ActorType, Message, Vec3};

/// Snapshot store backed by one JSON file
struct JsonStore {
    path: PathBuf,
}

impl GameStateStore for JsonStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> bool {
        match serde_json::to_vec_pretty(snapshot) {
            Ok(bytes) => fs::write(&self.path, bytes).is_ok(),
            Err(_) => false,
        }
    }

    fn load(&mut self) -> Option<GameSnapshot> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

struct Critter;

impl Actor for Critter {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl GameActor for Critter {
    fn invoke(&mut self, _invokable: &str, _message: &Message, _ctx: &mut GameContext) {}
}

struct Stone;

impl Actor for Stone {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn critter_type() -> ActorType {
    ActorType::new("fauna", "Critter")
}

fn stone_type() -> ActorType {
    ActorType::new("fauna", "Stone")
}

struct MenagerieFactory;

impl ActorFactory for MenagerieFactory {
    fn supported_types(&self) -> Vec<ActorType> {
        vec![critter_type(), stone_type()]
    }

    fn create(&self, actor_type: &ActorType) -> game_runtime::Result<ActorProxy> {
        let instance = if *actor_type == critter_type() {
            ActorInstance::Game(Box::new(Critter))
        } else {
            ActorInstance::Plain(Box::new(Stone))
        };
        Ok(ActorProxy::new(actor_type.clone(), instance))
    }
}

fn critter_proxy() -> ActorProxy {
    ActorProxy::new(critter_type(), ActorInstance::Game(Box::new(Critter)))
}

fn stone_proxy() -> ActorProxy {
    ActorProxy::new(stone_type(), ActorInstance::Plain(Box::new(Stone)))
}

#[test]
fn test_save_then_load_rebuilds_the_world() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonStore {
        path: dir.path().join("session.json"),
    };

    let mut gm = GameManager::named("saver");
    gm.register_factory("menagerie", Box::new(MenagerieFactory))
        .unwrap();

    let stone = gm
        .add_actor(
            stone_proxy()
                .with_name("mossy")
                .with_position(Vec3::new(1.0, 2.0, 3.0)),
        )
        .unwrap();
    let fox = gm
        .add_game_actor(critter_proxy().with_name("fox"), false, true)
        .unwrap();
    let ghost = gm
        .add_game_actor(critter_proxy().with_name("ghost"), true, false)
        .unwrap();
    gm.change_time_settings(120.5, 1.0, chrono::Utc::now());

    assert!(gm.save_game_state(&mut store));

    let mut restored = GameManager::named("loader");
    restored
        .register_factory("menagerie", Box::new(MenagerieFactory))
        .unwrap();
    assert!(restored.load_game_state(&mut store));

    assert_eq!(restored.num_actors(), 3);
    assert_eq!(restored.num_game_actors(), 2);
    assert_eq!(restored.simulation_time(), 120.5);

    let stone_back = restored.find_actor(stone).expect("identity preserved");
    assert_eq!(stone_back.name(), "mossy");
    assert_eq!(stone_back.position(), Some(Vec3::new(1.0, 2.0, 3.0)));
    assert!(restored.find_game_actor(stone).is_none(), "restored as plain");

    let fox_back = restored.find_actor(fox).unwrap();
    assert!(fox_back.is_published());
    assert!(!fox_back.is_remote());

    let ghost_back = restored.find_actor(ghost).unwrap();
    assert!(ghost_back.is_remote());
    assert!(!ghost_back.is_published());
}

#[test]
fn test_load_replaces_the_existing_world() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonStore {
        path: dir.path().join("session.json"),
    };

    let mut gm = GameManager::named("saver");
    gm.register_factory("menagerie", Box::new(MenagerieFactory))
        .unwrap();
    gm.add_game_actor(critter_proxy().with_name("fox"), false, false)
        .unwrap();
    assert!(gm.save_game_state(&mut store));

    let mut other = GameManager::named("loader");
    other
        .register_factory("menagerie", Box::new(MenagerieFactory))
        .unwrap();
    let stale = other.add_actor(stone_proxy().with_name("leftover")).unwrap();

    assert!(other.load_game_state(&mut store));
    assert!(other.find_actor(stale).is_none(), "load replaces, never merges");
    assert_eq!(other.num_actors(), 1);
    assert_eq!(other.find_actors_by_name("fox").len(), 1);
}

#[test]
fn test_load_without_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonStore {
        path: dir.path().join("absent.json"),
    };

    let mut gm = GameManager::named("loader");
    gm.add_actor(stone_proxy()).unwrap();

    assert!(!gm.load_game_state(&mut store));
    assert_eq!(gm.num_actors(), 1, "a missing snapshot leaves the world alone");
}

#[test]
fn test_load_with_unresolvable_type_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonStore {
        path: dir.path().join("session.json"),
    };

    let mut gm = GameManager::named("saver");
    gm.register_factory("menagerie", Box::new(MenagerieFactory))
        .unwrap();
    gm.add_game_actor(critter_proxy(), false, false).unwrap();
    assert!(gm.save_game_state(&mut store));

    // The loading side has no factories registered at all.
    let mut bare = GameManager::named("bare");
    assert!(!bare.load_game_state(&mut store));
}

#[test]
fn test_save_failure_reports_false() {
    let mut store = JsonStore {
        path: PathBuf::from("/nonexistent-scratch-dir/session.json"),
    };
    let mut gm = GameManager::named("saver");
    assert!(!gm.save_game_state(&mut store));
}
