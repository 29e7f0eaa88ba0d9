//! Full-session scenario: one world lives a complete life
//!
//! Covers the session arc end to end:
//! - map change populating the grove with a plain tree and a published keeper
//! - tick delivery to the keeper through its global registration
//! - a 500 ms one-shot timer about the keeper landing on its per-actor
//!   listener, with lateness reported
//! - the reject path for a greet request sourced from another machine,
//!   routed back toward the sender
//! - deferred keeper deletion with census and listener-table checks
//! - pause and resume notifications, once each

use std::time::Duration;

use game_runtime::invokable;
use tarn_e2e_tests::{ScenarioWorld, GREET_REQUEST};
use types::{MachineId, Message, MessageKind};

fn keeper_count(world: &ScenarioWorld, kind: MessageKind) -> usize {
    world.keeper_kinds().iter().filter(|k| **k == kind).count()
}

#[test]
fn test_full_session_walkthrough() {
    let mut world = ScenarioWorld::new();
    let keeper = world.load_grove();

    // The grove census: one plain tree, one published keeper.
    assert_eq!(world.gm.current_map(), Some("grove"));
    assert_eq!(world.gm.num_actors(), 2);
    assert_eq!(world.gm.num_game_actors(), 1);
    let oak = world.gm.find_actors_by_name("old-oak")[0].id();
    assert!(world.gm.find_game_actor(oak).is_none(), "the tree is scenery");
    assert!(world.gm.find_actor(keeper).unwrap().is_published());

    // The keeper hears ticks and greets globally, and its own timer
    // per-actor.
    world
        .gm
        .register_global_listener(MessageKind::TICK_LOCAL, keeper, invokable::TICK_LOCAL);
    world
        .gm
        .register_global_listener(GREET_REQUEST, keeper, invokable::PROCESS_MESSAGE);
    world.gm.register_actor_listener(
        MessageKind::TIMER_ELAPSED,
        keeper,
        keeper,
        invokable::PROCESS_MESSAGE,
    );

    world.gm.advance_frame(0.1, 0.1);
    assert_eq!(world.keeper_kinds(), vec![MessageKind::TICK_LOCAL]);

    // A 500 ms one-shot about the keeper: silent at 300 ms, fires at 600 ms
    // and reports how late it ran.
    world
        .gm
        .set_timer("npc-timer", Some(keeper), Duration::from_millis(500), false, false);
    world.gm.advance_frame(0.3, 0.3);
    assert_eq!(keeper_count(&world, MessageKind::TIMER_ELAPSED), 0);
    world.gm.advance_frame(0.3, 0.3);
    assert_eq!(keeper_count(&world, MessageKind::TIMER_ELAPSED), 1);
    assert_eq!(world.gm.num_timers(), 0, "one-shots disappear after firing");

    let late = world
        .processed
        .lock()
        .unwrap()
        .iter()
        .find_map(|m| m.timer().map(|t| t.late_time))
        .unwrap();
    assert!((late - 0.1).abs() < 1e-9, "fired 0.1 s past the deadline, got {late}");

    // A greet from another machine is turned away, and the rejection
    // travels outbound toward the sender rather than back through the
    // local process queue.
    let peer = MachineId::new();
    world
        .gm
        .process_message(Message::new(GREET_REQUEST).with_source(peer));
    world.gm.drain_messages(); // deliver the greet; the rejection is queued
    world.gm.drain_messages(); // route the rejection
    assert_eq!(keeper_count(&world, GREET_REQUEST), 1);

    let routed = world.routed.lock().unwrap();
    assert_eq!(routed.len(), 1);
    let rejection = &routed[0];
    assert_eq!(rejection.kind(), MessageKind::REQUEST_REJECTED);
    assert_eq!(rejection.destination(), Some(peer));
    assert!(rejection.is_from(world.gm.machine_id()));
    let info = rejection.rejection().unwrap();
    assert_eq!(info.cause.kind(), GREET_REQUEST);
    assert_eq!(info.description, "the keeper is busy");
    drop(routed);
    assert!(
        !world
            .processed
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.kind() == MessageKind::REQUEST_REJECTED),
        "remote-bound rejections never reach the process queue"
    );

    // Pause and resume notify exactly once each; ticks keep coming with a
    // zero sim delta while paused.
    world.gm.set_paused(true);
    world.gm.set_paused(true); // no-op
    world.gm.advance_frame(0.0, 0.1);
    world.gm.set_paused(false);
    world.gm.advance_frame(0.1, 0.1);
    let pauses = world
        .processed
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m.kind() == MessageKind::PAUSED)
        .count();
    let resumes = world
        .processed
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m.kind() == MessageKind::RESUMED)
        .count();
    assert_eq!((pauses, resumes), (1, 1));
    assert_eq!(keeper_count(&world, MessageKind::TICK_LOCAL), 5);

    // Deletion is deferred to the end of the frame; the keeper stays
    // queryable until the flush but receives nothing more.
    world.gm.delete_actor(keeper);
    assert!(world.gm.is_marked_for_delete(keeper));
    assert!(world.gm.find_actor(keeper).is_some(), "queryable until the flush");

    world.gm.advance_frame(0.1, 0.1);
    assert!(world.gm.find_actor(keeper).is_none());
    assert_eq!(world.gm.num_actors(), 1, "only the tree remains");
    assert_eq!(world.gm.num_game_actors(), 0);
    assert!(
        !world.gm.has_listener_registrations(keeper),
        "every registration stripped with the actor"
    );
    assert_eq!(
        keeper_count(&world, MessageKind::TICK_LOCAL),
        5,
        "marked actors are skipped, so the flush frame's tick never landed"
    );

    // The deletion notifications drain on the following frame; the about-
    // the-keeper record now tells the whole story in order.
    world.gm.advance_frame(0.1, 0.1);
    assert_eq!(
        world.processed_kinds_about(keeper),
        vec![
            MessageKind::ACTOR_CREATED,
            MessageKind::ACTOR_PUBLISHED,
            MessageKind::TIMER_ELAPSED,
            MessageKind::ACTOR_ABOUT_TO_DELETE,
            MessageKind::ACTOR_DELETED,
        ]
    );

    let stats = world.gm.stats();
    assert_eq!(stats.frames, 7);
    assert_eq!(stats.actors_deleted, 1);
    assert_eq!(stats.timers_fired, 1);
}

#[test]
fn test_remote_greet_through_the_inlet() {
    let mut world = ScenarioWorld::new();
    let keeper = world.load_grove();
    world
        .gm
        .register_global_listener(GREET_REQUEST, keeper, invokable::PROCESS_MESSAGE);

    // Remote traffic enters through the inlet and keeps its source; the
    // frame pump hands it to the keeper, whose rejection goes back out.
    let peer = MachineId::new();
    world
        .gm
        .inlet()
        .post(Message::new(GREET_REQUEST).with_source(peer))
        .unwrap();

    world.gm.advance_frame(0.1, 0.1); // pump, deliver, queue the rejection
    world.gm.advance_frame(0.1, 0.1); // route it

    assert_eq!(keeper_count(&world, GREET_REQUEST), 1);
    let routed = world.routed.lock().unwrap();
    assert_eq!(routed.len(), 1);
    assert_eq!(routed[0].kind(), MessageKind::REQUEST_REJECTED);
    assert_eq!(routed[0].destination(), Some(peer));
}

#[test]
fn test_sessions_share_nothing() {
    let mut a = ScenarioWorld::new();
    let b = ScenarioWorld::new();

    assert_ne!(a.gm.machine_id(), b.gm.machine_id());

    let keeper = a.load_grove();
    assert_eq!(b.gm.num_actors(), 0, "one session's map never leaks");
    assert!(b.gm.find_actor(keeper).is_none());

    let aside = MessageKind::user(101);
    a.gm.register_message_kind(aside, "aside").unwrap();
    assert_eq!(a.gm.message_name(aside), Some("aside"));
    assert_eq!(b.gm.message_name(aside), None, "catalogs are per-session");
}
