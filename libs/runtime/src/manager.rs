//! The GameManager: frame orchestration over actors, messages, and time
//!
//! One manager owns the whole runtime: factory registry, actor registry,
//! message router, message catalog, timers, components, and the simulation
//! clock. A driver advances it frame by frame:
//!
//! ```text
//!   pre_frame(delta_sim, delta_real)   clock, tick synthesis, inlet pump, timers
//!   drain_messages()                   send queue, then process queue
//!   post_frame()                       deferred-deletion flush
//! ```
//!
//! Everything runs on the driving thread. Hooks invoked during delivery
//! interact with the manager through the [`GameContext`] op buffer, applied
//! between deliveries; the only cross-thread surface is the bounded
//! [`MessageInlet`], drained once per frame in `pre_frame`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use tracing::{debug, error, info, warn};

use config::RuntimeConfig;
use types::{
    ActorId, ActorType, MachineId, MachineInfo, MapInfo, Message, MessageBody, MessageKind,
    RejectionInfo, TickInfo, TimeChangeInfo, TimerElapsedInfo, Vec3,
};

use crate::catalog::MessageCatalog;
use crate::component::Component;
use crate::context::{GameContext, GameOp};
use crate::error::{GameError, Result};
use crate::factory::{ActorFactory, FactoryRegistry};
use crate::inlet::{self, MessageInlet};
use crate::proxy::ActorProxy;
use crate::registry::ActorRegistry;
use crate::router::{MessageRouter, RouterStats};
use crate::timer::TimerSet;
use crate::world::{ActorRecord, GameSnapshot, GameStateStore, MapSource};

/// Simulation clock state
#[derive(Debug, Clone)]
struct SimClock {
    sim_time: f64,
    time_scale: f32,
    sim_date: DateTime<Utc>,
    paused: bool,
}

impl SimClock {
    fn new(time_scale: f32) -> Self {
        Self {
            sim_time: 0.0,
            time_scale,
            sim_date: Utc::now(),
            paused: false,
        }
    }

    fn advance(&mut self, delta_sim: f64) {
        self.sim_time += delta_sim;
        self.sim_date += chrono::Duration::nanoseconds((delta_sim * 1e9) as i64);
    }
}

/// Counters across the manager's lifetime
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameStats {
    pub frames: u64,
    pub messages_delivered: u64,
    pub listeners_invoked: u64,
    pub actors_deleted: u64,
    pub timers_fired: u64,
    pub dangling_skips: u64,
}

/// Frame-driven orchestrator over one world
pub struct GameManager {
    machine: MachineInfo,
    factories: FactoryRegistry,
    catalog: MessageCatalog,
    registry: ActorRegistry,
    router: MessageRouter,
    components: Vec<Box<dyn Component>>,
    timers: TimerSet,
    clock: SimClock,
    current_map: Option<String>,
    inlet_handle: MessageInlet,
    inlet_rx: Receiver<Message>,
    stats: FrameStats,
}

impl GameManager {
    /// Manager with default configuration
    pub fn new() -> Self {
        Self::with_config(&RuntimeConfig::default())
    }

    /// Manager with default configuration and a specific machine name
    pub fn named(machine_name: impl Into<String>) -> Self {
        let mut config = RuntimeConfig::default();
        config.engine.machine_name = machine_name.into();
        Self::with_config(&config)
    }

    pub fn with_config(config: &RuntimeConfig) -> Self {
        let machine = MachineInfo::new(config.engine.machine_name.clone());
        // Capacity 0 would make every post fail; clamp to one slot.
        let (inlet_handle, inlet_rx) = inlet::channel(config.engine.inlet_capacity.max(1));
        info!(
            machine = %machine,
            time_scale = config.engine.time_scale,
            "game manager created"
        );
        Self {
            machine,
            factories: FactoryRegistry::new(),
            catalog: MessageCatalog::new(),
            registry: ActorRegistry::new(),
            router: MessageRouter::new(),
            components: Vec::new(),
            timers: TimerSet::new(),
            clock: SimClock::new(config.engine.time_scale),
            current_map: None,
            inlet_handle,
            inlet_rx,
            stats: FrameStats::default(),
        }
    }

    // ------------------------------------------------------------------
    // Identity and introspection
    // ------------------------------------------------------------------

    pub fn machine_info(&self) -> &MachineInfo {
        &self.machine
    }

    pub fn machine_id(&self) -> MachineId {
        self.machine.id()
    }

    /// True when the message originated on this machine
    pub fn is_local(&self, message: &Message) -> bool {
        message.is_from(self.machine.id())
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn router_stats(&self) -> RouterStats {
        self.router.stats()
    }

    pub fn current_map(&self) -> Option<&str> {
        self.current_map.as_deref()
    }

    // ------------------------------------------------------------------
    // Factories and the message catalog
    // ------------------------------------------------------------------

    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn ActorFactory>,
    ) -> Result<()> {
        self.factories.register(name, factory)
    }

    pub fn unregister_factory(&mut self, name: &str) -> Option<Box<dyn ActorFactory>> {
        self.factories.unregister(name)
    }

    /// Every creatable type across registered factories
    pub fn supported_actor_types(&self) -> Vec<ActorType> {
        self.factories.supported_types()
    }

    pub fn find_actor_type(&self, category: &str, name: &str) -> Option<ActorType> {
        self.factories.find_type(category, name)
    }

    /// Build a proxy for the type without inserting it
    pub fn create_actor(&self, actor_type: &ActorType) -> Result<ActorProxy> {
        self.factories.create(actor_type)
    }

    /// Register an application-defined message kind
    pub fn register_message_kind(&mut self, kind: MessageKind, name: impl Into<String>) -> Result<()> {
        self.catalog.register(kind, name)
    }

    pub fn message_name(&self, kind: MessageKind) -> Option<&str> {
        self.catalog.name(kind)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Add a component; it hears every drained message from now on
    pub fn add_component(&mut self, mut component: Box<dyn Component>) {
        info!(component = %component.name(), "component added");
        let mut ctx = self.new_context();
        component.on_added_to_manager(&mut ctx);
        self.components.push(component);
        self.apply_ops(ctx);
    }

    /// Remove a component by name, returning it
    pub fn remove_component(&mut self, name: &str) -> Option<Box<dyn Component>> {
        match self.components.iter().position(|c| c.name() == name) {
            Some(idx) => {
                info!(component = %name, "component removed");
                Some(self.components.remove(idx))
            }
            None => None,
        }
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    // ------------------------------------------------------------------
    // Actor lifecycle
    // ------------------------------------------------------------------

    /// Insert a non-participating actor (no ticks, no invokables)
    pub fn add_actor(&mut self, proxy: ActorProxy) -> Result<ActorId> {
        self.registry.add_actor(proxy)
    }

    /// Insert a game actor
    ///
    /// Local actors get their entered-world hook and an actor-created
    /// notification; `publish` additionally announces the actor to the
    /// session. A remote actor cannot be published.
    pub fn add_game_actor(&mut self, proxy: ActorProxy, remote: bool, publish: bool) -> Result<ActorId> {
        let id = self.registry.add_game_actor(proxy, remote, publish)?;
        if !remote {
            let mut ctx = self.new_context();
            ctx.set_current_actor(Some(id));
            if let Some(actor) = self.registry.get_mut(id).and_then(|p| p.game_actor_mut()) {
                actor.on_entered_world(&mut ctx);
            }
            self.apply_ops(ctx);
            self.queue_local_notification(Message::new(MessageKind::ACTOR_CREATED).with_about_actor(id));
        }
        if publish {
            self.publish_actor(id)?;
        }
        Ok(id)
    }

    /// Announce a local game actor to the rest of the session
    ///
    /// Idempotent once published.
    pub fn publish_actor(&mut self, id: ActorId) -> Result<()> {
        let proxy = self.registry.get_game_mut(id).ok_or_else(|| {
            GameError::invalid_state(format!("cannot publish unknown game actor {id}"))
        })?;
        if proxy.is_remote() {
            return Err(GameError::invalid_state(format!(
                "cannot publish remote actor {id}"
            )));
        }
        if proxy.is_published() {
            return Ok(());
        }
        proxy.set_published(true);
        info!(actor_id = %id, "actor published");
        self.queue_local_notification(Message::new(MessageKind::ACTOR_PUBLISHED).with_about_actor(id));
        Ok(())
    }

    /// Reposition an actor
    ///
    /// Published actors announce the change with an actor-updated message
    /// so peers can follow. Unknown ids are a warn-level no-op.
    pub fn move_actor(&mut self, id: ActorId, position: Vec3) {
        match self.registry.get_mut(id) {
            Some(proxy) => {
                proxy.set_position(position);
                if proxy.is_published() {
                    self.queue_local_notification(
                        Message::new(MessageKind::ACTOR_UPDATED).with_about_actor(id),
                    );
                }
            }
            None => warn!(actor_id = %id, "move requested for unknown actor"),
        }
    }

    /// Mark an actor for removal at this frame's flush point
    ///
    /// Synchronous and idempotent; the actor stays queryable until
    /// `post_frame`, but receives no further messages this frame.
    pub fn delete_actor(&mut self, id: ActorId) {
        self.registry.mark_for_delete(id);
    }

    /// Remove every actor immediately, outside the deferred path
    ///
    /// Used between sessions and on map change. Local game actors still
    /// get deletion notifications so components can tear down.
    pub fn delete_all_actors(&mut self) {
        let game_ids: HashSet<ActorId> = self.registry.game_actor_ids().into_iter().collect();
        let proxies = self.registry.drain_all();
        let count = proxies.len();
        let mut ctx = self.new_context();
        for mut proxy in proxies {
            let id = proxy.id();
            let was_game = game_ids.contains(&id);
            let local = !proxy.is_remote();
            if was_game {
                ctx.set_current_actor(Some(id));
                if let Some(actor) = proxy.game_actor_mut() {
                    actor.on_removed_from_world(&mut ctx);
                }
            }
            self.router.unregister_all_for(id);
            if local && was_game {
                self.queue_local_notification(
                    Message::new(MessageKind::ACTOR_DELETED).with_about_actor(id),
                );
            }
        }
        self.apply_ops(ctx);
        if count > 0 {
            info!(count, "deleted all actors");
        }
        self.stats.actors_deleted += count as u64;
    }

    // ------------------------------------------------------------------
    // Queries (absence is never an error)
    // ------------------------------------------------------------------

    pub fn find_actor(&self, id: ActorId) -> Option<&ActorProxy> {
        self.registry.get(id)
    }

    pub fn find_actor_mut(&mut self, id: ActorId) -> Option<&mut ActorProxy> {
        self.registry.get_mut(id)
    }

    /// Lookup restricted to game-loop participants
    pub fn find_game_actor(&self, id: ActorId) -> Option<&ActorProxy> {
        self.registry.get_game(id)
    }

    pub fn find_actors_by_name(&self, name: &str) -> Vec<&ActorProxy> {
        self.registry.find_by_name(name)
    }

    pub fn find_actors_by_type(&self, actor_type: &ActorType) -> Vec<&ActorProxy> {
        self.registry.find_by_type(actor_type)
    }

    pub fn find_actors_within(&self, center: Vec3, radius: f32) -> Vec<&ActorProxy> {
        self.registry.find_within_radius(center, radius)
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorProxy> + '_ {
        self.registry.actors()
    }

    pub fn game_actors(&self) -> impl Iterator<Item = &ActorProxy> + '_ {
        self.registry.game_actors()
    }

    pub fn non_game_actors(&self) -> impl Iterator<Item = &ActorProxy> + '_ {
        self.registry.non_game_actors()
    }

    pub fn num_actors(&self) -> usize {
        self.registry.len()
    }

    pub fn num_game_actors(&self) -> usize {
        self.registry.num_game_actors()
    }

    pub fn is_marked_for_delete(&self, id: ActorId) -> bool {
        self.registry.is_marked_for_delete(id)
    }

    // ------------------------------------------------------------------
    // Messaging
    // ------------------------------------------------------------------

    /// Queue an outbound message; unstamped sources become this machine
    pub fn send_message(&mut self, message: Message) {
        let message = self.stamp(message);
        self.router.queue_send(Arc::new(message));
    }

    /// Queue a simulation-facing message; unstamped sources become this machine
    pub fn process_message(&mut self, message: Message) {
        let message = self.stamp(message);
        self.router.queue_process(Arc::new(message));
    }

    /// Answer a request with a rejection
    ///
    /// Local causes come back on the process queue; remote causes go out
    /// through the send queue, addressed to the originating machine.
    pub fn reject_message(&mut self, cause: &Message, description: impl Into<String>) {
        let description = description.into();
        warn!(
            kind = %self.catalog.describe(cause.kind()),
            reason = %description,
            "request rejected"
        );
        let mut reject = Message::new(MessageKind::REQUEST_REJECTED)
            .with_source(self.machine.id())
            .with_body(MessageBody::Rejection(RejectionInfo {
                cause: Box::new(cause.clone()),
                description,
            }));
        if let Some(about) = cause.about_actor() {
            reject = reject.with_about_actor(about);
        }
        if cause.source().is_nil() || cause.is_from(self.machine.id()) {
            self.router.queue_process(Arc::new(reject));
        } else {
            reject = reject.with_destination(cause.source());
            self.router.queue_send(Arc::new(reject));
        }
    }

    /// Producer handle for other threads
    pub fn inlet(&self) -> MessageInlet {
        self.inlet_handle.clone()
    }

    // ------------------------------------------------------------------
    // Listener management
    // ------------------------------------------------------------------

    /// Listen for every message of a kind
    ///
    /// The listener id is not checked against the registry: dangling
    /// registrations are skipped at delivery.
    pub fn register_global_listener(
        &mut self,
        kind: MessageKind,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        self.router.register_global(kind, listener, invokable);
    }

    pub fn unregister_global_listener(
        &mut self,
        kind: MessageKind,
        listener: ActorId,
        invokable: &str,
    ) {
        self.router.unregister_global(kind, listener, invokable);
    }

    /// Listen for a kind only when it is about a particular actor
    pub fn register_actor_listener(
        &mut self,
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        self.router.register_for_actor(kind, about, listener, invokable);
    }

    pub fn unregister_actor_listener(
        &mut self,
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: &str,
    ) {
        self.router.unregister_for_actor(kind, about, listener, invokable);
    }

    /// Strip every registration whose listening actor is `listener`
    pub fn unregister_all_listeners_for(&mut self, listener: ActorId) {
        self.router.unregister_all_for(listener);
    }

    /// True while any table still references `listener` as the listening actor
    pub fn has_listener_registrations(&self, listener: ActorId) -> bool {
        self.router.has_registrations_for(listener)
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Arm a named timer; names are not unique
    ///
    /// `real_time` timers run on wall-clock deltas and keep going while
    /// the simulation is paused or scaled.
    pub fn set_timer(
        &mut self,
        name: impl Into<String>,
        about: Option<ActorId>,
        interval: Duration,
        repeat: bool,
        real_time: bool,
    ) {
        self.timers.set(name, about, interval, repeat, real_time);
    }

    /// Drop every timer with the name, returning how many were removed
    pub fn clear_timer(&mut self, name: &str) -> usize {
        self.timers.clear(name)
    }

    pub fn num_timers(&self) -> usize {
        self.timers.len()
    }

    // ------------------------------------------------------------------
    // Pause and time
    // ------------------------------------------------------------------

    /// Pause or resume the simulation
    ///
    /// No-op when the state does not change. The driver is expected to
    /// hold sim deltas at zero while paused; real-time timers keep running
    /// either way.
    pub fn set_paused(&mut self, paused: bool) {
        if self.clock.paused == paused {
            return;
        }
        self.clock.paused = paused;
        info!(paused, "pause state changed");
        let kind = if paused {
            MessageKind::PAUSED
        } else {
            MessageKind::RESUMED
        };
        self.queue_local_notification(Message::new(kind));
    }

    pub fn is_paused(&self) -> bool {
        self.clock.paused
    }

    /// Simulation time since session start, seconds
    pub fn simulation_time(&self) -> f64 {
        self.clock.sim_time
    }

    pub fn time_scale(&self) -> f32 {
        self.clock.time_scale
    }

    /// Simulated wall-clock date, advanced with sim time
    pub fn simulation_date(&self) -> DateTime<Utc> {
        self.clock.sim_date
    }

    /// Rebase the simulation clock
    pub fn change_time_settings(&mut self, sim_time: f64, time_scale: f32, sim_date: DateTime<Utc>) {
        self.clock.sim_time = sim_time;
        self.clock.time_scale = time_scale;
        self.clock.sim_date = sim_date;
        info!(sim_time, time_scale, "time settings changed");
        self.queue_local_notification(
            Message::new(MessageKind::TIME_CHANGED).with_body(MessageBody::TimeChange(
                TimeChangeInfo {
                    sim_time,
                    time_scale,
                },
            )),
        );
    }

    // ------------------------------------------------------------------
    // Maps and persistence
    // ------------------------------------------------------------------

    /// Swap the world for the named map's content
    ///
    /// The manifest is loaded first, so a failing source leaves the world
    /// untouched. On success every existing actor is removed, the manifest
    /// spawns are instantiated through the factories, and map-unloaded /
    /// map-loaded notifications are queued.
    pub fn change_map(&mut self, source: &mut dyn MapSource, map_name: &str) -> Result<()> {
        let manifest = source.load(map_name).map_err(|e| {
            GameError::general(format!("map '{map_name}' failed to load: {e}"))
        })?;

        if let Some(previous) = self.current_map.take() {
            self.queue_local_notification(
                Message::new(MessageKind::MAP_UNLOADED).with_body(MessageBody::MapEvent(MapInfo {
                    map_name: previous,
                })),
            );
        }
        self.delete_all_actors();

        for spawn in &manifest.spawns {
            let mut proxy = self.factories.create(&spawn.actor_type)?;
            proxy.set_name(&spawn.name);
            if let Some(position) = spawn.position {
                proxy.set_position(position);
            }
            if spawn.game_actor {
                self.add_game_actor(proxy, false, spawn.publish)?;
            } else {
                self.add_actor(proxy)?;
            }
        }

        info!(map = %map_name, spawns = manifest.spawns.len(), "map changed");
        self.current_map = Some(map_name.to_string());
        self.queue_local_notification(
            Message::new(MessageKind::MAP_LOADED).with_body(MessageBody::MapEvent(MapInfo {
                map_name: map_name.to_string(),
            })),
        );
        Ok(())
    }

    /// Capture the world into the store; true on success
    pub fn save_game_state(&mut self, store: &mut dyn GameStateStore) -> bool {
        let snapshot = self.snapshot();
        let ok = store.save(&snapshot);
        if ok {
            info!(actors = snapshot.actors.len(), "game state saved");
        } else {
            error!("game state store refused the snapshot");
        }
        ok
    }

    /// Rebuild the world from the store; true on success
    ///
    /// Replaces the current world wholesale. Every type in the snapshot
    /// must resolve through the registered factories.
    pub fn load_game_state(&mut self, store: &mut dyn GameStateStore) -> bool {
        let Some(snapshot) = store.load() else {
            error!("game state store had no snapshot");
            return false;
        };
        self.delete_all_actors();
        for record in &snapshot.actors {
            if let Err(e) = self.restore_actor(record) {
                error!(
                    actor_type = %record.actor_type,
                    error = %e,
                    "failed to restore actor"
                );
                return false;
            }
        }
        self.clock.sim_time = snapshot.sim_time;
        self.current_map = snapshot.map_name.clone();
        info!(
            actors = snapshot.actors.len(),
            sim_time = snapshot.sim_time,
            "game state loaded"
        );
        true
    }

    /// Current world census
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            sim_time: self.clock.sim_time,
            map_name: self.current_map.clone(),
            actors: self
                .registry
                .actors()
                .map(|p| ActorRecord {
                    id: p.id(),
                    actor_type: p.actor_type().clone(),
                    name: p.name().to_string(),
                    game_actor: self.registry.is_game_actor(p.id()),
                    remote: p.is_remote(),
                    published: p.is_published(),
                    position: p.position(),
                })
                .collect(),
        }
    }

    fn restore_actor(&mut self, record: &ActorRecord) -> Result<()> {
        let mut proxy = self.factories.create(&record.actor_type)?.with_id(record.id);
        proxy.set_name(&record.name);
        if let Some(position) = record.position {
            proxy.set_position(position);
        }
        if record.game_actor {
            self.add_game_actor(proxy, record.remote, false)?;
            if record.published && !record.remote {
                self.publish_actor(record.id)?;
            }
        } else {
            self.add_actor(proxy)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Frame lifecycle
    // ------------------------------------------------------------------

    /// Start of frame: advance the clock, synthesize ticks, pump the
    /// inlet, fire timers
    ///
    /// The driver supplies both deltas; while paused it passes a zero sim
    /// delta. Tick messages are queued first, so they lead each frame's
    /// process drain.
    pub fn pre_frame(&mut self, delta_sim: f64, delta_real: f64) {
        self.stats.frames += 1;
        self.clock.advance(delta_sim);

        let tick = TickInfo {
            delta_sim,
            delta_real,
            time_scale: self.clock.time_scale,
            sim_time: self.clock.sim_time,
        };
        self.queue_local_notification(
            Message::new(MessageKind::TICK_LOCAL).with_body(MessageBody::Tick(tick.clone())),
        );
        self.queue_local_notification(
            Message::new(MessageKind::TICK_REMOTE).with_body(MessageBody::Tick(tick)),
        );

        // External producers enter the pipeline here, nowhere else.
        while let Ok(message) = self.inlet_rx.try_recv() {
            let message = self.stamp(message);
            self.router.queue_process(Arc::new(message));
        }

        for expired in self.timers.advance(delta_sim, delta_real) {
            self.stats.timers_fired += 1;
            let mut message = Message::new(MessageKind::TIMER_ELAPSED).with_body(
                MessageBody::TimerElapsed(TimerElapsedInfo {
                    timer_name: expired.name,
                    late_time: expired.late,
                }),
            );
            if let Some(about) = expired.about {
                message = message.with_about_actor(about);
            }
            self.queue_local_notification(message);
        }
    }

    /// Drain both queues: send first, then process
    ///
    /// Send-queue messages reach the components' routing hook. Process-
    /// queue messages reach the components' processing hook, then global
    /// listeners for the kind, then listeners registered for the message's
    /// about-actor. Messages queued onto the process queue during this
    /// loop drain in the same pass; new sends wait for the next frame.
    pub fn drain_messages(&mut self) {
        while let Some(message) = self.router.next_send() {
            self.stats.messages_delivered += 1;
            let mut ctx = self.new_context();
            for component in &mut self.components {
                component.on_message_for_routing(&message, &mut ctx);
            }
            self.apply_ops(ctx);
        }

        while let Some(message) = self.router.next_process() {
            self.stats.messages_delivered += 1;
            let mut ctx = self.new_context();
            for component in &mut self.components {
                component.on_message_for_processing(&message, &mut ctx);
            }

            let mut targets = self.router.global_listeners(message.kind());
            if let Some(about) = message.about_actor() {
                targets.extend(self.router.actor_listeners(message.kind(), about));
            }
            for registration in targets {
                if self.registry.is_marked_for_delete(registration.listener) {
                    continue;
                }
                ctx.set_current_actor(Some(registration.listener));
                match self
                    .registry
                    .get_game_mut(registration.listener)
                    .and_then(|p| p.game_actor_mut())
                {
                    Some(actor) => {
                        self.stats.listeners_invoked += 1;
                        actor.invoke(&registration.invokable, &message, &mut ctx);
                    }
                    None => {
                        self.stats.dangling_skips += 1;
                        debug!(
                            listener = %registration.listener,
                            kind = %self.catalog.describe(message.kind()),
                            "skipping dangling listener registration"
                        );
                    }
                }
            }
            self.apply_ops(ctx);
        }
    }

    /// End of frame: flush deferred deletions
    ///
    /// The single point where actors actually leave the world. For each
    /// doomed local game actor an about-to-delete notification is queued
    /// while it still exists, then the actor is removed from every
    /// container, its removed-from-world hook runs, its listener
    /// registrations are dropped, and the deleted notification is queued.
    pub fn post_frame(&mut self) {
        let doomed = self.registry.take_doomed();
        if doomed.is_empty() {
            return;
        }
        let mut ctx = self.new_context();
        for id in doomed {
            let (local, was_game) = match self.registry.get(id) {
                Some(p) => (!p.is_remote(), self.registry.is_game_actor(id)),
                None => continue,
            };
            if local && was_game {
                self.queue_local_notification(
                    Message::new(MessageKind::ACTOR_ABOUT_TO_DELETE).with_about_actor(id),
                );
            }
            let Some(mut proxy) = self.registry.remove(id) else {
                continue;
            };
            if was_game {
                ctx.set_current_actor(Some(id));
                if let Some(actor) = proxy.game_actor_mut() {
                    actor.on_removed_from_world(&mut ctx);
                }
            }
            self.router.unregister_all_for(id);
            if local && was_game {
                self.queue_local_notification(
                    Message::new(MessageKind::ACTOR_DELETED).with_about_actor(id),
                );
            }
            self.stats.actors_deleted += 1;
            debug!(actor_id = %id, "actor flushed");
        }
        self.apply_ops(ctx);
    }

    /// One full frame: pre, drain, post
    pub fn advance_frame(&mut self, delta_sim: f64, delta_real: f64) {
        self.pre_frame(delta_sim, delta_real);
        self.drain_messages();
        self.post_frame();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn new_context(&self) -> GameContext {
        GameContext::new(self.machine.id(), self.clock.sim_time)
    }

    fn stamp(&self, message: Message) -> Message {
        if message.source().is_nil() {
            message.with_source(self.machine.id())
        } else {
            message
        }
    }

    /// Runtime-originated notifications always carry the local source
    fn queue_local_notification(&mut self, message: Message) {
        let message = message.with_source(self.machine.id());
        self.router.queue_process(Arc::new(message));
    }

    /// Apply deferred operations queued on a context during delivery
    fn apply_ops(&mut self, mut ctx: GameContext) {
        if ctx.is_empty() {
            return;
        }
        for op in ctx.take_ops() {
            match op {
                GameOp::Send(message) => self.send_message(message),
                GameOp::Process(message) => self.process_message(message),
                GameOp::Reject { cause, description } => self.reject_message(&cause, description),
                GameOp::DeleteActor(id) => self.delete_actor(id),
                GameOp::SpawnActor {
                    actor_type,
                    name,
                    publish,
                } => match self.spawn_from_op(&actor_type, name.as_deref(), publish) {
                    Ok(id) => {
                        debug!(actor_id = %id, actor_type = %actor_type, "deferred spawn applied")
                    }
                    Err(e) => {
                        error!(actor_type = %actor_type, error = %e, "deferred spawn failed")
                    }
                },
                GameOp::PublishActor(id) => {
                    if let Err(e) = self.publish_actor(id) {
                        error!(actor_id = %id, error = %e, "deferred publish failed");
                    }
                }
                GameOp::MoveActor { id, position } => self.move_actor(id, position),
                GameOp::SetTimer {
                    name,
                    about,
                    interval,
                    repeat,
                    real_time,
                } => self.timers.set(name, about, interval, repeat, real_time),
                GameOp::ClearTimer(name) => {
                    self.timers.clear(&name);
                }
                GameOp::RegisterGlobal {
                    kind,
                    listener,
                    invokable,
                } => self.router.register_global(kind, listener, invokable),
                GameOp::UnregisterGlobal {
                    kind,
                    listener,
                    invokable,
                } => self.router.unregister_global(kind, listener, &invokable),
                GameOp::RegisterForActor {
                    kind,
                    about,
                    listener,
                    invokable,
                } => self.router.register_for_actor(kind, about, listener, invokable),
                GameOp::UnregisterForActor {
                    kind,
                    about,
                    listener,
                    invokable,
                } => self.router.unregister_for_actor(kind, about, listener, &invokable),
            }
        }
    }

    fn spawn_from_op(
        &mut self,
        actor_type: &ActorType,
        name: Option<&str>,
        publish: bool,
    ) -> Result<ActorId> {
        let mut proxy = self.factories.create(actor_type)?;
        if let Some(name) = name {
            proxy.set_name(name);
        }
        if proxy.is_game_actor() {
            self.add_game_actor(proxy, false, publish)
        } else {
            self.add_actor(proxy)
        }
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new()
    }
}
