//! Tarn Testbed
//!
//! Single-process demo session that exercises the whole runtime: loads a
//! map of wanderers and lanterns, lets the wanderers roam and report
//! finds, feeds visitor messages in through the inlet from a producer
//! thread, pauses the simulation mid-run, and prints frame statistics on
//! the way out.
//!
//! Architecture:
//! frame loop ──▶ GameManager ──▶ listeners / components
//!                    ▲
//!               MessageInlet ◀── producer thread

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use config::RuntimeConfig;
use game_runtime::{
    invokable, Actor, ActorFactory, ActorInstance, ActorProxy, Component, GameActor, GameContext,
    GameManager, MapManifest, MapSource, SpawnRecord,
};
use types::{ActorType, Message, MessageBody, MessageKind, Vec3};

/// Raised by a wanderer that stumbles on treasure
const TREASURE_FOUND: MessageKind = MessageKind::user(0);
/// Posted through the inlet by the producer thread
const VISITOR_ARRIVED: MessageKind = MessageKind::user(1);

const WANDER_SPEED: f32 = 4.0;
const WORLD_EDGE: f32 = 15.0;
const TREASURE_CHANCE: f64 = 0.02;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "testbed")]
#[command(about = "Demo session driver for the Tarn actor runtime")]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run before exiting
    #[arg(short, long, default_value = "300")]
    frames: u64,

    /// Map to load at startup
    #[arg(short, long, default_value = "meadow")]
    map: String,
}

/// Roams the map, announcing finds and eventually walking off the edge
struct Wanderer {
    rng: StdRng,
    position: Vec3,
    velocity: Vec3,
}

impl Wanderer {
    fn new() -> Self {
        let mut rng = StdRng::from_entropy();
        let heading: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        Self {
            rng,
            position: Vec3::ZERO,
            velocity: Vec3::new(heading.cos(), 0.0, heading.sin()) * WANDER_SPEED,
        }
    }
}

impl Actor for Wanderer {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl GameActor for Wanderer {
    fn on_entered_world(&mut self, ctx: &mut GameContext) {
        if let Some(me) = ctx.actor_id() {
            ctx.register_global_listener(MessageKind::TICK_LOCAL, me, invokable::TICK_LOCAL);
        }
    }

    fn invoke(&mut self, invokable: &str, message: &Message, ctx: &mut GameContext) {
        if invokable != invokable::TICK_LOCAL {
            return;
        }
        let (Some(me), Some(tick)) = (ctx.actor_id(), message.tick()) else {
            return;
        };

        let dt = tick.delta_sim as f32;
        let jitter = Vec3::new(
            self.rng.gen_range(-1.0..1.0),
            0.0,
            self.rng.gen_range(-1.0..1.0),
        ) * (WANDER_SPEED * 0.5);
        self.position += (self.velocity + jitter) * dt;
        ctx.move_actor(me, self.position);

        if self.rng.gen_bool(TREASURE_CHANCE) {
            ctx.process_message(
                Message::new(TREASURE_FOUND)
                    .with_sending_actor(me)
                    .with_about_actor(me)
                    .with_body(MessageBody::Custom(serde_json::json!({
                        "x": self.position.x,
                        "z": self.position.z,
                    }))),
            );
        }

        if self.position.x.abs() > WORLD_EDGE || self.position.z.abs() > WORLD_EDGE {
            debug!(actor_id = %me, "wanderer walked off the map edge");
            ctx.delete_actor(me);
        }
    }
}

/// Scenery; proves plain actors live alongside game actors
struct Lantern;

impl Actor for Lantern {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Tallies treasure, greets visitors, and reports on its heartbeat timer
#[derive(Default)]
struct Warden {
    tally: u64,
}

impl Actor for Warden {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl GameActor for Warden {
    fn invoke(&mut self, invokable: &str, message: &Message, _ctx: &mut GameContext) {
        if invokable != invokable::PROCESS_MESSAGE {
            return;
        }
        match message.kind() {
            TREASURE_FOUND => {
                self.tally += 1;
                if let Some(spot) = message.custom() {
                    info!(finder = ?message.sending_actor(), spot = %spot, "treasure logged");
                }
            }
            VISITOR_ARRIVED => {
                if let Some(visitor) = message.custom() {
                    info!(visitor = %visitor, "warden greets a visitor");
                }
            }
            MessageKind::TIMER_ELAPSED => {
                if let Some(timer) = message.timer() {
                    info!(
                        timer = %timer.timer_name,
                        late = timer.late_time,
                        tally = self.tally,
                        "heartbeat"
                    );
                }
            }
            MessageKind::ACTOR_DELETED => {
                info!(about = ?message.about_actor(), "warden notes a wanderer is gone");
            }
            _ => {}
        }
    }
}

fn wanderer_type() -> ActorType {
    ActorType::new("demo", "Wanderer")
}

fn lantern_type() -> ActorType {
    ActorType::new("demo", "Lantern")
}

/// Builds the demo cast
struct DemoFactory;

impl ActorFactory for DemoFactory {
    fn supported_types(&self) -> Vec<ActorType> {
        vec![wanderer_type(), lantern_type()]
    }

    fn create(&self, actor_type: &ActorType) -> game_runtime::Result<ActorProxy> {
        let instance = if *actor_type == wanderer_type() {
            ActorInstance::Game(Box::new(Wanderer::new()))
        } else {
            ActorInstance::Plain(Box::new(Lantern))
        };
        Ok(ActorProxy::new(actor_type.clone(), instance))
    }
}

/// Built-in demo maps
struct DemoMaps;

impl MapSource for DemoMaps {
    fn load(
        &mut self,
        map_name: &str,
    ) -> std::result::Result<MapManifest, Box<dyn std::error::Error + Send + Sync>> {
        let spawn = |actor_type: ActorType, name: &str, game: bool, publish: bool, pos| SpawnRecord {
            actor_type,
            name: name.to_string(),
            game_actor: game,
            publish,
            position: pos,
        };
        match map_name {
            "meadow" => Ok(MapManifest {
                spawns: vec![
                    spawn(wanderer_type(), "wanderer-1", true, true, None),
                    spawn(wanderer_type(), "wanderer-2", true, true, None),
                    spawn(wanderer_type(), "wanderer-3", true, false, None),
                    spawn(lantern_type(), "lantern-1", false, false, Some(Vec3::new(-8.0, 0.0, 8.0))),
                    spawn(lantern_type(), "lantern-2", false, false, Some(Vec3::new(8.0, 0.0, -8.0))),
                ],
            }),
            "glade" => Ok(MapManifest {
                spawns: vec![
                    spawn(wanderer_type(), "wanderer-1", true, true, None),
                    spawn(lantern_type(), "lantern-1", false, false, Some(Vec3::ZERO)),
                ],
            }),
            other => Err(format!("unknown demo map '{other}'").into()),
        }
    }
}

/// Message traffic counters shared between the monitor and main
#[derive(Default)]
struct TrafficCounters {
    processed: AtomicU64,
    outbound: AtomicU64,
}

/// Forwards published-actor updates outbound and counts both queues
///
/// The routing hook is the end of the line here; a networked deployment
/// would hand those messages to a transport instead.
struct PublishingMonitor {
    counters: Arc<TrafficCounters>,
}

impl Component for PublishingMonitor {
    fn name(&self) -> &str {
        "publishing-monitor"
    }

    fn on_message_for_routing(&mut self, message: &Message, _ctx: &mut GameContext) {
        self.counters.outbound.fetch_add(1, Ordering::Relaxed);
        debug!(kind = message.kind().id(), "dispatched outbound");
    }

    fn on_message_for_processing(&mut self, message: &Message, ctx: &mut GameContext) {
        self.counters.processed.fetch_add(1, Ordering::Relaxed);
        // Published-actor traffic goes out to the wire on the next frame.
        if matches!(
            message.kind(),
            MessageKind::ACTOR_PUBLISHED | MessageKind::ACTOR_UPDATED
        ) {
            ctx.send_message(message.clone());
        }
    }
}

fn resolve_config(args: &Args) -> Result<RuntimeConfig> {
    if let Some(path) = &args.config {
        return RuntimeConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }
    if let Ok(path) = std::env::var("TARN_CONFIG") {
        return RuntimeConfig::from_file(&path)
            .with_context(|| format!("failed to load config from TARN_CONFIG={path}"));
    }
    let default_path = PathBuf::from("config/runtime.toml");
    if default_path.exists() {
        return RuntimeConfig::from_file(&default_path)
            .context("failed to load config/runtime.toml");
    }
    info!("no config file found, using local session defaults");
    Ok(RuntimeConfig::local_session())
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("testbed=info".parse()?)
                .add_directive("game_runtime=info".parse()?),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let args = Args::parse();
    let config = resolve_config(&args)?;

    info!("🚀 Tarn Testbed Starting");
    info!(
        machine = %config.engine.machine_name,
        rate_hz = config.frame.rate_hz,
        frames = args.frames,
        map = %args.map,
        "session parameters"
    );

    let mut gm = GameManager::with_config(&config);
    gm.register_message_kind(TREASURE_FOUND, "treasure-found")?;
    gm.register_message_kind(VISITOR_ARRIVED, "visitor-arrived")?;
    gm.register_factory("demo", Box::new(DemoFactory))?;

    let counters = Arc::new(TrafficCounters::default());
    gm.add_component(Box::new(PublishingMonitor {
        counters: counters.clone(),
    }));

    gm.change_map(&mut DemoMaps, &args.map)
        .with_context(|| format!("failed to load map '{}'", args.map))?;

    // The warden watches the world: every find and visitor globally, plus
    // the fate of one particular wanderer.
    let warden = gm.add_game_actor(
        ActorProxy::new(
            ActorType::new("demo", "Warden"),
            ActorInstance::Game(Box::new(Warden::default())),
        )
        .with_name("warden"),
        false,
        false,
    )?;
    gm.register_global_listener(TREASURE_FOUND, warden, invokable::PROCESS_MESSAGE);
    gm.register_global_listener(VISITOR_ARRIVED, warden, invokable::PROCESS_MESSAGE);
    gm.register_actor_listener(
        MessageKind::TIMER_ELAPSED,
        warden,
        warden,
        invokable::PROCESS_MESSAGE,
    );
    if let Some(first) = gm.find_actors_by_type(&wanderer_type()).first() {
        gm.register_actor_listener(
            MessageKind::ACTOR_DELETED,
            first.id(),
            warden,
            invokable::PROCESS_MESSAGE,
        );
    }
    gm.set_timer("heartbeat", Some(warden), Duration::from_secs(1), true, false);

    // Visitors arrive from outside the frame loop.
    let inlet = gm.inlet();
    let producer = thread::spawn(move || {
        for visitor in 1..=3u32 {
            thread::sleep(Duration::from_millis(300));
            if inlet
                .post(
                    Message::new(VISITOR_ARRIVED)
                        .with_body(MessageBody::Custom(serde_json::json!({ "visitor": visitor }))),
                )
                .is_err()
            {
                break;
            }
        }
    });

    let frame_dt = Duration::from_secs_f64(1.0 / config.frame.rate_hz);
    let frames_per_second = (config.frame.rate_hz as u64).max(1);
    let pause_at = args.frames / 2;
    let resume_at = pause_at + frames_per_second;
    let mut last = Instant::now();

    for frame in 0..args.frames {
        if frame == pause_at {
            info!(frame, "pausing the simulation");
            gm.set_paused(true);
        }
        if frame == resume_at {
            info!(frame, "resuming the simulation");
            gm.set_paused(false);
        }

        let now = Instant::now();
        let delta_real = now.duration_since(last).as_secs_f64();
        last = now;
        let delta_sim = if gm.is_paused() {
            0.0
        } else {
            delta_real * f64::from(gm.time_scale())
        };
        gm.advance_frame(delta_sim, delta_real);

        if frame % frames_per_second == 0 {
            info!(
                frame,
                actors = gm.num_actors(),
                game_actors = gm.num_game_actors(),
                sim_time = gm.simulation_time(),
                "world census"
            );
        }

        if let Some(remaining) = frame_dt.checked_sub(now.elapsed()) {
            thread::sleep(remaining);
        }
    }

    producer
        .join()
        .map_err(|_| anyhow::anyhow!("inlet producer thread panicked"))?;

    let stats = gm.stats();
    info!(
        frames = stats.frames,
        delivered = stats.messages_delivered,
        listeners = stats.listeners_invoked,
        deleted = stats.actors_deleted,
        timers = stats.timers_fired,
        "session complete"
    );
    info!(
        processed = counters.processed.load(Ordering::Relaxed),
        outbound = counters.outbound.load(Ordering::Relaxed),
        "publishing monitor totals"
    );

    Ok(())
}
