//! Arena state and the authoritative event loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace};

use crate::net::DelayQueue;
use crate::util::time::{broadcast_period, coin_spawn_period, simulation_period};
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::ids::IdGenerator;
use super::registry::{
    init_message, ConnectionRegistry, Frame, Outbound, Outgoing, SendOutcome, SessionHandle,
};
use super::simulation;
use super::snapshot::SnapshotBuilder;
use super::spawner::CoinSpawner;
use super::world::{PlayerId, WorldState};

/// Capacity of the command channel from connections to the arena
const COMMAND_CAPACITY: usize = 1024;

/// Outbound payload waiting out its latency delay
#[derive(Debug)]
enum Pending {
    /// Serialized when delivered
    Init,
    /// Serialized when sampled
    Frame(Frame),
}

/// Arena tuning
#[derive(Debug, Clone)]
pub struct ArenaSettings {
    /// One-way artificial latency for every message
    pub latency: Duration,
    /// Seed for spawn positions, colors and coin placement
    pub seed: u64,
}

/// Requests from connection tasks to the arena
#[derive(Debug)]
pub enum ArenaCommand {
    /// New session; the arena replies with the allocated player id
    Join {
        outbound: mpsc::Sender<Frame>,
        reply: oneshot::Sender<PlayerId>,
    },
    /// Validated client message, applied after the latency delay
    Inbound { player_id: PlayerId, msg: ClientMsg },
    /// Session closed
    Leave { player_id: PlayerId },
}

/// Live counters readable without going through the arena
#[derive(Debug, Default)]
pub struct ArenaCounters {
    pub players: AtomicUsize,
    pub coins: AtomicUsize,
}

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Arena is not running")]
    Closed,
}

/// Handle to the running arena
#[derive(Clone)]
pub struct ArenaHandle {
    command_tx: mpsc::Sender<ArenaCommand>,
    counters: Arc<ArenaCounters>,
}

impl ArenaHandle {
    /// Register a session and wait for its player id
    pub async fn join(&self, outbound: mpsc::Sender<Frame>) -> Result<PlayerId, ArenaError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(ArenaCommand::Join { outbound, reply })
            .await
            .map_err(|_| ArenaError::Closed)?;
        rx.await.map_err(|_| ArenaError::Closed)
    }

    pub async fn submit(&self, player_id: PlayerId, msg: ClientMsg) -> Result<(), ArenaError> {
        self.command_tx
            .send(ArenaCommand::Inbound { player_id, msg })
            .await
            .map_err(|_| ArenaError::Closed)
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), ArenaError> {
        self.command_tx
            .send(ArenaCommand::Leave { player_id })
            .await
            .map_err(|_| ArenaError::Closed)
    }

    pub fn player_count(&self) -> usize {
        self.counters.players.load(Ordering::Relaxed)
    }

    pub fn coin_count(&self) -> usize {
        self.counters.coins.load(Ordering::Relaxed)
    }
}

/// The authoritative arena. Owns the world; nothing else mutates it.
pub struct Arena {
    world: WorldState,
    registry: ConnectionRegistry,
    spawner: CoinSpawner,
    snapshots: SnapshotBuilder,
    outbound: DelayQueue<Pending>,
    inbound: DelayQueue<ClientMsg>,
    rng: ChaCha8Rng,
    ids: Box<dyn IdGenerator>,
    command_rx: mpsc::Receiver<ArenaCommand>,
    counters: Arc<ArenaCounters>,
    tick: u64,
}

impl Arena {
    /// Create a new arena
    pub fn new(settings: ArenaSettings, ids: Box<dyn IdGenerator>) -> (Self, ArenaHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let counters = Arc::new(ArenaCounters::default());

        let handle = ArenaHandle {
            command_tx,
            counters: counters.clone(),
        };

        let arena = Self {
            world: WorldState::new(),
            registry: ConnectionRegistry::new(),
            spawner: CoinSpawner::default(),
            snapshots: SnapshotBuilder::new(),
            outbound: DelayQueue::new(settings.latency),
            inbound: DelayQueue::new(settings.latency),
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            ids,
            command_rx,
            counters,
            tick: 0,
        };

        (arena, handle)
    }

    /// Run the event loop until every handle is dropped
    pub async fn run(mut self) {
        info!(latency_ms = self.outbound.delay().as_millis() as u64, "Arena started");

        let mut sim_interval = interval(simulation_period());
        sim_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut broadcast_interval = interval(broadcast_period());
        broadcast_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // First coin one period after start
        let spawn_period = coin_spawn_period();
        let mut spawn_interval = interval_at(Instant::now() + spawn_period, spawn_period);
        spawn_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let next_due = self.next_due();

            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = sim_interval.tick() => self.run_tick(),
                _ = broadcast_interval.tick() => self.broadcast_update(),
                _ = spawn_interval.tick() => self.spawn_coin(),
                _ = sleep_until(next_due) => {}
            }

            self.flush_due(Instant::now());
            self.publish_counters();
        }

        info!(tick = self.tick, "Arena stopped");
    }

    fn handle_command(&mut self, cmd: ArenaCommand) {
        let now = Instant::now();
        match cmd {
            ArenaCommand::Join { outbound, reply } => {
                let (player_id, out) = self.registry.join(
                    &mut self.world,
                    &mut self.rng,
                    self.ids.as_mut(),
                    SessionHandle { outbound },
                );
                self.enqueue(now, out);

                if reply.send(player_id.clone()).is_err() {
                    // Connection vanished before learning its id
                    self.handle_leave(now, &player_id);
                }
            }
            ArenaCommand::Inbound { player_id, msg } => {
                if self.registry.contains(&player_id) {
                    self.inbound.push(now, player_id, msg);
                }
            }
            ArenaCommand::Leave { player_id } => self.handle_leave(now, &player_id),
        }
    }

    fn handle_leave(&mut self, now: Instant, player_id: &PlayerId) {
        let out = self.registry.leave(&mut self.world, player_id);
        let dropped = self.outbound.cancel(player_id) + self.inbound.cancel(player_id);
        if dropped > 0 {
            debug!(player_id = %player_id, dropped, "Discarded pending deliveries");
        }
        self.enqueue(now, out);
    }

    /// Run a single simulation tick
    fn run_tick(&mut self) {
        self.tick += 1;
        for pickup in simulation::run_tick(&mut self.world) {
            debug!(
                tick = self.tick,
                player_id = %pickup.player_id,
                coin_id = %pickup.coin_id,
                "Coin collected"
            );
        }
    }

    fn spawn_coin(&mut self) {
        if let Some(coin) = self
            .spawner
            .tick(&mut self.world, &mut self.rng, self.ids.as_mut())
        {
            debug!(coin_id = %coin.id, x = coin.x, y = coin.y, "Coin spawned");
        }
    }

    /// Sample the world and queue an update for every session
    fn broadcast_update(&mut self) {
        if self.registry.is_empty() {
            return;
        }

        let msg = self.snapshots.build(&self.world);
        let Some(frame) = encode(&msg) else {
            return;
        };

        let now = Instant::now();
        let recipients: Vec<PlayerId> = self.registry.session_ids().cloned().collect();
        self.snapshots
            .record(self.world.player_count(), frame.len(), recipients.len());
        for to in recipients {
            self.outbound.push(now, to, Pending::Frame(frame.clone()));
        }

        let stats = self.snapshots.stats();
        if stats.total_snapshots % 300 == 0 {
            debug!(
                snapshots = stats.total_snapshots,
                bytes = stats.total_bytes,
                avg_players = stats.avg_players_per_snapshot,
                "Broadcast stats"
            );
        }
    }

    fn enqueue(&mut self, now: Instant, out: Vec<Outgoing>) {
        for Outgoing { to, msg } in out {
            let pending = match msg {
                Outbound::Init => Pending::Init,
                Outbound::Message(msg) => match encode(&msg) {
                    Some(frame) => Pending::Frame(frame),
                    None => continue,
                },
            };
            self.outbound.push(now, to, pending);
        }
    }

    fn next_due(&self) -> Option<Instant> {
        match (self.outbound.next_due(), self.inbound.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Apply inbound effects and hand outbound frames to their sessions
    fn flush_due(&mut self, now: Instant) {
        for delivery in self.inbound.pop_due(now) {
            self.registry
                .apply(&mut self.world, &delivery.session, delivery.payload);
        }

        for delivery in self.outbound.pop_due(now) {
            let frame = match delivery.payload {
                Pending::Frame(frame) => frame,
                Pending::Init => match encode(&init_message(&self.world, &delivery.session)) {
                    Some(frame) => frame,
                    None => continue,
                },
            };
            if self.registry.send(&delivery.session, frame) == SendOutcome::Closed {
                trace!(player_id = %delivery.session, "Discarded frame for closed session");
            }
        }
    }

    fn publish_counters(&self) {
        self.counters
            .players
            .store(self.world.player_count(), Ordering::Relaxed);
        self.counters
            .coins
            .store(self.world.coin_count(), Ordering::Relaxed);
    }
}

fn encode(msg: &ServerMsg) -> Option<Frame> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Frame::from(json)),
        Err(e) => {
            error!(error = %e, "Failed to serialize server message");
            None
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
