//! Client tick loop.
//!
//! Each tick:
//!
//! 1. Poll the handshake, if the loop has been started and the host is ready.
//! 2. Snapshot the world's system enable flags.
//! 3. Run `update` on every active system with the measured frame delta.
//! 4. Run `fixed_update` once per fixed step that has accumulated, up to
//!    `max_fixed_steps`. A larger backlog is dropped.
//! 5. Log entity positions if the watch interval has elapsed.

use std::time::Instant;

use engine_component::MovementComponent;
use engine_net::NetworkSession;
use tracing::{debug, info, warn};

use crate::config::{HandshakeConfig, TickConfig};
use crate::error::AppError;
use crate::handshake::{HandshakePoll, HandshakeStateMachine};
use crate::scene::Scene;
use crate::world::World;

/// What one call to [`TickLoop::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick_id: u64,
    /// Frame delta in seconds.
    pub dt: f64,
    /// Fixed steps run this tick.
    pub fixed_steps: u32,
    /// Handshake outcome, if it was polled.
    pub handshake: Option<HandshakePoll>,
}

/// The client's tick loop state.
#[derive(Debug)]
pub struct TickLoop {
    /// Current tick counter.
    tick_id: u64,
    config: TickConfig,
    world: World,
    session: NetworkSession,
    handshake: HandshakeStateMachine,
    /// Unconsumed simulation time, in seconds.
    accumulator: f64,
    last_tick: Option<Instant>,
    last_watch: Option<Instant>,
    ready: bool,
    started: bool,
}

impl TickLoop {
    /// Create a tick loop over an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if `config` fails
    /// [`TickConfig::validate`].
    pub fn new(
        config: TickConfig,
        handshake: HandshakeConfig,
        session: NetworkSession,
    ) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            tick_id: 0,
            config,
            world: World::new(),
            session,
            handshake: HandshakeStateMachine::new(handshake),
            accumulator: 0.0,
            last_tick: None,
            last_watch: None,
            ready: false,
            started: false,
        })
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns a reference to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns a mutable reference to the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the handshake state machine.
    #[must_use]
    pub fn handshake(&self) -> &HandshakeStateMachine {
        &self.handshake
    }

    /// Build the session's entities and systems.
    ///
    /// # Errors
    ///
    /// Propagates the scene's error.
    pub fn setup(&mut self, scene: &mut dyn Scene) -> Result<(), AppError> {
        scene.setup(&mut self.world)?;
        info!(
            entities = self.world.registry().len(),
            systems = self.world.system_count(),
            "scene set up"
        );
        Ok(())
    }

    /// Signal that the host has finished loading resources.
    pub fn on_ready(&mut self) {
        if self.ready {
            debug!("on_ready called again, ignoring");
            return;
        }
        self.ready = true;
        info!("host ready");
    }

    /// Arm the handshake. Polling begins on the first tick at which the host
    /// is also ready.
    pub fn start(&mut self) {
        if !self.started {
            self.started = true;
            info!(tick_id = self.tick_id, "tick loop started");
        }
    }

    /// Returns `true` once [`on_ready`](Self::on_ready) has been called.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Run one tick at time `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the handshake or a system hook fails.
    pub fn tick(&mut self, now: Instant) -> Result<TickReport, AppError> {
        self.tick_id += 1;
        let dt = match self.last_tick {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f64(),
            None => self.config.tick_duration().as_secs_f64(),
        };
        self.last_tick = Some(now);

        let handshake = if self.started && self.ready {
            Some(self.handshake.poll(now, &self.session, &mut self.world)?)
        } else {
            None
        };

        self.world.begin_tick();
        self.world.run_update(self.tick_id, dt as f32, &self.session)?;

        let fixed_dt = self.config.fixed_dt();
        self.accumulator += dt;
        let mut fixed_steps = 0u32;
        while self.accumulator >= fixed_dt && fixed_steps < self.config.max_fixed_steps {
            self.world
                .run_fixed_update(self.tick_id, fixed_dt as f32, &self.session)?;
            self.accumulator -= fixed_dt;
            fixed_steps += 1;
        }
        if self.accumulator >= fixed_dt {
            warn!(
                tick_id = self.tick_id,
                backlog_s = self.accumulator,
                "fixed-step backlog dropped"
            );
            self.accumulator = 0.0;
        }

        self.watch(now);

        Ok(TickReport {
            tick_id: self.tick_id,
            dt,
            fixed_steps,
            handshake,
        })
    }

    fn watch(&mut self, now: Instant) {
        let Some(interval) = self.config.watch_interval else {
            return;
        };
        let last = *self.last_watch.get_or_insert(now);
        if now.saturating_duration_since(last) < interval {
            return;
        }
        self.last_watch = Some(now);
        for (entity, movement) in self.world.store().iter::<MovementComponent>() {
            info!(%entity, position = ?movement.position, "position watch");
        }
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Stops at the first tick that fails and returns its error.
    pub fn run(&mut self) -> Result<(), AppError> {
        let tick_duration = self.config.tick_duration();
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            fixed_rate = self.config.fixed_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();
            self.tick(start)?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }
}
