//! Session role management and the synchronization state machine
//!
//! One [`Session`] per process: it owns the role (authoritative or not),
//! the local view of the match, the keepalive liveness watchdog, and the
//! per-frame simulation loop. Transport callbacks stay thin: every
//! inbound frame funnels through [`Session::handle_frame`], every
//! simulation step through [`Session::tick`], both synchronous seams the
//! tests drive directly without timers.

pub mod bot;
pub mod frontend;

pub use bot::Bot;
pub use frontend::{Frontend, LogFrontend, Phase};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::input::{launch, DragTracker, Point};
use crate::game::projectile::{check_impact, Impact, ImpactKind};
use crate::game::resolve::resolve_impact;
use crate::game::{GameConfig, MatchState, PlayerSide, Replica};
use crate::net::transport::Channel;
use crate::net::PeerMsg;
use crate::util::rate_limit::FireGate;
use crate::util::time::{liveness_timeout, tick_duration, KEEPALIVE_PERIOD};

/// Which peer this is. The first peer to accept an inbound connection is
/// authoritative; the dialing peer is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Authoritative,
    NonAuthoritative,
}

/// Why a session's run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The transport closed or errored; full client reset.
    PeerClosed,
    /// No inbound traffic for several keepalive periods.
    LivenessTimeout,
    /// Bot-piloted runs return once the match is decided.
    MatchComplete,
}

/// The local view of the match, shaped by role. The authoritative side
/// owns the mutable state and resolves outcomes on it; the other side
/// holds a [`Replica`] that only ever changes wholesale.
enum View {
    Authority(MatchState),
    Replica(Replica),
}

impl View {
    fn state(&self) -> &MatchState {
        match self {
            View::Authority(state) => state,
            View::Replica(replica) => replica.state(),
        }
    }
}

pub struct Session<F: Frontend> {
    role: Role,
    side: PlayerSide,
    cfg: GameConfig,
    view: View,
    outbound: mpsc::Sender<String>,
    inbound: Option<mpsc::Receiver<String>>,
    frontend: F,
    fire_gate: FireGate,
    drag: DragTracker,
    rng: ChaCha8Rng,
    keepalive_seq: u32,
    flight_steps: u32,
    closed: bool,
}

impl<F: Frontend> Session<F> {
    /// Authoritative session: the channel just opened, so the terrain is
    /// generated here and the first snapshot is pushed once the peer
    /// says it is ready.
    pub fn new_authoritative(cfg: GameConfig, channel: Channel, frontend: F, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = MatchState::generate(&cfg, &mut rng);
        Self::build(
            Role::Authoritative,
            PlayerSide::A,
            cfg,
            View::Authority(state),
            channel,
            frontend,
            rng,
        )
    }

    /// Non-authoritative session: never generates terrain, only consumes
    /// the distributed snapshots.
    pub fn new_non_authoritative(cfg: GameConfig, channel: Channel, frontend: F) -> Self {
        let replica = Replica::new(&cfg);
        let rng = ChaCha8Rng::from_entropy();
        Self::build(
            Role::NonAuthoritative,
            PlayerSide::B,
            cfg,
            View::Replica(replica),
            channel,
            frontend,
            rng,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        role: Role,
        side: PlayerSide,
        cfg: GameConfig,
        view: View,
        channel: Channel,
        frontend: F,
        rng: ChaCha8Rng,
    ) -> Self {
        let (outbound, inbound) = channel.split();
        Self {
            role,
            side,
            cfg,
            view,
            outbound,
            inbound: Some(inbound),
            frontend,
            fire_gate: FireGate::new(),
            drag: DragTracker::default(),
            rng,
            keepalive_seq: 0,
            flight_steps: 0,
            closed: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn side(&self) -> PlayerSide {
        self.side
    }

    pub fn state(&self) -> &MatchState {
        self.view.state()
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Whether the local player may start a shot right now.
    pub fn can_fire(&self) -> bool {
        let state = self.view.state();
        let synced = match &self.view {
            View::Authority(_) => true,
            View::Replica(replica) => replica.synced(),
        };
        synced && !state.over && state.projectile.is_none() && state.turn == self.side
    }

    async fn send(&mut self, msg: PeerMsg) {
        let frame = match msg.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "failed to encode outbound message");
                return;
            }
        };
        if self.outbound.send(frame).await.is_err() {
            self.closed = true;
        }
    }

    /// One inbound frame from the peer. Malformed or out-of-protocol
    /// frames are logged and dropped, never fatal.
    pub async fn handle_frame(&mut self, frame: &str) {
        let msg = match PeerMsg::from_frame(frame) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "malformed peer message dropped");
                return;
            }
        };

        match msg {
            PeerMsg::ReadyRequest => {
                let snapshot = match &self.view {
                    View::Authority(state) => Some(state.clone()),
                    View::Replica(_) => None,
                };
                match snapshot {
                    Some(state) => {
                        self.frontend.phase_changed(Phase::Playing);
                        self.frontend.state_changed(&state, self.side);
                        self.send(PeerMsg::FullSync { state }).await;
                    }
                    None => {
                        warn!("ready request received on non-authoritative side, dropped");
                    }
                }
            }

            PeerMsg::FullSync { state } => match &mut self.view {
                View::Replica(replica) => {
                    if !state.is_well_formed(&self.cfg) {
                        warn!("structurally invalid snapshot dropped");
                        return;
                    }
                    let first = !replica.synced();
                    replica.replace(state);
                    if first {
                        self.frontend.phase_changed(Phase::Playing);
                    }
                    self.frontend.state_changed(self.view.state(), self.side);
                }
                View::Authority(_) => {
                    warn!("full sync received on authoritative side, dropped");
                }
            },

            PeerMsg::ShotFired { shot } => {
                if let View::Replica(replica) = &self.view {
                    if !replica.synced() {
                        debug!("shot before first sync, dropped");
                        return;
                    }
                }
                let state = self.view.state();
                if state.over {
                    debug!("shot after match over, dropped");
                    return;
                }
                if state.turn == self.side {
                    warn!("peer fired out of turn, dropped");
                    return;
                }
                // Install the payload verbatim and start simulating
                // immediately; the next FullSync is the correction.
                match &mut self.view {
                    View::Authority(state) => state.projectile = Some(shot),
                    View::Replica(replica) => replica.set_speculative_shot(shot),
                }
                self.flight_steps = 0;
            }

            PeerMsg::Keepalive { seq } => {
                self.send(PeerMsg::KeepaliveAck { seq }).await;
            }

            PeerMsg::KeepaliveAck { seq } => {
                debug!(seq, "keepalive acknowledged");
            }
        }
    }

    /// One simulation step: advance the in-flight projectile and handle
    /// its termination. Runs identically on both peers; only the
    /// authoritative outcome is binding.
    pub async fn tick(&mut self) {
        if self.view.state().over {
            return;
        }

        let gravity = self.cfg.gravity;
        let stepped = match &mut self.view {
            View::Authority(state) => match state.projectile.as_mut() {
                Some(p) => {
                    p.step(gravity);
                    true
                }
                None => false,
            },
            View::Replica(replica) => match replica.projectile_mut() {
                Some(p) => {
                    p.step(gravity);
                    true
                }
                None => false,
            },
        };
        if !stepped {
            return;
        }
        self.flight_steps += 1;

        let state = self.view.state();
        let shooter = state.turn;
        let projectile = match state.projectile {
            Some(p) => p,
            None => return,
        };
        let target = state.tank(shooter.opponent());

        let mut impact = check_impact(&projectile, &state.terrain, target, &self.cfg);
        if impact.is_none() && self.flight_steps >= self.cfg.max_flight_steps {
            // Safety net: a flight that somehow never meets a bounds
            // check is forced down as a shot into the wilds.
            warn!(steps = self.flight_steps, "flight step cap reached");
            impact = Some(Impact {
                kind: ImpactKind::Wilds,
                x: projectile.x,
                y: projectile.y,
            });
        }

        let impact = match impact {
            Some(impact) => impact,
            None => return,
        };

        self.frontend.impact_burst(impact.x, impact.y, shooter);
        self.flight_steps = 0;

        let sync = match &mut self.view {
            View::Authority(state) => {
                resolve_impact(state, &impact, &self.cfg, &mut self.rng);
                Some(state.clone())
            }
            View::Replica(replica) => {
                // Consequences arrive with the authoritative FullSync.
                replica.clear_projectile();
                None
            }
        };

        if let Some(state) = sync {
            self.frontend.state_changed(&state, self.side);
            self.send(PeerMsg::FullSync { state }).await;
        }
    }

    /// Pointer press. Ignored unless the local player may fire.
    pub fn pointer_down(&mut self, at: Point) {
        if !self.can_fire() {
            return;
        }
        self.drag.begin(at);
    }

    /// Pointer move: track the drag and preview the aim angle.
    pub fn pointer_move(&mut self, at: Point) {
        if let Some(angle) = self.drag.update(at) {
            match &mut self.view {
                View::Authority(state) => state.tank_mut(self.side).aim_angle = angle,
                View::Replica(replica) => replica.set_local_aim(self.side, angle),
            }
        }
    }

    /// Pointer release: map the drag to a shot, install it locally and
    /// broadcast it. Returns whether a shot was fired.
    pub async fn pointer_up(&mut self, at: Point) -> bool {
        let Some((press, release)) = self.drag.release(at) else {
            return false;
        };
        if !self.can_fire() {
            return false;
        }
        if !self.fire_gate.check_fire() {
            warn!("fire rate limit exceeded, drag dropped");
            return false;
        }

        let state = self.view.state();
        let tank = state.tank(self.side);
        let Some(shot) = launch(press, release, tank, state.wind, &self.cfg) else {
            return false;
        };

        match &mut self.view {
            View::Authority(state) => state.projectile = Some(shot),
            View::Replica(replica) => replica.set_speculative_shot(shot),
        }
        self.flight_steps = 0;
        self.send(PeerMsg::ShotFired { shot }).await;
        true
    }

    /// The session event loop: simulation ticks, inbound frames and the
    /// keepalive watchdog, interleaved on one task. Returns when the
    /// channel dies, liveness lapses, or (bot-piloted) the match ends.
    pub async fn run(mut self, mut pilot: Option<Bot>) -> SessionEnd {
        self.frontend.phase_changed(Phase::Waiting);

        match self.role {
            Role::NonAuthoritative => {
                // Explicit readiness instead of racing a settling timer:
                // the authoritative side answers with the first snapshot.
                self.send(PeerMsg::ReadyRequest).await;
            }
            Role::Authoritative => {
                let state = self.view.state().clone();
                self.frontend.state_changed(&state, self.side);
            }
        }

        let mut inbound = self
            .inbound
            .take()
            .expect("session run twice");

        let mut sim = interval(tick_duration());
        sim.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut keepalive = interval(KEEPALIVE_PERIOD);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_inbound = Instant::now();

        loop {
            if self.closed {
                self.frontend.disconnected("channel closed");
                self.frontend.phase_changed(Phase::Closed);
                return SessionEnd::PeerClosed;
            }

            tokio::select! {
                _ = sim.tick() => {
                    self.tick().await;

                    if let Some(bot) = pilot.as_mut() {
                        if self.view.state().over {
                            info!(winner = ?self.view.state().winner, "bot run complete");
                            return SessionEnd::MatchComplete;
                        }
                        if self.can_fire() {
                            if let Some((press, release)) = bot.plan(self.view.state(), self.side, &self.cfg) {
                                self.pointer_down(press);
                                self.pointer_move(release);
                                self.pointer_up(release).await;
                            }
                        }
                    }
                }

                _ = keepalive.tick() => {
                    if last_inbound.elapsed() > liveness_timeout() {
                        warn!("no inbound traffic within the liveness window");
                        self.frontend.disconnected("liveness timeout");
                        self.frontend.phase_changed(Phase::Closed);
                        return SessionEnd::LivenessTimeout;
                    }
                    self.keepalive_seq += 1;
                    let seq = self.keepalive_seq;
                    self.send(PeerMsg::Keepalive { seq }).await;
                }

                frame = inbound.recv() => {
                    match frame {
                        Some(frame) => {
                            last_inbound = Instant::now();
                            self.handle_frame(&frame).await;
                        }
                        None => {
                            self.frontend.disconnected("peer closed the channel");
                            self.frontend.phase_changed(Phase::Closed);
                            return SessionEnd::PeerClosed;
                        }
                    }
                }
            }
        }
    }
}
