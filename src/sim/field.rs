//! The simulation handle
//!
//! `BubbleField` owns every bubble, both particle pools, the selection
//! machine and the seeded RNG. Hosts drive it from their frame callback with
//! `step` and forward pointer events; everything runs synchronously on the
//! caller's thread.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::forces;
use super::particles::ParticleSystem;
use super::selection::{PressOutcome, SelectionPhase, SelectionState};
use super::spring;
use super::state::{Bounds, Bubble, BubbleId};
use crate::config::SimConfig;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::ConfigError;

/// Listener invoked with the payload of a newly expanded bubble
type SelectListener<P> = Box<dyn FnMut(&P)>;

/// Drawable state of one bubble
#[derive(Debug, Clone, Serialize)]
pub struct BubbleView<'a, P> {
    pub id: BubbleId,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub is_hovered: bool,
    pub is_expanded: bool,
    pub payload: &'a P,
}

/// Drawable state of one particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Rendered opacity (seed faded by remaining lifespan)
    pub alpha: f32,
}

/// Read-only frame state handed to the host for drawing
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a, P> {
    pub bubbles: Vec<BubbleView<'a, P>>,
    pub particles: Vec<ParticleView>,
}

impl<P> Snapshot<'_, P> {
    fn empty() -> Self {
        Self {
            bubbles: Vec::new(),
            particles: Vec::new(),
        }
    }
}

pub struct BubbleField<P> {
    config: SimConfig,
    bounds: Bounds,
    bubbles: Vec<Bubble<P>>,
    particles: ParticleSystem,
    selection: SelectionState,
    rng: Pcg32,
    accumulator: f32,
    pointer: Option<Vec2>,
    listeners: Vec<SelectListener<P>>,
    initialized: bool,
    time_ticks: u64,
}

impl<P> BubbleField<P> {
    /// Create an uninitialized field. An invalid config is replaced by the
    /// defaults (with a warning) rather than rejected.
    pub fn new(config: SimConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Rejected bubble field config ({e}), using defaults");
                SimConfig::default()
            }
        };
        Self::with_valid_config(config)
    }

    /// Create an uninitialized field, rejecting an invalid config.
    pub fn try_new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    /// Create and populate a field in one go
    pub fn with_payloads(config: SimConfig, bounds: Bounds, payloads: Vec<P>) -> Self {
        let mut field = Self::new(config);
        field.initialize(bounds, payloads);
        field
    }

    fn with_valid_config(config: SimConfig) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            bounds: Bounds::default(),
            bubbles: Vec::new(),
            particles: ParticleSystem::new(),
            selection: SelectionState::new(),
            accumulator: 0.0,
            pointer: None,
            listeners: Vec::new(),
            initialized: false,
            time_ticks: 0,
        }
    }

    /// Build the bubble population (one per payload) and the ambient pool.
    ///
    /// Calling this again starts a fresh session; registered listeners stay.
    pub fn initialize(&mut self, bounds: Bounds, payloads: Vec<P>) {
        self.reset_state();
        self.rng = Pcg32::seed_from_u64(self.config.seed);
        self.bounds = bounds;

        let size = bounds.size();
        let config = &self.config;
        let rng = &mut self.rng;
        self.bubbles = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                let base_radius = lerp(config.base_radius_min, config.base_radius_max, rng.random());
                let pos = Vec2::new(
                    place_on_axis(rng, size.x, base_radius),
                    place_on_axis(rng, size.y, base_radius),
                );
                let mut bubble = Bubble::new(BubbleId(i as u32), pos, base_radius, payload);
                bubble.radius = base_radius.max(config.min_radius);
                bubble.target_radius = bubble.radius;
                bubble.pulse_phase = rng.random::<f32>() * std::f32::consts::TAU;
                bubble.spring_stiffness =
                    config.spring_stiffness * lerp(1.0 - config.stiffness_jitter, 1.0, rng.random());
                bubble.friction = config.friction;
                bubble.update_mass(config.intensity);
                bubble
            })
            .collect();

        self.particles.replenish(&mut self.rng, bounds, &self.config);
        self.initialized = true;

        if bounds.is_degenerate() {
            log::warn!(
                "Bubble field initialized with degenerate bounds {}x{}; motion paused until resize",
                bounds.width,
                bounds.height
            );
        }
        log::info!(
            "Bubble field initialized: {} bubbles, {} ambient particles, {}x{}",
            self.bubbles.len(),
            self.particles.ambient.len(),
            bounds.width,
            bounds.height
        );
    }

    /// Update the working bounds used for wall bounces and particle wrap
    pub fn resize(&mut self, bounds: Bounds) {
        if bounds != self.bounds {
            log::info!("Bubble field resized to {}x{}", bounds.width, bounds.height);
        }
        self.bounds = bounds;
    }

    /// Advance the simulation by `delta_seconds` of wall-clock time.
    ///
    /// Time is consumed in fixed ticks; a zero, negative or non-finite delta
    /// runs no tick. `pointer` is the current pointer position, or `None` when
    /// the pointer is outside the surface. Before `initialize` (or after
    /// `destroy`) this does nothing and returns an empty snapshot.
    pub fn step(&mut self, delta_seconds: f32, pointer: Option<Vec2>) -> Snapshot<'_, P> {
        if !self.initialized {
            return Snapshot::empty();
        }

        self.pointer = pointer.filter(|p| p.is_finite());
        self.selection.pointer_moved(&mut self.bubbles, self.pointer);

        let dt = if delta_seconds.is_finite() {
            delta_seconds.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than fast-forwarding next frame
            self.accumulator = 0.0;
        }

        self.snapshot()
    }

    /// Run exactly one fixed tick
    fn tick(&mut self) {
        forces::integrate(&mut self.bubbles, self.pointer, self.bounds, &self.config);
        spring::animate_radii(&mut self.bubbles, &self.config);
        self.particles.tick(&mut self.rng, self.bounds, &self.config);
        self.time_ticks += 1;
    }

    /// Forwarded pointer-move event
    pub fn pointer_moved(&mut self, pointer: Vec2) {
        if !self.initialized {
            return;
        }
        self.pointer = Some(pointer).filter(|p| p.is_finite());
        self.selection.pointer_moved(&mut self.bubbles, self.pointer);
    }

    /// Pointer left the surface: nothing is hovered any more
    pub fn pointer_left(&mut self) {
        if !self.initialized {
            return;
        }
        self.pointer = None;
        self.selection.pointer_moved(&mut self.bubbles, None);
    }

    /// Forwarded pointer-press event.
    ///
    /// Expanding a bubble spawns a burst at its center and notifies every
    /// listener registered with `on_select`.
    pub fn pointer_pressed(&mut self, pointer: Vec2) -> PressOutcome {
        if !self.initialized {
            return PressOutcome::Ignored;
        }

        let outcome = self.selection.pointer_pressed(&mut self.bubbles, pointer);
        match outcome {
            PressOutcome::Expanded(id) => {
                let bubble = &self.bubbles[id.index()];
                let spawned = self.particles.spawn_burst(&mut self.rng, bubble.pos, &self.config);
                log::debug!("Bubble {} expanded ({} burst particles)", id.0, spawned);
                for listener in self.listeners.iter_mut() {
                    listener(&bubble.payload);
                }
            }
            PressOutcome::Collapsed(id) => {
                log::debug!("Bubble {} collapsed", id.0);
            }
            PressOutcome::Ignored => {}
        }
        outcome
    }

    /// Register a listener for selection (expand) events
    pub fn on_select<F>(&mut self, listener: F)
    where
        F: FnMut(&P) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Release all bubbles, particles and listeners.
    ///
    /// Safe to call repeatedly; later calls other than `initialize` are no-ops.
    pub fn destroy(&mut self) {
        if self.initialized {
            log::info!("Bubble field destroyed after {} ticks", self.time_ticks);
        }
        self.reset_state();
        self.bubbles = Vec::new();
        self.particles = ParticleSystem::new();
        self.listeners.clear();
        self.bounds = Bounds::default();
        self.initialized = false;
    }

    fn reset_state(&mut self) {
        self.bubbles.clear();
        self.particles.clear();
        self.selection.clear();
        self.accumulator = 0.0;
        self.pointer = None;
        self.time_ticks = 0;
    }

    /// Current drawable state
    pub fn snapshot(&self) -> Snapshot<'_, P> {
        let bubbles = self
            .bubbles
            .iter()
            .map(|b| BubbleView {
                id: b.id,
                x: b.pos.x,
                y: b.pos.y,
                radius: b.radius,
                is_hovered: b.is_hovered,
                is_expanded: b.is_expanded,
                payload: &b.payload,
            })
            .collect();
        let particles = self
            .particles
            .iter()
            .map(|p| ParticleView {
                x: p.pos.x,
                y: p.pos.y,
                size: p.size,
                alpha: p.alpha * p.lifespan,
            })
            .collect();
        Snapshot { bubbles, particles }
    }

    pub fn bubbles(&self) -> &[Bubble<P>] {
        &self.bubbles
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble<P>> {
        self.bubbles.get(id.index())
    }

    pub fn ambient_count(&self) -> usize {
        self.particles.ambient.len()
    }

    pub fn burst_count(&self) -> usize {
        self.particles.burst.len()
    }

    pub fn selection(&self) -> SelectionPhase {
        self.selection.phase()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Fixed ticks run since `initialize`
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }
}

impl<P> fmt::Debug for BubbleField<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BubbleField")
            .field("initialized", &self.initialized)
            .field("bounds", &self.bounds)
            .field("bubbles", &self.bubbles.len())
            .field("ambient", &self.particles.ambient.len())
            .field("burst", &self.particles.burst.len())
            .field("selection", &self.selection.phase())
            .field("listeners", &self.listeners.len())
            .field("time_ticks", &self.time_ticks)
            .finish()
    }
}

#[inline]
fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}

/// Random coordinate that keeps a circle of `radius` inside `extent` when it fits
fn place_on_axis<R: Rng>(rng: &mut R, extent: f32, radius: f32) -> f32 {
    if extent > 2.0 * radius {
        lerp(radius, extent - radius, rng.random())
    } else {
        extent * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn field(count: usize) -> BubbleField<usize> {
        BubbleField::with_payloads(
            SimConfig::default(),
            Bounds::new(800.0, 600.0),
            (0..count).collect(),
        )
    }

    #[test]
    fn test_step_before_initialize_is_noop() {
        let mut field: BubbleField<usize> = BubbleField::new(SimConfig::default());
        let snapshot = field.step(SIM_DT, Some(Vec2::new(10.0, 10.0)));
        assert!(snapshot.bubbles.is_empty());
        assert!(snapshot.particles.is_empty());
        assert_eq!(field.pointer_pressed(Vec2::ZERO), PressOutcome::Ignored);
        assert_eq!(field.time_ticks(), 0);
    }

    #[test]
    fn test_zero_payloads_runs_ambient_only() {
        let mut field = field(0);
        for _ in 0..120 {
            let snapshot = field.step(SIM_DT, None);
            assert!(snapshot.bubbles.is_empty());
            assert_eq!(snapshot.particles.len(), 50);
        }
        assert_eq!(field.pointer_pressed(Vec2::new(400.0, 300.0)), PressOutcome::Ignored);
    }

    #[test]
    fn test_bubbles_start_inside_bounds() {
        let field = field(12);
        for b in field.bubbles() {
            assert!(b.pos.x >= b.radius && b.pos.x <= 800.0 - b.radius);
            assert!(b.pos.y >= b.radius && b.pos.y <= 600.0 - b.radius);
            assert!(b.mass > 0.0);
        }
    }

    #[test]
    fn test_fixed_step_accumulator() {
        let mut field = field(3);
        field.step(0.0, None);
        assert_eq!(field.time_ticks(), 0);

        field.step(SIM_DT * 0.5, None);
        assert_eq!(field.time_ticks(), 0);
        field.step(SIM_DT * 0.6, None);
        assert_eq!(field.time_ticks(), 1);

        field.step(-1.0, None);
        field.step(f32::NAN, None);
        assert_eq!(field.time_ticks(), 1);

        // Huge frame deltas are capped at MAX_SUBSTEPS ticks
        field.step(10.0, None);
        assert_eq!(field.time_ticks(), 1 + MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_select_notifies_listeners_with_payload() {
        let mut field = field(5);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        field.on_select(move |payload: &usize| sink.borrow_mut().push(*payload));

        let center = field.bubbles()[4].pos;
        let burst_before = field.burst_count();
        let outcome = field.pointer_pressed(center);

        assert!(matches!(outcome, PressOutcome::Expanded(_)));
        assert_eq!(field.burst_count(), burst_before + field.config().burst_count);
        assert_eq!(seen.borrow().len(), 1);

        // Collapsing does not notify
        field.pointer_pressed(center);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut field = field(4);
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        field.on_select(move |_| *counter.borrow_mut() += 1);

        field.destroy();
        assert!(!field.is_initialized());
        assert!(field.bubbles().is_empty());
        assert_eq!(field.ambient_count(), 0);
        assert!(field.step(SIM_DT, None).particles.is_empty());

        // Listeners are gone too
        field.initialize(Bounds::new(800.0, 600.0), vec![1]);
        let center = field.bubbles()[0].pos;
        field.pointer_pressed(center);
        assert_eq!(*calls.borrow(), 0);

        field.destroy();
        field.destroy();
    }

    #[test]
    fn test_determinism() {
        // Two fields with the same seed should produce identical results
        let mut a = field(6);
        let mut b = field(6);
        let pointer = Some(Vec2::new(300.0, 200.0));

        for _ in 0..240 {
            a.step(SIM_DT, pointer);
            b.step(SIM_DT, pointer);
        }
        for (x, y) in a.bubbles().iter().zip(b.bubbles()) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.radius, y.radius);
        }
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = field(3);
        let mut b = BubbleField::with_payloads(
            SimConfig {
                seed: 9,
                ..Default::default()
            },
            Bounds::new(400.0, 400.0),
            vec![10usize, 11],
        );

        let center = a.bubbles()[0].pos;
        a.pointer_pressed(center);
        b.step(SIM_DT, None);

        assert!(matches!(a.selection(), SelectionPhase::Expanded(_)));
        assert_eq!(b.selection(), SelectionPhase::Idle);
        assert_eq!(b.burst_count(), 0);
    }

    #[test]
    fn test_degenerate_bounds_then_resize() {
        let mut field = BubbleField::with_payloads(SimConfig::default(), Bounds::new(0.0, 0.0), vec![1usize, 2, 3]);
        for _ in 0..30 {
            let snapshot = field.step(SIM_DT, Some(Vec2::ZERO));
            for b in &snapshot.bubbles {
                assert!(b.x.is_finite() && b.y.is_finite() && b.radius.is_finite());
            }
        }

        field.resize(Bounds::new(800.0, 600.0));
        for _ in 0..120 {
            field.step(SIM_DT, None);
        }
        for b in field.bubbles() {
            // Walls are resolved against the radius from before this tick's spring step
            assert!(b.pos.x >= b.radius - 1.0 && b.pos.x <= 800.0 - b.radius + 1.0);
            assert!(b.pos.y >= b.radius - 1.0 && b.pos.y <= 600.0 - b.radius + 1.0);
        }
    }

    #[test]
    fn test_tick_moves_before_resizing() {
        let mut field = field(1);
        let r0 = field.bubbles[0].radius;
        field.bubbles[0].pos = Vec2::new(r0, 300.0);
        field.bubbles[0].vel = Vec2::ZERO;
        field.bubbles[0].is_expanded = true;

        field.tick();

        // Integration saw the old radius, so the wall did not push the bubble
        let b = &field.bubbles[0];
        assert!(b.radius > r0);
        assert_eq!(b.pos.x, r0);
        assert_eq!(field.time_ticks(), 1);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let bad = SimConfig {
            friction: 2.0,
            ..Default::default()
        };
        assert!(BubbleField::<()>::try_new(bad.clone()).is_err());
        let field: BubbleField<()> = BubbleField::new(bad);
        assert_eq!(field.config(), &SimConfig::default());
    }

    #[test]
    fn test_snapshot_alpha_fades_with_lifespan() {
        let mut field = field(0);
        for _ in 0..10 {
            let snapshot = field.step(SIM_DT, None);
            assert!(snapshot.particles.iter().all(|p| p.alpha > 0.0 && p.alpha <= 0.6));
        }
    }
}
