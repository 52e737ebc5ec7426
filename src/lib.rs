//! Bubble Field - floating bubble physics for animated demo pages
//!
//! Core modules:
//! - `sim`: Deterministic simulation (forces, radius springs, particles, selection)
//! - `config`: Tunable simulation parameters and quality presets
//! - `error`: Configuration errors
//! - `platform`: Browser bindings (wasm32 only)

pub mod config;
pub mod error;
pub mod platform;
pub mod sim;

pub use config::{QualityPreset, SimConfig};
pub use error::ConfigError;
pub use sim::{
    Bounds, BubbleField, BubbleId, BubblePayload, BubbleView, ParticleView, PressOutcome,
    SelectionPhase, Snapshot,
};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Largest frame delta accepted by `step` (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Particles are removed once their lifespan decays below this
    pub const LIFESPAN_EPSILON: f32 = 0.01;

    /// Mass per unit of bubble area (before intensity scaling)
    pub const MASS_PER_AREA: f32 = 0.001;
    /// Mass floor so force division never blows up
    pub const MIN_MASS: f32 = 0.05;
}

/// Build a bubble field with the default configuration.
pub fn initialize<P>(bounds: Bounds, payloads: Vec<P>) -> BubbleField<P> {
    BubbleField::with_payloads(SimConfig::default(), bounds, payloads)
}

/// Wrap an angle into [0, TAU)
#[inline]
pub fn wrap_phase(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

/// Unit vector at the given angle
#[inline]
pub fn unit_at(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
