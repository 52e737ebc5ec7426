//! Deterministic bubble simulation
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by bubble ID)
//! - No rendering or platform dependencies

pub mod field;
pub mod forces;
pub mod particles;
pub mod selection;
pub mod spring;
pub mod state;

pub use field::{BubbleField, BubbleView, ParticleView, Snapshot};
pub use forces::{crosses_wall, integrate, reflect_velocity, resolve_walls};
pub use particles::ParticleSystem;
pub use selection::{PressOutcome, SelectionPhase, SelectionState, hit_test};
pub use spring::{animate_radii, spring_step, target_radius};
pub use state::{Bounds, Bubble, BubbleId, BubblePayload, Particle};
