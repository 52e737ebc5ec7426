//! Bubble and particle state
//!
//! Plain data owned by the simulation. Forces, springs and the selection
//! machine mutate these in place; the host only ever sees snapshots.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{LIFESPAN_EPSILON, MASS_PER_AREA, MIN_MASS};

/// Working area of the simulation (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when the host has not laid out its surface yet (or handed us garbage)
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Bounds as a vector, with degenerate axes reported as zero
    pub fn size(&self) -> Vec2 {
        let clean = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Vec2::new(clean(self.width), clean(self.height))
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }
}

/// Stable index of a bubble for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BubbleId(pub u32);

impl BubbleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Display record carried by a bubble. The simulation never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BubblePayload {
    pub title: String,
    pub stat: String,
    #[serde(default)]
    pub description: String,
}

impl BubblePayload {
    pub fn new(title: impl Into<String>, stat: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stat: stat.into(),
            description: description.into(),
        }
    }
}

/// A floating bubble
#[derive(Debug, Clone)]
pub struct Bubble<P> {
    pub id: BubbleId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Resting radius the animator scales from
    pub base_radius: f32,
    /// Current visual radius
    pub radius: f32,
    /// Radius the spring is moving toward
    pub target_radius: f32,
    /// Derived from radius; always > 0
    pub mass: f32,
    /// Fraction of the radius gap closed per tick, in (0, 1]
    pub spring_stiffness: f32,
    /// Velocity damping per tick, in (0, 1]
    pub friction: f32,
    /// Idle breathing angle, wrapped to [0, TAU)
    pub pulse_phase: f32,
    pub is_hovered: bool,
    pub is_expanded: bool,
    pub payload: P,
}

impl<P> Bubble<P> {
    pub fn new(id: BubbleId, pos: Vec2, base_radius: f32, payload: P) -> Self {
        let mut bubble = Self {
            id,
            pos,
            vel: Vec2::ZERO,
            base_radius,
            radius: base_radius,
            target_radius: base_radius,
            mass: MIN_MASS,
            spring_stiffness: 0.1,
            friction: 0.98,
            pulse_phase: 0.0,
            is_hovered: false,
            is_expanded: false,
            payload,
        };
        bubble.update_mass(1.0);
        bubble
    }

    /// Recompute mass from the current radius
    pub fn update_mass(&mut self, intensity: f32) {
        let mass = self.radius * self.radius * MASS_PER_AREA * intensity;
        self.mass = if mass.is_finite() { mass.max(MIN_MASS) } else { MIN_MASS };
    }

    /// Whether a point lies inside the bubble's current circle
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.radius * self.radius
    }
}

/// An ambient or burst particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Opacity seed; rendered opacity is `alpha * lifespan`
    pub alpha: f32,
    /// 0-1, decays multiplicatively each tick
    pub lifespan: f32,
}

impl Particle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifespan >= LIFESPAN_EPSILON
    }
}
