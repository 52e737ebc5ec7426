//! Ambient and burst particles
//!
//! Ambient particles drift and wrap around the bounds and are topped back up
//! to the configured population every tick. Burst particles fan out from a
//! selected bubble and simply drain away.

use glam::Vec2;
use rand::Rng;

use super::state::{Bounds, Particle};
use crate::config::SimConfig;
use crate::unit_at;

#[inline]
fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}

/// Both particle pools
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    pub ambient: Vec<Particle>,
    pub burst: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the ambient pool up to its target population
    pub fn replenish<R: Rng>(&mut self, rng: &mut R, bounds: Bounds, config: &SimConfig) {
        while self.ambient.len() < config.ambient_count {
            self.ambient.push(seed_ambient(rng, bounds, config));
        }
    }

    /// Advance both pools by one tick
    pub fn tick<R: Rng>(&mut self, rng: &mut R, bounds: Bounds, config: &SimConfig) {
        self.tick_ambient(rng, bounds, config);
        self.tick_burst(config);
    }

    fn tick_ambient<R: Rng>(&mut self, rng: &mut R, bounds: Bounds, config: &SimConfig) {
        let size = bounds.size();
        let can_move = !bounds.is_degenerate();

        for particle in self.ambient.iter_mut() {
            if can_move {
                particle.pos += particle.vel;
                particle.pos = Vec2::new(
                    particle.pos.x.rem_euclid(size.x),
                    particle.pos.y.rem_euclid(size.y),
                );
            }
            particle.lifespan *= config.ambient_decay;
        }
        self.ambient.retain(|p| p.is_alive());

        self.replenish(rng, bounds, config);
    }

    fn tick_burst(&mut self, config: &SimConfig) {
        for particle in self.burst.iter_mut() {
            particle.pos += particle.vel;
            particle.vel *= config.burst_drag;
            particle.lifespan *= config.burst_decay;
        }
        self.burst.retain(|p| p.is_alive());
    }

    /// Fan a ring of particles out from `at`. Returns how many were spawned.
    pub fn spawn_burst<R: Rng>(&mut self, rng: &mut R, at: Vec2, config: &SimConfig) -> usize {
        let count = config.burst_count;
        self.burst.reserve(count);
        for i in 0..count {
            let angle = std::f32::consts::TAU * (i as f32 / count as f32);
            let speed = lerp(config.burst_speed_min, config.burst_speed_max, rng.random());
            self.burst.push(Particle {
                pos: at,
                vel: unit_at(angle) * speed,
                size: lerp(config.burst_size_min, config.burst_size_max, rng.random()),
                alpha: 1.0,
                lifespan: lerp(config.burst_min_lifespan, 1.0, rng.random()),
            });
        }
        count
    }

    pub fn clear(&mut self) {
        self.ambient.clear();
        self.burst.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.ambient.iter().chain(self.burst.iter())
    }
}

fn seed_ambient<R: Rng>(rng: &mut R, bounds: Bounds, config: &SimConfig) -> Particle {
    let size = bounds.size();
    let speed = config.ambient_speed;
    Particle {
        pos: Vec2::new(rng.random::<f32>() * size.x, rng.random::<f32>() * size.y),
        vel: Vec2::new(
            lerp(-speed, speed, rng.random()),
            lerp(-speed, speed, rng.random()),
        ),
        size: lerp(config.ambient_size_min, config.ambient_size_max, rng.random()),
        alpha: lerp(config.ambient_alpha_min, config.ambient_alpha_max, rng.random()),
        lifespan: lerp(config.ambient_min_lifespan, 1.0, rng.random()),
    }
}
