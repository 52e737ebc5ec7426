//! Radius animation
//!
//! Each tick picks a target radius from the bubble's state and closes a fixed
//! fraction of the gap. With the fraction in (0, 1] the radius converges
//! without overshoot.

use super::state::Bubble;
use crate::config::SimConfig;
use crate::wrap_phase;

/// Radius a bubble is heading toward given its current state
pub fn target_radius<P>(bubble: &Bubble<P>, config: &SimConfig) -> f32 {
    if bubble.is_expanded {
        bubble.base_radius * config.expand_scale
    } else if bubble.is_hovered {
        bubble.base_radius * config.hover_scale
    } else {
        bubble.base_radius * (1.0 + config.pulse_amplitude * bubble.pulse_phase.sin())
    }
}

/// Move `current` toward `target` by `stiffness` of the remaining gap
#[inline]
pub fn spring_step(current: f32, target: f32, stiffness: f32) -> f32 {
    current + (target - current) * stiffness
}

/// Advance pulse phase, retarget, and spring every bubble's radius one tick.
pub fn animate_radii<P>(bubbles: &mut [Bubble<P>], config: &SimConfig) {
    for bubble in bubbles.iter_mut() {
        bubble.pulse_phase = wrap_phase(bubble.pulse_phase + config.pulse_speed);
        bubble.target_radius = target_radius(bubble, config).max(config.min_radius);

        let next = spring_step(bubble.radius, bubble.target_radius, bubble.spring_stiffness);
        bubble.radius = if next.is_finite() {
            next.max(config.min_radius)
        } else {
            bubble.target_radius
        };
        bubble.update_mass(config.intensity);
    }
}
