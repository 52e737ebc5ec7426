//! Per-tick force accumulation and integration
//!
//! Order matters: attraction, repulsion, lift, friction, then integrate and
//! bounce off the walls. Velocities are in pixels per tick.

use glam::Vec2;

use super::state::{Bounds, Bubble};
use crate::config::SimConfig;

/// Separation normal used when two centers coincide exactly
const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Advance every bubble's velocity and position by exactly one tick.
///
/// Degenerate bounds skip the tick entirely so nothing turns into NaN before
/// the host has a real surface.
pub fn integrate<P>(
    bubbles: &mut [Bubble<P>],
    pointer: Option<Vec2>,
    bounds: Bounds,
    config: &SimConfig,
) {
    if bounds.is_degenerate() {
        return;
    }

    let pointer = pointer.filter(|p| p.is_finite());
    if let Some(pointer) = pointer {
        apply_pointer_attraction(bubbles, pointer, config.attraction);
    }
    apply_repulsion(bubbles, config.repulsion);

    for bubble in bubbles.iter_mut() {
        bubble.vel.y -= config.lift;
        bubble.vel *= bubble.friction;
        bubble.pos += bubble.vel;
        resolve_walls(bubble, bounds, config.restitution);
    }
}

/// Pull hovered, collapsed bubbles gently toward the pointer
pub fn apply_pointer_attraction<P>(bubbles: &mut [Bubble<P>], pointer: Vec2, attraction: f32) {
    for bubble in bubbles.iter_mut() {
        if bubble.is_hovered && !bubble.is_expanded {
            bubble.vel += (pointer - bubble.pos) * attraction;
        }
    }
}

/// Push every overlapping pair apart along their separation normal.
///
/// The push is proportional to overlap depth and split by each bubble's mass,
/// equal and opposite.
pub fn apply_repulsion<P>(bubbles: &mut [Bubble<P>], repulsion: f32) {
    let n = bubbles.len();
    for i in 0..n {
        let (head, tail) = bubbles.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            let delta = b.pos - a.pos;
            let dist = delta.length();
            let min_dist = a.radius + b.radius;
            if dist >= min_dist {
                continue;
            }

            let normal = if dist > 0.0 { delta / dist } else { FALLBACK_NORMAL };
            let push = normal * (min_dist - dist) * repulsion;
            a.vel -= push / a.mass;
            b.vel += push / b.mass;
        }
    }
}

/// Whether a circle's edge crosses any wall of the bounding rectangle
#[inline]
pub fn crosses_wall(pos: Vec2, radius: f32, bounds: Bounds) -> bool {
    let size = bounds.size();
    pos.x < radius || pos.y < radius || pos.x > size.x - radius || pos.y > size.y - radius
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Clamp a bubble back inside the bounds and bounce it with restitution.
///
/// Returns true if any wall was touched this tick.
pub fn resolve_walls<P>(bubble: &mut Bubble<P>, bounds: Bounds, restitution: f32) -> bool {
    if !crosses_wall(bubble.pos, bubble.radius, bounds) {
        return false;
    }

    let size = bounds.size();
    for axis in 0..2 {
        let extent = size[axis];
        let lo = bubble.radius;
        let hi = extent - bubble.radius;

        if lo > hi {
            // Wider than the bounds on this axis: park it in the middle
            bubble.pos[axis] = extent * 0.5;
            bubble.vel[axis] = 0.0;
            continue;
        }

        let wall_normal = if bubble.pos[axis] < lo {
            bubble.pos[axis] = lo;
            1.0
        } else if bubble.pos[axis] > hi {
            bubble.pos[axis] = hi;
            -1.0
        } else {
            continue;
        };

        // Only flip motion heading out through the wall
        if bubble.vel[axis] * wall_normal < 0.0 {
            let mut normal = Vec2::ZERO;
            normal[axis] = wall_normal;
            let reflected = reflect_velocity(bubble.vel, normal);
            bubble.vel[axis] = reflected[axis] * restitution;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BubbleId;

    fn bubble(id: u32, x: f32, y: f32, r: f32) -> Bubble<()> {
        Bubble::new(BubbleId(id), Vec2::new(x, y), r, ())
    }

    fn still_config() -> SimConfig {
        SimConfig {
            attraction: 0.0,
            lift: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_repulsion_separates_overlapping_pair() {
        let mut bubbles = vec![bubble(0, 400.0, 300.0, 40.0), bubble(1, 440.0, 300.0, 40.0)];
        let before = bubbles[0].pos.distance(bubbles[1].pos);

        integrate(&mut bubbles, None, Bounds::new(800.0, 600.0), &still_config());

        let after = bubbles[0].pos.distance(bubbles[1].pos);
        assert!(after > before, "{after} should exceed {before}");
        assert!(bubbles[0].vel.x < 0.0);
        assert!(bubbles[1].vel.x > 0.0);
    }

    #[test]
    fn test_repulsion_is_equal_and_opposite_for_equal_mass() {
        let mut bubbles = vec![bubble(0, 100.0, 100.0, 30.0), bubble(1, 100.0, 140.0, 30.0)];
        apply_repulsion(&mut bubbles, 0.05);
        let sum = bubbles[0].vel + bubbles[1].vel;
        assert!(sum.length() < 1e-5);
        assert!(bubbles[0].vel.y < 0.0);
    }

    #[test]
    fn test_repulsion_coincident_centers_uses_fallback() {
        let mut bubbles = vec![bubble(0, 200.0, 200.0, 30.0), bubble(1, 200.0, 200.0, 30.0)];
        apply_repulsion(&mut bubbles, 0.05);
        assert!(bubbles[0].vel.is_finite());
        assert!(bubbles[1].vel.is_finite());
        assert!(bubbles[0].vel.x < 0.0);
        assert!(bubbles[1].vel.x > 0.0);
    }

    #[test]
    fn test_no_repulsion_when_apart() {
        let mut bubbles = vec![bubble(0, 0.0, 0.0, 10.0), bubble(1, 30.0, 0.0, 10.0)];
        apply_repulsion(&mut bubbles, 0.05);
        assert_eq!(bubbles[0].vel, Vec2::ZERO);
        assert_eq!(bubbles[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_attraction_only_for_hovered_collapsed() {
        let mut bubbles = vec![
            bubble(0, 100.0, 100.0, 20.0),
            bubble(1, 300.0, 100.0, 20.0),
            bubble(2, 500.0, 100.0, 20.0),
        ];
        bubbles[0].is_hovered = true;
        bubbles[2].is_hovered = true;
        bubbles[2].is_expanded = true;

        apply_pointer_attraction(&mut bubbles, Vec2::new(200.0, 100.0), 0.01);
        assert!((bubbles[0].vel.x - 1.0).abs() < 1e-5);
        assert_eq!(bubbles[1].vel, Vec2::ZERO);
        assert_eq!(bubbles[2].vel, Vec2::ZERO);
    }

    #[test]
    fn test_lift_moves_bubble_up() {
        let mut bubbles = vec![bubble(0, 400.0, 300.0, 20.0)];
        let config = SimConfig {
            lift: 0.5,
            ..Default::default()
        };
        integrate(&mut bubbles, None, Bounds::new(800.0, 600.0), &config);
        assert!(bubbles[0].pos.y < 300.0);
    }

    #[test]
    fn test_wall_bounce_left() {
        let mut b = bubble(0, 15.0, 300.0, 20.0);
        b.vel = Vec2::new(-10.0, 0.0);
        let hit = resolve_walls(&mut b, Bounds::new(800.0, 600.0), 0.7);
        assert!(hit);
        assert_eq!(b.pos.x, 20.0);
        assert!((b.vel.x - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_wall_bounce_bottom_right_corner() {
        let mut b = bubble(0, 795.0, 598.0, 10.0);
        b.vel = Vec2::new(4.0, 2.0);
        resolve_walls(&mut b, Bounds::new(800.0, 600.0), 0.5);
        assert_eq!(b.pos, Vec2::new(790.0, 590.0));
        assert!((b.vel.x + 2.0).abs() < 1e-5);
        assert!((b.vel.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_wall_keeps_inward_velocity() {
        let mut b = bubble(0, 5.0, 300.0, 20.0);
        b.vel = Vec2::new(3.0, 0.0);
        resolve_walls(&mut b, Bounds::new(800.0, 600.0), 0.7);
        assert_eq!(b.pos.x, 20.0);
        assert_eq!(b.vel.x, 3.0);
    }

    #[test]
    fn test_oversized_bubble_is_centered() {
        let mut b = bubble(0, 10.0, 50.0, 80.0);
        b.vel = Vec2::new(-3.0, 0.0);
        resolve_walls(&mut b, Bounds::new(100.0, 400.0), 0.7);
        assert_eq!(b.pos.x, 50.0);
        assert_eq!(b.vel.x, 0.0);
        assert_eq!(b.pos.y, 80.0);
    }

    #[test]
    fn test_zero_bounds_is_noop() {
        let mut bubbles = vec![bubble(0, 0.0, 0.0, 20.0), bubble(1, 0.0, 0.0, 20.0)];
        integrate(&mut bubbles, Some(Vec2::ZERO), Bounds::new(0.0, 0.0), &SimConfig::default());
        for b in &bubbles {
            assert_eq!(b.pos, Vec2::ZERO);
            assert_eq!(b.vel, Vec2::ZERO);
        }
    }

    #[test]
    fn test_crosses_wall() {
        let bounds = Bounds::new(800.0, 600.0);
        assert!(!crosses_wall(Vec2::new(400.0, 300.0), 50.0, bounds));
        assert!(!crosses_wall(Vec2::new(20.0, 580.0), 20.0, bounds));
        assert!(crosses_wall(Vec2::new(19.0, 300.0), 20.0, bounds));
        assert!(crosses_wall(Vec2::new(400.0, 581.0), 20.0, bounds));

        // A resting bubble touching a wall is left alone
        let mut b = bubble(0, 20.0, 300.0, 20.0);
        b.vel = Vec2::new(-1.0, 0.0);
        assert!(!resolve_walls(&mut b, bounds, 0.7));
        assert_eq!(b.vel.x, -1.0);
    }

    #[test]
    fn test_reflect_velocity() {
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }
}
