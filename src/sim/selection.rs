//! Hover and expand tracking
//!
//! The machine owns the authoritative hovered/expanded ids and mirrors them
//! onto the bubbles' flags after every transition, so at most one bubble is
//! ever expanded.

use glam::Vec2;

use super::state::{Bubble, BubbleId};

/// Externally visible selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Nothing hovered or expanded
    Idle,
    /// Pointer is over a bubble, nothing expanded
    Hovered(BubbleId),
    /// A bubble is showing its detail view
    Expanded(BubbleId),
}

/// What a pointer press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// This bubble is now expanded (any previous one was collapsed)
    Expanded(BubbleId),
    /// This bubble was collapsed and nothing is expanded now
    Collapsed(BubbleId),
    /// Press hit empty space with nothing expanded
    Ignored,
}

/// Find the bubble under `point`.
///
/// When circles overlap the nearest center wins; exact ties go to the lower id.
pub fn hit_test<P>(bubbles: &[Bubble<P>], point: Vec2) -> Option<BubbleId> {
    if !point.is_finite() {
        return None;
    }

    let mut best: Option<(BubbleId, f32)> = None;
    for bubble in bubbles {
        if !bubble.contains(point) {
            continue;
        }
        let dist_sq = bubble.pos.distance_squared(point);
        let closer = match best {
            None => true,
            Some((best_id, best_dist)) => {
                dist_sq < best_dist || (dist_sq == best_dist && bubble.id < best_id)
            }
        };
        if closer {
            best = Some((bubble.id, dist_sq));
        }
    }
    best.map(|(id, _)| id)
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    hovered: Option<BubbleId>,
    expanded: Option<BubbleId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<BubbleId> {
        self.hovered
    }

    pub fn expanded(&self) -> Option<BubbleId> {
        self.expanded
    }

    pub fn phase(&self) -> SelectionPhase {
        match (self.expanded, self.hovered) {
            (Some(id), _) => SelectionPhase::Expanded(id),
            (None, Some(id)) => SelectionPhase::Hovered(id),
            (None, None) => SelectionPhase::Idle,
        }
    }

    /// Re-run the hover hit-test. A `None` pointer clears hover.
    pub fn pointer_moved<P>(&mut self, bubbles: &mut [Bubble<P>], pointer: Option<Vec2>) -> Option<BubbleId> {
        self.hovered = pointer.and_then(|p| hit_test(bubbles, p));
        self.sync_flags(bubbles);
        self.hovered
    }

    /// Apply a press at `point`: toggle, switch, or collapse.
    pub fn pointer_pressed<P>(&mut self, bubbles: &mut [Bubble<P>], point: Vec2) -> PressOutcome {
        let outcome = match hit_test(bubbles, point) {
            Some(id) if self.expanded == Some(id) => {
                self.expanded = None;
                PressOutcome::Collapsed(id)
            }
            Some(id) => {
                self.expanded = Some(id);
                PressOutcome::Expanded(id)
            }
            None => match self.expanded.take() {
                Some(prev) => PressOutcome::Collapsed(prev),
                None => PressOutcome::Ignored,
            },
        };
        self.sync_flags(bubbles);
        outcome
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.expanded = None;
    }

    fn sync_flags<P>(&self, bubbles: &mut [Bubble<P>]) {
        for bubble in bubbles.iter_mut() {
            bubble.is_hovered = self.hovered == Some(bubble.id);
            bubble.is_expanded = self.expanded == Some(bubble.id);
        }
    }
}
