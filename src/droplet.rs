// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;

/// Index of a droplet slot in the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DropletId(pub(crate) usize);

impl DropletId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One historical sample of a droplet, drawn as its fading tail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Optional per-spawn overrides; unset fields are drawn from the config.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnOverrides {
    pub radius: Option<f32>,
    pub vx: Option<f32>,
    pub vy: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct Droplet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    radius: f32,
    mass: f32,
    pub life: f32,
    pub max_life: f32,
    pub(crate) active: bool,
    pub(crate) merged: bool,
    pub stuck: bool,
    pub stuck_timer: f32,
    /// Most recent sample first.
    pub(crate) trail: VecDeque<TrailPoint>,
}

impl Droplet {
    pub(crate) fn new(trail_capacity: usize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            radius: 0.0,
            mass: 0.0,
            life: 0.0,
            max_life: 0.0,
            active: false,
            merged: false,
            stuck: false,
            stuck_timer: 0.0,
            trail: VecDeque::with_capacity(trail_capacity + 1),
        }
    }

    /// Returns every field to its default while keeping the trail allocation.
    pub(crate) fn clear(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.vx = 0.0;
        self.vy = 0.0;
        self.radius = 0.0;
        self.mass = 0.0;
        self.life = 0.0;
        self.max_life = 0.0;
        self.active = false;
        self.merged = false;
        self.stuck = false;
        self.stuck_timer = 0.0;
        self.trail.clear();
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Always `radius²`.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
        self.mass = radius * radius;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_merged(&self) -> bool {
        self.merged
    }

    pub fn trail(&self) -> impl ExactSizeIterator<Item = &TrailPoint> + '_ {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Fraction of life remaining in `[0, 1]`.
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    /// Records the current position unless it is within `min_step` of the last
    /// sample, then trims the oldest samples past `max_len`.
    pub(crate) fn record_trail(&mut self, min_step: f32, max_len: usize) {
        let moved = match self.trail.front() {
            Some(last) => {
                let dx = self.x - last.x;
                let dy = self.y - last.y;
                dx * dx + dy * dy > min_step * min_step
            }
            None => true,
        };
        if moved {
            self.trail.push_front(TrailPoint {
                x: self.x,
                y: self.y,
                radius: self.radius * 0.5,
            });
        }
        self.trail.truncate(max_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_radius_keeps_mass_in_sync() {
        let mut d = Droplet::new(4);
        d.set_radius(3.0);
        assert_eq!(d.mass(), 9.0);
        d.set_radius(0.5);
        assert_eq!(d.mass(), 0.25);
    }

    #[test]
    fn record_trail_skips_small_moves_and_caps_length() {
        let mut d = Droplet::new(3);
        d.set_radius(4.0);
        d.record_trail(2.0, 3);
        assert_eq!(d.trail_len(), 1);

        d.y = 1.0;
        d.record_trail(2.0, 3);
        assert_eq!(d.trail_len(), 1);

        for step in 1..=5 {
            d.y = 10.0 * step as f32;
            d.record_trail(2.0, 3);
        }
        assert_eq!(d.trail_len(), 3);
        let ys: Vec<f32> = d.trail().map(|p| p.y).collect();
        assert_eq!(ys, vec![50.0, 40.0, 30.0]);
        assert!(d.trail().all(|p| p.radius == 2.0));
    }

    #[test]
    fn clear_resets_fields() {
        let mut d = Droplet::new(2);
        d.set_radius(2.0);
        d.active = true;
        d.stuck = true;
        d.record_trail(2.0, 2);
        d.clear();
        assert!(!d.is_active());
        assert!(!d.stuck);
        assert_eq!(d.mass(), 0.0);
        assert_eq!(d.trail_len(), 0);
    }
}
