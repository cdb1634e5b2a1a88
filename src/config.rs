// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng};

/// Effect configuration. Merge against the defaults with struct-update syntax:
///
/// ```
/// let cfg = rainglass::RainConfig {
///     gravity: 0.3,
///     ..Default::default()
/// };
/// assert_eq!(cfg.max_droplets, 400);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    /// Pool capacity; never grows at runtime.
    pub max_droplets: usize,
    /// Droplets spawned per tick. The fractional part is spawned stochastically.
    pub spawn_rate: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    /// Magnitude of the lateral jitter applied every tick.
    pub surface_tension: f32,
    /// Displacement filter scale.
    pub refraction_strength: f32,
    /// Background blur strength.
    pub blur_amount: f32,
    pub enable_lightning: bool,
    /// Flash cooldown range in ticks, `(min, max)`.
    pub lightning_interval: (f32, f32),
    pub enable_interaction: bool,
    pub min_droplet_radius: f32,
    pub max_droplet_radius: f32,
    /// Multiplier on the summed radii below which two droplets merge.
    pub merge_distance: f32,
    pub auto_start: bool,

    pub trail_max_length: usize,
    /// Initial lifetime range in ticks, `(min, max)`.
    pub droplet_life: (f32, f32),
    /// Pinning probability per tick is `stick_chance / radius`.
    pub stick_chance: f32,
    /// Probability that a pointer move spawns a droplet.
    pub pointer_spawn_chance: f32,
    pub burst_count: usize,
    pub burst_radius: f32,
    pub burst_speed: f32,
    /// Size of the displacement map relative to the effect.
    pub displacement_resolution: f32,
    /// Upper bound for a single frame's `dt`. Zero disables the clamp.
    pub max_frame_delta: f32,
    /// Seed for the effect's generator; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            max_droplets: 400,
            spawn_rate: 0.6,
            gravity: 0.12,
            terminal_velocity: 6.0,
            surface_tension: 0.35,
            refraction_strength: 30.0,
            blur_amount: 6.0,
            enable_lightning: true,
            lightning_interval: (300.0, 900.0),
            enable_interaction: true,
            min_droplet_radius: 2.0,
            max_droplet_radius: 6.0,
            merge_distance: 0.8,
            auto_start: true,
            trail_max_length: 12,
            droplet_life: (400.0, 900.0),
            stick_chance: 0.001,
            pointer_spawn_chance: 0.15,
            burst_count: 12,
            burst_radius: 10.0,
            burst_speed: 1.5,
            displacement_resolution: 0.25,
            max_frame_delta: 4.0,
            seed: None,
        }
    }
}

impl RainConfig {
    /// Edge length of a spatial hash cell.
    pub fn cell_size(&self) -> f32 {
        4.0 * self.max_droplet_radius
    }

    /// Largest radius a droplet can reach through merging.
    pub fn radius_cap(&self) -> f32 {
        2.5 * self.max_droplet_radius
    }
}

/// Returns `(lo, hi)` ordered, so swapped ranges still sample correctly.
pub(crate) fn ordered(range: (f32, f32)) -> (f32, f32) {
    if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    }
}

/// Draws uniformly from `range`. A range whose width is not finite yields
/// its finite end, or `hi` when `lo` is not finite.
pub(crate) fn sample(range: (f32, f32), rng: &mut StdRng) -> f32 {
    let (lo, hi) = ordered(range);
    if hi > lo && (hi - lo).is_finite() {
        rng.random_range(lo..=hi)
    } else if lo.is_finite() {
        lo
    } else {
        hi
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn cell_size_tracks_max_radius() {
        let cfg = RainConfig {
            max_droplet_radius: 5.0,
            ..Default::default()
        };
        assert_eq!(cfg.cell_size(), 20.0);
        assert_eq!(cfg.radius_cap(), 12.5);
    }

    #[test]
    fn ordered_swaps_inverted_ranges() {
        assert_eq!(ordered((9.0, 3.0)), (3.0, 9.0));
        assert_eq!(ordered((1.0, 2.0)), (1.0, 2.0));
    }

    #[test]
    fn sample_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let v = sample((8.0, 2.0), &mut rng);
            assert!((2.0..=8.0).contains(&v));
        }
        assert_eq!(sample((3.0, 3.0), &mut rng), 3.0);
    }

    #[test]
    fn sample_unbounded_range_falls_back_to_finite_end() {
        let mut rng = StdRng::seed_from_u64(12);
        assert_eq!(sample((300.0, f32::INFINITY), &mut rng), 300.0);
        assert_eq!(sample((f32::NEG_INFINITY, 5.0), &mut rng), 5.0);
        assert_eq!(sample((-f32::MAX, f32::MAX), &mut rng), -f32::MAX);
    }

    #[test]
    fn cell_size_has_no_floor() {
        let cfg = RainConfig {
            max_droplet_radius: 0.1,
            ..Default::default()
        };
        assert_eq!(cfg.cell_size(), 0.4);
    }
}
