// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng};

use crate::config::{ordered, sample};

pub const FLASH_MIN: f32 = 0.7;
pub const FLASH_MAX: f32 = 1.0;
pub const SHAKE_X: f32 = 6.0;
pub const SHAKE_Y: f32 = 3.0;
pub const INTENSITY_DECAY: f32 = 0.82;
pub const SHAKE_DECAY: f32 = 0.82;
pub const INTENSITY_EPSILON: f32 = 0.01;
pub const SHAKE_EPSILON: f32 = 0.05;

/// Interval-randomized flash trigger with decaying overlay and shake.
#[derive(Clone, Debug)]
pub struct LightningTimer {
    interval: (f32, f32),
    timer: f32,
    cooldown: f32,
    intensity: f32,
    shake: (f32, f32),
    flashes: u64,
}

impl LightningTimer {
    pub fn new(interval: (f32, f32), rng: &mut StdRng) -> Self {
        let mut t = Self {
            interval: ordered(interval),
            timer: 0.0,
            cooldown: 0.0,
            intensity: 0.0,
            shake: (0.0, 0.0),
            flashes: 0,
        };
        t.draw_cooldown(rng);
        t
    }

    fn draw_cooldown(&mut self, rng: &mut StdRng) {
        self.cooldown = sample(self.interval, rng);
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn shake(&self) -> (f32, f32) {
        self.shake
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn elapsed(&self) -> f32 {
        self.timer
    }

    pub fn flashes(&self) -> u64 {
        self.flashes
    }

    pub fn set_interval(&mut self, interval: (f32, f32), rng: &mut StdRng) {
        self.interval = ordered(interval);
        self.draw_cooldown(rng);
    }

    /// Decays the current flash, then advances the cooldown. Returns whether
    /// a flash fired.
    pub fn update(&mut self, dt: f32, rng: &mut StdRng) -> bool {
        self.decay();
        self.advance(dt, rng)
    }

    /// Accumulates `dt` and fires when the cooldown is reached.
    pub fn advance(&mut self, dt: f32, rng: &mut StdRng) -> bool {
        self.timer += dt;
        if self.timer >= self.cooldown {
            self.trigger(rng);
            return true;
        }
        false
    }

    /// Fires a flash immediately and restarts the cooldown.
    pub fn trigger(&mut self, rng: &mut StdRng) {
        self.intensity = rng.random_range(FLASH_MIN..FLASH_MAX);
        self.shake = (
            rng.random_range(-SHAKE_X..SHAKE_X),
            rng.random_range(-SHAKE_Y..SHAKE_Y),
        );
        self.timer = 0.0;
        self.flashes += 1;
        self.draw_cooldown(rng);
    }

    /// Fades the flash and shake one frame toward zero.
    pub fn decay(&mut self) {
        self.intensity *= INTENSITY_DECAY;
        if self.intensity < INTENSITY_EPSILON {
            self.intensity = 0.0;
        }

        self.shake.0 *= SHAKE_DECAY;
        self.shake.1 *= SHAKE_DECAY;
        if self.shake.0.abs() < SHAKE_EPSILON && self.shake.1.abs() < SHAKE_EPSILON {
            self.shake = (0.0, 0.0);
        }
    }

    /// Clears the flash and restarts the cooldown.
    pub fn reset(&mut self, rng: &mut StdRng) {
        self.timer = 0.0;
        self.intensity = 0.0;
        self.shake = (0.0, 0.0);
        self.draw_cooldown(rng);
    }
}
