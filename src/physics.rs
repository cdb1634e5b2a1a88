// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng};

use crate::config::RainConfig;
use crate::droplet::Droplet;
use crate::pool::DropletPool;

/// Droplets further than this below the bottom edge are despawned.
pub const DESPAWN_MARGIN: f32 = 50.0;
pub const STUCK_TICKS_MIN: f32 = 20.0;
pub const STUCK_TICKS_MAX: f32 = 60.0;
pub const LATERAL_DAMPING: f32 = 0.98;
pub const TRAIL_MIN_STEP: f32 = 2.0;
pub const WALL_RESTITUTION: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

/// Advances every active, unmerged droplet by `dt` ticks and returns how many
/// were despawned.
pub fn integrate(
    pool: &mut DropletPool,
    cfg: &RainConfig,
    bounds: Bounds,
    dt: f32,
    rng: &mut StdRng,
) -> usize {
    let mut despawned = 0;

    // Walk backwards: a swap-remove only moves an already visited id into `i`.
    let mut i = pool.active_count();
    while i > 0 {
        i -= 1;
        let Some(id) = pool.active_at(i) else {
            continue;
        };
        let Some(d) = pool.get_mut(id) else {
            continue;
        };
        if d.merged {
            continue;
        }

        d.life -= dt;
        if d.life <= 0.0 || d.y > bounds.height + DESPAWN_MARGIN {
            pool.release(id);
            despawned += 1;
            continue;
        }

        step(d, cfg, bounds, dt, rng);
    }

    despawned
}

fn step(d: &mut Droplet, cfg: &RainConfig, bounds: Bounds, dt: f32, rng: &mut StdRng) {
    if d.stuck {
        d.stuck_timer -= dt;
        if d.stuck_timer <= 0.0 {
            d.stuck = false;
            d.stuck_timer = 0.0;
        } else {
            return;
        }
    }

    if d.radius() > 0.0 && rng.random::<f32>() < cfg.stick_chance / d.radius() {
        d.stuck = true;
        d.stuck_timer = rng.random_range(STUCK_TICKS_MIN..STUCK_TICKS_MAX);
        return;
    }

    d.vy = (d.vy + cfg.gravity * dt).min(cfg.terminal_velocity);

    if cfg.surface_tension != 0.0 {
        d.vx += rng.random_range(-0.5f32..0.5) * cfg.surface_tension * dt;
    }
    d.vx *= LATERAL_DAMPING;

    d.x += d.vx * dt;
    d.y += d.vy * dt;

    d.record_trail(TRAIL_MIN_STEP, cfg.trail_max_length);

    let r = d.radius();
    if d.x < r {
        d.x = r;
        d.vx = -d.vx * WALL_RESTITUTION;
    } else if d.x > bounds.width - r {
        d.x = bounds.width - r;
        d.vx = -d.vx * WALL_RESTITUTION;
    }
}
