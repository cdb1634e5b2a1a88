// Copyright (c) 2026 rezky_nightky

//! Proximity merging over the spatial hash.
//!
//! Pairs are visited cell by cell. A droplet that absorbs a neighbour keeps
//! growing within the same pass, so dense clusters can chain-absorb in one
//! frame. Absorbed droplets are tombstoned and released after the pass.

use crate::config::RainConfig;
use crate::droplet::{Droplet, DropletId};
use crate::pool::DropletPool;
use crate::spatial::SpatialHash;

/// Reusable scratch space for the merge pass.
#[derive(Default)]
pub struct MergeResolver {
    grid: SpatialHash,
    candidates: Vec<DropletId>,
    absorbed: Vec<DropletId>,
}

impl MergeResolver {
    pub fn new(cell_size: f32) -> Self {
        Self {
            grid: SpatialHash::new(cell_size),
            candidates: Vec::new(),
            absorbed: Vec::new(),
        }
    }

    pub fn grid(&self) -> &SpatialHash {
        &self.grid
    }

    /// Runs one merge pass and returns how many droplets were absorbed.
    pub fn resolve(&mut self, pool: &mut DropletPool, cfg: &RainConfig) -> usize {
        self.grid.rebuild(pool);
        self.absorbed.clear();

        let cap = cfg.radius_cap();
        let cells = self.grid.occupied_cells().len();
        for ci in 0..cells {
            let key = self.grid.occupied_cells()[ci];
            self.candidates.clear();
            self.candidates.extend(self.grid.neighbourhood(key));

            for &a in self.grid.bucket(key) {
                for &b in &self.candidates {
                    if a == b {
                        continue;
                    }
                    let Some((da, db)) = pool.pair_mut(a, b) else {
                        continue;
                    };
                    if da.merged {
                        break;
                    }
                    if db.merged {
                        continue;
                    }
                    let reach = (da.radius() + db.radius()) * cfg.merge_distance;
                    let dx = da.x - db.x;
                    let dy = da.y - db.y;
                    if dx * dx + dy * dy < reach * reach {
                        absorb(da, db, cap, cfg.trail_max_length);
                        self.absorbed.push(b);
                    }
                }
            }
        }

        for &id in &self.absorbed {
            pool.release(id);
        }
        self.absorbed.len()
    }
}

/// Folds `b` into `a`, conserving momentum and area. `b` is tombstoned.
pub fn absorb(a: &mut Droplet, b: &mut Droplet, radius_cap: f32, trail_max: usize) {
    let ma = a.mass();
    let mb = b.mass();
    let total = ma + mb;
    if total > 0.0 {
        a.x = (a.x * ma + b.x * mb) / total;
        a.y = (a.y * ma + b.y * mb) / total;
        a.vx = (a.vx * ma + b.vx * mb) / total;
        a.vy = (a.vy * ma + b.vy * mb) / total;
    }

    let radius = (a.radius() * a.radius() + b.radius() * b.radius()).sqrt();
    a.set_radius(radius.min(radius_cap));

    let room = trail_max.saturating_sub(a.trail.len());
    a.trail.extend(b.trail.iter().take(room).copied());
    a.trail.truncate(trail_max);

    a.stuck = false;
    a.stuck_timer = 0.0;
    b.merged = true;
}
