// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;

use crate::droplet::DropletId;
use crate::pool::DropletPool;

pub type CellKey = (i32, i32);

/// Uniform grid over droplet positions, rebuilt every frame.
///
/// Buckets keep their allocation between frames; `occupied` records cells in
/// first-insertion order so iteration does not depend on hash order.
#[derive(Default)]
pub struct SpatialHash {
    cell_size: f32,
    buckets: HashMap<CellKey, Vec<DropletId>>,
    occupied: Vec<CellKey>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            buckets: HashMap::new(),
            occupied: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn key(&self, x: f32, y: f32) -> CellKey {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        for key in self.occupied.drain(..) {
            if let Some(bucket) = self.buckets.get_mut(&key) {
                bucket.clear();
            }
        }
    }

    pub fn insert(&mut self, id: DropletId, x: f32, y: f32) {
        let key = self.key(x, y);
        let bucket = self.buckets.entry(key).or_default();
        if bucket.is_empty() {
            self.occupied.push(key);
        }
        bucket.push(id);
    }

    /// Rebuilds the grid from every active, unmerged droplet in the pool.
    pub fn rebuild(&mut self, pool: &DropletPool) {
        self.clear();
        for id in pool.active_ids() {
            let Some(d) = pool.get(id) else {
                continue;
            };
            if d.is_merged() {
                continue;
            }
            self.insert(id, d.x, d.y);
        }
    }

    pub fn occupied_cells(&self) -> &[CellKey] {
        &self.occupied
    }

    pub fn bucket(&self, key: CellKey) -> &[DropletId] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Droplets in `key` and its eight neighbours.
    pub fn neighbourhood(&self, key: CellKey) -> impl Iterator<Item = DropletId> + '_ {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).flat_map(move |dx| {
                self.bucket((key.0 + dx, key.1 + dy)).iter().copied()
            })
        })
    }

    pub fn len(&self) -> usize {
        self.occupied.iter().map(|&k| self.bucket(k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}
