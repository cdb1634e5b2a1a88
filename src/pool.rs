// Copyright (c) 2026 rezky_nightky

//! Fixed-capacity droplet arena.
//!
//! Slots are allocated once. `free` holds released slot ids, `active` is a
//! compact list of live ids and `position` maps a slot to its index in
//! `active` so release is a swap-remove.

use crate::droplet::{Droplet, DropletId};

const NOT_ACTIVE: usize = usize::MAX;

pub struct DropletPool {
    slots: Vec<Droplet>,
    free: Vec<usize>,
    active: Vec<usize>,
    position: Vec<usize>,
}

impl DropletPool {
    pub fn new(capacity: usize, trail_capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Droplet::new(trail_capacity));
        Self {
            slots,
            // Reversed so that slot 0 is handed out first.
            free: (0..capacity).rev().collect(),
            active: Vec::with_capacity(capacity),
            position: vec![NOT_ACTIVE; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Takes a slot off the free list, or `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<DropletId> {
        let slot = self.free.pop()?;
        let d = &mut self.slots[slot];
        d.clear();
        d.active = true;
        self.position[slot] = self.active.len();
        self.active.push(slot);
        Some(DropletId(slot))
    }

    /// Returns a slot to the free list. Releasing an inactive slot is a no-op.
    pub fn release(&mut self, id: DropletId) {
        let slot = id.0;
        let Some(d) = self.slots.get_mut(slot) else {
            return;
        };
        if !d.active {
            return;
        }
        d.clear();

        let pos = self.position[slot];
        self.active.swap_remove(pos);
        if let Some(&moved) = self.active.get(pos) {
            self.position[moved] = pos;
        }
        self.position[slot] = NOT_ACTIVE;
        self.free.push(slot);
    }

    pub fn release_all(&mut self) {
        while let Some(&slot) = self.active.last() {
            self.release(DropletId(slot));
        }
    }

    pub fn get(&self, id: DropletId) -> Option<&Droplet> {
        self.slots.get(id.0).filter(|d| d.active)
    }

    pub fn get_mut(&mut self, id: DropletId) -> Option<&mut Droplet> {
        self.slots.get_mut(id.0).filter(|d| d.active)
    }

    /// Active ids in arena order of activation, subject to swap-removes.
    pub fn active_ids(&self) -> impl ExactSizeIterator<Item = DropletId> + '_ {
        self.active.iter().map(|&slot| DropletId(slot))
    }

    /// Active id at position `i` of the compact list.
    pub(crate) fn active_at(&self, i: usize) -> Option<DropletId> {
        self.active.get(i).map(|&slot| DropletId(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Droplet> + '_ {
        self.active.iter().map(move |&slot| &self.slots[slot])
    }

    /// Two distinct active droplets borrowed mutably at once.
    pub(crate) fn pair_mut(
        &mut self,
        a: DropletId,
        b: DropletId,
    ) -> Option<(&mut Droplet, &mut Droplet)> {
        if a.0 == b.0 || a.0 >= self.slots.len() || b.0 >= self.slots.len() {
            return None;
        }
        let (da, db) = if a.0 < b.0 {
            let (lo, hi) = self.slots.split_at_mut(b.0);
            (&mut lo[a.0], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(a.0);
            (&mut hi[0], &mut lo[b.0])
        };
        if da.active && db.active {
            Some((da, db))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_until_exhausted_then_none() {
        let mut pool = DropletPool::new(3, 4);
        let ids: Vec<_> = (0..3).filter_map(|_| pool.acquire()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool = DropletPool::new(2, 4);
        let a = pool.acquire().unwrap();
        pool.release(a);
        pool.release(a);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn release_swap_removes_and_keeps_positions_consistent() {
        let mut pool = DropletPool::new(4, 4);
        let ids: Vec<_> = (0..4).filter_map(|_| pool.acquire()).collect();
        pool.release(ids[1]);
        let remaining: Vec<_> = pool.active_ids().collect();
        assert_eq!(remaining, vec![ids[0], ids[3], ids[2]]);

        pool.release(ids[3]);
        pool.release(ids[0]);
        let remaining: Vec<_> = pool.active_ids().collect();
        assert_eq!(remaining, vec![ids[2]]);
        assert!(pool.get(ids[2]).is_some());
        assert!(pool.get(ids[0]).is_none());
    }

    #[test]
    fn released_slot_is_reacquired_clean() {
        let mut pool = DropletPool::new(1, 4);
        let a = pool.acquire().unwrap();
        {
            let d = pool.get_mut(a).unwrap();
            d.set_radius(5.0);
            d.stuck = true;
        }
        pool.release(a);
        let b = pool.acquire().unwrap();
        assert_eq!(a, b);
        let d = pool.get(b).unwrap();
        assert_eq!(d.radius(), 0.0);
        assert!(!d.stuck);
    }

    #[test]
    fn pair_mut_rejects_same_or_inactive() {
        let mut pool = DropletPool::new(3, 4);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert!(pool.pair_mut(a, a).is_none());
        assert!(pool.pair_mut(b, a).is_some());
        pool.release(b);
        assert!(pool.pair_mut(a, b).is_none());
    }

    #[test]
    fn release_all_empties_active_set() {
        let mut pool = DropletPool::new(5, 4);
        for _ in 0..5 {
            pool.acquire();
        }
        pool.release_all();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count(), 5);
    }
}
