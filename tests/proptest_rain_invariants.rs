// Copyright (c) 2026 rezky_nightky

//! Property-based invariant tests for the rain simulation.
//!
//! Every case runs the effect on a `HeadlessHost` with a fixed seed drawn by
//! proptest, so failures shrink to a reproducible configuration.
//!
//! 1. `mass == radius²` for every live droplet after any number of frames.
//! 2. The active count never exceeds the pool capacity.
//! 3. Trails stay within their length bound.
//! 4. A falling droplet's trail is ordered most-recent-first.
//! 5. Merging conserves area and momentum.
//! 6. Lightning flashes decay to exactly zero.
//! 7. `reset()` leaves an empty, calm, running effect.

use proptest::prelude::*;
use rainglass::{HeadlessHost, RainConfig, RainEffect, SpawnOverrides};

// ── Helpers ─────────────────────────────────────────────────────────────

const WIDTH: f32 = 320.0;
const HEIGHT: f32 = 240.0;

fn effect(cfg: RainConfig) -> RainEffect<HeadlessHost> {
    let mut host = HeadlessHost::new();
    let stage = host.stage();
    RainEffect::new(host, stage, WIDTH, HEIGHT, cfg).expect("headless host supports everything")
}

fn busy_config_strategy() -> impl Strategy<Value = RainConfig> {
    (
        1usize..=120,
        0.0f32..6.0,
        0.0f32..1.0,
        0.0f32..2.0,
        (0.5f32..4.0, 0.0f32..6.0),
        0usize..=16,
        any::<u64>(),
    )
        .prop_map(
            |(max_droplets, spawn_rate, gravity, merge_distance, (min_r, extra), trail, seed)| {
                RainConfig {
                    max_droplets,
                    spawn_rate,
                    gravity,
                    merge_distance,
                    min_droplet_radius: min_r,
                    max_droplet_radius: min_r + extra,
                    trail_max_length: trail,
                    lightning_interval: (5.0, 40.0),
                    stick_chance: 0.05,
                    seed: Some(seed),
                    ..Default::default()
                }
            },
        )
}

fn calm_config(seed: u64) -> RainConfig {
    RainConfig {
        spawn_rate: 0.0,
        surface_tension: 0.0,
        stick_chance: 0.0,
        enable_lightning: false,
        droplet_life: (10_000.0, 10_000.0),
        seed: Some(seed),
        ..Default::default()
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Structural invariants under load
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn busy_rain_keeps_structural_invariants(
        cfg in busy_config_strategy(),
        frames in 1usize..120,
        dt in 0.1f32..4.0,
    ) {
        let capacity = cfg.max_droplets;
        let trail_max = cfg.trail_max_length;
        let mut rain = effect(cfg);

        for _ in 0..frames {
            rain.tick(dt);
            prop_assert!(rain.droplet_count() <= capacity);
            prop_assert_eq!(rain.droplets().count(), rain.droplet_count());
            for d in rain.droplets() {
                prop_assert_eq!(d.mass(), d.radius() * d.radius());
                prop_assert!(d.trail_len() <= trail_max);
                prop_assert!(!d.is_merged());
            }
        }
    }
}

proptest! {
    #[test]
    fn overfilling_the_pool_returns_none(extra in 1usize..20, seed in any::<u64>()) {
        let mut rain = effect(RainConfig { max_droplets: 8, ..calm_config(seed) });
        for i in 0..8 {
            let spawned = rain.spawn_droplet_at(20.0 + i as f32 * 30.0, 50.0, SpawnOverrides::default());
            prop_assert!(spawned.is_some());
        }
        let before: Vec<(f32, f32, f32)> = rain.droplets().map(|d| (d.x, d.y, d.radius())).collect();
        for _ in 0..extra {
            prop_assert!(rain.spawn_droplet_at(10.0, 10.0, SpawnOverrides::default()).is_none());
        }
        let after: Vec<(f32, f32, f32)> = rain.droplets().map(|d| (d.x, d.y, d.radius())).collect();
        prop_assert_eq!(before, after);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Trails are most-recent-first
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn falling_trail_is_newest_first(
        gravity in 0.2f32..2.0,
        frames in 2usize..60,
        seed in any::<u64>(),
    ) {
        let mut rain = effect(RainConfig {
            gravity,
            terminal_velocity: 20.0,
            trail_max_length: 8,
            ..calm_config(seed)
        });
        let id = rain
            .spawn_droplet_at(WIDTH / 2.0, 0.0, SpawnOverrides { radius: Some(3.0), ..Default::default() })
            .expect("empty pool");

        for _ in 0..frames {
            rain.tick(1.0);
        }
        if let Some(d) = rain.droplet(id) {
            let ys: Vec<f32> = d.trail().map(|p| p.y).collect();
            prop_assert!(ys.len() <= 8);
            for w in ys.windows(2) {
                prop_assert!(w[0] > w[1], "trail not newest-first: {:?}", ys);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Merge conserves area and momentum
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merge_conserves_area_and_momentum(
        r1 in 2.0f32..6.0,
        r2 in 2.0f32..6.0,
        vx1 in -0.5f32..0.5,
        vx2 in -0.5f32..0.5,
        seed in any::<u64>(),
    ) {
        let mut rain = effect(RainConfig {
            gravity: 0.0,
            merge_distance: 1.0,
            ..calm_config(seed)
        });
        rain.spawn_droplet_at(160.0, 120.0, SpawnOverrides { radius: Some(r1), vx: Some(vx1), vy: Some(0.0) });
        rain.spawn_droplet_at(160.5, 120.0, SpawnOverrides { radius: Some(r2), vx: Some(vx2), vy: Some(0.0) });
        rain.tick(1.0);

        prop_assert_eq!(rain.droplet_count(), 1);
        let d = rain.droplets().next().expect("one survivor");
        let expected_r = (r1 * r1 + r2 * r2).sqrt();
        prop_assert!((d.radius() - expected_r).abs() < 1e-4);

        let (m1, m2) = (r1 * r1, r2 * r2);
        let expected_vx = 0.98 * (m1 * vx1 + m2 * vx2) / (m1 + m2);
        prop_assert!((d.vx - expected_vx).abs() < 1e-4, "vx {} expected {}", d.vx, expected_vx);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Lightning decays to exact zero
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lightning_settles_to_zero(dt in 0.1f32..4.0, seed in any::<u64>()) {
        let mut rain = effect(RainConfig {
            enable_lightning: true,
            lightning_interval: (1e9, 1e9),
            ..calm_config(seed)
        });
        rain.trigger_lightning();
        prop_assert!(rain.lightning().intensity() > 0.0);

        let mut last = rain.lightning().intensity();
        let mut frames = 0;
        while rain.lightning().intensity() > 0.0 || rain.lightning().shake() != (0.0, 0.0) {
            rain.tick(dt);
            prop_assert!(rain.lightning().intensity() <= last);
            last = rain.lightning().intensity();
            frames += 1;
            prop_assert!(frames < 100, "flash never settled");
        }
        prop_assert_eq!(rain.lightning().intensity(), 0.0);
        prop_assert_eq!(rain.lightning().shake(), (0.0, 0.0));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Reset
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reset_always_yields_calm_running_effect(
        cfg in busy_config_strategy(),
        frames in 0usize..60,
        stop_first in any::<bool>(),
    ) {
        let mut rain = effect(cfg);
        for _ in 0..frames {
            rain.tick(1.0);
        }
        rain.trigger_lightning();
        if stop_first {
            rain.stop();
        }
        rain.reset();

        prop_assert_eq!(rain.droplet_count(), 0);
        prop_assert_eq!(rain.lightning().intensity(), 0.0);
        prop_assert_eq!(rain.lightning().shake(), (0.0, 0.0));
        prop_assert!(rain.running());
    }
}
