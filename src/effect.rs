// Copyright (c) 2026 rezky_nightky

//! The effect controller.
//!
//! Frame order: spawn, integrate, merge, lightning, render. The host drives
//! [`RainEffect::tick`] once per frame while the effect's ticker is registered.

use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::{ordered, sample, RainConfig};
use crate::droplet::{Droplet, DropletId, SpawnOverrides};
use crate::error::{Error, Result};
use crate::host::{
    Capabilities, DrawCmd, FilterId, NodeId, PointerEvent, PointerKind, Rgba, SceneHost,
    TargetId, TickerId,
};
use crate::lightning::LightningTimer;
use crate::merge::MergeResolver;
use crate::physics::{self, Bounds};
use crate::pool::DropletPool;
use crate::render::RenderProjector;

/// Counters for the most recent frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub spawned: usize,
    pub despawned: usize,
    pub merged: usize,
    pub active: usize,
    pub flashed: bool,
}

#[derive(Clone, Copy, Debug)]
struct Scene {
    parent: NodeId,
    root: NodeId,
    background: NodeId,
    map_shape: NodeId,
    droplets: NodeId,
    flash: NodeId,
    map: TargetId,
    blur: FilterId,
    displacement: FilterId,
}

/// Host objects created so far, torn down if scene construction fails.
#[derive(Default)]
struct Created {
    nodes: Vec<NodeId>,
    targets: Vec<TargetId>,
    filters: Vec<FilterId>,
}

impl Created {
    fn release<H: SceneHost>(self, host: &mut H) {
        for f in self.filters {
            host.destroy_filter(f);
        }
        for t in self.targets {
            host.destroy_render_target(t);
        }
        for n in self.nodes.into_iter().rev() {
            host.remove_node(n);
        }
    }
}

fn map_size(width: f32, height: f32, resolution: f32) -> (u32, u32) {
    let res = if resolution > 0.0 { resolution } else { 1.0 };
    (
        (width * res).ceil().max(1.0) as u32,
        (height * res).ceil().max(1.0) as u32,
    )
}

fn build_scene<H: SceneHost>(
    host: &mut H,
    parent: NodeId,
    width: f32,
    height: f32,
    cfg: &RainConfig,
    created: &mut Created,
) -> Result<Scene> {
    let root = host.create_container().map_err(Error::Host)?;
    created.nodes.push(root);
    host.add_child(parent, root);

    let background = host.create_container().map_err(Error::Host)?;
    created.nodes.push(background);
    host.add_child(root, background);
    host.paint_background(background, width, height);

    let (mw, mh) = map_size(width, height, cfg.displacement_resolution);
    let map = host.create_render_target(mw, mh).map_err(Error::Host)?;
    created.targets.push(map);

    let blur = host
        .create_blur_filter(cfg.blur_amount)
        .map_err(Error::Host)?;
    created.filters.push(blur);
    let displacement = host
        .create_displacement_filter(map, cfg.refraction_strength)
        .map_err(Error::Host)?;
    created.filters.push(displacement);
    host.set_filters(background, &[blur, displacement]);

    // Rendered into `map` only, never attached.
    let map_shape = host.create_shape().map_err(Error::Host)?;
    created.nodes.push(map_shape);

    let droplets = host.create_shape().map_err(Error::Host)?;
    created.nodes.push(droplets);
    host.add_child(root, droplets);

    let flash = host.create_shape().map_err(Error::Host)?;
    created.nodes.push(flash);
    host.add_child(root, flash);
    host.draw(flash, &[flash_rect(width, height)]);
    host.set_alpha(flash, 0.0);

    Ok(Scene {
        parent,
        root,
        background,
        map_shape,
        droplets,
        flash,
        map,
        blur,
        displacement,
    })
}

fn flash_rect(width: f32, height: f32) -> DrawCmd {
    DrawCmd::Rect {
        x: 0.0,
        y: 0.0,
        width,
        height,
        color: Rgba::WHITE,
    }
}

pub struct RainEffect<H: SceneHost> {
    host: H,
    cfg: RainConfig,
    width: f32,
    height: f32,

    pool: DropletPool,
    merger: MergeResolver,
    lightning: LightningTimer,
    projector: RenderProjector,
    rng: StdRng,

    scene: Option<Scene>,
    ticker: Option<TickerId>,
    running: bool,
    stats: FrameStats,
    frames: u64,
}

impl<H: SceneHost> RainEffect<H> {
    /// Builds the effect under `target`. The generator is seeded from
    /// `cfg.seed`, or from OS entropy when unset.
    pub fn new(host: H, target: NodeId, width: f32, height: f32, cfg: RainConfig) -> Result<Self> {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(host, target, width, height, cfg, rng)
    }

    pub fn with_rng(
        mut host: H,
        target: NodeId,
        width: f32,
        height: f32,
        cfg: RainConfig,
        mut rng: StdRng,
    ) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidDimensions { width, height });
        }

        let caps = host.capabilities();
        for (cap, name) in Capabilities::REQUIRED {
            if !caps.contains(cap) {
                return Err(Error::MissingCapability(name));
            }
        }
        if cfg.enable_interaction && !caps.contains(Capabilities::POINTER_INPUT) {
            return Err(Error::MissingCapability("pointer input"));
        }
        if !host.has_node(target) {
            return Err(Error::MissingContainer(target));
        }

        let mut created = Created::default();
        let scene = match build_scene(&mut host, target, width, height, &cfg, &mut created) {
            Ok(scene) => scene,
            Err(e) => {
                created.release(&mut host);
                return Err(e);
            }
        };

        let lightning = LightningTimer::new(cfg.lightning_interval, &mut rng);
        let mut effect = Self {
            pool: DropletPool::new(cfg.max_droplets, cfg.trail_max_length),
            merger: MergeResolver::new(cfg.cell_size()),
            projector: RenderProjector::new(cfg.max_droplets),
            lightning,
            rng,
            host,
            width,
            height,
            scene: Some(scene),
            ticker: None,
            running: false,
            stats: FrameStats::default(),
            frames: 0,
            cfg,
        };
        info!(
            width,
            height,
            capacity = effect.cfg.max_droplets,
            "rain effect created"
        );

        if effect.cfg.auto_start {
            effect.start();
        }
        Ok(effect)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &RainConfig {
        &self.cfg
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn is_destroyed(&self) -> bool {
        self.scene.is_none()
    }

    pub fn droplet_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn droplets(&self) -> impl Iterator<Item = &Droplet> + '_ {
        self.pool.iter()
    }

    pub fn droplet(&self, id: DropletId) -> Option<&Droplet> {
        self.pool.get(id)
    }

    pub fn lightning(&self) -> &LightningTimer {
        &self.lightning
    }

    pub fn last_frame(&self) -> FrameStats {
        self.stats
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ticker(&self) -> Option<TickerId> {
        self.ticker
    }

    /// The shake-offset container every visual layer hangs from.
    pub fn root(&self) -> Option<NodeId> {
        self.scene.map(|s| s.root)
    }

    pub fn background_node(&self) -> Option<NodeId> {
        self.scene.map(|s| s.background)
    }

    pub fn droplet_node(&self) -> Option<NodeId> {
        self.scene.map(|s| s.droplets)
    }

    pub fn flash_node(&self) -> Option<NodeId> {
        self.scene.map(|s| s.flash)
    }

    pub fn displacement_map(&self) -> Option<TargetId> {
        self.scene.map(|s| s.map)
    }

    pub fn spawn_rate(&self) -> f32 {
        self.cfg.spawn_rate
    }

    pub fn set_spawn_rate(&mut self, rate: f32) {
        self.cfg.spawn_rate = rate;
    }

    pub fn gravity(&self) -> f32 {
        self.cfg.gravity
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.cfg.gravity = gravity;
    }

    pub fn refraction_strength(&self) -> f32 {
        self.cfg.refraction_strength
    }

    pub fn set_refraction_strength(&mut self, strength: f32) {
        self.cfg.refraction_strength = strength;
        if let Some(scene) = self.scene {
            self.host.set_displacement_scale(scene.displacement, strength);
        }
    }

    pub fn blur_amount(&self) -> f32 {
        self.cfg.blur_amount
    }

    pub fn set_blur_amount(&mut self, amount: f32) {
        self.cfg.blur_amount = amount;
        if let Some(scene) = self.scene {
            self.host.set_blur_strength(scene.blur, amount);
        }
    }

    pub fn set_lightning_enabled(&mut self, on: bool) {
        self.cfg.enable_lightning = on;
    }

    pub fn set_lightning_interval(&mut self, interval: (f32, f32)) {
        self.cfg.lightning_interval = ordered(interval);
        self.lightning.set_interval(interval, &mut self.rng);
    }

    /// Registers with the host's frame clock. No-op when running or destroyed.
    pub fn start(&mut self) {
        if self.running || self.scene.is_none() {
            return;
        }
        self.ticker = Some(self.host.register_ticker());
        self.running = true;
        info!("rain effect started");
    }

    /// Detaches from the frame clock, keeping all state.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let Some(ticker) = self.ticker.take() {
            self.host.unregister_ticker(ticker);
        }
        self.running = false;
        info!("rain effect stopped");
    }

    /// Clears every droplet and the lightning state, then starts running.
    pub fn reset(&mut self) {
        if self.scene.is_none() {
            return;
        }
        self.stop();
        self.pool.release_all();
        self.lightning.reset(&mut self.rng);
        self.stats = FrameStats::default();
        self.render();
        info!("rain effect reset");
        self.start();
    }

    /// Terminal teardown. Repeated calls are no-ops.
    pub fn destroy(&mut self) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        self.stop();
        self.pool.release_all();
        self.pool = DropletPool::new(0, 0);

        self.host.set_filters(scene.background, &[]);
        self.host.destroy_filter(scene.displacement);
        self.host.destroy_filter(scene.blur);
        self.host.destroy_render_target(scene.map);
        self.host.remove_node(scene.map_shape);
        self.host.remove_node(scene.root);
        info!(frames = self.frames, "rain effect destroyed");
    }

    /// Changes the effect bounds, repainting the background and rebuilding
    /// the displacement map at the new size.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let Some(mut scene) = self.scene else {
            return Ok(());
        };
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidDimensions { width, height });
        }

        let (mw, mh) = map_size(width, height, self.cfg.displacement_resolution);
        let map = self
            .host
            .create_render_target(mw, mh)
            .map_err(Error::Host)?;
        let displacement = match self
            .host
            .create_displacement_filter(map, self.cfg.refraction_strength)
        {
            Ok(f) => f,
            Err(e) => {
                self.host.destroy_render_target(map);
                return Err(Error::Host(e));
            }
        };
        self.host
            .set_filters(scene.background, &[scene.blur, displacement]);
        self.host.destroy_filter(scene.displacement);
        self.host.destroy_render_target(scene.map);
        scene.map = map;
        scene.displacement = displacement;
        self.scene = Some(scene);

        self.width = width;
        self.height = height;
        self.host.paint_background(scene.background, width, height);
        self.host.draw(scene.flash, &[flash_rect(width, height)]);
        debug!(width, height, "rain effect resized");
        self.render();
        Ok(())
    }

    /// Acquires a droplet at `(x, y)`. Returns `None` when the pool is
    /// exhausted or the effect is destroyed.
    pub fn spawn_droplet_at(&mut self, x: f32, y: f32, overrides: SpawnOverrides) -> Option<DropletId> {
        self.scene?;

        let radius = match overrides.radius {
            Some(r) => r,
            None => {
                let range = (self.cfg.min_droplet_radius, self.cfg.max_droplet_radius);
                sample(range, &mut self.rng)
            }
        };
        let life = sample(self.cfg.droplet_life, &mut self.rng);

        let Some(id) = self.pool.acquire() else {
            debug!(capacity = self.pool.capacity(), "droplet pool exhausted");
            return None;
        };
        let d = self.pool.get_mut(id)?;
        d.x = x;
        d.y = y;
        d.vx = overrides.vx.unwrap_or(0.0);
        d.vy = overrides.vy.unwrap_or(0.0);
        d.set_radius(radius);
        d.life = life;
        d.max_life = life;
        Some(id)
    }

    /// Forwards a pointer event: a move sometimes spawns one droplet, a press
    /// spawns a radial burst. Returns how many droplets were spawned.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> usize {
        if !self.cfg.enable_interaction {
            return 0;
        }
        let Some(scene) = self.scene else {
            return 0;
        };
        let Some((x, y)) = self.host.to_local(scene.parent, event) else {
            return 0;
        };

        match event.kind {
            PointerKind::Move => {
                if self.rng.random::<f32>() < self.cfg.pointer_spawn_chance
                    && self.spawn_droplet_at(x, y, SpawnOverrides::default()).is_some()
                {
                    1
                } else {
                    0
                }
            }
            PointerKind::Down => self.burst(x, y),
        }
    }

    fn burst(&mut self, x: f32, y: f32) -> usize {
        let n = self.cfg.burst_count;
        let mut spawned = 0;
        for i in 0..n {
            let angle = i as f32 / n as f32 * TAU;
            let (s, c) = angle.sin_cos();
            let overrides = SpawnOverrides {
                radius: None,
                vx: Some(c * self.cfg.burst_speed),
                vy: Some(s * self.cfg.burst_speed),
            };
            let px = x + c * self.cfg.burst_radius;
            let py = y + s * self.cfg.burst_radius;
            if self.spawn_droplet_at(px, py, overrides).is_none() {
                break;
            }
            spawned += 1;
        }
        debug!(x, y, spawned, "pointer burst");
        spawned
    }

    /// Fires a lightning flash now.
    pub fn trigger_lightning(&mut self) {
        if self.scene.is_none() {
            return;
        }
        self.lightning.trigger(&mut self.rng);
        debug!(intensity = self.lightning.intensity(), "lightning triggered");
        self.apply_lightning();
    }

    /// Advances one frame by `dt` ticks. Does nothing unless running.
    pub fn tick(&mut self, dt: f32) {
        if !self.running || self.scene.is_none() || !dt.is_finite() || dt < 0.0 {
            return;
        }
        let dt = if self.cfg.max_frame_delta > 0.0 {
            dt.min(self.cfg.max_frame_delta)
        } else {
            dt
        };

        let mut stats = FrameStats {
            spawned: self.spawn_ambient(dt),
            ..FrameStats::default()
        };

        let bounds = Bounds {
            width: self.width,
            height: self.height,
        };
        stats.despawned = physics::integrate(&mut self.pool, &self.cfg, bounds, dt, &mut self.rng);
        stats.merged = self.merger.resolve(&mut self.pool, &self.cfg);

        self.lightning.decay();
        if self.cfg.enable_lightning {
            stats.flashed = self.lightning.advance(dt, &mut self.rng);
            if stats.flashed {
                debug!(intensity = self.lightning.intensity(), "lightning flash");
            }
        }

        self.render();

        stats.active = self.pool.active_count();
        self.stats = stats;
        self.frames += 1;
        trace!(
            frame = self.frames,
            spawned = stats.spawned,
            despawned = stats.despawned,
            merged = stats.merged,
            active = stats.active,
            "frame"
        );
    }

    fn spawn_ambient(&mut self, dt: f32) -> usize {
        let budget = (self.cfg.spawn_rate * dt).max(0.0);
        let mut count = budget.floor() as usize;
        if self.rng.random::<f32>() < budget.fract() {
            count += 1;
        }

        let mut spawned = 0;
        for _ in 0..count {
            let x = self.rng.random::<f32>() * self.width;
            let y = self.rng.random::<f32>() * self.height;
            if self.spawn_droplet_at(x, y, SpawnOverrides::default()).is_none() {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    fn render(&mut self) {
        let Some(scene) = self.scene else {
            return;
        };
        self.projector.project(
            self.pool.iter(),
            self.width,
            self.height,
            self.cfg.displacement_resolution,
        );
        self.host.draw(scene.map_shape, self.projector.displacement());
        self.host.render_to_target(scene.map_shape, scene.map);
        self.host.draw(scene.droplets, self.projector.visual());
        self.apply_lightning();
    }

    fn apply_lightning(&mut self) {
        let Some(scene) = self.scene else {
            return;
        };
        let (sx, sy) = self.lightning.shake();
        self.host.set_position(scene.root, sx, sy);
        self.host.set_alpha(scene.flash, self.lightning.intensity());
    }
}

impl<H: SceneHost> Drop for RainEffect<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessFilter, HeadlessHost};

    fn quiet() -> RainConfig {
        RainConfig {
            spawn_rate: 0.0,
            enable_lightning: false,
            stick_chance: 0.0,
            surface_tension: 0.0,
            droplet_life: (1000.0, 1000.0),
            seed: Some(7),
            ..Default::default()
        }
    }

    fn effect_with(cfg: RainConfig) -> RainEffect<HeadlessHost> {
        let mut host = HeadlessHost::new();
        let stage = host.stage();
        RainEffect::new(host, stage, 200.0, 100.0, cfg).unwrap()
    }

    #[test]
    fn auto_start_registers_a_ticker() {
        let fx = effect_with(quiet());
        assert!(fx.running());
        assert_eq!(fx.host().ticker_count(), 1);

        let fx = effect_with(RainConfig {
            auto_start: false,
            ..quiet()
        });
        assert!(!fx.running());
        assert_eq!(fx.host().ticker_count(), 0);
    }

    #[test]
    fn missing_container_fails_construction() {
        let host = HeadlessHost::new();
        let err = RainEffect::new(host, NodeId(99), 10.0, 10.0, quiet()).err();
        assert!(matches!(err, Some(Error::MissingContainer(NodeId(99)))));
    }

    #[test]
    fn missing_capability_fails_construction() {
        let mut host =
            HeadlessHost::with_capabilities(Capabilities::ALL.without(Capabilities::BLUR_FILTER));
        let stage = host.stage();
        let err = RainEffect::new(host, stage, 10.0, 10.0, quiet()).err();
        assert!(matches!(err, Some(Error::MissingCapability("blur filter"))));
    }

    #[test]
    fn pointer_capability_only_needed_with_interaction() {
        let caps = Capabilities::ALL.without(Capabilities::POINTER_INPUT);
        let mut host = HeadlessHost::with_capabilities(caps);
        let stage = host.stage();
        assert!(RainEffect::new(host, stage, 10.0, 10.0, quiet()).is_err());

        let mut host = HeadlessHost::with_capabilities(caps);
        let stage = host.stage();
        let cfg = RainConfig {
            enable_interaction: false,
            ..quiet()
        };
        assert!(RainEffect::new(host, stage, 10.0, 10.0, cfg).is_ok());
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let mut host = HeadlessHost::new();
        let stage = host.stage();
        let err = RainEffect::new(host, stage, 0.0, 10.0, quiet()).err();
        assert!(matches!(err, Some(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn scene_is_wired_under_target() {
        let fx = effect_with(quiet());
        let host = fx.host();
        let root = fx.root().unwrap();
        let bg = fx.background_node().unwrap();
        assert_eq!(host.node(bg).unwrap().parent, Some(root));
        assert_eq!(host.node(bg).unwrap().background, Some((200.0, 100.0)));
        assert_eq!(host.node(bg).unwrap().filters.len(), 2);
        let map = fx.displacement_map().unwrap();
        let t = host.target(map).unwrap();
        assert_eq!((t.width, t.height), (50, 25));
    }

    #[test]
    fn stop_and_start_toggle_ticker() {
        let mut fx = effect_with(quiet());
        fx.stop();
        fx.stop();
        assert!(!fx.running());
        assert_eq!(fx.host().ticker_count(), 0);
        fx.start();
        fx.start();
        assert_eq!(fx.host().ticker_count(), 1);
    }

    #[test]
    fn tick_is_ignored_while_stopped() {
        let mut fx = effect_with(quiet());
        let id = fx.spawn_droplet_at(50.0, 10.0, SpawnOverrides::default()).unwrap();
        fx.stop();
        fx.tick(1.0);
        assert_eq!(fx.droplet(id).unwrap().y, 10.0);
        assert_eq!(fx.frames(), 0);
    }

    #[test]
    fn gravity_scenario_caps_at_terminal_velocity() {
        let mut fx = effect_with(RainConfig {
            gravity: 1.0,
            terminal_velocity: 8.0,
            ..quiet()
        });
        let id = fx
            .spawn_droplet_at(
                100.0,
                0.0,
                SpawnOverrides {
                    radius: Some(5.0),
                    vx: Some(0.0),
                    vy: Some(0.0),
                },
            )
            .unwrap();
        fx.tick(1.0);
        assert_eq!(fx.droplet(id).unwrap().vy, 1.0);
        for _ in 0..9 {
            fx.tick(1.0);
        }
        assert_eq!(fx.droplet(id).unwrap().vy, 8.0);
    }

    #[test]
    fn merge_scenario_produces_radius_five() {
        let mut fx = effect_with(RainConfig {
            merge_distance: 1.8,
            gravity: 0.0,
            ..quiet()
        });
        let r3 = SpawnOverrides {
            radius: Some(3.0),
            ..Default::default()
        };
        let r4 = SpawnOverrides {
            radius: Some(4.0),
            ..Default::default()
        };
        fx.spawn_droplet_at(50.0, 50.0, r3).unwrap();
        fx.spawn_droplet_at(51.0, 50.0, r4).unwrap();
        fx.tick(1.0);
        assert_eq!(fx.droplet_count(), 1);
        assert_eq!(fx.last_frame().merged, 1);
        let d = fx.droplets().next().unwrap();
        assert!((d.radius() - 5.0).abs() < 1e-5);
        assert!((d.mass() - d.radius() * d.radius()).abs() < 1e-6);
    }

    #[test]
    fn exhausted_pool_spawns_nothing_and_leaves_others_alone() {
        let mut fx = effect_with(RainConfig {
            max_droplets: 2,
            ..quiet()
        });
        let a = fx.spawn_droplet_at(10.0, 10.0, SpawnOverrides::default()).unwrap();
        fx.spawn_droplet_at(100.0, 10.0, SpawnOverrides::default()).unwrap();
        let before = fx.droplet(a).unwrap().clone();
        assert!(fx.spawn_droplet_at(50.0, 50.0, SpawnOverrides::default()).is_none());
        assert_eq!(fx.droplet_count(), 2);
        let after = fx.droplet(a).unwrap();
        assert_eq!((after.x, after.y, after.radius()), (before.x, before.y, before.radius()));
    }

    #[test]
    fn spawned_radius_stays_in_configured_range() {
        let mut fx = effect_with(RainConfig {
            max_droplets: 50,
            ..quiet()
        });
        for i in 0..50 {
            let id = fx
                .spawn_droplet_at(i as f32 * 4.0, 50.0, SpawnOverrides::default())
                .unwrap();
            let r = fx.droplet(id).unwrap().radius();
            assert!((2.0..=6.0).contains(&r));
        }
    }

    #[test]
    fn ambient_spawn_respects_whole_rate() {
        let mut fx = effect_with(RainConfig {
            spawn_rate: 3.0,
            merge_distance: 0.0,
            ..quiet()
        });
        fx.tick(1.0);
        assert_eq!(fx.last_frame().spawned, 3);
        assert_eq!(fx.droplet_count(), 3);
    }

    #[test]
    fn reset_clears_everything_and_runs() {
        let mut fx = effect_with(RainConfig {
            enable_lightning: true,
            ..quiet()
        });
        fx.spawn_droplet_at(10.0, 10.0, SpawnOverrides::default());
        fx.trigger_lightning();
        fx.stop();

        fx.reset();
        assert_eq!(fx.droplet_count(), 0);
        assert_eq!(fx.lightning().intensity(), 0.0);
        assert_eq!(fx.lightning().shake(), (0.0, 0.0));
        assert!(fx.running());
        let flash = fx.flash_node().unwrap();
        assert_eq!(fx.host().node(flash).unwrap().alpha, 0.0);
    }

    #[test]
    fn destroy_twice_is_safe() {
        let mut fx = effect_with(quiet());
        fx.spawn_droplet_at(10.0, 10.0, SpawnOverrides::default());
        fx.destroy();
        fx.destroy();
        assert!(fx.is_destroyed());
        assert!(!fx.running());
        assert_eq!(fx.droplet_count(), 0);
        assert_eq!(fx.host().ticker_count(), 0);
        assert_eq!(fx.host().target_count(), 0);
        assert_eq!(fx.host().filter_count(), 0);
        // Only the stage remains.
        assert_eq!(fx.host().node_count(), 1);

        fx.start();
        assert!(!fx.running());
        assert!(fx.spawn_droplet_at(1.0, 1.0, SpawnOverrides::default()).is_none());
        fx.reset();
        fx.trigger_lightning();
        fx.tick(1.0);
    }

    #[test]
    fn live_filter_updates_reach_host() {
        let mut fx = effect_with(quiet());
        fx.set_refraction_strength(12.0);
        fx.set_blur_amount(3.0);
        let bg = fx.background_node().unwrap();
        let filters = fx.host().node(bg).unwrap().filters.clone();
        assert_eq!(
            fx.host().filter(filters[0]),
            Some(&HeadlessFilter::Blur { strength: 3.0 })
        );
        match fx.host().filter(filters[1]) {
            Some(HeadlessFilter::Displacement { scale, .. }) => assert_eq!(*scale, 12.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn manual_lightning_moves_root_and_lights_flash() {
        let mut fx = effect_with(quiet());
        fx.trigger_lightning();
        let flash = fx.flash_node().unwrap();
        let alpha = fx.host().node(flash).unwrap().alpha;
        assert!(alpha >= 0.7 && alpha < 1.0);
        let root = fx.root().unwrap();
        assert_eq!(fx.host().node(root).unwrap().position, fx.lightning().shake());
    }

    #[test]
    fn manual_flash_fades_with_lightning_disabled() {
        let mut fx = effect_with(quiet());
        fx.trigger_lightning();
        let flash = fx.flash_node().unwrap();
        assert!(fx.host().node(flash).unwrap().alpha > 0.0);

        let mut frames = 0;
        while fx.lightning().intensity() > 0.0 || fx.lightning().shake() != (0.0, 0.0) {
            fx.tick(1.0);
            frames += 1;
            assert!(frames < 100, "flash never settled");
        }
        assert_eq!(fx.host().node(flash).unwrap().alpha, 0.0);
        let root = fx.root().unwrap();
        assert_eq!(fx.host().node(root).unwrap().position, (0.0, 0.0));
        assert_eq!(fx.lightning().flashes(), 1);
    }

    #[test]
    fn unbounded_ranges_are_accepted() {
        let mut fx = effect_with(RainConfig {
            enable_lightning: true,
            lightning_interval: (300.0, f32::INFINITY),
            min_droplet_radius: 2.0,
            max_droplet_radius: f32::INFINITY,
            droplet_life: (50.0, f32::INFINITY),
            ..quiet()
        });
        assert_eq!(fx.lightning().cooldown(), 300.0);
        let id = fx.spawn_droplet_at(40.0, 40.0, SpawnOverrides::default()).unwrap();
        let d = fx.droplet(id).unwrap();
        assert_eq!(d.radius(), 2.0);
        assert_eq!(d.max_life, 50.0);
        fx.tick(1.0);
    }

    #[test]
    fn pointer_press_spawns_radial_burst() {
        let mut fx = effect_with(RainConfig {
            merge_distance: 0.0,
            ..quiet()
        });
        let n = fx.handle_pointer(&PointerEvent {
            kind: PointerKind::Down,
            x: 100.0,
            y: 50.0,
        });
        assert_eq!(n, 12);
        assert_eq!(fx.droplet_count(), 12);
        for d in fx.droplets() {
            let dist = ((d.x - 100.0).powi(2) + (d.y - 50.0).powi(2)).sqrt();
            assert!((dist - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn pointer_ignored_without_interaction() {
        let mut fx = effect_with(RainConfig {
            enable_interaction: false,
            ..quiet()
        });
        let n = fx.handle_pointer(&PointerEvent {
            kind: PointerKind::Down,
            x: 100.0,
            y: 50.0,
        });
        assert_eq!(n, 0);
    }

    #[test]
    fn pointer_move_spawns_at_most_one() {
        let mut fx = effect_with(RainConfig {
            pointer_spawn_chance: 1.0,
            ..quiet()
        });
        let ev = PointerEvent {
            kind: PointerKind::Move,
            x: 30.0,
            y: 40.0,
        };
        assert_eq!(fx.handle_pointer(&ev), 1);
        let d = fx.droplets().next().unwrap();
        assert_eq!((d.x, d.y), (30.0, 40.0));
    }

    #[test]
    fn resize_rebuilds_map() {
        let mut fx = effect_with(quiet());
        let old = fx.displacement_map().unwrap();
        fx.resize(400.0, 40.0).unwrap();
        let map = fx.displacement_map().unwrap();
        assert_ne!(old, map);
        assert!(fx.host().target(old).is_none());
        let t = fx.host().target(map).unwrap();
        assert_eq!((t.width, t.height), (100, 10));
        assert_eq!(fx.width(), 400.0);
    }

    #[test]
    fn tick_renders_both_passes() {
        let mut fx = effect_with(quiet());
        fx.spawn_droplet_at(100.0, 50.0, SpawnOverrides::default());
        fx.tick(1.0);
        let shape = fx.droplet_node().unwrap();
        assert!(!fx.host().node(shape).unwrap().commands.is_empty());
        let map = fx.displacement_map().unwrap();
        assert!(fx.host().target(map).unwrap().commands.len() > 1);
    }
}
