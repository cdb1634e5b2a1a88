// Copyright (c) 2026 rezky_nightky

use crate::droplet::Droplet;
use crate::host::{DrawCmd, Rgba};

/// Neutral displacement: sampled at 0.5 the filter does not offset.
pub const NEUTRAL: Rgba = Rgba::new(0.5, 0.5, 0.5, 1.0);
const LENS_RINGS: usize = 3;
const LENS_GAIN: f32 = 0.45;
const TRAIL_LENS: f32 = 0.15;

const BODY: Rgba = Rgba::new(0.78, 0.86, 0.95, 0.55);
const HIGHLIGHT: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.8);
const TRAIL: Rgba = Rgba::new(0.7, 0.8, 0.92, 0.35);

/// Turns droplet state into the two draw passes. The command buffers are
/// reused between frames.
#[derive(Default)]
pub struct RenderProjector {
    displacement: Vec<DrawCmd>,
    visual: Vec<DrawCmd>,
}

impl RenderProjector {
    pub fn new(capacity: usize) -> Self {
        Self {
            displacement: Vec::with_capacity(capacity * (LENS_RINGS + 1) + 1),
            visual: Vec::with_capacity(capacity * 2),
        }
    }

    pub fn displacement(&self) -> &[DrawCmd] {
        &self.displacement
    }

    pub fn visual(&self) -> &[DrawCmd] {
        &self.visual
    }

    pub fn project<'a>(
        &mut self,
        droplets: impl Iterator<Item = &'a Droplet>,
        width: f32,
        height: f32,
        map_scale: f32,
    ) {
        self.displacement.clear();
        self.visual.clear();

        self.displacement.push(DrawCmd::Rect {
            x: 0.0,
            y: 0.0,
            width: width * map_scale,
            height: height * map_scale,
            color: NEUTRAL,
        });

        for d in droplets {
            if d.is_merged() {
                continue;
            }
            self.project_trail(d, map_scale);
            self.project_droplet(d, map_scale);
        }
    }

    fn project_trail(&mut self, d: &Droplet, map_scale: f32) {
        let n = d.trail_len().max(1) as f32;
        // The newest sample sits under the droplet itself.
        for (i, p) in d.trail().enumerate().skip(1) {
            let fade = 1.0 - i as f32 / n;
            self.visual.push(DrawCmd::Circle {
                x: p.x,
                y: p.y,
                radius: p.radius,
                color: TRAIL.with_alpha(TRAIL.a * fade),
            });
            let v = 0.5 + TRAIL_LENS * fade;
            self.displacement.push(DrawCmd::Circle {
                x: p.x * map_scale,
                y: p.y * map_scale,
                radius: p.radius * map_scale,
                color: Rgba::new(v, v, 0.5, 1.0),
            });
        }
    }

    fn project_droplet(&mut self, d: &Droplet, map_scale: f32) {
        let r = d.radius();
        let fade = (d.life_fraction() * 4.0).min(1.0);

        for ring in 0..LENS_RINGS {
            let t = (ring + 1) as f32 / LENS_RINGS as f32;
            let v = 0.5 + LENS_GAIN * t;
            self.displacement.push(DrawCmd::Circle {
                x: d.x * map_scale,
                y: d.y * map_scale,
                radius: r * (1.0 - ring as f32 / LENS_RINGS as f32) * map_scale,
                color: Rgba::new(v, v, 0.5, 1.0),
            });
        }

        self.visual.push(DrawCmd::Circle {
            x: d.x,
            y: d.y,
            radius: r,
            color: BODY.with_alpha(BODY.a * fade),
        });
        self.visual.push(DrawCmd::Circle {
            x: d.x - r * 0.35,
            y: d.y - r * 0.35,
            radius: r * 0.3,
            color: HIGHLIGHT.with_alpha(HIGHLIGHT.a * fade),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DropletPool;

    fn pool_with_droplet() -> DropletPool {
        let mut pool = DropletPool::new(2, 4);
        let id = pool.acquire().unwrap();
        let d = pool.get_mut(id).unwrap();
        d.x = 40.0;
        d.y = 80.0;
        d.set_radius(4.0);
        d.life = 100.0;
        d.max_life = 100.0;
        pool
    }

    #[test]
    fn empty_scene_is_a_neutral_map() {
        let pool = DropletPool::new(2, 4);
        let mut proj = RenderProjector::new(2);
        proj.project(pool.iter(), 100.0, 200.0, 0.25);
        assert_eq!(
            proj.displacement(),
            &[DrawCmd::Rect {
                x: 0.0,
                y: 0.0,
                width: 25.0,
                height: 50.0,
                color: NEUTRAL,
            }]
        );
        assert!(proj.visual().is_empty());
    }

    #[test]
    fn droplet_projects_scaled_lens_and_full_res_body() {
        let pool = pool_with_droplet();
        let mut proj = RenderProjector::new(2);
        proj.project(pool.iter(), 100.0, 200.0, 0.25);

        assert_eq!(proj.displacement().len(), 1 + LENS_RINGS);
        match proj.displacement()[1] {
            DrawCmd::Circle { x, y, radius, .. } => {
                assert_eq!((x, y, radius), (10.0, 20.0, 1.0));
            }
            other => panic!("unexpected {:?}", other),
        }
        match proj.visual()[0] {
            DrawCmd::Circle { x, y, radius, .. } => {
                assert_eq!((x, y, radius), (40.0, 80.0, 4.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trail_samples_fade_with_age() {
        let mut pool = pool_with_droplet();
        let id = pool.active_ids().next().unwrap();
        {
            let d = pool.get_mut(id).unwrap();
            for y in [60.0, 70.0, 80.0] {
                d.y = y;
                d.record_trail(2.0, 4);
            }
        }
        let mut proj = RenderProjector::new(2);
        proj.project(pool.iter(), 100.0, 200.0, 0.5);

        let alphas: Vec<f32> = proj
            .visual()
            .iter()
            .take(2)
            .map(|c| match c {
                DrawCmd::Circle { color, .. } => color.a,
                DrawCmd::Rect { color, .. } => color.a,
            })
            .collect();
        assert_eq!(alphas.len(), 2);
        assert!(alphas[0] > alphas[1]);
    }
}
