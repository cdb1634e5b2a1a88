// Copyright (c) 2026 rezky_nightky

//! [`SceneHost`] on a terminal cell grid.
//!
//! Effect coordinates are finer than cells: one cell covers `CELL_W` by
//! `CELL_H` effect units, which keeps droplet radii meaningful at terminal
//! resolution. Composition walks the scene graph from its roots and folds
//! every visible node into one color per cell plus an optional glyph.

use std::collections::HashMap;

use crossterm::style::Color;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rainglass::{
    Capabilities, DrawCmd, FilterId, NodeId, PointerEvent, Rgba, SceneHost, TargetId, TickerId,
};

use super::cell::Cell;
use super::frame::Frame;
use super::palette::{gradient_at, luminance, mix, quantize, rgb8, theme_colors, Rgb, ThemeColors, BLACK, WHITE};
use super::runtime::{ColorMode, GlyphSet, Theme};

pub const CELL_W: f32 = 4.0;
pub const CELL_H: f32 = 8.0;

const OVERLAY_GAIN: f32 = 0.65;
const GLYPH_MIN_RADIUS: f32 = 2.0;
const GLYPH_MIN_ALPHA: f32 = 0.4;
const TRAIL_MIN_ALPHA: f32 = 0.05;

/// Effect-space center of a terminal cell.
pub fn cell_center(col: u16, row: u16) -> (f32, f32) {
    ((col as f32 + 0.5) * CELL_W, (row as f32 + 0.5) * CELL_H)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Container,
    Shape,
}

struct Canvas {
    size: (f32, f32),
    cols: usize,
    rows: usize,
    px: Vec<Rgb>,
    blurred: Vec<Rgb>,
    blur_key: Option<(usize, usize)>,
}

impl Canvas {
    fn new(width: f32, height: f32, colors: &ThemeColors, rng: &mut StdRng) -> Self {
        let cols = (width / CELL_W).ceil().max(1.0) as usize;
        let rows = (height / CELL_H).ceil().max(1.0) as usize;
        let px = skyline(cols, rows, colors, rng);
        Self {
            size: (width, height),
            cols,
            rows,
            px,
            blurred: Vec::new(),
            blur_key: None,
        }
    }

    fn ensure_blur(&mut self, strength: f32) {
        let rx = (strength.max(0.0) / CELL_W).round() as usize;
        let ry = (strength.max(0.0) / CELL_H).round() as usize;
        if self.blur_key == Some((rx, ry)) {
            return;
        }
        self.blurred = box_blur(&self.px, self.cols, self.rows, rx, ry);
        self.blur_key = Some((rx, ry));
    }

    /// Nearest-cell lookup in canvas cell units, clamped at the edges.
    fn sample(&self, fx: f32, fy: f32) -> Rgb {
        let src = if self.blur_key.is_some() {
            &self.blurred
        } else {
            &self.px
        };
        let x = (fx.floor().max(0.0) as usize).min(self.cols - 1);
        let y = (fy.floor().max(0.0) as usize).min(self.rows - 1);
        src.get(y * self.cols + x).copied().unwrap_or(BLACK)
    }
}

fn skyline(cols: usize, rows: usize, colors: &ThemeColors, rng: &mut StdRng) -> Vec<Rgb> {
    let mut px = vec![BLACK; cols * rows];
    for y in 0..rows {
        let sky = gradient_at(colors.sky, y as f32 / (rows - 1).max(1) as f32);
        px[y * cols..(y + 1) * cols].fill(sky);
    }

    let building = rgb8(colors.building);
    let mut x = 0;
    while x < cols {
        let w = rng.random_range(3..=9).min(cols - x);
        let h = (rows as f32 * rng.random_range(0.2f32..0.65)).round() as usize;
        let top = rows.saturating_sub(h);
        let shade = mix(building, BLACK, rng.random_range(0.0f32..0.4));

        for y in top..rows {
            for cx in x..x + w {
                let window = y > top && (cx - x) % 2 == 1;
                px[y * cols + cx] = if window
                    && !colors.lights.is_empty()
                    && rng.random::<f32>() < colors.lit
                {
                    rgb8(colors.lights[rng.random_range(0..colors.lights.len())])
                } else {
                    shade
                };
            }
        }
        x += w + rng.random_range(0..=1);
    }
    px
}

fn box_blur(src: &[Rgb], cols: usize, rows: usize, rx: usize, ry: usize) -> Vec<Rgb> {
    let pass = |input: &[Rgb], horizontal: bool, radius: usize| -> Vec<Rgb> {
        if radius == 0 {
            return input.to_vec();
        }
        let mut out = vec![BLACK; input.len()];
        for y in 0..rows {
            for x in 0..cols {
                let (pos, len) = if horizontal { (x, cols) } else { (y, rows) };
                let lo = pos.saturating_sub(radius);
                let hi = (pos + radius).min(len - 1);
                let mut acc = [0.0f32; 3];
                for k in lo..=hi {
                    let idx = if horizontal { y * cols + k } else { k * cols + x };
                    for (a, v) in acc.iter_mut().zip(input[idx]) {
                        *a += v;
                    }
                }
                let n = (hi - lo + 1) as f32;
                out[y * cols + x] = [acc[0] / n, acc[1] / n, acc[2] / n];
            }
        }
        out
    };
    let h = pass(src, true, rx);
    pass(&h, false, ry)
}

struct TermNode {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    commands: Vec<DrawCmd>,
    filters: Vec<FilterId>,
    position: (f32, f32),
    alpha: f32,
    canvas: Option<Canvas>,
}

impl TermNode {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            commands: Vec::new(),
            filters: Vec::new(),
            position: (0.0, 0.0),
            alpha: 1.0,
            canvas: None,
        }
    }
}

enum TermFilter {
    Blur { strength: f32 },
    Displacement { map: TargetId, scale: f32 },
}

/// Red and green channels of a rasterized displacement map.
struct MapTarget {
    width: u32,
    height: u32,
    px: Vec<[f32; 2]>,
}

impl MapTarget {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            px: vec![[0.5, 0.5]; width as usize * height as usize],
        }
    }

    fn rasterize(&mut self, commands: &[DrawCmd]) {
        let (w, h) = (self.width as usize, self.height as usize);
        for cmd in commands {
            match *cmd {
                DrawCmd::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    let x0 = x.max(0.0) as usize;
                    let y0 = y.max(0.0) as usize;
                    let x1 = ((x + width).ceil().max(0.0) as usize).min(w);
                    let y1 = ((y + height).ceil().max(0.0) as usize).min(h);
                    for py in y0..y1 {
                        for px in x0..x1 {
                            blend_rg(&mut self.px[py * w + px], color);
                        }
                    }
                }
                DrawCmd::Circle {
                    x,
                    y,
                    radius,
                    color,
                } => {
                    let x0 = (x - radius).floor().max(0.0) as usize;
                    let y0 = (y - radius).floor().max(0.0) as usize;
                    let x1 = ((x + radius).ceil().max(0.0) as usize).min(w);
                    let y1 = ((y + radius).ceil().max(0.0) as usize).min(h);
                    for py in y0..y1 {
                        for px in x0..x1 {
                            let dx = px as f32 + 0.5 - x;
                            let dy = py as f32 + 0.5 - y;
                            if dx * dx + dy * dy <= radius * radius {
                                blend_rg(&mut self.px[py * w + px], color);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Offset in effect units at map pixel `(mx, my)`.
    fn offset(&self, mx: f32, my: f32, scale: f32) -> (f32, f32) {
        if self.width == 0 || self.height == 0 {
            return (0.0, 0.0);
        }
        let x = (mx.max(0.0) as usize).min(self.width as usize - 1);
        let y = (my.max(0.0) as usize).min(self.height as usize - 1);
        let [r, g] = self.px[y * self.width as usize + x];
        ((r - 0.5) * scale, (g - 0.5) * scale)
    }
}

fn blend_rg(px: &mut [f32; 2], color: Rgba) {
    let a = color.a.clamp(0.0, 1.0);
    px[0] += (color.r - px[0]) * a;
    px[1] += (color.g - px[1]) * a;
}

pub struct TermHost {
    cols: u16,
    rows: u16,
    caps: Capabilities,
    theme: Theme,
    glyphs: GlyphSet,
    rng: StdRng,

    next_id: u32,
    nodes: HashMap<NodeId, TermNode>,
    targets: HashMap<TargetId, MapTarget>,
    filters: HashMap<FilterId, TermFilter>,
    tickers: Vec<TickerId>,

    color: Vec<Rgb>,
    glyph: Vec<Option<(char, Rgb)>>,
}

impl TermHost {
    pub fn new(cols: u16, rows: u16, theme: Theme, glyphs: GlyphSet, pointer: bool, seed: u64) -> Self {
        let caps = if pointer {
            Capabilities::ALL
        } else {
            Capabilities::ALL.without(Capabilities::POINTER_INPUT)
        };
        Self {
            cols,
            rows,
            caps,
            theme,
            glyphs,
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
            nodes: HashMap::new(),
            targets: HashMap::new(),
            filters: HashMap::new(),
            tickers: Vec::new(),
            color: Vec::new(),
            glyph: Vec::new(),
        }
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Creates a detached root container covering the terminal.
    pub fn stage(&mut self) -> NodeId {
        let id = NodeId(self.next());
        self.nodes.insert(id, TermNode::new(Kind::Container));
        id
    }

    /// Effect-space size of the grid.
    pub fn extent(&self) -> (f32, f32) {
        (self.cols as f32 * CELL_W, self.rows as f32 * CELL_H)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switches the background art and repaints every canvas.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        let colors = theme_colors(theme);
        for node in self.nodes.values_mut() {
            if let Some(canvas) = node.canvas.as_mut() {
                *canvas = Canvas::new(canvas.size.0, canvas.size.1, &colors, &mut self.rng);
            }
        }
    }

    /// True while some effect wants frames.
    pub fn is_ticking(&self) -> bool {
        !self.tickers.is_empty()
    }

    fn origin_of(&self, node: NodeId) -> Option<(f32, f32)> {
        let mut cur = self.nodes.get(&node)?;
        let mut origin = cur.position;
        while let Some(parent) = cur.parent.and_then(|p| self.nodes.get(&p)) {
            origin.0 += parent.position.0;
            origin.1 += parent.position.1;
            cur = parent;
        }
        Some(origin)
    }

    /// Folds the scene into `frame`, which must match the grid size.
    pub fn compose(&mut self, frame: &mut Frame, mode: ColorMode) {
        let n = self.cols as usize * self.rows as usize;
        self.color.clear();
        self.color.resize(n, BLACK);
        self.glyph.clear();
        self.glyph.resize(n, None);

        let mut roots: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none() && node.kind == Kind::Container)
            .map(|(&id, _)| id)
            .collect();
        roots.sort_unstable_by_key(|id| id.0);
        for root in roots {
            self.visit(root, (0.0, 0.0), 1.0);
        }

        for i in 0..n.min(frame.len()) {
            let bg = self.color[i];
            let cell = match (mode, self.glyph[i]) {
                (ColorMode::Mono, Some((ch, _))) => Cell::glyph(ch, Color::White, Color::Reset),
                (ColorMode::Mono, None) => {
                    let l = luminance(bg);
                    let ch = if l > 0.6 {
                        '#'
                    } else if l > 0.3 {
                        ':'
                    } else if l > 0.12 {
                        '.'
                    } else {
                        ' '
                    };
                    Cell::glyph(ch, Color::Grey, Color::Reset)
                }
                (_, Some((ch, fg))) => Cell::glyph(ch, quantize(mode, fg), quantize(mode, bg)),
                (_, None) => Cell::fill(quantize(mode, bg)),
            };
            frame.set_index(i, cell);
        }
    }

    fn visit(&mut self, id: NodeId, origin: (f32, f32), alpha: f32) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let origin = (origin.0 + node.position.0, origin.1 + node.position.1);
        let alpha = alpha * node.alpha;
        if alpha <= 0.0 {
            return;
        }
        let children = node.children.clone();
        let has_canvas = node.canvas.is_some();
        let is_shape = node.kind == Kind::Shape;

        if has_canvas {
            self.paint_canvas(id, origin, alpha);
        }
        if is_shape {
            self.paint_shape(id, origin, alpha);
        }
        for child in children {
            self.visit(child, origin, alpha);
        }
    }

    fn paint_canvas(&mut self, id: NodeId, origin: (f32, f32), alpha: f32) {
        let mut blur = None;
        let mut displacement = None;
        if let Some(node) = self.nodes.get(&id) {
            for f in &node.filters {
                match self.filters.get(f) {
                    Some(TermFilter::Blur { strength }) => blur = Some(*strength),
                    Some(TermFilter::Displacement { map, scale }) => {
                        displacement = Some((*map, *scale))
                    }
                    None => {}
                }
            }
        }

        let Some(canvas) = self.nodes.get_mut(&id).and_then(|n| n.canvas.as_mut()) else {
            return;
        };
        match blur {
            Some(strength) => canvas.ensure_blur(strength),
            None => canvas.blur_key = None,
        }

        let Some(canvas) = self.nodes.get(&id).and_then(|n| n.canvas.as_ref()) else {
            return;
        };
        let map = displacement.and_then(|(m, s)| self.targets.get(&m).map(|t| (t, s)));
        let cols = self.cols as usize;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let (cx, cy) = cell_center(col, row);
                let ex = cx - origin.0;
                let ey = cy - origin.1;
                let (dx, dy) = match map {
                    Some((t, scale)) => t.offset(
                        ex / canvas.size.0 * t.width as f32,
                        ey / canvas.size.1 * t.height as f32,
                        scale,
                    ),
                    None => (0.0, 0.0),
                };
                let c = canvas.sample((ex + dx) / CELL_W, (ey + dy) / CELL_H);
                let i = row as usize * cols + col as usize;
                self.color[i] = mix(self.color[i], c, alpha);
            }
        }
    }

    fn paint_shape(&mut self, id: NodeId, origin: (f32, f32), alpha: f32) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let cols = self.cols as usize;
        let rows = self.rows as usize;

        for cmd in &node.commands {
            match *cmd {
                DrawCmd::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    let a = color.a * alpha * OVERLAY_GAIN;
                    let rgb = [color.r, color.g, color.b];
                    for row in 0..rows {
                        for col in 0..cols {
                            let (cx, cy) = cell_center(col as u16, row as u16);
                            let (lx, ly) = (cx - origin.0, cy - origin.1);
                            if lx >= x && lx < x + width && ly >= y && ly < y + height {
                                let i = row * cols + col;
                                self.color[i] = mix(self.color[i], rgb, a);
                                if let Some((_, fg)) = self.glyph[i].as_mut() {
                                    *fg = mix(*fg, rgb, a);
                                }
                            }
                        }
                    }
                }
                DrawCmd::Circle {
                    x,
                    y,
                    radius,
                    color,
                } => {
                    let (x, y) = (x + origin.0, y + origin.1);
                    let a = color.a * alpha;
                    let rgb = [color.r, color.g, color.b];

                    let c0 = ((x - radius) / CELL_W).floor().max(0.0) as usize;
                    let r0 = ((y - radius) / CELL_H).floor().max(0.0) as usize;
                    let c1 = (((x + radius) / CELL_W).floor().max(0.0) as usize).min(cols.saturating_sub(1));
                    let r1 = (((y + radius) / CELL_H).floor().max(0.0) as usize).min(rows.saturating_sub(1));

                    let center = if x >= 0.0 && y >= 0.0 {
                        let col = (x / CELL_W) as usize;
                        let row = (y / CELL_H) as usize;
                        (col < cols && row < rows).then_some(row * cols + col)
                    } else {
                        None
                    };

                    let mut hit = false;
                    for row in r0..=r1 {
                        for col in c0..=c1 {
                            if row >= rows || col >= cols {
                                continue;
                            }
                            let (cx, cy) = cell_center(col as u16, row as u16);
                            if (cx - x).powi(2) + (cy - y).powi(2) <= radius * radius {
                                let i = row * cols + col;
                                self.color[i] = mix(self.color[i], rgb, a);
                                hit = true;
                            }
                        }
                    }

                    let Some(i) = center else {
                        continue;
                    };
                    if !hit {
                        self.color[i] = mix(self.color[i], rgb, a);
                    }
                    if radius >= GLYPH_MIN_RADIUS {
                        if a >= GLYPH_MIN_ALPHA {
                            let tint = mix(rgb, WHITE, 0.3);
                            self.glyph[i] = Some((self.glyphs.for_radius(radius), tint));
                        } else if a > TRAIL_MIN_ALPHA && self.glyph[i].is_none() {
                            self.glyph[i] = Some((self.glyphs.trail(), rgb));
                        }
                    }
                }
            }
        }
    }
}

impl SceneHost for TermHost {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn has_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn create_container(&mut self) -> Result<NodeId, String> {
        Ok(self.stage())
    }

    fn create_shape(&mut self) -> Result<NodeId, String> {
        let id = NodeId(self.next());
        self.nodes.insert(id, TermNode::new(Kind::Shape));
        Ok(id)
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes.contains_key(&parent) {
            return;
        }
        match self.nodes.get_mut(&child) {
            Some(c) => c.parent = Some(parent),
            None => return,
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        let Some(n) = self.nodes.remove(&node) else {
            return;
        };
        if let Some(parent) = n.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != node);
        }
        for child in n.children {
            self.remove_node(child);
        }
    }

    fn paint_background(&mut self, node: NodeId, width: f32, height: f32) {
        let colors = theme_colors(self.theme);
        if let Some(n) = self.nodes.get_mut(&node) {
            n.canvas = Some(Canvas::new(width, height, &colors, &mut self.rng));
        }
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<TargetId, String> {
        let id = TargetId(self.next());
        self.targets.insert(id, MapTarget::new(width, height));
        Ok(id)
    }

    fn destroy_render_target(&mut self, target: TargetId) {
        self.targets.remove(&target);
    }

    fn create_blur_filter(&mut self, strength: f32) -> Result<FilterId, String> {
        let id = FilterId(self.next());
        self.filters.insert(id, TermFilter::Blur { strength });
        Ok(id)
    }

    fn create_displacement_filter(&mut self, map: TargetId, scale: f32) -> Result<FilterId, String> {
        if !self.targets.contains_key(&map) {
            return Err(format!("unknown render target {}", map.0));
        }
        let id = FilterId(self.next());
        self.filters.insert(id, TermFilter::Displacement { map, scale });
        Ok(id)
    }

    fn set_blur_strength(&mut self, filter: FilterId, strength: f32) {
        if let Some(TermFilter::Blur { strength: s }) = self.filters.get_mut(&filter) {
            *s = strength;
        }
    }

    fn set_displacement_scale(&mut self, filter: FilterId, scale: f32) {
        if let Some(TermFilter::Displacement { scale: s, .. }) = self.filters.get_mut(&filter) {
            *s = scale;
        }
    }

    fn set_filters(&mut self, node: NodeId, filters: &[FilterId]) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.filters.clear();
            n.filters.extend_from_slice(filters);
        }
    }

    fn destroy_filter(&mut self, filter: FilterId) {
        self.filters.remove(&filter);
    }

    fn draw(&mut self, shape: NodeId, commands: &[DrawCmd]) {
        if let Some(n) = self.nodes.get_mut(&shape) {
            n.commands.clear();
            n.commands.extend_from_slice(commands);
        }
    }

    fn render_to_target(&mut self, shape: NodeId, target: TargetId) {
        let Some(n) = self.nodes.get(&shape) else {
            return;
        };
        if let Some(t) = self.targets.get_mut(&target) {
            t.px.fill([0.5, 0.5]);
            t.rasterize(&n.commands);
        }
    }

    fn set_position(&mut self, node: NodeId, x: f32, y: f32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.position = (x, y);
        }
    }

    fn set_alpha(&mut self, node: NodeId, alpha: f32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn register_ticker(&mut self) -> TickerId {
        let id = TickerId(self.next());
        self.tickers.push(id);
        id
    }

    fn unregister_ticker(&mut self, ticker: TickerId) {
        self.tickers.retain(|&t| t != ticker);
    }

    fn to_local(&self, node: NodeId, event: &PointerEvent) -> Option<(f32, f32)> {
        let (ox, oy) = self.origin_of(node)?;
        Some((event.x - ox, event.y - oy))
    }
}
