// Copyright (c) 2026 rezky_nightky

//! The rendering host the effect draws through.
//!
//! The effect never touches concrete rendering types. A host hands out opaque
//! ids for nodes, render targets, filters and frame tickers, and accepts draw
//! command lists for shape nodes.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickerId(pub u32);

/// Primitives a host supports.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const CONTAINERS: Capabilities = Capabilities(0x1);
    pub const SHAPES: Capabilities = Capabilities(0x2);
    pub const RENDER_TARGETS: Capabilities = Capabilities(0x4);
    pub const BLUR_FILTER: Capabilities = Capabilities(0x8);
    pub const DISPLACEMENT_FILTER: Capabilities = Capabilities(0x10);
    pub const FRAME_CLOCK: Capabilities = Capabilities(0x20);
    pub const POINTER_INPUT: Capabilities = Capabilities(0x40);

    pub const ALL: Capabilities = Capabilities(0x7F);

    /// Everything the effect needs regardless of configuration.
    pub const REQUIRED: [(Capabilities, &'static str); 6] = [
        (Capabilities::CONTAINERS, "container nodes"),
        (Capabilities::SHAPES, "shape drawing"),
        (Capabilities::RENDER_TARGETS, "render targets"),
        (Capabilities::BLUR_FILTER, "blur filter"),
        (Capabilities::DISPLACEMENT_FILTER, "displacement filter"),
        (Capabilities::FRAME_CLOCK, "frame clock"),
    ];

    pub fn contains(self, other: Capabilities) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    pub fn without(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 & !other.0)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capabilities({:#x})", self.0)
    }
}

/// Straight-alpha color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCmd {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: Rgba,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Down,
}

/// A pointer event in host coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

pub trait SceneHost {
    fn capabilities(&self) -> Capabilities;
    fn has_node(&self, node: NodeId) -> bool;

    fn create_container(&mut self) -> Result<NodeId, String>;
    fn create_shape(&mut self) -> Result<NodeId, String>;
    fn add_child(&mut self, parent: NodeId, child: NodeId);
    fn remove_node(&mut self, node: NodeId);

    /// Fills `node` with the host's procedural background art.
    fn paint_background(&mut self, node: NodeId, width: f32, height: f32);

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<TargetId, String>;
    fn destroy_render_target(&mut self, target: TargetId);

    fn create_blur_filter(&mut self, strength: f32) -> Result<FilterId, String>;
    fn create_displacement_filter(&mut self, map: TargetId, scale: f32)
        -> Result<FilterId, String>;
    fn set_blur_strength(&mut self, filter: FilterId, strength: f32);
    fn set_displacement_scale(&mut self, filter: FilterId, scale: f32);
    fn set_filters(&mut self, node: NodeId, filters: &[FilterId]);
    fn destroy_filter(&mut self, filter: FilterId);

    /// Replaces the contents of a shape node.
    fn draw(&mut self, shape: NodeId, commands: &[DrawCmd]);
    fn render_to_target(&mut self, shape: NodeId, target: TargetId);

    fn set_position(&mut self, node: NodeId, x: f32, y: f32);
    fn set_alpha(&mut self, node: NodeId, alpha: f32);

    /// While a ticker is registered the host calls the effect's `tick` once
    /// per frame.
    fn register_ticker(&mut self) -> TickerId;
    fn unregister_ticker(&mut self, ticker: TickerId);

    /// Maps a host pointer event into `node`'s local coordinates.
    fn to_local(&self, node: NodeId, event: &PointerEvent) -> Option<(f32, f32)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_requires_every_bit() {
        let caps = Capabilities::CONTAINERS.union(Capabilities::SHAPES);
        assert!(caps.contains(Capabilities::SHAPES));
        assert!(!caps.contains(Capabilities::SHAPES.union(Capabilities::BLUR_FILTER)));
        assert!(Capabilities::ALL.contains(caps));
        assert!(!Capabilities::ALL
            .without(Capabilities::FRAME_CLOCK)
            .contains(Capabilities::FRAME_CLOCK));
    }

    #[test]
    fn all_covers_required() {
        for (cap, _) in Capabilities::REQUIRED {
            assert!(Capabilities::ALL.contains(cap));
        }
        assert!(Capabilities::ALL.contains(Capabilities::POINTER_INPUT));
    }
}
