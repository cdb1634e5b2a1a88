// Copyright (c) 2026 rezky_nightky

//! In-memory [`SceneHost`] that keeps the scene graph as plain data.
//!
//! Useful for running the simulation without a display and for inspecting
//! what the effect submitted.

use std::collections::HashMap;

use crate::host::{
    Capabilities, DrawCmd, FilterId, NodeId, PointerEvent, SceneHost, TargetId, TickerId,
};

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Container,
    Shape,
}

#[derive(Clone, Debug)]
pub struct HeadlessNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub commands: Vec<DrawCmd>,
    pub filters: Vec<FilterId>,
    pub position: (f32, f32),
    pub alpha: f32,
    pub background: Option<(f32, f32)>,
}

impl HeadlessNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            commands: Vec::new(),
            filters: Vec::new(),
            position: (0.0, 0.0),
            alpha: 1.0,
            background: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HeadlessFilter {
    Blur { strength: f32 },
    Displacement { map: TargetId, scale: f32 },
}

#[derive(Clone, Debug)]
pub struct HeadlessTarget {
    pub width: u32,
    pub height: u32,
    /// Commands of the last shape rendered into this target.
    pub commands: Vec<DrawCmd>,
}

pub struct HeadlessHost {
    caps: Capabilities,
    next_id: u32,
    nodes: HashMap<NodeId, HeadlessNode>,
    targets: HashMap<TargetId, HeadlessTarget>,
    filters: HashMap<FilterId, HeadlessFilter>,
    tickers: Vec<TickerId>,
    /// `(x, y)` offset applied by `to_local`, as if the stage were scrolled.
    pub origin: (f32, f32),
    pub draw_calls: u64,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::ALL)
    }

    pub fn with_capabilities(caps: Capabilities) -> Self {
        Self {
            caps,
            next_id: 1,
            nodes: HashMap::new(),
            targets: HashMap::new(),
            filters: HashMap::new(),
            tickers: Vec::new(),
            origin: (0.0, 0.0),
            draw_calls: 0,
        }
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Creates a detached container, typically the stage the effect mounts on.
    pub fn stage(&mut self) -> NodeId {
        let id = NodeId(self.next());
        self.nodes.insert(id, HeadlessNode::new(NodeKind::Container));
        id
    }

    pub fn node(&self, node: NodeId) -> Option<&HeadlessNode> {
        self.nodes.get(&node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn target(&self, target: TargetId) -> Option<&HeadlessTarget> {
        self.targets.get(&target)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn filter(&self, filter: FilterId) -> Option<&HeadlessFilter> {
        self.filters.get(&filter)
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }
}

impl SceneHost for HeadlessHost {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn has_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn create_container(&mut self) -> Result<NodeId, String> {
        if !self.caps.contains(Capabilities::CONTAINERS) {
            return Err("containers unsupported".to_string());
        }
        Ok(self.stage())
    }

    fn create_shape(&mut self) -> Result<NodeId, String> {
        if !self.caps.contains(Capabilities::SHAPES) {
            return Err("shapes unsupported".to_string());
        }
        let id = NodeId(self.next());
        self.nodes.insert(id, HeadlessNode::new(NodeKind::Shape));
        Ok(id)
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes.contains_key(&parent) {
            return;
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        } else {
            return;
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
        if let Some(n) = self.nodes.get_mut(&node) {
            n.background = Some((width, height));
        }
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<TargetId, String> {
        if !self.caps.contains(Capabilities::RENDER_TARGETS) {
            return Err("render targets unsupported".to_string());
        }
        let id = TargetId(self.next());
        self.targets.insert(
            id,
            HeadlessTarget {
                width,
                height,
                commands: Vec::new(),
            },
        );
        Ok(id)
    }

    fn destroy_render_target(&mut self, target: TargetId) {
        self.targets.remove(&target);
    }

    fn create_blur_filter(&mut self, strength: f32) -> Result<FilterId, String> {
        let id = FilterId(self.next());
        self.filters.insert(id, HeadlessFilter::Blur { strength });
        Ok(id)
    }

    fn create_displacement_filter(
        &mut self,
        map: TargetId,
        scale: f32,
    ) -> Result<FilterId, String> {
        if !self.targets.contains_key(&map) {
            return Err(format!("unknown render target {:?}", map));
        }
        let id = FilterId(self.next());
        self.filters
            .insert(id, HeadlessFilter::Displacement { map, scale });
        Ok(id)
    }

    fn set_blur_strength(&mut self, filter: FilterId, strength: f32) {
        if let Some(HeadlessFilter::Blur { strength: s }) = self.filters.get_mut(&filter) {
            *s = strength;
        }
    }

    fn set_displacement_scale(&mut self, filter: FilterId, scale: f32) {
        if let Some(HeadlessFilter::Displacement { scale: s, .. }) = self.filters.get_mut(&filter)
        {
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
            self.draw_calls += 1;
        }
    }

    fn render_to_target(&mut self, shape: NodeId, target: TargetId) {
        let Some(n) = self.nodes.get(&shape) else {
            return;
        };
        if let Some(t) = self.targets.get_mut(&target) {
            t.commands.clear();
            t.commands.extend_from_slice(&n.commands);
        }
    }

    fn set_position(&mut self, node: NodeId, x: f32, y: f32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.position = (x, y);
        }
    }

    fn set_alpha(&mut self, node: NodeId, alpha: f32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.alpha = alpha;
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
        if !self.nodes.contains_key(&node) {
            return None;
        }
        Some((event.x - self.origin.0, event.y - self.origin.1))
    }
}
