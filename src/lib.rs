// Copyright (c) 2026 rezky_nightky

//! Rain on glass.
//!
//! A fixed pool of droplets slides down a pane under gravity and surface
//! tension, merges on contact, and refracts a blurred background through a
//! displacement map. Occasional lightning flashes brighten the scene and
//! shake it.
//!
//! Rendering goes through a [`SceneHost`]. [`HeadlessHost`] keeps the scene as
//! plain data; the `rainglass` binary ships a terminal host.
//!
//! ```
//! use rainglass::{HeadlessHost, RainConfig, RainEffect};
//!
//! let mut host = HeadlessHost::new();
//! let stage = host.stage();
//! let cfg = RainConfig { seed: Some(1), ..Default::default() };
//! let mut rain = RainEffect::new(host, stage, 320.0, 200.0, cfg).unwrap();
//! for _ in 0..60 {
//!     rain.tick(1.0);
//! }
//! assert!(rain.droplet_count() <= rain.config().max_droplets);
//! rain.destroy();
//! ```

pub mod config;
pub mod droplet;
pub mod effect;
pub mod error;
pub mod headless;
pub mod host;
pub mod lightning;
pub mod merge;
pub mod physics;
pub mod pool;
pub mod render;
pub mod spatial;

pub use config::RainConfig;
pub use droplet::{Droplet, DropletId, SpawnOverrides, TrailPoint};
pub use effect::{FrameStats, RainEffect};
pub use error::{Error, Result};
pub use headless::HeadlessHost;
pub use host::{
    Capabilities, DrawCmd, FilterId, NodeId, PointerEvent, PointerKind, Rgba, SceneHost,
    TargetId, TickerId,
};
pub use lightning::LightningTimer;
pub use pool::DropletPool;
