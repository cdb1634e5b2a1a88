// Copyright (c) 2026 rezky_nightky

//! Construction-time errors. Runtime operations never fail.

use thiserror::Error;

use crate::host::NodeId;

#[derive(Debug, Error)]
pub enum Error {
    /// The host does not provide a primitive the effect needs.
    #[error("scene host is missing a required capability: {0}")]
    MissingCapability(&'static str),

    /// The target container is unknown to the host.
    #[error("target container {0:?} does not exist in the scene host")]
    MissingContainer(NodeId),

    #[error("invalid effect dimensions {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },

    /// A host primitive failed while the scene was being built.
    #[error("scene host error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, Error>;
