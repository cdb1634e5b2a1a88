// Copyright (c) 2026 rezky_nightky

//! Terminal front end: a crossterm-backed scene host and its CLI.

pub mod args;
pub mod cell;
pub mod frame;
pub mod host;
pub mod palette;
pub mod runtime;
pub mod terminal;
