// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use rainglass::RainConfig;

use super::runtime::Theme;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  rainglass --theme night --fps 60 --max-droplets 400 --spawn-rate 0.6 --gravity 0.12 --terminal-velocity 6 --surface-tension 0.35 --refraction 30 --blur 6 --radius 2,6 --merge-distance 0.8 --trail 12 --lightning-interval 300,900";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for line in text.split_inclusive('\n') {
        if let Some(rest) = line.strip_prefix("  rainglass") {
            out.push_str("  \x1b[1;34mrainglass\x1b[0m");
            out.push_str(rest);
        } else if line.trim_end().ends_with(':') {
            out.push_str("\x1b[1;36m");
            out.push_str(line.trim_end());
            out.push_str("\x1b[0m\n");
        } else {
            out.push_str(line);
        }
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

/// `LOW,HIGH` pair of finite floats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct F32Range {
    pub low: f32,
    pub high: f32,
}

impl FromStr for F32Range {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: NUM1,NUM2".to_string())?;
        let low: f32 = a
            .trim()
            .parse()
            .map_err(|_| "invalid low value".to_string())?;
        let high: f32 = b
            .trim()
            .parse()
            .map_err(|_| "invalid high value".to_string())?;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err("range must be finite and low <= high".to_string());
        }
        Ok(Self { low, high })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "rainglass", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 't',
        long = "theme",
        default_value_t = Theme::Night,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background theme"
    )]
    pub theme: Theme,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "ascii",
        help_heading = "APPEARANCE",
        help = "Use ASCII droplet glyphs (default when LANG is not UTF-8)"
    )]
    pub ascii: bool,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the simulation for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with RUST_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        short = 'n',
        long = "max-droplets",
        default_value_t = 400,
        help_heading = "RAIN",
        help = "Droplet pool capacity (min 1 max 5000)"
    )]
    pub max_droplets: u16,

    #[arg(
        short = 'r',
        long = "spawn-rate",
        default_value_t = 0.6,
        help_heading = "RAIN",
        help = "Droplets spawned per tick (min 0 max 50)"
    )]
    pub spawn_rate: f32,

    #[arg(
        short = 'g',
        long = "gravity",
        default_value_t = 0.12,
        help_heading = "RAIN",
        help = "Vertical acceleration per tick (min 0 max 5)"
    )]
    pub gravity: f32,

    #[arg(
        long = "terminal-velocity",
        default_value_t = 6.0,
        help_heading = "RAIN",
        help = "Vertical speed cap (min 0.1 max 50)"
    )]
    pub terminal_velocity: f32,

    #[arg(
        long = "surface-tension",
        default_value_t = 0.35,
        help_heading = "RAIN",
        help = "Lateral jitter magnitude (min 0 max 5)"
    )]
    pub surface_tension: f32,

    #[arg(
        long = "radius",
        default_value = "2,6",
        help_heading = "RAIN",
        help = "Spawn radius range: LOW,HIGH (min 0.5 max 40)"
    )]
    pub radius: F32Range,

    #[arg(
        long = "merge-distance",
        default_value_t = 0.8,
        help_heading = "RAIN",
        help = "Merge distance multiplier on summed radii (min 0 max 3)"
    )]
    pub merge_distance: f32,

    #[arg(
        long = "trail",
        default_value_t = 12,
        help_heading = "RAIN",
        help = "Trail samples per droplet (min 0 max 64)"
    )]
    pub trail: u16,

    #[arg(
        long = "refraction",
        default_value_t = 30.0,
        help_heading = "GLASS",
        help = "Displacement strength (min 0 max 200)"
    )]
    pub refraction: f32,

    #[arg(
        long = "blur",
        default_value_t = 6.0,
        help_heading = "GLASS",
        help = "Background blur (min 0 max 40)"
    )]
    pub blur: f32,

    #[arg(
        long = "no-lightning",
        help_heading = "LIGHTNING",
        help = "Disable lightning flashes"
    )]
    pub no_lightning: bool,

    #[arg(
        long = "lightning-interval",
        default_value = "300,900",
        help_heading = "LIGHTNING",
        help = "Flash cooldown range in ticks: LOW,HIGH (min 10 max 100000)"
    )]
    pub lightning_interval: F32Range,

    #[arg(
        long = "no-mouse",
        help_heading = "GENERAL",
        help = "Disable mouse interaction"
    )]
    pub no_mouse: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

pub fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u16_range(name: &str, v: u16, min: u16, max: u16) -> u16 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

impl Args {
    /// Validates every numeric flag and builds the effect configuration.
    /// Out-of-range values exit the process with status 1.
    pub fn rain_config(&self) -> RainConfig {
        let radius_low = require_f32_range("--radius low", self.radius.low, 0.5, 40.0);
        let radius_high = require_f32_range("--radius high", self.radius.high, 0.5, 40.0);
        let li_low =
            require_f32_range("--lightning-interval low", self.lightning_interval.low, 10.0, 100_000.0);
        let li_high = require_f32_range(
            "--lightning-interval high",
            self.lightning_interval.high,
            10.0,
            100_000.0,
        );

        RainConfig {
            max_droplets: require_u16_range("--max-droplets", self.max_droplets, 1, 5000) as usize,
            spawn_rate: require_f32_range("--spawn-rate", self.spawn_rate, 0.0, 50.0),
            gravity: require_f32_range("--gravity", self.gravity, 0.0, 5.0),
            terminal_velocity: require_f32_range(
                "--terminal-velocity",
                self.terminal_velocity,
                0.1,
                50.0,
            ),
            surface_tension: require_f32_range("--surface-tension", self.surface_tension, 0.0, 5.0),
            refraction_strength: require_f32_range("--refraction", self.refraction, 0.0, 200.0),
            blur_amount: require_f32_range("--blur", self.blur, 0.0, 40.0),
            enable_lightning: !self.no_lightning,
            lightning_interval: (li_low, li_high),
            enable_interaction: !self.no_mouse,
            min_droplet_radius: radius_low,
            max_droplet_radius: radius_high,
            merge_distance: require_f32_range("--merge-distance", self.merge_distance, 0.0, 3.0),
            trail_max_length: require_u16_range("--trail", self.trail, 0, 64) as usize,
            seed: self.seed,
            ..Default::default()
        }
    }
}
