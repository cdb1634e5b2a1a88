// Copyright (c) 2026 rezky_nightky

mod tui;

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use rainglass::{PointerEvent, PointerKind, RainEffect};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::tui::args::{
    color_enabled_stdout, default_params_usage_for_help, require_f64_range, Args,
};
use crate::tui::frame::Frame;
use crate::tui::host::{cell_center, TermHost};
use crate::tui::runtime::{ColorMode, GlyphSet, Theme};
use crate::tui::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

/// Simulation ticks per wall-clock second.
const TICKS_PER_SECOND: f32 = 60.0;

fn build_info() -> &'static str {
    env!("RAINGLASS_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        None => detect_color_mode_auto(),
        Some(0) => ColorMode::Mono,
        Some(16) => ColorMode::Color16,
        Some(8) | Some(256) => ColorMode::Color256,
        Some(24) | Some(32) => ColorMode::TrueColor,
        Some(m) => {
            eprintln!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m);
            std::process::exit(1);
        }
    }
}

fn next_theme(t: Theme) -> Theme {
    match t {
        Theme::Night => Theme::Dusk,
        Theme::Dusk => Theme::Neon,
        Theme::Neon => Theme::Storm,
        Theme::Storm => Theme::Night,
    }
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)
}

fn main() -> io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Commit: {}", env!("RAINGLASS_GIT_SHA"));
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() { "(unset)" } else { &colorterm }
        );
        println!("  TERM: {}", if term.is_empty() { "(unset)" } else { &term });
        println!("  auto_detected: {}", detect_color_mode_auto().label());
        println!("  effective: {}", detect_color_mode(&args).label());
        return Ok(());
    }

    let cfg = args.rain_config();
    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let end_after = match args.duration {
        Some(s) if s.is_finite() && s > 0.0 => Some(require_f64_range("--duration", s, 0.1, 86400.0)),
        Some(s) if !s.is_finite() => {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        _ => None,
    };
    let color_mode = detect_color_mode(&args);
    let glyphs = if args.ascii || default_to_ascii() {
        GlyphSet::ASCII
    } else {
        GlyphSet::UNICODE
    };

    if let Some(path) = &args.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("failed to open log file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    let mut term = Terminal::new(!args.no_mouse)?;
    let (cols, rows) = term.size()?;
    info!(cols, rows, mode = color_mode.label(), "terminal session started");

    let host_seed = args.seed.unwrap_or_else(rand::random);
    let mut host = TermHost::new(cols, rows, args.theme, glyphs, !args.no_mouse, host_seed);
    let stage = host.stage();
    let (w, h) = host.extent();
    let mut rain = RainEffect::new(host, stage, w, h, cfg).map_err(io::Error::other)?;
    let mut frame = Frame::new(cols, rows);

    let start_time = Instant::now();
    let end_time = end_after.map(|s| start_time + Duration::from_secs_f64(s));
    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut last_tick = Instant::now();

    let mut perf_frames: u64 = 0;
    let mut perf_work_sum_s: f64 = 0.0;
    let mut perf_work_max_s: f32 = 0.0;
    let mut perf_peak_droplets: usize = 0;

    let mut quit = false;
    while !quit {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            quit = true;
                            break;
                        }
                        match (k.code, k.modifiers) {
                            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => quit = true,
                            (KeyCode::Char('c'), KeyModifiers::CONTROL) => quit = true,
                            (KeyCode::Char(' '), _) => rain.reset(),
                            (KeyCode::Char('l'), _) => rain.trigger_lightning(),
                            (KeyCode::Char('p'), _) => {
                                if rain.running() {
                                    rain.stop();
                                } else {
                                    rain.start();
                                    last_tick = Instant::now();
                                }
                            }
                            (KeyCode::Char('t'), _) => {
                                let theme = next_theme(rain.host().theme());
                                rain.host_mut().set_theme(theme);
                                frame.mark_all_dirty();
                            }
                            (KeyCode::Char('+'), _) | (KeyCode::Char('='), KeyModifiers::SHIFT) => {
                                let r = (rain.spawn_rate() + 0.2).min(50.0);
                                rain.set_spawn_rate(r);
                            }
                            (KeyCode::Char('-'), _) => {
                                let r = (rain.spawn_rate() - 0.2).max(0.0);
                                rain.set_spawn_rate(r);
                            }
                            (KeyCode::Up, _) => {
                                let g = (rain.gravity() + 0.02).min(5.0);
                                rain.set_gravity(g);
                            }
                            (KeyCode::Down, _) => {
                                let g = (rain.gravity() - 0.02).max(0.0);
                                rain.set_gravity(g);
                            }
                            (KeyCode::Right, _) => {
                                let s = (rain.refraction_strength() + 5.0).min(200.0);
                                rain.set_refraction_strength(s);
                            }
                            (KeyCode::Left, _) => {
                                let s = (rain.refraction_strength() - 5.0).max(0.0);
                                rain.set_refraction_strength(s);
                            }
                            (KeyCode::Char('b'), _) => {
                                let b = (rain.blur_amount() + 1.0).min(40.0);
                                rain.set_blur_amount(b);
                            }
                            (KeyCode::Char('B'), _) => {
                                let b = (rain.blur_amount() - 1.0).max(0.0);
                                rain.set_blur_amount(b);
                            }
                            _ => {}
                        }
                    }
                    Event::Mouse(m) => {
                        let kind = match m.kind {
                            MouseEventKind::Down(_) => Some(PointerKind::Down),
                            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                                Some(PointerKind::Move)
                            }
                            _ => None,
                        };
                        if let Some(kind) = kind {
                            let (x, y) = cell_center(m.column, m.row);
                            rain.handle_pointer(&PointerEvent { kind, x, y });
                        }
                    }
                    _ => {}
                }
            }

            if quit || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }
            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if quit {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            rain.host_mut().resize(nw, nh);
            let (w, h) = rain.host().extent();
            if let Err(e) = rain.resize(w, h) {
                warn!(error = %e, "resize rejected");
            }
            frame = Frame::new(nw, nh);
        }

        let work_start = Instant::now();
        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f32() * TICKS_PER_SECOND;
        last_tick = now;
        if rain.host().is_ticking() {
            rain.tick(dt);
        }
        rain.host_mut().compose(&mut frame, color_mode);
        if frame.has_changes() {
            term.draw(&mut frame)?;
        }

        if args.perf_stats {
            let work_s = work_start.elapsed().as_secs_f32();
            perf_frames = perf_frames.saturating_add(1);
            perf_work_sum_s += work_s as f64;
            perf_work_max_s = perf_work_max_s.max(work_s);
            perf_peak_droplets = perf_peak_droplets.max(rain.droplet_count());
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    let flashes = rain.lightning().flashes();
    rain.destroy();
    drop(term);
    info!("terminal session ended");

    if args.perf_stats {
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let frames = perf_frames.max(1);
        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", perf_frames as f64 / elapsed_s);
        println!("  frames: {}", perf_frames);
        println!(
            "  avg_work_ms: {:.3}",
            perf_work_sum_s / frames as f64 * 1000.0
        );
        println!("  max_work_ms: {:.3}", perf_work_max_s as f64 * 1000.0);
        println!("  peak_droplets: {}", perf_peak_droplets);
        println!("  lightning_flashes: {}", flashes);
    }

    Ok(())
}
