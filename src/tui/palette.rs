// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use super::runtime::{ColorMode, Theme};

/// Linear RGB in `[0, 1]`.
pub type Rgb = [f32; 3];

pub const BLACK: Rgb = [0.0, 0.0, 0.0];
pub const WHITE: Rgb = [1.0, 1.0, 1.0];

/// Sky gradient, building tones and window lights for one theme.
#[derive(Clone, Debug)]
pub struct ThemeColors {
    pub sky: &'static [(u8, u8, u8)],
    pub building: (u8, u8, u8),
    pub lights: &'static [(u8, u8, u8)],
    /// Fraction of building cells that are lit windows.
    pub lit: f32,
}

pub fn theme_colors(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Night => ThemeColors {
            sky: &[(4, 6, 20), (12, 20, 52), (34, 44, 86)],
            building: (8, 10, 18),
            lights: &[(255, 200, 110), (255, 230, 170), (140, 200, 255)],
            lit: 0.22,
        },
        Theme::Dusk => ThemeColors {
            sky: &[(30, 10, 50), (120, 40, 90), (240, 120, 60)],
            building: (20, 10, 24),
            lights: &[(255, 210, 120), (255, 160, 90)],
            lit: 0.15,
        },
        Theme::Neon => ThemeColors {
            sky: &[(8, 0, 20), (30, 0, 50), (60, 10, 80)],
            building: (10, 4, 20),
            lights: &[(255, 60, 200), (60, 240, 255), (180, 80, 255)],
            lit: 0.28,
        },
        Theme::Storm => ThemeColors {
            sky: &[(20, 22, 26), (52, 56, 62), (90, 94, 100)],
            building: (16, 18, 20),
            lights: &[(220, 200, 150)],
            lit: 0.08,
        },
    }
}

pub fn rgb8(c: (u8, u8, u8)) -> Rgb {
    [c.0 as f32 / 255.0, c.1 as f32 / 255.0, c.2 as f32 / 255.0]
}

pub fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

pub fn luminance(c: Rgb) -> f32 {
    0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2]
}

/// Samples a piecewise-linear gradient at `t` in `[0, 1]`.
pub fn gradient_at(stops: &[(u8, u8, u8)], t: f32) -> Rgb {
    match stops.len() {
        0 => BLACK,
        1 => rgb8(stops[0]),
        n => {
            let segs = n - 1;
            let pos = t.clamp(0.0, 1.0) * segs as f32;
            let seg = (pos.floor() as usize).min(segs - 1);
            mix(rgb8(stops[seg]), rgb8(stops[seg + 1]), pos - seg as f32)
        }
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

/// Nearest xterm-256 index, choosing between the 6x6x6 cube and the grey ramp.
pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let q = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (q(r), q(g), q(b));
    let cube = (
        LEVELS[r6 as usize],
        LEVELS[g6 as usize],
        LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (grey_idx, grey) = match avg {
        0..=7 => (16, (0, 0, 0)),
        239..=255 => (231, (255, 255, 255)),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, (v, v, v))
        }
    };

    if dist2((r, g, b), grey) < dist2((r, g, b), cube) {
        grey_idx
    } else {
        cube_idx
    }
}

pub fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2((r, g, b), *rgb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

/// Converts a composited color to what the terminal can show.
pub fn quantize(mode: ColorMode, c: Rgb) -> Color {
    let (r, g, b) = (to_u8(c[0]), to_u8(c[1]), to_u8(c[2]));
    match mode {
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
        ColorMode::Color16 => rgb_to_color16(r, g, b),
        ColorMode::Mono => {
            if luminance(c) > 0.5 {
                Color::White
            } else {
                Color::Black
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256_prefers_grey_ramp_for_greys() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(128, 128, 128), 244);
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
    }

    #[test]
    fn color16_picks_nearest() {
        assert_eq!(rgb_to_color16(250, 10, 10), Color::Red);
        assert_eq!(rgb_to_color16(5, 5, 5), Color::Black);
    }

    #[test]
    fn gradient_hits_endpoints() {
        let stops = [(0, 0, 0), (255, 255, 255)];
        assert_eq!(gradient_at(&stops, 0.0), BLACK);
        assert_eq!(gradient_at(&stops, 1.0), WHITE);
        let mid = gradient_at(&stops, 0.5);
        assert!((mid[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn quantize_truecolor_is_exact() {
        assert_eq!(
            quantize(ColorMode::TrueColor, [1.0, 0.0, 0.5]),
            Color::Rgb { r: 255, g: 0, b: 128 }
        );
    }
}
