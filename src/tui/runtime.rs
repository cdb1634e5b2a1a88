// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

/// Background art the terminal host paints behind the glass.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    /// Deep blue sky over a lit skyline.
    Night,
    /// Violet to orange sunset.
    Dusk,
    /// Magenta and cyan signage.
    Neon,
    /// Grey overcast, few lights.
    Storm,
}

/// Glyphs for trail, small, medium and large droplets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphSet(pub [char; 4]);

impl GlyphSet {
    pub const ASCII: GlyphSet = GlyphSet(['.', 'o', 'O', '@']);
    pub const UNICODE: GlyphSet = GlyphSet(['·', '∘', '○', '◯']);

    pub fn trail(self) -> char {
        self.0[0]
    }

    pub fn for_radius(self, radius: f32) -> char {
        if radius < 3.0 {
            self.0[1]
        } else if radius < 6.0 {
            self.0[2]
        } else {
            self.0[3]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_grows_with_radius() {
        let g = GlyphSet::ASCII;
        assert_eq!(g.for_radius(2.0), 'o');
        assert_eq!(g.for_radius(4.0), 'O');
        assert_eq!(g.for_radius(9.0), '@');
        assert_eq!(g.trail(), '.');
    }
}
