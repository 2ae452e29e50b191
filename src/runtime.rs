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

/// How a terminal cell shows the raster underneath it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphMode {
    /// Upper half block: two dots per cell.
    HalfBlock,
    /// Plain space with a background colour: one dot per cell.
    Ascii,
}

impl GlyphMode {
    pub fn dots_per_cell(self) -> usize {
        match self {
            GlyphMode::HalfBlock => 2,
            GlyphMode::Ascii => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Blood,
    Night,
    Ink,
    Ember,
    Moss,
    Ocean,
    Violet,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 7] = [
        ColorScheme::Blood,
        ColorScheme::Night,
        ColorScheme::Ink,
        ColorScheme::Ember,
        ColorScheme::Moss,
        ColorScheme::Ocean,
        ColorScheme::Violet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::Blood => "blood",
            ColorScheme::Night => "night",
            ColorScheme::Ink => "ink",
            ColorScheme::Ember => "ember",
            ColorScheme::Moss => "moss",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Violet => "violet",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blood" | "red" => Ok(ColorScheme::Blood),
            "night" | "dark" => Ok(ColorScheme::Night),
            "ink" | "mono" => Ok(ColorScheme::Ink),
            "ember" | "fire" => Ok(ColorScheme::Ember),
            "moss" | "forest" => Ok(ColorScheme::Moss),
            "ocean" | "deep-sea" | "deep_sea" => Ok(ColorScheme::Ocean),
            "violet" | "purple" => Ok(ColorScheme::Violet),
            _ => Err(format!("invalid color: {} (see --list-colors)", s)),
        }
    }

    /// The theme after this one, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&c| c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}
