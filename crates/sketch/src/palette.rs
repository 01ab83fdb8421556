use std::fmt;

use serde::{Serialize, Serializer};

/// 8-bit RGBA colour in the gamma-encoded space the palette is authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the same colour with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Normalised channels, still gamma encoded.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Normalised channels with RGB decoded from sRGB to linear light.
    pub fn to_linear_f32(self) -> [f32; 4] {
        let [r, g, b, a] = self.to_f32();
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.040_45 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Orange ramp used by the loading spinner, from `#ff4800` to `#ffb600`.
pub const PALETTE: [Rgba; 10] = [
    Rgba::rgb(0xff, 0x48, 0x00),
    Rgba::rgb(0xff, 0x54, 0x00),
    Rgba::rgb(0xff, 0x60, 0x00),
    Rgba::rgb(0xff, 0x6d, 0x00),
    Rgba::rgb(0xff, 0x79, 0x00),
    Rgba::rgb(0xff, 0x85, 0x00),
    Rgba::rgb(0xff, 0x91, 0x00),
    Rgba::rgb(0xff, 0x9e, 0x00),
    Rgba::rgb(0xff, 0xaa, 0x00),
    Rgba::rgb(0xff, 0xb6, 0x00),
];

/// Palette entry for an ellipse index; repeats every `PALETTE.len()` indices.
pub fn color_for(index: usize) -> Rgba {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_matches_reference_hex() {
        let expected = [
            "#ff4800", "#ff5400", "#ff6000", "#ff6d00", "#ff7900", "#ff8500", "#ff9100",
            "#ff9e00", "#ffaa00", "#ffb600",
        ];
        let hex: Vec<String> = PALETTE.iter().map(ToString::to_string).collect();
        assert_eq!(hex, expected);
        assert_eq!(Rgba::WHITE.with_alpha(0).to_string(), "#ffffff00");
    }

    #[test]
    fn colors_cycle_every_ten_indices() {
        for index in 0..64 {
            assert_eq!(color_for(index), color_for(index + 10));
        }
        assert_eq!(color_for(13), PALETTE[3]);
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        let [r, g, b, a] = Rgba::rgba(255, 0, 0, 255).to_linear_f32();
        assert!((r - 1.0).abs() < 1e-6);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
        assert_eq!(a, 1.0);
        let [mid, ..] = Rgba::rgb(128, 0, 0).to_linear_f32();
        assert!(mid < 128.0 / 255.0);
    }
}
