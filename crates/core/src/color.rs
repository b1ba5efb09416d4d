use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::error::Error;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Linear interpolation in sRGB space, `t = 0` is `self`.
    pub fn mix(self, other: Color, t: f64) -> Self {
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The 20-color categorical palette tiles are drawn from.
pub const CATEGORY20: [Color; 20] = [
    Color::from_hex(0x1f77b4),
    Color::from_hex(0xaec7e8),
    Color::from_hex(0xff7f0e),
    Color::from_hex(0xffbb78),
    Color::from_hex(0x2ca02c),
    Color::from_hex(0x98df8a),
    Color::from_hex(0xd62728),
    Color::from_hex(0xff9896),
    Color::from_hex(0x9467bd),
    Color::from_hex(0xc5b0d5),
    Color::from_hex(0x8c564b),
    Color::from_hex(0xc49c94),
    Color::from_hex(0xe377c2),
    Color::from_hex(0xf7b6d2),
    Color::from_hex(0x7f7f7f),
    Color::from_hex(0xc7c7c7),
    Color::from_hex(0xbcbd22),
    Color::from_hex(0xdbdb8d),
    Color::from_hex(0x17becf),
    Color::from_hex(0x9edae5),
];

/// How far each palette color is pulled toward white.
pub const DEFAULT_FADE: f64 = 0.2;

/// Binds category names to palette slots in first-seen order.
///
/// Slot `n` goes to the `n`-th distinct category asked for, wrapping around
/// the palette. Bindings are never reassigned, so one encoder shared by the
/// tiles and the legend of a view gives both the same colors.
#[derive(Debug, Clone)]
pub struct ColorEncoder {
    base: Vec<Color>,
    faded: Vec<Color>,
    slots: HashMap<String, usize>,
    order: Vec<String>,
}

impl Default for ColorEncoder {
    fn default() -> Self {
        Self::with_palette(&CATEGORY20, DEFAULT_FADE)
    }
}

impl ColorEncoder {
    /// Encoder over `palette`, each color pulled toward white by `fade`.
    pub fn new(palette: &[Color], fade: f64) -> crate::Result<Self> {
        if palette.is_empty() {
            return Err(Error::InvalidConfig("color palette is empty".into()));
        }
        Ok(Self::with_palette(palette, fade))
    }

    fn with_palette(palette: &[Color], fade: f64) -> Self {
        Self {
            base: palette.to_vec(),
            faded: palette.iter().map(|c| c.mix(Color::WHITE, fade)).collect(),
            slots: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The faded color for `category`, binding the next slot if it is new.
    pub fn color_for(&mut self, category: &str) -> Color {
        let slot = match self.slots.get(category) {
            Some(&slot) => slot,
            None => {
                let slot = self.order.len() % self.faded.len();
                tracing::debug!("Bound category '{}' to palette slot {}", category, slot);
                self.slots.insert(category.to_string(), slot);
                self.order.push(category.to_string());
                slot
            }
        };
        self.faded[slot]
    }

    /// Lookup without binding.
    pub fn get(&self, category: &str) -> Option<Color> {
        self.slots.get(category).map(|&slot| self.faded[slot])
    }

    /// The unfaded palette color bound to `category`.
    pub fn base_color(&self, category: &str) -> Option<Color> {
        self.slots.get(category).map(|&slot| self.base[slot])
    }

    /// Bound categories in binding order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, Color)> + '_ {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.faded[self.slots[name]]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for ColorEncoder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.bindings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_blends_toward_white() {
        // 0x1f + (0xff - 0x1f) * 0.2 = 75.8
        assert_eq!(CATEGORY20[0].mix(Color::WHITE, 0.2), Color::rgb(76, 146, 195));
        assert_eq!(Color::WHITE.mix(Color::rgb(0, 0, 0), 0.0), Color::WHITE);
    }

    #[test]
    fn binds_in_first_seen_order() {
        let mut enc = ColorEncoder::default();
        let wii = enc.color_for("Wii");
        let ds = enc.color_for("DS");
        assert_eq!(enc.color_for("Wii"), wii);
        assert_eq!(wii, CATEGORY20[0].mix(Color::WHITE, 0.2));
        assert_eq!(ds, CATEGORY20[1].mix(Color::WHITE, 0.2));
        assert_eq!(enc.base_color("DS"), Some(CATEGORY20[1]));
        let order: Vec<_> = enc.bindings().map(|(name, _)| name).collect();
        assert_eq!(order, ["Wii", "DS"]);
    }

    #[test]
    fn wraps_after_palette_is_exhausted() {
        let mut enc = ColorEncoder::default();
        let first = enc.color_for("c0");
        for i in 1..20 {
            enc.color_for(&format!("c{i}"));
        }
        assert_eq!(enc.color_for("c20"), first);
        assert_eq!(enc.len(), 21);
    }

    #[test]
    fn get_does_not_bind() {
        let enc = ColorEncoder::default();
        assert_eq!(enc.get("nope"), None);
        assert!(enc.is_empty());
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(matches!(ColorEncoder::new(&[], 0.2), Err(Error::InvalidConfig(_))));
        let mut enc = ColorEncoder::new(&CATEGORY20[..2], 0.0).unwrap();
        enc.color_for("a");
        enc.color_for("b");
        assert_eq!(enc.color_for("c"), CATEGORY20[0]);
    }

    #[test]
    fn hex_display() {
        assert_eq!(CATEGORY20[2].to_string(), "#ff7f0e");
        assert_eq!(serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap(), "\"#010203\"");
    }
}
