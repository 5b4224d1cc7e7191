// Rarity colours as stored in RarityColorTable (`"FFB400"`, `"#9452FAFF"`, ...).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `RGB`, `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
                Some(Rgba::new(short(0)?, short(1)?, short(2)?, 255))
            }
            6 => Some(Rgba::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Rgba::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// CSS form: `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                f64::from(self.a) / 255.0
            )
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Rgba::from_hex("FFB400"), Some(Rgba::new(255, 180, 0, 255)));
        assert_eq!(Rgba::from_hex("#9452faff"), Some(Rgba::new(0x94, 0x52, 0xfa, 255)));
        assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::new(255, 255, 255, 255)));
        assert_eq!(Rgba::from_hex("00000000"), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(Rgba::from_hex(""), None);
        assert_eq!(Rgba::from_hex("12345"), None);
        assert_eq!(Rgba::from_hex("zzzzzz"), None);
        assert_eq!(Rgba::from_hex("é12"), None);
    }

    #[test]
    fn test_css_output() {
        assert_eq!(Rgba::new(255, 180, 0, 255).to_css(), "#ffb400");
        assert_eq!(Rgba::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0)");
    }
}
