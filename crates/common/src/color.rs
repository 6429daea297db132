use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB colour stored as `0xRRGGBB`.
///
/// Config files and scene descriptions use sRGB hex; shaders want linear
/// floats, so conversion happens once at upload time via [`Color::linear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("invalid hex colour {0:?}: expected #rrggbb or 0xrrggbb")]
    BadHex(String),
    #[error("unknown colour name {0:?}")]
    UnknownName(String),
}

impl Color {
    pub const WHITE: Color = Color(0xffffff);
    pub const BLACK: Color = Color(0x000000);

    /// Look up one of the CSS colour keywords the scene uses.
    pub fn named(name: &str) -> Option<Self> {
        let hex = match name.to_ascii_lowercase().as_str() {
            "white" => 0xffffff,
            "black" => 0x000000,
            "red" => 0xff0000,
            "green" => 0x008000,
            "lime" => 0x00ff00,
            "blue" => 0x0000ff,
            "yellow" => 0xffff00,
            "orange" => 0xffa500,
            "pink" => 0xffc0cb,
            "gray" | "grey" => 0x808080,
            _ => return None,
        };
        Some(Self(hex))
    }

    pub fn srgb(&self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xff) as f32 / 255.0,
            ((self.0 >> 8) & 0xff) as f32 / 255.0,
            (self.0 & 0xff) as f32 / 255.0,
        ]
    }

    pub fn linear(&self) -> [f32; 3] {
        self.srgb().map(srgb_to_linear)
    }

    /// Linear colour with an alpha of one, as vertex data expects.
    pub fn linear_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.linear();
        [r, g, b, 1.0]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"));
        match digits {
            Some(d) if d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()) => {
                u32::from_str_radix(d, 16)
                    .map(Color)
                    .map_err(|_| ColorParseError::BadHex(s.to_string()))
            }
            Some(_) => Err(ColorParseError::BadHex(s.to_string())),
            None => Color::named(s).ok_or_else(|| ColorParseError::UnknownName(s.to_string())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#ff5500".parse::<Color>().unwrap(), Color(0xff5500));
        assert_eq!("0x2e2e2e".parse::<Color>().unwrap(), Color(0x2e2e2e));
        assert_eq!("  #FFFFFF ".parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn parses_names() {
        assert_eq!("pink".parse::<Color>().unwrap(), Color(0xffc0cb));
        assert_eq!("White".parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "#12345".parse::<Color>(),
            Err(ColorParseError::BadHex(_))
        ));
        assert!(matches!(
            "#zzzzzz".parse::<Color>(),
            Err(ColorParseError::BadHex(_))
        ));
        assert!(matches!(
            "mauve".parse::<Color>(),
            Err(ColorParseError::UnknownName(_))
        ));
    }

    #[test]
    fn rejects_signed_hex() {
        for text in ["#+fffff", "0x-00000", "#+0000f"] {
            assert!(
                matches!(text.parse::<Color>(), Err(ColorParseError::BadHex(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Color(0x00ff00).to_string(), "#00ff00");
    }

    #[test]
    fn linear_conversion_endpoints() {
        assert_eq!(Color::BLACK.linear(), [0.0, 0.0, 0.0]);
        let w = Color::WHITE.linear();
        for c in w {
            assert!((c - 1.0).abs() < 1e-6);
        }
        // sRGB 0.5 is roughly 0.214 linear
        let mid = Color(0x808080).linear()[0];
        assert!((mid - 0.2158).abs() < 1e-3, "{mid}");
    }
}
