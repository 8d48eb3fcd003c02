//! Color stops handed to the compositor.

use std::str::FromStr;

use serde::Serialize;

/// Default stops used when the host never sends colors.
pub const DEFAULT_COLORS: [&str; 3] = ["#5227FF", "#FF9FFC", "#B19EEF"];

/// Linear 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Components scaled to `[0, 1]`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl FromStr for Rgb {
    type Err = PaletteError;

    /// Parse `#rgb` or `#rrggbb`; the leading `#` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PaletteError::InvalidHex(s.to_string()));
        }

        let parse = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|_| PaletteError::InvalidHex(s.to_string()))
        };
        match hex.len() {
            3 => {
                // #abc expands to #aabbcc
                let expand = |i: usize| parse(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb {
                    r: expand(0)?,
                    g: expand(1)?,
                    b: expand(2)?,
                })
            }
            6 => Ok(Rgb {
                r: parse(&hex[0..2])?,
                g: parse(&hex[2..4])?,
                b: parse(&hex[4..6])?,
            }),
            _ => Err(PaletteError::InvalidHex(s.to_string())),
        }
    }
}

/// Ordered color ramp with at least two stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    stops: Vec<Rgb>,
}

impl Palette {
    /// Build from hex strings. An empty list gives two white stops and a
    /// single color is duplicated, so a ramp always has two ends.
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self, PaletteError> {
        let mut stops = colors
            .iter()
            .map(|c| c.as_ref().parse::<Rgb>())
            .collect::<Result<Vec<_>, _>>()?;

        match stops.len() {
            0 => stops = vec![Rgb::WHITE, Rgb::WHITE],
            1 => stops.push(stops[0]),
            _ => {}
        }
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }
}

impl Default for Palette {
    fn default() -> Self {
        // Hard-coded stops are valid hex
        Self::from_hex(&DEFAULT_COLORS).unwrap_or(Self {
            stops: vec![Rgb::WHITE, Rgb::WHITE],
        })
    }
}

/// Palette parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaletteError {
    #[error("Invalid hex color '{0}'")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_hex() {
        assert_eq!(
            "#5227FF".parse::<Rgb>().unwrap(),
            Rgb {
                r: 0x52,
                g: 0x27,
                b: 0xFF
            }
        );
        assert_eq!("#fa0".parse::<Rgb>().unwrap(), Rgb { r: 255, g: 170, b: 0 });
        assert_eq!("b19eef".parse::<Rgb>().unwrap().b, 0xEF);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "#", "#12", "#12345", "#gggggg", "#+12", "red"] {
            assert!(bad.parse::<Rgb>().is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_empty_list_gives_two_white_stops() {
        let palette = Palette::from_hex::<&str>(&[]).unwrap();
        assert_eq!(palette.stops(), &[Rgb::WHITE, Rgb::WHITE]);
    }

    #[test]
    fn test_single_color_is_duplicated() {
        let palette = Palette::from_hex(&["#000"]).unwrap();
        assert_eq!(palette.stops().len(), 2);
        assert_eq!(palette.stops()[0], palette.stops()[1]);
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.stops().len(), 3);
        assert_eq!(palette.stops()[1].to_unit()[0], 1.0);
    }

    #[test]
    fn test_one_bad_color_fails_whole_palette() {
        let err = Palette::from_hex(&["#fff", "nope"]).unwrap_err();
        assert_eq!(err, PaletteError::InvalidHex("nope".to_string()));
    }
}
