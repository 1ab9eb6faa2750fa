//! Editor preferences: brush sizes, colors and history/gallery bounds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::Rgba;

/// Allowed draw brush diameters, in pixels.
pub const DRAW_SIZE_RANGE: (u32, u32) = (1, 20);

/// Allowed eraser diameters, in pixels.
pub const ERASE_SIZE_RANGE: (u32, u32) = (5, 50);

/// Errors for invalid settings or color strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("Invalid color '{0}': expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
}

/// An RGBA color that serializes as a `#RRGGBB` / `#RRGGBBAA` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Rgba);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);

    pub fn rgba(self) -> Rgba {
        self.0
    }
}

impl FromStr for Color {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Parse a `#RRGGBB` or `#RRGGBBAA` string into RGBA.
pub fn parse_hex_color(s: &str) -> Result<Rgba, SettingsError> {
    s.parse::<Color>().map(Color::rgba)
}

fn default_palette() -> Vec<Color> {
    [
        [0x00, 0x00, 0x00],
        [0xFF, 0x00, 0x00],
        [0x00, 0xFF, 0x00],
        [0x00, 0x00, 0xFF],
        [0xFF, 0xFF, 0x00],
        [0xFF, 0x00, 0xFF],
        [0x00, 0xFF, 0xFF],
        [0xFF, 0xA5, 0x00],
        [0x80, 0x00, 0x80],
    ]
    .into_iter()
    .map(|[r, g, b]| Color([r, g, b, 255]))
    .collect()
}

/// User-adjustable editor settings.
///
/// Missing fields deserialize to their defaults, so the UI can send a
/// partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub draw_size: u32,
    pub erase_size: u32,
    pub brush_color: Color,
    pub palette: Vec<Color>,
    /// Slider position applied when an intensity tool is selected (0-100).
    pub default_intensity: u8,
    /// Undo snapshots kept before the oldest is evicted.
    pub history_capacity: usize,
    /// Entries shown in the activity panel.
    pub history_display_limit: usize,
    /// Longest edge of images stored in the gallery.
    pub gallery_max_edge: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            draw_size: 5,
            erase_size: 20,
            brush_color: Color::BLACK,
            palette: default_palette(),
            default_intensity: 50,
            history_capacity: 20,
            history_display_limit: 10,
            gallery_max_edge: 2048,
        }
    }
}

impl EditorSettings {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("draw_size", self.draw_size, DRAW_SIZE_RANGE)?;
        check_range("erase_size", self.erase_size, ERASE_SIZE_RANGE)?;
        check_range("default_intensity", self.default_intensity as u32, (0, 100))?;

        if self.history_capacity == 0 {
            return Err(SettingsError::Zero {
                field: "history_capacity",
            });
        }
        if self.history_display_limit == 0 {
            return Err(SettingsError::Zero {
                field: "history_display_limit",
            });
        }
        if self.gallery_max_edge == 0 {
            return Err(SettingsError::Zero {
                field: "gallery_max_edge",
            });
        }
        Ok(())
    }

    /// Set the draw brush size, clamped into range.
    pub fn set_draw_size(&mut self, size: u32) -> u32 {
        self.draw_size = size.clamp(DRAW_SIZE_RANGE.0, DRAW_SIZE_RANGE.1);
        self.draw_size
    }

    /// Set the eraser size, clamped into range.
    pub fn set_erase_size(&mut self, size: u32) -> u32 {
        self.erase_size = size.clamp(ERASE_SIZE_RANGE.0, ERASE_SIZE_RANGE.1);
        self.erase_size
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), SettingsError> {
    if value < min || value > max {
        return Err(SettingsError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = EditorSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.draw_size, 5);
        assert_eq!(settings.erase_size, 20);
        assert_eq!(settings.palette.len(), 9);
        assert_eq!(settings.palette[7], Color([255, 165, 0, 255]));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000").unwrap(), [255, 0, 0, 255]);
        assert_eq!(parse_hex_color("#00ff0080").unwrap(), [0, 255, 0, 128]);
        assert_eq!(parse_hex_color(" #800080 ").unwrap(), [128, 0, 128, 255]);
    }

    #[test]
    fn test_parse_hex_color_rejects_bad_input() {
        for bad in ["FF0000", "#FFF", "#GG0000", "#FF00000", "", "#ÿÿÿ"] {
            assert!(
                matches!(parse_hex_color(bad), Err(SettingsError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color([255, 165, 0, 255]).to_string(), "#FFA500");
        assert_eq!(Color([1, 2, 3, 4]).to_string(), "#01020304");
    }

    #[test]
    fn test_size_setters_clamp() {
        let mut settings = EditorSettings::default();
        assert_eq!(settings.set_draw_size(0), 1);
        assert_eq!(settings.set_draw_size(99), 20);
        assert_eq!(settings.set_erase_size(1), 5);
        assert_eq!(settings.set_erase_size(33), 33);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut settings = EditorSettings::default();
        settings.erase_size = 60;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::OutOfRange {
                field: "erase_size",
                value: 60,
                min: 5,
                max: 50
            })
        );

        let mut settings = EditorSettings::default();
        settings.history_capacity = 0;
        assert!(matches!(settings.validate(), Err(SettingsError::Zero { .. })));
    }

    #[test]
    fn test_serde_partial_object_uses_defaults() {
        let json = r##"{"draw_size": 9, "brush_color": "#FF00FF"}"##;
        let settings: EditorSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.draw_size, 9);
        assert_eq!(settings.brush_color, Color([255, 0, 255, 255]));
        assert_eq!(settings.erase_size, 20);
        assert_eq!(settings.history_capacity, 20);
    }

    #[test]
    fn test_serde_rejects_bad_color() {
        let json = r##"{"brush_color": "red"}"##;
        assert!(serde_json::from_str::<EditorSettings>(json).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut settings = EditorSettings::default();
        settings.brush_color = Color([10, 20, 30, 40]);
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"#0A141E28\""));
        let back: EditorSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
