//! Light/dark appearance, derived from the configured theme mode.
//!
//! Nothing here reads ambient state: callers pass the `ThemeMode` from `Config` and whatever the
//! platform reports as its colour scheme, and get colours back.

use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ThemeMode {
    /// Follow the system colour scheme
    Auto,
    Light,
    Dark,
}

impl FromStr for ThemeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "system" => Ok(ThemeMode::Auto),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(anyhow!("unknown theme mode: {}", s)),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Auto => write!(f, "auto"),
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

/// Colour scheme reported by the platform.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SystemScheme {
    Light,
    Dark,
}

impl SystemScheme {
    /// Interprets a `COLORFGBG` style value ("15;0"): the last field is the background colour
    /// index, and 0-6 or 8 are dark backgrounds.
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        match bg {
            0..=6 | 8 => Some(SystemScheme::Dark),
            _ => Some(SystemScheme::Light),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    pub fn resolve(mode: ThemeMode, system: Option<SystemScheme>) -> Self {
        match (mode, system) {
            (ThemeMode::Auto, Some(SystemScheme::Dark)) => Appearance::Dark,
            (ThemeMode::Auto, _) => Appearance::Light,
            (ThemeMode::Light, _) => Appearance::Light,
            (ThemeMode::Dark, _) => Appearance::Dark,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Appearance::Dark
    }
}

/// Style of the icons drawn on a bar; "light" icons go on dark bars.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BarStyle {
    Light,
    Dark,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Palette {
    pub screen_background: &'static str,
    pub navigation_bar_background: &'static str,
    pub navigation_bar_buttons: BarStyle,
    pub status_bar: BarStyle,
    pub text: &'static str,
    pub muted_text: &'static str,
    pub accent: &'static str,
    pub teal: &'static str,
}

impl Palette {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Palette {
                screen_background: "#FFFFFF",
                navigation_bar_background: "#FFFFFF",
                navigation_bar_buttons: BarStyle::Dark,
                status_bar: BarStyle::Dark,
                text: "#1F2937",
                muted_text: "#6B7280",
                accent: "#3B82F6",
                teal: "#0D9488",
            },
            Appearance::Dark => Palette {
                screen_background: "#201E1E",
                navigation_bar_background: "#1A1A1A",
                navigation_bar_buttons: BarStyle::Light,
                status_bar: BarStyle::Light,
                text: "#F9FAFB",
                muted_text: "#9CA3AF",
                accent: "#60A5FA",
                teal: "#14B8A6",
            },
        }
    }

    pub fn resolve(mode: ThemeMode, system: Option<SystemScheme>) -> Self {
        Self::for_appearance(Appearance::resolve(mode, system))
    }
}

/// Parses "#RRGGBB" into its components.
pub fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

#[test]
fn test_resolve_appearance() {
    use SystemScheme::*;
    assert_eq!(Appearance::resolve(ThemeMode::Auto, Some(Dark)), Appearance::Dark);
    assert_eq!(Appearance::resolve(ThemeMode::Auto, Some(Light)), Appearance::Light);
    assert_eq!(Appearance::resolve(ThemeMode::Auto, None), Appearance::Light);
    assert_eq!(Appearance::resolve(ThemeMode::Light, Some(Dark)), Appearance::Light);
    assert_eq!(Appearance::resolve(ThemeMode::Dark, Some(Light)), Appearance::Dark);
}

#[test]
fn test_palette() {
    let dark = Palette::resolve(ThemeMode::Auto, Some(SystemScheme::Dark));
    assert_eq!(dark.navigation_bar_background, "#1A1A1A");
    assert_eq!(dark.navigation_bar_buttons, BarStyle::Light);
    assert_eq!(dark.status_bar, BarStyle::Light);

    let light = Palette::resolve(ThemeMode::Light, Some(SystemScheme::Dark));
    assert_eq!(light.navigation_bar_background, "#FFFFFF");
    assert_eq!(light.navigation_bar_buttons, BarStyle::Dark);
    assert_eq!(light.screen_background, "#FFFFFF");
}

#[test]
fn test_theme_mode_and_scheme_parsing() {
    assert_eq!(ThemeMode::from_str("Dark").unwrap(), ThemeMode::Dark);
    assert_eq!(ThemeMode::from_str(" system ").unwrap(), ThemeMode::Auto);
    assert!(ThemeMode::from_str("sepia").is_err());

    assert_eq!(SystemScheme::from_colorfgbg("15;0"), Some(SystemScheme::Dark));
    assert_eq!(SystemScheme::from_colorfgbg("0;15"), Some(SystemScheme::Light));
    assert_eq!(SystemScheme::from_colorfgbg("15;default;0"), Some(SystemScheme::Dark));
    assert_eq!(SystemScheme::from_colorfgbg(""), None);
}

#[test]
fn test_hex_rgb() {
    assert_eq!(hex_rgb("#0D9488"), Some((0x0d, 0x94, 0x88)));
    assert_eq!(hex_rgb("0D9488"), None);
    assert_eq!(hex_rgb("#0D94"), None);
    assert_eq!(hex_rgb("#GGGGGG"), None);
}
