//! Color themes for the dashboard
//!
//! Four retro schemes, selected with `--theme`.

use ratatui::style::Color;
use std::fmt;
use std::str::FromStr;

use crate::metrics::PnlClass;
use crate::types::BlockClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Muted modern palette
    #[default]
    Nord,
    /// White on blue
    DosBlue,
    AmberCrt,
    GreenPhosphor,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nord" => Ok(Theme::Nord),
            "dos" | "dosblue" | "dos-blue" => Ok(Theme::DosBlue),
            "amber" | "ambercrt" | "amber-crt" => Ok(Theme::AmberCrt),
            "green" | "greenphosphor" | "green-phosphor" => Ok(Theme::GreenPhosphor),
            _ => Err(format!(
                "Unknown theme '{s}'. Available: nord, dos-blue, amber-crt, green-phosphor"
            )),
        }
    }
}

impl Theme {
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Nord => ColorScheme::nord(),
            Theme::DosBlue => ColorScheme::dos_blue(),
            Theme::AmberCrt => ColorScheme::amber_crt(),
            Theme::GreenPhosphor => ColorScheme::green_phosphor(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Nord => "nord",
            Theme::DosBlue => "dos-blue",
            Theme::AmberCrt => "amber-crt",
            Theme::GreenPhosphor => "green-phosphor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
    /// Secondary text and labels
    pub text_dim: Color,
    /// Active tab and focused input border
    pub focus_border: Color,
    pub unfocused_border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Headline numbers (height, balances)
    pub accent: Color,
    /// Inline "error loading" placeholders
    pub placeholder_error: Color,
    pub pnl_positive: Color,
    pub pnl_negative: Color,
    pub connected: Color,
    pub disconnected: Color,
    /// Epoch progress gauge fill
    pub gauge: Color,
    pub toast_success: Color,
    pub toast_error: Color,
}

impl ColorScheme {
    pub fn nord() -> Self {
        Self {
            background: Color::Black,
            text: Color::White,
            text_dim: Color::Gray,
            focus_border: Color::Yellow,
            unfocused_border: Color::Gray,
            selection_bg: Color::Yellow,
            selection_fg: Color::Black,
            accent: Color::Cyan,
            placeholder_error: Color::LightRed,
            pnl_positive: Color::Green,
            pnl_negative: Color::Red,
            connected: Color::Green,
            disconnected: Color::Red,
            gauge: Color::Cyan,
            toast_success: Color::Green,
            toast_error: Color::Red,
        }
    }

    pub fn dos_blue() -> Self {
        Self {
            background: Color::Blue,
            text: Color::White,
            text_dim: Color::LightBlue,
            focus_border: Color::Yellow,
            unfocused_border: Color::Cyan,
            selection_bg: Color::Cyan,
            selection_fg: Color::Black,
            accent: Color::LightCyan,
            placeholder_error: Color::LightRed,
            pnl_positive: Color::LightGreen,
            pnl_negative: Color::LightRed,
            connected: Color::LightGreen,
            disconnected: Color::LightRed,
            gauge: Color::Yellow,
            toast_success: Color::LightGreen,
            toast_error: Color::LightRed,
        }
    }

    pub fn amber_crt() -> Self {
        let amber = Color::Rgb(255, 176, 0);
        let amber_bright = Color::Rgb(255, 200, 100);
        let amber_dim = Color::Rgb(180, 120, 0);

        Self {
            background: Color::Black,
            text: amber,
            text_dim: amber_dim,
            focus_border: amber_bright,
            unfocused_border: amber_dim,
            selection_bg: amber,
            selection_fg: Color::Black,
            accent: amber_bright,
            placeholder_error: Color::Red,
            pnl_positive: Color::Rgb(100, 255, 100),
            pnl_negative: Color::Red,
            connected: amber_bright,
            disconnected: Color::Red,
            gauge: amber,
            toast_success: Color::Rgb(100, 255, 100),
            toast_error: Color::Red,
        }
    }

    pub fn green_phosphor() -> Self {
        let green = Color::Rgb(0, 255, 0);
        let green_dim = Color::Rgb(0, 180, 0);
        let green_bright = Color::Rgb(100, 255, 100);

        Self {
            background: Color::Black,
            text: green,
            text_dim: green_dim,
            focus_border: green_bright,
            unfocused_border: green_dim,
            selection_bg: green,
            selection_fg: Color::Black,
            accent: green_bright,
            placeholder_error: Color::Red,
            pnl_positive: green_bright,
            pnl_negative: Color::Red,
            connected: green_bright,
            disconnected: Color::Red,
            gauge: green,
            toast_success: green_bright,
            toast_error: Color::Red,
        }
    }

    pub fn pnl(&self, class: PnlClass) -> Color {
        match class {
            PnlClass::Positive => self.pnl_positive,
            PnlClass::Negative => self.pnl_negative,
        }
    }

    pub fn block_class(&self, class: BlockClass) -> Color {
        match class {
            BlockClass::Consensus => self.text_dim,
            BlockClass::Governance => self.focus_border,
            BlockClass::Value => self.pnl_positive,
            BlockClass::Supply => self.accent,
            BlockClass::Unknown => self.unfocused_border,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_parse() {
        assert_eq!("nord".parse::<Theme>(), Ok(Theme::Nord));
        assert_eq!("NORD".parse::<Theme>(), Ok(Theme::Nord));
        assert_eq!("dos".parse::<Theme>(), Ok(Theme::DosBlue));
        assert_eq!("amber-crt".parse::<Theme>(), Ok(Theme::AmberCrt));
        assert_eq!("green".parse::<Theme>(), Ok(Theme::GreenPhosphor));
        assert!("solarized".parse::<Theme>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for t in [Theme::Nord, Theme::DosBlue, Theme::AmberCrt, Theme::GreenPhosphor] {
            assert_eq!(t.to_string().parse::<Theme>(), Ok(t));
        }
    }

    #[test]
    fn pnl_colors_differ_in_every_theme() {
        for t in [Theme::Nord, Theme::DosBlue, Theme::AmberCrt, Theme::GreenPhosphor] {
            let c = t.colors();
            assert_ne!(c.pnl(PnlClass::Positive), c.pnl(PnlClass::Negative), "{t}");
            assert_ne!(c.connected, c.disconnected, "{t}");
        }
    }
}
