//! Selectable window themes.

use egui::{Stroke, Visuals};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Mocha,
}

/// Catppuccin Mocha palette.
mod mocha {
    use egui::Color32;

    pub const BASE: Color32 = Color32::from_rgb(30, 30, 46);
    pub const MANTLE: Color32 = Color32::from_rgb(24, 24, 37);
    pub const CRUST: Color32 = Color32::from_rgb(17, 17, 27);
    pub const SURFACE0: Color32 = Color32::from_rgb(49, 50, 68);
    pub const SURFACE1: Color32 = Color32::from_rgb(69, 71, 90);
    pub const TEXT: Color32 = Color32::from_rgb(205, 214, 244);
    pub const SUBTEXT0: Color32 = Color32::from_rgb(166, 173, 200);
    pub const BLUE: Color32 = Color32::from_rgb(137, 180, 250);
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::Mocha];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Mocha => "mocha",
        }
    }

    /// Case-insensitive lookup of a saved theme name.
    pub fn from_name(name: &str) -> Option<Theme> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Like [`from_name`](Self::from_name), falling back to the default.
    /// Empty means "never chosen" and is not worth a warning.
    pub fn from_name_or_default(name: &str) -> Theme {
        match Self::from_name(name) {
            Some(theme) => theme,
            None => {
                if !name.is_empty() {
                    log::warn!("[Theme] Unknown theme '{name}', using default");
                }
                Theme::default()
            }
        }
    }

    pub fn visuals(self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
            Theme::Mocha => mocha_visuals(),
        }
    }

    pub fn apply(self, ctx: &egui::Context) {
        ctx.set_visuals(self.visuals());
    }
}

fn mocha_visuals() -> Visuals {
    let mut visuals = Visuals::dark();

    visuals.panel_fill = mocha::BASE;
    visuals.window_fill = mocha::MANTLE;
    visuals.extreme_bg_color = mocha::CRUST;

    visuals.widgets.noninteractive.bg_fill = mocha::SURFACE0;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, mocha::TEXT);
    visuals.widgets.noninteractive.weak_bg_fill = mocha::MANTLE;
    visuals.widgets.inactive.bg_fill = mocha::MANTLE;
    visuals.widgets.inactive.weak_bg_fill = mocha::MANTLE;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, mocha::SURFACE0);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, mocha::SUBTEXT0);
    visuals.widgets.hovered.bg_fill = mocha::SURFACE0;
    visuals.widgets.hovered.weak_bg_fill = mocha::SURFACE0;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, mocha::TEXT);
    visuals.widgets.active.bg_fill = mocha::SURFACE1;
    visuals.widgets.active.weak_bg_fill = mocha::SURFACE1;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, mocha::TEXT);

    visuals.selection.bg_fill = mocha::BLUE.linear_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, mocha::BLUE);
    visuals.window_stroke = Stroke::new(1.0, mocha::SURFACE0);
    visuals.override_text_color = Some(mocha::TEXT);

    visuals
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), Some(theme));
        }
    }

    #[test]
    fn test_from_name_case_insensitive() {
        assert_eq!(Theme::from_name("Mocha"), Some(Theme::Mocha));
        assert_eq!(Theme::from_name(" LIGHT "), Some(Theme::Light));
    }

    #[test]
    fn test_unknown_name_falls_back() {
        assert_eq!(Theme::from_name("clam"), None);
        assert_eq!(Theme::from_name_or_default("clam"), Theme::Dark);
        assert_eq!(Theme::from_name_or_default(""), Theme::Dark);
    }

    #[test]
    fn test_visuals_dark_mode() {
        assert!(Theme::Dark.visuals().dark_mode);
        assert!(!Theme::Light.visuals().dark_mode);
        assert!(Theme::Mocha.visuals().dark_mode);
        assert_eq!(Theme::Mocha.visuals().panel_fill, mocha::BASE);
    }
}
