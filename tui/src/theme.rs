//! Color theme and glyphs for the quiz board.
//!
//! Chrome uses the Kanagawa Wave palette; tiles keep the classic Material
//! button colors so the three tile states read at a glance.

use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;

use capquiz_types::{TileVisual, UiOptions};

mod colors {
    use super::Color;

    // === Backgrounds (Sumi Ink) ===
    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0

    // === Foregrounds (Fuji) ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray
    pub const TEXT_DISABLED: Color = Color::Rgb(113, 124, 124); // katanaGray

    // === Accent Colors ===
    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const YELLOW: Color = Color::Rgb(230, 195, 132); // carpYellow
    pub const ORANGE: Color = Color::Rgb(255, 160, 102); // surimiOrange
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed

    // === Tiles (Material) ===
    pub const TILE_DEFAULT: Color = Color::Rgb(176, 190, 197); // #B0BEC5 blue grey 200
    pub const TILE_SELECTED: Color = Color::Rgb(33, 150, 243); // #2196F3 blue 500
    pub const TILE_ERROR: Color = Color::Rgb(244, 67, 54); // #F44336 red 500
    pub const TILE_TEXT_DARK: Color = Color::Rgb(38, 50, 56); // #263238 blue grey 900
    pub const TILE_TEXT_LIGHT: Color = Color::Rgb(255, 255, 255);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub text_primary: Color,
    pub text_muted: Color,
    pub text_disabled: Color,
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub peach: Color,
    pub tile_default: Color,
    pub tile_selected: Color,
    pub tile_error: Color,
    pub tile_text_dark: Color,
    pub tile_text_light: Color,
    pub focus: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            text_primary: colors::TEXT_PRIMARY,
            text_muted: colors::TEXT_MUTED,
            text_disabled: colors::TEXT_DISABLED,
            primary: colors::PRIMARY,
            success: colors::GREEN,
            warning: colors::YELLOW,
            error: colors::RED,
            peach: colors::ORANGE,
            tile_default: colors::TILE_DEFAULT,
            tile_selected: colors::TILE_SELECTED,
            tile_error: colors::TILE_ERROR,
            tile_text_dark: colors::TILE_TEXT_DARK,
            tile_text_light: colors::TILE_TEXT_LIGHT,
            focus: colors::YELLOW,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            text_primary: Color::White,
            text_muted: Color::Gray,
            text_disabled: Color::DarkGray,
            primary: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            peach: Color::Yellow,
            tile_default: Color::Gray,
            tile_selected: Color::Blue,
            tile_error: Color::Red,
            tile_text_dark: Color::Black,
            tile_text_light: Color::White,
            focus: Color::Yellow,
        }
    }

    /// Background and label colors for a tile in the given state.
    #[must_use]
    pub fn tile_colors(&self, visual: TileVisual) -> (Color, Color) {
        match visual {
            TileVisual::Default => (self.tile_default, self.tile_text_dark),
            TileVisual::Selected => (self.tile_selected, self.tile_text_light),
            TileVisual::Error => (self.tile_error, self.tile_text_light),
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for borders, markers and spinners.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub border: border::Set<'static>,
    pub focus_marker: &'static str,
    pub ellipsis: &'static str,
    pub bullet: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

const ASCII_BORDER: border::Set<'static> = border::Set {
    top_left: "+",
    top_right: "+",
    bottom_left: "+",
    bottom_right: "+",
    vertical_left: "|",
    vertical_right: "|",
    horizontal_top: "-",
    horizontal_bottom: "-",
};

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            border: ASCII_BORDER,
            focus_marker: ">",
            ellipsis: "...",
            bullet: "*",
            success: "*",
            failure: "x",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            border: border::ROUNDED,
            focus_marker: "▸",
            ellipsis: "…",
            bullet: "•",
            success: "✓",
            failure: "✗",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.peach)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use capquiz_types::{TileVisual, UiOptions};
    use ratatui::style::Color;

    use super::{Palette, glyphs, palette, spinner_frame};

    #[test]
    fn spinner_frame_cycles_without_reduced_motion() {
        let options = UiOptions::default();
        assert_ne!(spinner_frame(0, options), spinner_frame(1, options));
    }

    #[test]
    fn spinner_frame_static_with_reduced_motion() {
        let options = UiOptions {
            reduced_motion: true,
            ..UiOptions::default()
        };
        assert_eq!(spinner_frame(0, options), spinner_frame(1, options));
        assert_eq!(spinner_frame(0, options), spinner_frame(100, options));
    }

    #[test]
    fn ascii_only_avoids_box_drawing() {
        let options = UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        };
        let glyphs = glyphs(options);
        assert!(glyphs.border.top_left.is_ascii());
        assert!(glyphs.spinner_frames.iter().all(|f| f.is_ascii()));
        assert_eq!(spinner_frame(3, options), "\\");
    }

    #[test]
    fn tile_colors_follow_visual_state() {
        let palette = Palette::standard();
        assert_eq!(
            palette.tile_colors(TileVisual::Default).0,
            Color::Rgb(176, 190, 197)
        );
        assert_eq!(
            palette.tile_colors(TileVisual::Selected).0,
            Color::Rgb(33, 150, 243)
        );
        assert_eq!(
            palette.tile_colors(TileVisual::Error).0,
            Color::Rgb(244, 67, 54)
        );
    }

    #[test]
    fn high_contrast_uses_named_colors() {
        let options = UiOptions {
            high_contrast: true,
            ..UiOptions::default()
        };
        assert_eq!(palette(options).tile_colors(TileVisual::Error).0, Color::Red);
    }
}
