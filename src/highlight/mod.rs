//! Syntax highlighting for embedded code widgets.
//!
//! Uses syntect with the bundled Sublime Text syntax definitions. Output
//! is per-line span runs carrying an optional foreground color; the
//! renderer lays selection and cursor styling over them.

use std::sync::{Mutex, OnceLock};

use ratatui::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

/// One highlighted run of text within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpan {
    pub text: String,
    pub fg: Option<Color>,
}

/// Highlight `code` as `language`, one span list per line.
///
/// Unknown or empty languages fall back to a single uncolored span per
/// line. The trailing newline does not produce an empty extra line.
pub fn highlight_code(language: &str, code: &str) -> Vec<Vec<CodeSpan>> {
    let syntax_set = syntax_set();
    let mode = background_mode();
    let syntax = (!language.is_empty())
        .then(|| {
            syntax_set
                .find_syntax_by_token(language)
                .or_else(|| syntax_set.find_syntax_by_name(language))
        })
        .flatten();

    let Some(syntax) = syntax else {
        return code
            .lines()
            .map(|line| {
                vec![CodeSpan {
                    text: line.to_string(),
                    fg: None,
                }]
            })
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, theme());
    code.lines()
        .map(|line| {
            let ranges = highlighter
                .highlight_line(line, syntax_set)
                .unwrap_or_default();
            ranges
                .into_iter()
                .map(|(style, text)| CodeSpan {
                    text: text.to_string(),
                    fg: Some(adjust_fg_for_background(
                        (style.foreground.r, style.foreground.g, style.foreground.b),
                        mode,
                    )),
                })
                .collect()
        })
        .collect()
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        let preferred = match background_mode() {
            BackgroundMode::Dark => [
                "Monokai Extended",
                "Dracula",
                "Solarized (dark)",
                "base16-ocean.dark",
            ]
            .as_slice(),
            BackgroundMode::Light => [
                "InspiredGitHub",
                "Solarized (light)",
                "base16-ocean.light",
            ]
            .as_slice(),
        };

        for name in preferred {
            if let Some(theme) = theme_set.themes.get(*name) {
                return theme.clone();
            }
        }

        theme_set
            .themes
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackgroundMode {
    Dark,
    Light,
}

/// Terminal background override, settable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightBackground {
    Light,
    Dark,
}

static BACKGROUND_OVERRIDE: OnceLock<Mutex<Option<HighlightBackground>>> = OnceLock::new();

pub fn set_background_mode(mode: Option<HighlightBackground>) {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(mut guard) = lock.lock() {
        *guard = mode;
    }
}

fn background_mode() -> BackgroundMode {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(guard) = lock.lock()
        && let Some(mode) = *guard
    {
        return match mode {
            HighlightBackground::Light => BackgroundMode::Light,
            HighlightBackground::Dark => BackgroundMode::Dark,
        };
    }
    background_mode_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> BackgroundMode {
    let Some(value) = colorfgbg else {
        return BackgroundMode::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return BackgroundMode::Dark;
    };

    if bg >= 7 {
        BackgroundMode::Light
    } else {
        BackgroundMode::Dark
    }
}

/// Bright theme colors wash out on light backgrounds; darken anything
/// above the readability threshold.
fn adjust_fg_for_background((r, g, b): (u8, u8, u8), mode: BackgroundMode) -> Color {
    match mode {
        BackgroundMode::Dark => Color::Rgb(r, g, b),
        BackgroundMode::Light => {
            let luma = (0.2126 * f32::from(r)) + (0.7152 * f32::from(g)) + (0.0722 * f32::from(b));
            if luma < 155.0 {
                return Color::Rgb(r, g, b);
            }

            Color::Rgb(
                ((f32::from(r)) * 0.42).round() as u8,
                ((f32::from(g)) * 0.42).round() as u8,
                ((f32::from(b)) * 0.42).round() as u8,
            )
        }
    }
}
