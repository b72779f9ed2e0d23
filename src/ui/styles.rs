use std::borrow::Cow;

use ratatui::prelude::Stylize;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::market::{Rgba, Tone};

/// Base the translucent chart fill is composited onto.
pub const TERMINAL_BASE: (u8, u8, u8) = (24, 24, 24);

/// Brand teal shared by the accent text and the close-price line.
pub const ACCENT: Color = Color::Rgb(0x0d, 0x72, 0x65);
pub const POSITIVE: Color = Color::Green;
pub const NEGATIVE: Color = Color::Red;
pub const ERROR: Color = Color::LightRed;

pub fn rgb(color: Rgba) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

pub fn translucent(color: Rgba) -> Color {
    let (r, g, b) = color.blend_over(TERMINAL_BASE);
    Color::Rgb(r, g, b)
}

pub fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Positive => Style::default().fg(POSITIVE),
        Tone::Negative => Style::default().fg(NEGATIVE),
        Tone::Neutral => Style::default(),
    }
}

/// Dimmed line for secondary descriptions and hints.
pub fn secondary_line<'a>(text: impl Into<Cow<'a, str>>) -> Line<'a> {
    let owned = text.into().into_owned();
    Line::from(owned.dim())
}

pub fn secondary_span<'a>(text: impl Into<Cow<'a, str>>) -> Span<'a> {
    let owned = text.into().into_owned();
    Span::from(owned).dim()
}

pub fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn error_line<'a>(text: impl Into<Cow<'a, str>>) -> Line<'a> {
    Line::from(Span::styled(
        text.into().into_owned(),
        Style::default().fg(ERROR),
    ))
}
