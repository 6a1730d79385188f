//! Text screen model for the 128×64 OLED.
//!
//! The domain describes what should be on the display as a list of text
//! lines (text, size, row, column).  The display adapter rasterises it;
//! the application service only pushes a screen when it differs from the
//! last one shown.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::clock::ClockReading;
use crate::monitor::EnvironmentStatus;

pub const MAX_LINES: usize = 6;
pub const LINE_CAPACITY: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String<LINE_CAPACITY>,
    /// Text scale: 1 = 6×10 px glyphs, 2 = 10×20 px glyphs.
    pub size: u8,
    /// Top edge in pixels.
    pub row: u8,
    /// Left edge in pixels.
    pub column: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    lines: Vec<Line, MAX_LINES>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.  Text longer than a line is truncated; lines past
    /// [`MAX_LINES`] are dropped.
    pub fn push(&mut self, text: &str, size: u8, row: u8, column: u8) -> &mut Self {
        self.push_fmt(format_args!("{text}"), size, row, column)
    }

    pub fn push_fmt(&mut self, args: fmt::Arguments<'_>, size: u8, row: u8, column: u8) -> &mut Self {
        let mut text = String::new();
        let _ = Truncating(&mut text).write_fmt(args);
        let _ = self.lines.push(Line { text, size, row, column });
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True if any line's text equals `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|l| l.text.as_str() == text)
    }
}

/// `fmt::Write` that keeps as much as fits instead of failing the whole write.
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

// ── Fixed screens ─────────────────────────────────────────────

/// Date, time and any climate alerts.
pub fn clock(now: &ClockReading, env: EnvironmentStatus) -> Screen {
    let mut s = Screen::new();
    s.push_fmt(format_args!("{}/{}/{}", now.day, now.month, now.year), 1, 0, 0);
    s.push_fmt(format_args!("{}:{}:{}", now.hour, now.minute, now.second), 2, 10, 0);
    if env.temperature_alert() {
        s.push("Temp Alert!", 1, 40, 0);
    }
    if env.humidity_alert() {
        s.push("Humidity Alert!", 1, 50, 0);
    }
    s
}

/// Ringing banner, with the new time underneath once snoozed.
pub fn ringing(snoozed_to: Option<(u8, u8)>) -> Screen {
    let mut s = Screen::new();
    s.push("Medicine Time!", 2, 0, 0);
    if let Some((h, m)) = snoozed_to {
        s.push("Snoozed to:", 1, 40, 0);
        s.push_fmt(format_args!("{}:{}", h, m), 2, 50, 0);
    }
    s
}

pub fn banner(text: &str) -> Screen {
    let mut s = Screen::new();
    s.push(text, 1, 0, 2);
    s
}

pub fn connecting() -> Screen {
    let mut s = Screen::new();
    s.push("Connecting...", 2, 0, 0);
    s
}
