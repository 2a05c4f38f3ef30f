//! Proportional bar graphs.
//!
//! A bar splits a fixed number of character cells among weighted, colored
//! segments. Fractional widths are apportioned with the largest-remainder
//! method so the integer widths always add up to the requested width, and
//! a half-block marker shows segments whose fractional part is at least
//! one half.
//!
//! # Example
//!
//! ```rust
//! use crossterm::style::Color;
//! use gauntlet::bar::{layout, Segment};
//!
//! let cells = layout(&[Segment::new(3.0, Color::Green), Segment::new(1.0, Color::Red)], 10);
//! assert_eq!(cells.len(), 10);
//! assert_eq!(cells.iter().filter(|c| c.fg == Color::Green).count(), 8);
//! ```

use std::io;

use crossterm::style::Color;

use crate::console::{Console, TEXT};

/// Full block drawn for every whole cell of a segment.
pub const FULL: char = '█';
/// Half block marking a fractional part of at least one half.
pub const HALF: char = '▌';
/// Filler used when more than one cell is left over.
pub const SHADE: char = '▓';

/// One weighted, colored part of a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Relative weight. Negative and non-finite weights count as zero.
    pub value: f64,
    /// Fill color.
    pub color: Color,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub const fn new(value: f64, color: Color) -> Self {
        Self { value, color }
    }
}

/// One drawn character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Glyph to draw.
    pub glyph: char,
    /// Foreground color.
    pub fg: Color,
    /// Background color, `None` for the terminal default.
    pub bg: Option<Color>,
}

impl Cell {
    const fn new(glyph: char, fg: Color) -> Self {
        Self { glyph, fg, bg: None }
    }
}

/// Fractional widths of `values` scaled to `width` cells.
///
/// The whole truncation remainder (`width - sum(floor(w))`) is added to the
/// segment with the largest fractional width (the first one on ties), so the
/// floors of the result sum to exactly `width` whenever `values` is not
/// empty.
#[must_use]
pub fn apportion(values: &[f64], width: usize) -> Vec<f64> {
    #[expect(clippy::cast_precision_loss, reason = "bar widths are small")]
    let total = width as f64;
    let clamped: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { v.max(0.0) } else { 0.0 })
        .collect();
    let sum: f64 = clamped.iter().sum();

    let mut widths: Vec<f64> = clamped
        .iter()
        .map(|v| {
            let w = v / sum * total;
            if w.is_finite() { w.max(0.0) } else { 0.0 }
        })
        .collect();

    let floors: f64 = widths.iter().map(|w| w.floor()).sum();
    let remainder = (total - floors).max(0.0);

    let mut largest: Option<usize> = None;
    for (i, w) in widths.iter().enumerate() {
        if largest.is_none_or(|l| *w > widths[l]) {
            largest = Some(i);
        }
    }
    if let Some(i) = largest {
        widths[i] += remainder;
    }

    widths
}

/// Lays out exactly `width` cells for `segments`.
///
/// Each segment draws `floor(w)` full blocks. When its fractional part is
/// at least one half, every other such segment draws its last cell as a
/// half block, on the next segment's color when that segment qualifies
/// too. Any cells still missing are filled with [`SHADE`] (or a single
/// [`FULL`] when only one is missing).
#[must_use]
pub fn layout(segments: &[Segment], width: usize) -> Vec<Cell> {
    let values: Vec<f64> = segments.iter().map(|s| s.value).collect();
    let widths = apportion(&values, width);
    let qualifies = |w: f64| w.fract() >= 0.5;

    let mut cells = Vec::with_capacity(width);
    let mut half = false;

    for (i, (segment, w)) in segments.iter().zip(&widths).enumerate() {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "widths are finite, non-negative and at most `width`"
        )]
        let full = (w.floor() as usize).min(width - cells.len());
        cells.extend(std::iter::repeat_n(Cell::new(FULL, segment.color), full));

        if full > 0 && qualifies(*w) {
            half = !half;
            if half {
                let bg = widths
                    .get(i + 1)
                    .filter(|next| qualifies(**next))
                    .map(|_| segments[i + 1].color);
                if let Some(last) = cells.last_mut() {
                    *last = Cell {
                        glyph: HALF,
                        fg: segment.color,
                        bg,
                    };
                }
            }
        }
    }

    let missing = width - cells.len();
    let filler = if missing > 1 { SHADE } else { FULL };
    cells.extend(std::iter::repeat_n(Cell::new(filler, TEXT), missing));
    cells
}

/// Draws one bar line: `padding` spaces, a framed bar `width` cells wide in
/// total, then `description`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_bar(
    console: &mut Console<'_>,
    padding: usize,
    width: usize,
    description: &str,
    segments: &[Segment],
) -> io::Result<()> {
    console.print(&" ".repeat(padding), TEXT)?;
    console.print("│", TEXT)?;

    let mut glyph = [0_u8; 4];
    for cell in layout(segments, width.saturating_sub(2)) {
        let text = cell.glyph.encode_utf8(&mut glyph);
        match cell.bg {
            Some(bg) => console.print_on(text, cell.fg, bg)?,
            None => console.print(text, cell.fg)?,
        }
    }

    console.println(&format!("│ {description}"), TEXT)
}
