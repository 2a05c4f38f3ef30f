//! Rendering context for the console report.
//!
//! [`Console`] wraps the output writer and threads the current colors and
//! cursor column through every reporting call instead of relying on
//! ambient terminal state. Dropping it resets the terminal colors, so the
//! caller's terminal is restored on every exit path.
//!
//! With color disabled nothing but plain text is written: no escape
//! sequences and no cursor movement. Status lines are then emitted in one
//! piece once their outcome is known.
//!
//! In color mode a status line is printed with a blank placeholder and
//! rewritten in place once the outcome is known. Anything a case prints to
//! the same terminal in between moves the cursor; with a cursor query
//! installed ([`Console::with_cursor_query`]) that is detected and the
//! status line is printed again in full instead of overwriting whatever
//! ended up on the placeholder's row.

use std::io::{self, Write};

use crossterm::cursor::{MoveToColumn, MoveUp, RestorePosition, SavePosition};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use unicode_width::UnicodeWidthChar;

/// Foreground used for regular report text.
pub const TEXT: Color = Color::Reset;

/// Width of the `[....]` status placeholder contents.
pub const MARKER_WIDTH: usize = 4;

/// Reports the terminal cursor as `(column, row)`.
pub type CursorQuery = fn() -> io::Result<(u16, u16)>;

/// Output writer plus the color and cursor state of the report.
pub struct Console<'w> {
    out: &'w mut dyn Write,
    color: bool,
    fg: Color,
    bg: Color,
    column: usize,
    terminal_width: Option<usize>,
    cursor_query: Option<CursorQuery>,
}

impl<'w> Console<'w> {
    /// Wraps `out`. With `color` set, ANSI colors and cursor movement are used.
    pub fn new(out: &'w mut dyn Write, color: bool) -> Self {
        Self {
            out,
            color,
            fg: TEXT,
            bg: Color::Reset,
            column: 0,
            terminal_width: None,
            cursor_query: None,
        }
    }

    /// Sets the terminal width used to locate placeholders on wrapped lines.
    #[must_use]
    pub const fn with_terminal_width(mut self, width: Option<usize>) -> Self {
        self.terminal_width = width;
        self
    }

    /// Installs a cursor query, typically [`crossterm::cursor::position`]
    /// when the output is the terminal itself. Status lines then notice
    /// output written behind the console's back.
    #[must_use]
    pub const fn with_cursor_query(mut self, query: CursorQuery) -> Self {
        self.cursor_query = Some(query);
        self
    }

    /// Whether colors and cursor movement are in use.
    #[must_use]
    pub const fn is_color(&self) -> bool {
        self.color
    }

    /// Current cursor column (display cells since the last newline).
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Current foreground color.
    #[must_use]
    pub const fn foreground(&self) -> Color {
        self.fg
    }

    /// Switches the foreground color.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn set_foreground(&mut self, color: Color) -> io::Result<()> {
        if self.color && color != self.fg {
            queue!(&mut self.out, SetForegroundColor(color))?;
        }
        self.fg = color;
        Ok(())
    }

    /// Switches the background color.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn set_background(&mut self, color: Color) -> io::Result<()> {
        if self.color && color != self.bg {
            queue!(&mut self.out, SetBackgroundColor(color))?;
        }
        self.bg = color;
        Ok(())
    }

    /// Writes `text` in `color`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn print(&mut self, text: &str, color: Color) -> io::Result<()> {
        self.set_foreground(color)?;
        self.write_raw(text)
    }

    /// Writes `text` in `color` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn println(&mut self, text: &str, color: Color) -> io::Result<()> {
        self.print(text, color)?;
        self.write_raw("\n")
    }

    /// Writes `text` in `fg` over `bg`, then returns to the previous background.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn print_on(&mut self, text: &str, fg: Color, bg: Color) -> io::Result<()> {
        let previous = self.bg;
        self.set_background(bg)?;
        self.print(text, fg)?;
        self.set_background(previous)
    }

    /// Writes an empty line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn newline(&mut self) -> io::Result<()> {
        self.write_raw("\n")
    }

    fn write_raw(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            queue!(&mut self.out, Print(text))?;
        } else {
            self.out.write_all(text.as_bytes())?;
        }
        for ch in text.chars() {
            if ch == '\n' {
                self.column = 0;
            } else {
                self.column += ch.width().unwrap_or(0);
            }
        }
        Ok(())
    }

    /// Starts a status line: `{indent}[    ]{rest}`.
    ///
    /// In color mode the line is written immediately with a blank
    /// placeholder that [`close_status`](Self::close_status) fills in later.
    /// In plain mode nothing is written until then.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn open_status(&mut self, indent: &str, rest: &str) -> io::Result<StatusLine> {
        let mut line = StatusLine {
            indent: indent.to_string(),
            rest: rest.to_string(),
            column: 0,
            rows_below: 0,
            anchor: None,
        };

        if self.color {
            self.print(indent, TEXT)?;
            self.print("[", TEXT)?;
            line.column = self.column;
            self.print(&" ".repeat(MARKER_WIDTH), TEXT)?;
            self.print("]", TEXT)?;
            self.print(rest, TEXT)?;
            self.flush()?;

            if let Some(width) = self.terminal_width.filter(|w| *w > 0) {
                line.rows_below = self.column.saturating_sub(1) / width;
                line.column %= width;
            }
            line.anchor = self.query_cursor();
        }

        Ok(line)
    }

    /// Completes a status line by filling its placeholder with `marker`.
    ///
    /// In color mode the cursor is moved back onto the placeholder and
    /// restored afterwards; the line is then terminated. When the cursor
    /// query shows that something else was printed since the line was
    /// opened, the whole line is printed again below instead.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn close_status(&mut self, line: StatusLine, marker: &str, color: Color) -> io::Result<()> {
        if self.color && line.anchor.is_some() {
            self.flush()?;
            let now = self.query_cursor();
            if now != line.anchor {
                if now.is_some_and(|(column, _)| column > 0) {
                    self.newline()?;
                }
                return self.write_status(&line, marker, color);
            }
        }

        if self.color {
            let restore = self.fg;
            queue!(&mut self.out, SavePosition)?;
            if line.rows_below > 0 {
                let rows = u16::try_from(line.rows_below).unwrap_or(u16::MAX);
                queue!(&mut self.out, MoveUp(rows))?;
            }
            let column = u16::try_from(line.column).unwrap_or(u16::MAX);
            queue!(
                &mut self.out,
                MoveToColumn(column),
                SetForegroundColor(color),
                Print(marker),
                SetForegroundColor(restore),
                RestorePosition
            )?;
            self.newline()
        } else {
            self.write_status(&line, marker, color)
        }
    }

    fn write_status(&mut self, line: &StatusLine, marker: &str, color: Color) -> io::Result<()> {
        self.print(&line.indent, TEXT)?;
        self.print("[", TEXT)?;
        self.print(marker, color)?;
        self.print("]", TEXT)?;
        self.println(&line.rest, TEXT)
    }

    fn query_cursor(&mut self) -> Option<(u16, u16)> {
        let query = self.cursor_query?;
        match query() {
            Ok(position) => Some(position),
            Err(err) => {
                tracing::debug!(error = %err, "cursor query failed, status lines rewrite blind");
                self.cursor_query = None;
                None
            }
        }
    }

    /// Flushes the writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Resets colors to the terminal defaults and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.color {
            queue!(&mut self.out, ResetColor)?;
        }
        self.fg = TEXT;
        self.bg = Color::Reset;
        self.out.flush()
    }
}

impl Drop for Console<'_> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// A status line whose placeholder has not been filled in yet.
#[derive(Debug)]
#[must_use = "an open status line must be closed"]
pub struct StatusLine {
    indent: String,
    rest: String,
    column: usize,
    rows_below: usize,
    anchor: Option<(u16, u16)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain<F: FnOnce(&mut Console<'_>)>(f: F) -> String {
        let mut buf = Vec::new();
        {
            let mut console = Console::new(&mut buf, false);
            f(&mut console);
        }
        String::from_utf8(buf).expect("utf-8 output")
    }

    fn colored<F: FnOnce(&mut Console<'_>)>(f: F) -> String {
        let mut buf = Vec::new();
        {
            let mut console = Console::new(&mut buf, true);
            f(&mut console);
        }
        String::from_utf8(buf).expect("utf-8 output")
    }

    #[test]
    fn test_plain_output_has_no_escapes() {
        let out = plain(|c| {
            c.println("hello", Color::Red).unwrap();
            c.print_on("▌", Color::Green, Color::Blue).unwrap();
        });
        assert_eq!(out, "hello\n▌");
    }

    #[test]
    fn test_color_output_switches_only_on_change() {
        let out = colored(|c| {
            c.print("a", Color::Red).unwrap();
            c.print("b", Color::Red).unwrap();
            c.print("c", Color::Green).unwrap();
        });
        assert_eq!(out.matches("\x1b[38;5;9m").count(), 1);
        assert!(out.contains("ab"));
        // Drop resets colors.
        assert!(out.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_column_tracking() {
        let mut buf = Vec::new();
        let mut console = Console::new(&mut buf, false);
        console.print("ab", TEXT).unwrap();
        assert_eq!(console.column(), 2);
        console.print("█│\nxyz", TEXT).unwrap();
        assert_eq!(console.column(), 3);
    }

    #[test]
    fn test_plain_status_line_written_on_close() {
        let out = plain(|c| {
            let line = c.open_status("    ", " Testing 'x()'").unwrap();
            assert_eq!(c.column(), 0);
            c.close_status(line, "PASS", Color::Green).unwrap();
        });
        assert_eq!(out, "    [PASS] Testing 'x()'\n");
    }

    #[test]
    fn test_color_status_line_rewrites_placeholder() {
        let out = colored(|c| {
            let line = c.open_status("    ", " Testing 'x()'").unwrap();
            c.close_status(line, "FAIL", Color::Red).unwrap();
        });
        assert!(out.contains("[    ] Testing 'x()'"));
        // Save, move to column 5, print, restore.
        assert!(out.contains("\x1b7"));
        assert!(out.contains("\x1b[6G"));
        assert!(out.contains("FAIL"));
        assert!(out.contains("\x1b8"));
    }

    #[test]
    fn test_wrapped_status_line_moves_up() {
        let mut buf = Vec::new();
        {
            let mut console = Console::new(&mut buf, true).with_terminal_width(Some(10));
            let line = console.open_status("    ", " a long description").unwrap();
            console.close_status(line, "PASS", Color::Green).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("\x1b[2A"));
    }

    thread_local! {
        static CURSOR: std::cell::Cell<(u16, u16)> = const { std::cell::Cell::new((20, 3)) };
    }

    fn fake_cursor() -> io::Result<(u16, u16)> {
        Ok(CURSOR.with(std::cell::Cell::get))
    }

    #[test]
    fn test_status_line_rewrites_in_place_when_cursor_unmoved() {
        CURSOR.with(|c| c.set((20, 3)));
        let mut buf = Vec::new();
        {
            let mut console = Console::new(&mut buf, true).with_cursor_query(fake_cursor);
            let line = console.open_status("    ", " Testing 'x()'").unwrap();
            console.close_status(line, "PASS", Color::Green).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("\x1b7"));
        assert_eq!(out.matches("Testing 'x()'").count(), 1);
    }

    #[test]
    fn test_status_line_reprinted_after_foreign_output() {
        CURSOR.with(|c| c.set((20, 3)));
        let mut buf = Vec::new();
        {
            let mut console = Console::new(&mut buf, true).with_cursor_query(fake_cursor);
            let line = console.open_status("    ", " Testing 'x()'").unwrap();
            // A case body printed two lines straight to the terminal.
            CURSOR.with(|c| c.set((7, 5)));
            console.close_status(line, "FAIL", Color::Red).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert!(!out.contains("\x1b7"));
        assert_eq!(out.matches("Testing 'x()'").count(), 2);
        assert!(out.contains("FAIL"));
        assert!(out.contains("\n    ["));
    }
}
