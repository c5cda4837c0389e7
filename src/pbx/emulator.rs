//! 80x24 virtual terminal backed by `alacritty_terminal`.
//!
//! Each vt220 screen capture feeds the bytes that arrived before a sentinel
//! into a fresh grid and snapshots the rendered rows. The SAT uses cursor
//! positioning, line erase, SGR and cursor save/restore; alacritty's
//! processor covers all of it.

use alacritty_terminal::event::VoidListener;
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::{Config as TermConfig, Term};
use alacritty_terminal::vte::ansi::Processor;

pub(crate) const SCREEN_ROWS: usize = 24;
pub(crate) const SCREEN_COLS: usize = 80;

#[derive(Clone, Copy)]
struct ScreenDimensions;

impl Dimensions for ScreenDimensions {
    fn total_lines(&self) -> usize {
        SCREEN_ROWS
    }

    fn screen_lines(&self) -> usize {
        SCREEN_ROWS
    }

    fn columns(&self) -> usize {
        SCREEN_COLS
    }
}

pub(crate) struct ScreenBuffer {
    term: Term<VoidListener>,
    processor: Processor,
}

impl ScreenBuffer {
    pub(crate) fn new() -> Self {
        let config = TermConfig {
            scrolling_history: 0,
            ..TermConfig::default()
        };
        Self {
            term: Term::new(config, &ScreenDimensions, VoidListener),
            processor: Processor::new(),
        }
    }

    pub(crate) fn feed(&mut self, text: &str) {
        self.processor.advance(&mut self.term, text.as_bytes());
    }

    /// One row as the SAT laid it out, space-padded to the full width.
    pub(crate) fn row_text(&self, row: usize) -> String {
        let grid = self.term.grid();
        let mut line = String::with_capacity(SCREEN_COLS);
        for col in 0..SCREEN_COLS {
            line.push(grid[Line(row as i32)][Column(col)].c);
        }
        line
    }

    /// The 24 rendered rows joined by newlines.
    pub(crate) fn render(&self) -> String {
        let rows: Vec<String> = (0..SCREEN_ROWS).map(|row| self.row_text(row)).collect();
        rows.join("\n")
    }
}

#[cfg(test)]
#[path = "../test/pbx/emulator.rs"]
mod tests;
