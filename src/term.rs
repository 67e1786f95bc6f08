use crate::{Coords, TermInt};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal, Result};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, read, poll};

/// One terminal cell worth of output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub color: Option<Color>,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph { ch: ' ', color: None };

    pub fn plain(ch: char) -> Self {
        Glyph { ch, color: None }
    }

    pub fn colored(ch: char, color: Color) -> Self {
        Glyph { ch, color: Some(color) }
    }
}

/// Double-buffered terminal. Frames are composed in `screen` and only the
/// cells that differ from what is already on the terminal get written.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Glyph>,
    drawn: Vec<Glyph>,
    active: bool,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![Glyph::BLANK; width as usize * height as usize];
        let drawn = screen.clone();
        Ok(TermManager { width, height, stdout, screen, drawn, active: false })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        self.active = true;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.clear()
    }

    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )
    }

    /// Drains every pending terminal event without blocking for long.
    pub fn read_events_queue(&self) -> Result<Vec<Event>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            events.push(read()?);
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: TermInt, height: TermInt) -> Result<()> {
        self.width = width;
        self.height = height;
        self.clear()
    }

    /// Wipes the terminal and both buffers.
    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![Glyph::BLANK; self.width as usize * self.height as usize];
        self.drawn = self.screen.clone();
        Ok(())
    }

    /// Starts composing a new frame.
    pub fn clear_buffer(&mut self) {
        for g in self.screen.iter_mut() {
            *g = Glyph::BLANK;
        }
    }

    /// Draws a frame around the `size` area whose first inner cell is `top_left`.
    pub fn draw_borders(&mut self, top_left: Coords, size: Coords, color: Color) {
        let (x0, y0) = (top_left.0 as i32 - 1, top_left.1 as i32 - 1);
        let (x1, y1) = (top_left.0 as i32 + size.0 as i32, top_left.1 as i32 + size.1 as i32);

        for x in x0..=x1 {
            let ch = if x == x0 || x == x1 {'+'} else {'-'};
            self.put(x, y0, Glyph::colored(ch, color));
            self.put(x, y1, Glyph::colored(ch, color));
        }

        for y in y0 + 1..y1 {
            self.put(x0, y, Glyph::colored('|', color));
            self.put(x1, y, Glyph::colored('|', color));
        }
    }

    /// Boxed message centred on the terminal, drawn over whatever is there.
    pub fn show_message(&mut self, lines: &[&str]) {
        let msg_height = (lines.len() + 2) as i32;
        let msg_width = (lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2) as i32;
        let top_left = (
            self.width as i32 / 2 - msg_width / 2,
            self.height as i32 / 2 - msg_height / 2,
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.put(top_left.0 + x_diff, *y, Glyph::BLANK);
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as i32 + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.put(top_left.0 + x_diff as i32, y, Glyph::plain(ch));
            }
        }
    }

    pub fn print_at(&mut self, pos: Coords, glyph: Glyph) {
        self.put(pos.0 as i32, pos.1 as i32, glyph);
    }

    pub fn print_str(&mut self, pos: Coords, text: &str, color: Option<Color>) {
        for (i, ch) in text.chars().enumerate() {
            self.put(pos.0 as i32 + i as i32, pos.1 as i32, Glyph { ch, color });
        }
    }

    /// Writes out the cells that changed since the last flush.
    pub fn flush(&mut self) -> Result<()> {
        let mut current_color = None;

        for (pos, glyph) in changed_cells(&self.drawn, &self.screen, self.width) {
            if glyph.color != current_color {
                match glyph.color {
                    Some(color) => queue!(self.stdout, style::SetForegroundColor(color))?,
                    None => queue!(self.stdout, style::ResetColor)?,
                }
                current_color = glyph.color;
            }
            queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(glyph.ch))?;
        }

        if current_color.is_some() {
            queue!(self.stdout, style::ResetColor)?;
        }

        self.drawn.copy_from_slice(&self.screen);
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn put(&mut self, x: i32, y: i32, glyph: Glyph) {
        // Anything off-screen is dropped; the terminal may have shrunk
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.screen[self.width as usize * y as usize + x as usize] = glyph;
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn changed_cells(prev: &[Glyph], next: &[Glyph], width: TermInt) -> Vec<(Coords, Glyph)> {
    let width = width as usize;
    prev.iter()
        .zip(next.iter())
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(i, (_, new))| (((i % width) as TermInt, (i / width) as TermInt), *new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_changed_cells_are_reported() {
        let prev = vec![Glyph::BLANK; 6];
        let mut next = prev.clone();
        next[1] = Glyph::plain('x');
        next[5] = Glyph::colored('O', Color::Red);

        let changes = changed_cells(&prev, &next, 3);
        assert_eq!(
            changes,
            vec![((1, 0), Glyph::plain('x')), ((2, 1), Glyph::colored('O', Color::Red))]
        );
    }

    #[test]
    fn recolouring_counts_as_a_change() {
        let prev = vec![Glyph::plain('#'); 2];
        let next = vec![Glyph::plain('#'), Glyph::colored('#', Color::Green)];
        assert_eq!(changed_cells(&prev, &next, 2).len(), 1);
        assert!(changed_cells(&prev, &prev, 2).is_empty());
    }
}
