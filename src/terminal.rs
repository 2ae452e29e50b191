// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Owns the alternate screen for the life of the program; dropping it
/// restores the user's terminal.
pub struct Terminal {
    stdout: Stdout,
    last_size: Option<(u16, u16)>,
    run_buf: String,
}

fn leave(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(event::EnableMouseCapture)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last_size: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    /// Window size in pixels, when the terminal reports one.
    pub fn pixel_size(&self) -> Option<(u16, u16)> {
        let ws = terminal::window_size().ok()?;
        (ws.width > 0 && ws.height > 0).then_some((ws.width, ws.height))
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn queue_colors(&mut self, cell: &Cell, cur: &mut (Option<Color>, Option<Color>)) -> Result<()> {
        if cell.fg != cur.0 {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            cur.0 = cell.fg;
        }
        if cell.bg != cur.1 {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            cur.1 = cell.bg;
        }
        Ok(())
    }

    /// Writes the frame's changes: every cell after a resize or reset,
    /// otherwise runs of adjacent dirty cells sharing colours.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let full = frame.is_dirty_all() || self.last_size != Some(size);
        if self.last_size != Some(size) {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last_size = Some(size);
        }

        // Reset first so the colour state below matches the terminal.
        self.stdout.queue(ResetColor)?;
        let mut cur: (Option<Color>, Option<Color>) = (None, None);

        if full {
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    self.queue_colors(&cell, &mut cur)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
        } else {
            let width = frame.width as usize;
            let mut dirty = frame.dirty_indices().to_vec();
            dirty.sort_unstable();

            let mut cur_pos: Option<usize> = None;
            let mut i = 0usize;
            while i < dirty.len() {
                let idx0 = dirty[i];
                let cell0 = frame.cell_at_index(idx0);
                self.run_buf.clear();
                self.run_buf.push(cell0.ch);

                let mut j = i + 1;
                while j < dirty.len() {
                    let idx1 = dirty[j];
                    if idx1 != dirty[j - 1] + 1 || idx1 % width == 0 {
                        break;
                    }
                    let cell1 = frame.cell_at_index(idx1);
                    if cell1.fg != cell0.fg || cell1.bg != cell0.bg {
                        break;
                    }
                    self.run_buf.push(cell1.ch);
                    j += 1;
                }

                if cur_pos != Some(idx0) {
                    self.stdout.queue(cursor::MoveTo(
                        (idx0 % width) as u16,
                        (idx0 / width) as u16,
                    ))?;
                }
                self.queue_colors(&cell0, &mut cur)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;

                let next = dirty[j - 1] + 1;
                cur_pos = (next % width != 0).then_some(next);
                i = j;
            }
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        leave(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}
