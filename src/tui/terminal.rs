// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use super::frame::Frame;

/// Raw-mode alternate screen with mouse capture. Restored on drop.
pub struct Terminal {
    stdout: Stdout,
    run_buf: String,
    rows: Vec<Vec<usize>>,
}

fn leave(out: &mut Stdout) {
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new(mouse: bool) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            if mouse {
                out.execute(event::EnableMouseCapture)?;
            }
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            run_buf: String::with_capacity(64),
            rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let width = frame.width as usize;
        if width == 0 || frame.height == 0 {
            frame.clear_dirty();
            return Ok(());
        }

        let full = frame.is_dirty_all() || frame.dirty_indices().len() >= frame.len() / 3;

        if self.rows.len() != frame.height as usize {
            self.rows = vec![Vec::new(); frame.height as usize];
        }
        for r in &mut self.rows {
            r.clear();
        }
        if full {
            for (y, r) in self.rows.iter_mut().enumerate() {
                r.extend(y * width..(y + 1) * width);
            }
        } else {
            for &idx in frame.dirty_indices() {
                if let Some(r) = self.rows.get_mut(idx / width) {
                    r.push(idx);
                }
            }
        }

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;

        for (y, row) in self.rows.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();

            let mut i = 0;
            while i < row.len() {
                let start = row[i];
                let head = frame.cell_at_index(start);
                self.run_buf.clear();
                self.run_buf.push(head.ch);

                let mut end = start;
                let mut j = i + 1;
                while j < row.len() && row[j] == end + 1 {
                    let next = frame.cell_at_index(row[j]);
                    if next.fg != head.fg || next.bg != head.bg {
                        break;
                    }
                    self.run_buf.push(next.ch);
                    end = row[j];
                    j += 1;
                }

                self.stdout
                    .queue(cursor::MoveTo((start % width) as u16, y as u16))?;
                if cur_fg != Some(head.fg) {
                    self.stdout.queue(SetForegroundColor(head.fg))?;
                    cur_fg = Some(head.fg);
                }
                if cur_bg != Some(head.bg) {
                    self.stdout.queue(SetBackgroundColor(head.bg))?;
                    cur_bg = Some(head.bg);
                }
                self.stdout.queue(Print(self.run_buf.as_str()))?;
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

/// Used from the panic hook and signal handlers, where no `Terminal` is
/// reachable.
pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}
