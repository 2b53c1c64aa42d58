use crate::error::Result;
use crate::framebuffer::{BUFFER_BYTES, HEIGHT, WIDTH};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is how the interpreter shows its framebuffer to the host. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// present a frame; `changed` has a bit set for every pixel that
    /// flipped since the last call
    fn draw(&mut self, frame: &[u8], changed: &[u8]) -> Result<()>;
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coords of every pixel whose bit equals `bitplane`
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(WIDTH, HEIGHT),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &[u8], changed: &[u8]) -> Result<()> {
        if changed.iter().all(|b| *b == 0) {
            return Ok(());
        }

        let off: Vec<(f64, f64)> = self.resolution.bitplane_from_data(frame, 0).collect();
        let on: Vec<(f64, f64)> = self.resolution.bitplane_from_data(frame, 1).collect();
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        let size = Rect::new(0, 0, 2 + WIDTH as u16, 2 + HEIGHT as u16);

        // 1:1 between chip8 pixels and terminal cells
        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &off,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &on,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// Renders nothing; remembers the last frame it was handed. Useful for
/// tests and headless runs.
pub struct DummyDisplay {
    pub frames: usize,
    pub last_frame: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay {
            frames: 0,
            last_frame: vec![0; BUFFER_BYTES],
        }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &[u8], _changed: &[u8]) -> Result<()> {
        self.frames += 1;
        self.last_frame.copy_from_slice(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplanes_split_pixels() {
        let r = Resolution(64, 32);
        let mut data = [0u8; 256];
        data[0] = 0x80; // (0, 0)
        data[9] = 0x01; // (15, 1)
        let mut on: Vec<(f64, f64)> = r.bitplane_from_data(&data, 1).collect();
        on.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(on, vec![(0.0, 0.0), (15.0, -1.0)]);
        assert_eq!(r.bitplane_from_data(&data, 0).count(), 2046);
    }

    #[test]
    fn test_dummy_keeps_last_frame() -> Result<()> {
        let mut d = DummyDisplay::new();
        let mut frame = [0u8; 256];
        frame[3] = 0xaa;
        d.draw(&frame, &frame)?;
        assert_eq!(d.frames, 1);
        assert_eq!(d.last_frame[3], 0xaa);
        Ok(())
    }
}
