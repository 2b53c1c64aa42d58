/// display width in pixels
pub const WIDTH: usize = 64;
/// display height in pixels
pub const HEIGHT: usize = 32;
/// bytes per row; 8 pixels to a byte
pub const ROW_BYTES: usize = WIDTH / 8;
/// size of the whole frame
pub const BUFFER_BYTES: usize = ROW_BYTES * HEIGHT;

/// 64x32 1-bit display memory, row-major, 8 pixels per byte with the
/// leftmost pixel in the high bit. Pixel (x, y) lives in byte
/// `8 * y + x / 8`, bit `7 - x % 8`.
///
/// Alongside the pixels it keeps a mask of what the last `clear` or `draw`
/// flipped, so a renderer can skip frames where nothing moved.
///
/// Sprites start at a wrapped coordinate (`x % 64`, `y % 32`) and are
/// clipped at the right and bottom edges.
#[derive(Clone)]
pub struct Framebuffer {
    buffer: [u8; BUFFER_BYTES],
    changed: [u8; BUFFER_BYTES],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            buffer: [0; BUFFER_BYTES],
            changed: [0; BUFFER_BYTES],
        }
    }

    /// blank the screen; every lit pixel counts as changed
    pub fn clear(&mut self) {
        self.changed = self.buffer;
        self.buffer = [0; BUFFER_BYTES];
    }

    /// XOR `height` rows of `sprite` onto the screen at (x, y). Returns
    /// true if any lit pixel was turned off.
    pub fn draw(&mut self, x: u8, y: u8, height: u8, sprite: &[u8]) -> bool {
        let x = x as usize % WIDTH;
        let y = y as usize % HEIGHT;
        let offset = x / 8;
        let shift = x % 8;
        let mut set_to_unset = false;
        self.changed = [0; BUFFER_BYTES];

        for (line, &row_data) in sprite.iter().take(height as usize).enumerate() {
            let row = y + line;
            if row >= HEIGHT {
                break;
            }
            let left = ROW_BYTES * row + offset;

            if shift == 0 {
                let original = self.buffer[left];
                self.buffer[left] = original ^ row_data;
                self.changed[left] = row_data;
                if original & row_data != 0 {
                    set_to_unset = true;
                }
            } else {
                // sprite row straddles two bytes
                let has_right = offset + 1 < ROW_BYTES;
                let right_original = if has_right { self.buffer[left + 1] } else { 0 };
                let original = u16::from_be_bytes([self.buffer[left], right_original]);
                let visible: u16 = if has_right { 0xffff } else { 0xff00 };
                let sprite_line = ((row_data as u16) << (8 - shift)) & visible;
                let [hi, lo] = (original ^ sprite_line).to_be_bytes();
                let [changed_hi, changed_lo] = sprite_line.to_be_bytes();

                self.buffer[left] = hi;
                self.changed[left] = changed_hi;
                if has_right {
                    self.buffer[left + 1] = lo;
                    self.changed[left + 1] = changed_lo;
                }
                if original & sprite_line != 0 {
                    set_to_unset = true;
                }
            }
        }
        set_to_unset
    }

    /// raw frame bytes
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// bits flipped by the most recent clear or draw
    pub fn changed(&self) -> &[u8] {
        &self.changed
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        1 & (self.buffer[ROW_BYTES * y + x / 8] >> (7 - x % 8)) == 1
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
