//! VGA text-mode display buffer.
//!
//! The cursor is a byte offset into the buffer (two bytes per cell), so it
//! always sits on an even value between `0` and `SCREEN_SIZE` inclusive.
//! Resting at `SCREEN_SIZE` is allowed; the next write scrolls first.

use core::fmt;
use core::ops::DerefMut;
use core::ptr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> Self {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }
}

/// Attribute byte used for every cell the console writes or blanks (0x07).
pub const DEFAULT_COLOR: ColorCode = ColorCode::new(Color::LightGray, Color::Black);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

impl ScreenChar {
    pub const BLANK: ScreenChar = ScreenChar {
        ascii_character: b' ',
        color_code: DEFAULT_COLOR,
    };
}

pub const BUFFER_HEIGHT: usize = 25;
pub const BUFFER_WIDTH: usize = 80;
pub const VGA_BUFFER_ADDRESS: usize = 0xb8000;

pub const BYTES_PER_CELL: usize = 2;
pub const LINE_SIZE: usize = BUFFER_WIDTH * BYTES_PER_CELL;
pub const SCREEN_SIZE: usize = LINE_SIZE * BUFFER_HEIGHT;
pub const CELL_COUNT: usize = BUFFER_WIDTH * BUFFER_HEIGHT;

/// Layout of the memory-mapped text buffer.
///
/// Cells are read and written with volatile operations so the same type can
/// stand for the real region at `VGA_BUFFER_ADDRESS` and for ordinary memory.
#[repr(transparent)]
pub struct Buffer {
    chars: [[ScreenChar; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

impl Buffer {
    pub const fn blank() -> Self {
        Self {
            chars: [[ScreenChar::BLANK; BUFFER_WIDTH]; BUFFER_HEIGHT],
        }
    }

    pub fn read(&self, row: usize, col: usize) -> ScreenChar {
        // SAFETY: indexing is bounds-checked; the reference is valid for reads.
        unsafe { ptr::read_volatile(&self.chars[row][col]) }
    }

    pub fn write(&mut self, row: usize, col: usize, screen_char: ScreenChar) {
        // SAFETY: indexing is bounds-checked; the reference is valid for writes.
        unsafe { ptr::write_volatile(&mut self.chars[row][col], screen_char) }
    }

    /// Character bytes of one row, for inspection.
    pub fn row_text(&self, row: usize) -> [u8; BUFFER_WIDTH] {
        let mut text = [b' '; BUFFER_WIDTH];
        for (col, byte) in text.iter_mut().enumerate() {
            *byte = self.read(row, col).ascii_character;
        }
        text
    }
}

/// Owns the cursor and drives a [`Buffer`].
///
/// `B` is whatever hands out exclusive access to the buffer: the
/// `&'static mut Buffer` at `VGA_BUFFER_ADDRESS` on hardware, or a plain
/// borrow of a local buffer elsewhere.
pub struct Display<B> {
    buffer: B,
    cursor: usize,
    color_code: ColorCode,
    scrolls: u64,
}

impl<B> Display<B>
where
    B: DerefMut<Target = Buffer>,
{
    pub fn new(buffer: B) -> Self {
        Self {
            buffer,
            cursor: 0,
            color_code: DEFAULT_COLOR,
            scrolls: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of times `scroll` has run since construction.
    pub fn scrolls(&self) -> u64 {
        self.scrolls
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Cell index the next character would land on, clamped to the grid.
    pub fn cursor_cell(&self) -> usize {
        (self.cursor / BYTES_PER_CELL).min(CELL_COUNT - 1)
    }

    pub fn clear(&mut self) {
        for row in 0..BUFFER_HEIGHT {
            self.clear_row(row);
        }
        self.cursor = 0;
    }

    pub fn write_text(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
    }

    pub fn write_byte(&mut self, byte: u8) {
        if byte == b'\n' {
            self.newline();
            return;
        }
        if self.cursor >= SCREEN_SIZE {
            self.scroll();
        }
        self.put(
            self.cursor,
            ScreenChar {
                ascii_character: byte,
                color_code: self.color_code,
            },
        );
        self.cursor += BYTES_PER_CELL;
    }

    pub fn newline(&mut self) {
        self.cursor += LINE_SIZE - (self.cursor % LINE_SIZE);
        if self.cursor >= SCREEN_SIZE {
            self.scroll();
        }
    }

    /// Shift every row up by one and blank the last row.
    ///
    /// Rows are copied in ascending order, so every source row is read
    /// before it becomes a destination.
    pub fn scroll(&mut self) {
        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                let character = self.buffer.read(row, col);
                self.buffer.write(row - 1, col, character);
            }
        }
        self.clear_row(BUFFER_HEIGHT - 1);
        self.cursor = (BUFFER_HEIGHT - 1) * LINE_SIZE;
        self.scrolls += 1;
    }

    /// Step back one cell and blank it, keeping that cell's attribute.
    pub fn erase_previous(&mut self) {
        if self.cursor < BYTES_PER_CELL {
            return;
        }
        self.cursor -= BYTES_PER_CELL;
        let (row, col) = Self::position(self.cursor);
        let existing = self.buffer.read(row, col);
        self.buffer.write(
            row,
            col,
            ScreenChar {
                ascii_character: b' ',
                color_code: existing.color_code,
            },
        );
    }

    fn clear_row(&mut self, row: usize) {
        for col in 0..BUFFER_WIDTH {
            self.buffer.write(row, col, ScreenChar::BLANK);
        }
    }

    fn put(&mut self, offset: usize, screen_char: ScreenChar) {
        let (row, col) = Self::position(offset);
        self.buffer.write(row, col, screen_char);
    }

    /// Byte offset to (row, col), clamped to the last cell.
    fn position(offset: usize) -> (usize, usize) {
        let cell = (offset / BYTES_PER_CELL).min(CELL_COUNT - 1);
        (cell / BUFFER_WIDTH, cell % BUFFER_WIDTH)
    }
}

impl<B> fmt::Write for Display<B>
where
    B: DerefMut<Target = Buffer>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_text(s);
        Ok(())
    }
}
