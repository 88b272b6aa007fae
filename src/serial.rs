//! COM1 16550 UART, polled, 115200 8N1. Carries log output only; the VGA
//! screen belongs to the console.

use core::fmt;

use crate::interrupts::{inb, outb};

const COM1: u16 = 0x3F8;

// Register offsets from the base port.
const RBR_THR_DLL: u16 = 0;
const IER_DLM: u16 = 1;
const FCR_IIR: u16 = 2;
const LCR: u16 = 3;
const MCR: u16 = 4;
const LSR: u16 = 5;

const LCR_WORDLEN_8: u8 = 0b11;
const LCR_DLAB: u8 = 1 << 7;
const LSR_THR_EMPTY: u8 = 1 << 5;

/// Program COM1: no UART interrupts, divisor 1, 8N1, FIFO on, DTR|RTS|OUT2.
pub fn init() {
    unsafe {
        outb(COM1 + IER_DLM, 0x00);

        outb(COM1 + LCR, LCR_DLAB);
        outb(COM1 + RBR_THR_DLL, 0x01);
        outb(COM1 + IER_DLM, 0x00);

        outb(COM1 + LCR, LCR_WORDLEN_8);
        outb(COM1 + FCR_IIR, 0xC7);
        outb(COM1 + MCR, 0x0B);
    }
}

pub fn write_byte_blocking(byte: u8) {
    unsafe {
        while inb(COM1 + LSR) & LSR_THR_EMPTY == 0 {}
        outb(COM1 + RBR_THR_DLL, byte);
    }
}

/// Write a string, translating `\n` to `\r\n`.
pub fn write_str(s: &str) {
    for b in s.bytes() {
        if b == b'\n' {
            write_byte_blocking(b'\r');
        }
        write_byte_blocking(b);
    }
}

/// Zero-sized `fmt::Write` handle for COM1.
pub struct SerialPort;

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_str(s);
        Ok(())
    }
}
