//! Line editor and keyboard entry point on top of the display buffer.
//!
//! [`Console`] owns all mutable console state: the display (and with it the
//! cursor), the command buffer and the prompt anchor. Every operation takes
//! `&mut self`; on hardware the single instance lives in a global that is
//! only reached with interrupts disabled.

use core::ops::DerefMut;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::keyboard::{self, Key};
use crate::shell::Command;
use crate::simple_string::FixedString;
use crate::vga_buffer::{Buffer, Display, LINE_SIZE};

pub const PROMPT: &str = "> ";
pub const BOOT_BANNER: &str = "Kernel Booted.";

/// Command buffer size including the terminator slot.
pub const MAX_COMMAND_LEN: usize = 100;

pub type CommandBuffer = FixedString<{ MAX_COMMAND_LEN - 1 }>;

/// Port-level access needed by [`Console::handle_interrupt`].
pub trait Hardware {
    /// Send end-of-interrupt to the interrupt controller.
    fn acknowledge_interrupt(&mut self);
    fn read_status(&mut self) -> u8;
    fn read_data(&mut self) -> u8;
    /// Move the blinking hardware cursor to a cell index.
    fn move_cursor(&mut self, _cell: usize) {}
}

/// What a single keyboard interrupt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    NoData,
    Released(u8),
    Unmapped(u8),
    Echoed(u8),
    /// Command buffer full or byte not ASCII.
    Dropped(u8),
    Erased,
    EraseIgnored,
    Submitted,
}

pub struct Console<B> {
    display: Display<B>,
    line: CommandBuffer,
    prompt_anchor: usize,
}

impl<B> Console<B>
where
    B: DerefMut<Target = Buffer>,
{
    pub fn new(buffer: B) -> Self {
        Self {
            display: Display::new(buffer),
            line: CommandBuffer::new(),
            prompt_anchor: 0,
        }
    }

    pub fn display(&self) -> &Display<B> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display<B> {
        &mut self.display
    }

    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn prompt_anchor(&self) -> usize {
        self.prompt_anchor
    }

    /// Blank the screen, print the banner and arm the first prompt.
    pub fn boot(&mut self) {
        self.display.clear();
        self.display.write_text(BOOT_BANNER);
        self.display.newline();
        self.prompt();
    }

    pub fn prompt(&mut self) {
        self.display.write_text(PROMPT);
        self.prompt_anchor = self.display.cursor();
    }

    /// Append and echo one byte; returns `false` when the key is dropped.
    pub fn on_character(&mut self, c: u8) -> bool {
        if let Err(err) = self.line.push_byte(c) {
            log::trace!("dropping {:#04x}: {:?}", c, err);
            return false;
        }

        let before = self.display.scrolls();
        self.display.write_byte(c);
        // Keep the anchor on the same text when the echo scrolled the screen.
        let shifted = (self.display.scrolls() - before) as usize;
        self.prompt_anchor = self.prompt_anchor.saturating_sub(shifted * LINE_SIZE);
        true
    }

    /// Remove the last typed byte; never reaches into the prompt.
    pub fn on_erase(&mut self) -> bool {
        if self.line.is_empty() || self.display.cursor() <= self.prompt_anchor {
            return false;
        }
        self.line.pop();
        self.display.erase_previous();
        true
    }

    /// Run the buffered line, then start a fresh prompt whatever it did.
    pub fn on_submit(&mut self) {
        let command = Command::parse(self.line.as_str());
        log::debug!("dispatch {:?}", command);
        command.execute(&mut self.display);

        self.line.clear();
        self.display.newline();
        self.prompt();
    }

    /// Feed one raw code from the data port.
    pub fn handle_scancode(&mut self, code: u8) -> KeyOutcome {
        if code & keyboard::RELEASE_BIT != 0 {
            return KeyOutcome::Released(code);
        }
        if code == keyboard::ENTER_KEY_CODE {
            self.on_submit();
            return KeyOutcome::Submitted;
        }

        match keyboard::resolve(code) {
            Key::Erase if self.on_erase() => KeyOutcome::Erased,
            Key::Erase => KeyOutcome::EraseIgnored,
            Key::Char(c) if self.on_character(c) => KeyOutcome::Echoed(c),
            Key::Char(c) => KeyOutcome::Dropped(c),
            Key::Unmapped => KeyOutcome::Unmapped(code),
        }
    }

    /// Keyboard interrupt service routine.
    ///
    /// The controller is acknowledged before anything else so a dropped or
    /// early-returning event never leaves IRQ1 blocked.
    pub fn handle_interrupt<H: Hardware>(&mut self, hw: &mut H) -> KeyOutcome {
        hw.acknowledge_interrupt();

        if hw.read_status() & keyboard::STATUS_OUTPUT_FULL == 0 {
            return KeyOutcome::NoData;
        }
        let code = hw.read_data();
        let outcome = self.handle_scancode(code);
        log::trace!("scancode {:#04x} -> {:?}", code, outcome);

        hw.move_cursor(self.display.cursor_cell());
        outcome
    }
}

/// Single-owner flag guarding the global console.
///
/// A second claim while the first is alive fails instead of handing out
/// an aliasing `&mut`.
pub struct ConsoleClaim(AtomicBool);

impl ConsoleClaim {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn try_claim(&self) -> Option<ClaimGuard<'_>> {
        if self.0.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(ClaimGuard(&self.0))
    }

    pub fn is_claimed(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for ConsoleClaim {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases its [`ConsoleClaim`] on drop.
pub struct ClaimGuard<'a>(&'a AtomicBool);

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(target_os = "none")]
pub use self::global::{_print, init, with_console, with_console_in_interrupt, VgaConsole};

#[cfg(target_os = "none")]
mod global {
    use core::cell::UnsafeCell;
    use x86_64::instructions::interrupts;

    use super::{Console, ConsoleClaim};
    use crate::vga_buffer::{Buffer, VGA_BUFFER_ADDRESS};

    pub type VgaConsole = Console<&'static mut Buffer>;

    struct GlobalConsole {
        slot: UnsafeCell<Option<VgaConsole>>,
        claim: ConsoleClaim,
    }

    impl GlobalConsole {
        const fn new() -> Self {
            Self {
                slot: UnsafeCell::new(None),
                claim: ConsoleClaim::new(),
            }
        }

        /// Returns `None` when the console is unbound or already borrowed
        /// further up the stack (a fault raised inside the keyboard handler).
        ///
        /// # Safety
        /// Interrupts must be disabled for the duration of `f`.
        unsafe fn with<F, R>(&self, f: F) -> Option<R>
        where
            F: FnOnce(&mut VgaConsole) -> R,
        {
            let _held = self.claim.try_claim()?;
            // SAFETY: the claim rules out a nested borrow on this core and
            // the caller keeps the keyboard handler from preempting us.
            unsafe { (*self.slot.get()).as_mut().map(f) }
        }
    }

    // SAFETY: see `with`; access is serialized by the claim flag and by
    // disabling interrupts.
    unsafe impl Sync for GlobalConsole {}

    static CONSOLE: GlobalConsole = GlobalConsole::new();

    /// Bind the console to the VGA text buffer. Later calls are ignored.
    pub fn init() {
        interrupts::without_interrupts(|| {
            let Some(_held) = CONSOLE.claim.try_claim() else {
                return;
            };
            // SAFETY: interrupts are off and the claim is held.
            let slot = unsafe { &mut *CONSOLE.slot.get() };
            if slot.is_none() {
                // SAFETY: 0xb8000 is the identity-mapped text buffer, and this
                // is the only place a reference to it is created.
                let buffer = unsafe { &mut *(VGA_BUFFER_ADDRESS as *mut Buffer) };
                *slot = Some(Console::new(buffer));
            }
        });
    }

    /// Run `f` against the console from normal (non-interrupt) context.
    pub fn with_console<F, R>(f: F) -> Option<R>
    where
        F: FnOnce(&mut VgaConsole) -> R,
    {
        // SAFETY: interrupts are disabled around the call.
        interrupts::without_interrupts(|| unsafe { CONSOLE.with(f) })
    }

    /// Run `f` from a handler installed as an interrupt gate.
    ///
    /// # Safety
    /// The CPU must have cleared IF on entry, as it does for interrupt
    /// gates, and `f` must not re-enable interrupts.
    pub unsafe fn with_console_in_interrupt<F, R>(f: F) -> Option<R>
    where
        F: FnOnce(&mut VgaConsole) -> R,
    {
        unsafe { CONSOLE.with(f) }
    }

    /// Screen half of `print!`. Output is dropped while the console is
    /// claimed; fault handlers mirror everything to COM1 anyway.
    #[doc(hidden)]
    pub fn _print(args: core::fmt::Arguments) {
        use core::fmt::Write;
        with_console(|console| {
            let _ = console.display_mut().write_fmt(args);
        });
    }
}

#[cfg(target_os = "none")]
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::console::_print(format_args!($($arg)*)));
}

#[cfg(target_os = "none")]
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($fmt:expr) => ($crate::print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::print!(concat!($fmt, "\n"), $($arg)*));
}
