//! Interrupt subsystem setup.
//!
//! Builds a small IDT (breakpoint, the fatal faults, and the keyboard line),
//! remaps the legacy PIC so only IRQ1 is delivered, and provides the port
//! helpers plus the [`Hardware`] implementation the console runs on.
//!
//! Every gate here is an interrupt gate (type 0x8E), so the CPU clears IF
//! on entry and the keyboard handler can never nest inside itself.

use core::{arch::asm, ptr};
use x86_64::instructions::segmentation::Segment;
use x86_64::registers::segmentation::CS;
use x86_64::structures::idt::InterruptStackFrame;

use crate::console::{self, Hardware};
use crate::keyboard::{KEYBOARD_DATA_PORT, KEYBOARD_STATUS_PORT};
use crate::{exceptions, gdt, println};

const PIC1_COMMAND: u16 = 0x20;
const PIC1_DATA: u16 = 0x21;
const PIC2_COMMAND: u16 = 0xA0;
const PIC2_DATA: u16 = 0xA1;
const PIC_EOI: u8 = 0x20;

pub const PIC1_OFFSET: u8 = 0x20;
pub const PIC2_OFFSET: u8 = PIC1_OFFSET + 8;

/// Mask for the master PIC: everything off except IRQ1.
const PIC1_MASK_KEYBOARD_ONLY: u8 = 0xFD;
const PIC2_MASK_ALL: u8 = 0xFF;

const CRT_INDEX_PORT: u16 = 0x3D4;
const CRT_DATA_PORT: u16 = 0x3D5;
const CRT_CURSOR_LOW: u8 = 0x0F;
const CRT_CURSOR_HIGH: u8 = 0x0E;

/// Type/attribute word: present, DPL 0, 64-bit interrupt gate.
const INTERRUPT_GATE: u16 = 0x8E00;
/// Low three bits of the attribute word select the IST slot.
const IST_BITS: u16 = 0b111;

/// One 16-byte long-mode gate descriptor.
#[derive(Copy, Clone)]
#[repr(C, packed)]
pub struct IdtEntry {
    offset_low: u16,
    selector: u16,
    options: u16,
    offset_mid: u16,
    offset_high: u32,
    reserved: u32,
}

impl IdtEntry {
    /// Non-present gate. Vectors left like this fault into a double fault.
    pub const fn missing() -> Self {
        Self {
            offset_low: 0,
            selector: 0,
            options: 0,
            offset_mid: 0,
            offset_high: 0,
            reserved: 0,
        }
    }

    /// Interrupt gate into `handler` through the current code segment.
    pub fn new(handler: usize) -> Self {
        Self {
            offset_low: handler as u16,
            selector: CS::get_reg().0,
            options: INTERRUPT_GATE,
            offset_mid: (handler >> 16) as u16,
            offset_high: (handler >> 32) as u32,
            reserved: 0,
        }
    }

    /// Same gate, but the CPU switches to IST slot `ist` (1..=7) first.
    pub fn new_with_ist(handler: usize, ist: u8) -> Self {
        Self {
            options: INTERRUPT_GATE | (u16::from(ist) & IST_BITS),
            ..Self::new(handler)
        }
    }
}

#[repr(C, packed)]
struct Idtr {
    limit: u16,
    base: u64,
}

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    Breakpoint = 0x03,
    DoubleFault = 0x08,
    GeneralProtection = 0x0D,
    PageFault = 0x0E,
    Keyboard = PIC1_OFFSET + 1,
}

const IDT_LEN: usize = 256;
static mut IDT: [IdtEntry; IDT_LEN] = [IdtEntry::missing(); IDT_LEN];

/// Install the IDT and program the PIC. Interrupts stay disabled; the
/// caller enables them once the console is ready.
pub fn init() {
    unsafe {
        let idt = &raw mut IDT;
        (*idt)[InterruptIndex::Breakpoint as usize] =
            IdtEntry::new(breakpoint_handler as *const () as usize);
        (*idt)[InterruptIndex::DoubleFault as usize] = IdtEntry::new_with_ist(
            exceptions::double_fault_handler as *const () as usize,
            gdt::DOUBLE_FAULT_IST_INDEX_FOR_IDT as u8,
        );
        (*idt)[InterruptIndex::GeneralProtection as usize] =
            IdtEntry::new(exceptions::gpf_handler as *const () as usize);
        (*idt)[InterruptIndex::PageFault as usize] =
            IdtEntry::new(exceptions::page_fault_handler as *const () as usize);
        (*idt)[InterruptIndex::Keyboard as usize] =
            IdtEntry::new(keyboard_interrupt_handler as *const () as usize);

        remap_pic();
        load_idt(ptr::addr_of!(IDT).cast(), IDT_LEN);
    }
    log::info!("IDT loaded, PIC remapped to {:#x}/{:#x}", PIC1_OFFSET, PIC2_OFFSET);
}

unsafe fn load_idt(idt: *const IdtEntry, len: usize) {
    let idtr = Idtr {
        limit: (len * size_of::<IdtEntry>() - 1) as u16,
        base: idt as u64,
    };
    // SAFETY: `idt` points at a static table of `len` entries.
    unsafe { asm!("lidt [{}]", in(reg) &idtr, options(readonly, nostack, preserves_flags)) };
}

/// Send End-Of-Interrupt to the Programmable Interrupt Controller.
pub unsafe fn send_eoi(vector: u8) {
    if vector >= PIC2_OFFSET {
        unsafe { outb(PIC2_COMMAND, PIC_EOI) };
    }
    unsafe { outb(PIC1_COMMAND, PIC_EOI) };
}

/// Remap the legacy PIC and mask every line except the keyboard.
unsafe fn remap_pic() {
    unsafe {
        outb(PIC1_COMMAND, 0x11);
        io_wait();
        outb(PIC2_COMMAND, 0x11);
        io_wait();

        outb(PIC1_DATA, PIC1_OFFSET);
        io_wait();
        outb(PIC2_DATA, PIC2_OFFSET);
        io_wait();

        outb(PIC1_DATA, 4);
        io_wait();
        outb(PIC2_DATA, 2);
        io_wait();

        outb(PIC1_DATA, 0x01);
        io_wait();
        outb(PIC2_DATA, 0x01);
        io_wait();

        outb(PIC1_DATA, PIC1_MASK_KEYBOARD_ONLY);
        outb(PIC2_DATA, PIC2_MASK_ALL);
    }
}

/// Unused POST diagnostic port; a write takes roughly a microsecond.
const IO_WAIT_PORT: u16 = 0x80;

/// Give the PIC time to settle between initialization words.
fn io_wait() {
    unsafe { outb(IO_WAIT_PORT, 0) }
}

/// Write one byte to an I/O port.
///
/// # Safety
/// Port writes can reprogram hardware; the caller owns the device behind `port`.
pub unsafe fn outb(port: u16, value: u8) {
    unsafe {
        asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags))
    };
}

/// Read one byte from an I/O port.
///
/// # Safety
/// Some device registers change state when read.
pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    unsafe {
        asm!("in al, dx", in("dx") port, out("al") value, options(nomem, nostack, preserves_flags))
    };
    value
}

/// The real keyboard controller, PIC and CRT cursor registers.
pub struct PortHardware;

impl Hardware for PortHardware {
    fn acknowledge_interrupt(&mut self) {
        unsafe { send_eoi(InterruptIndex::Keyboard as u8) }
    }

    fn read_status(&mut self) -> u8 {
        unsafe { inb(KEYBOARD_STATUS_PORT) }
    }

    fn read_data(&mut self) -> u8 {
        unsafe { inb(KEYBOARD_DATA_PORT) }
    }

    fn move_cursor(&mut self, cell: usize) {
        unsafe {
            outb(CRT_INDEX_PORT, CRT_CURSOR_LOW);
            outb(CRT_DATA_PORT, (cell & 0xFF) as u8);
            outb(CRT_INDEX_PORT, CRT_CURSOR_HIGH);
            outb(CRT_DATA_PORT, ((cell >> 8) & 0xFF) as u8);
        }
    }
}

extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    // SAFETY: installed as an interrupt gate, so IF is clear until iretq.
    let handled =
        unsafe { console::with_console_in_interrupt(|c| c.handle_interrupt(&mut PortHardware)) };
    if handled.is_none() {
        // Console unbound or already claimed: acknowledge and drain the port anyway.
        let mut hw = PortHardware;
        hw.acknowledge_interrupt();
        let _ = hw.read_data();
    }
}

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    println!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}
